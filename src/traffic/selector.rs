//! Weighted request selection.
//!
//! Each dispatch slot picks the favoured `index` URI with probability
//! `indexPct / 100` and otherwise one of `otherUris` uniformly. A source
//! address is drawn independently when `localAddresses` is configured.
//! Selection is stateless: no memory of earlier picks.

use std::fmt;
use std::net::IpAddr;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::config::Config;

/// Which branch of the weighted choice fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionKind {
    Index,
    Other,
}

impl SelectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionKind::Index => "index",
            SelectionKind::Other => "other",
        }
    }
}

impl fmt::Display for SelectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One dispatch slot's target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub kind: SelectionKind,
    pub uri: String,
    pub source: Option<IpAddr>,
}

/// Pick a target for one dispatch slot.
///
/// `chance` is drawn from `0..100`, so `chance < indexPct` selects `index`
/// with probability exactly `indexPct / 100`. An inclusive `1..=100` draw
/// would fall one point short and could pick `other` at `indexPct = 100`.
/// Returns `None` only if the
/// `other` branch fires with no `otherUris` to choose from.
pub fn select<R: Rng + ?Sized>(config: &Config, rng: &mut R) -> Option<Selection> {
    let chance: u32 = rng.gen_range(0..100);

    let (kind, uri) = if chance < config.index_pct {
        (SelectionKind::Index, config.index.clone())
    } else {
        (SelectionKind::Other, config.other_uris.choose(rng)?.clone())
    };

    let source = config
        .local_addresses
        .as_deref()
        .and_then(|addrs| addrs.choose(rng))
        .copied();

    Some(Selection { kind, uri, source })
}

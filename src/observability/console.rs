//! Debug console: redraws the stats document after every tick.

use std::io::{self, Write};

use crate::traffic::stats::StatsSnapshot;

/// Clear the terminal and print the stats document.
pub fn render(snapshot: &StatsSnapshot) {
    let Ok(doc) = serde_json::to_string_pretty(snapshot) else {
        return;
    };

    let mut out = io::stdout().lock();
    // ESC c resets the terminal, ESC [H homes the cursor.
    let _ = writeln!(out, "\x1bc\x1b[H{}", doc);
    let _ = out.flush();
}

pub mod auth;
pub mod handlers;

use axum::{middleware, routing::put, Router};

use self::auth::basic_auth_middleware;
use self::handlers::*;
use crate::http::server::AppState;

/// Control-plane routes.
///
/// Only `PUT /config` is authenticated; every other method and path,
/// `GET /config` included, falls through to the stats document.
pub fn setup_control_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/config",
            put(put_config)
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    basic_auth_middleware,
                ))
                .fallback(get_stats),
        )
        .fallback(get_stats)
        .with_state(state)
}

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;


pub fn build_router(app_state: AppState) -> Router {
    let protected_routes = Router::new()
        .route(
            "/processes/{process_id}/lock",
            post(handlers::lock_handler).get(handlers::lock_status_handler),
        )
        .route(
            "/processes/{process_id}/unlock",
            post(handlers::unlock_handler),
        )
        .route(
            "/processes/{process_id}/heartbeat",
            post(handlers::heartbeat_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_bearer,
        ));

    Router::new()
        .route("/health", get(handlers::health_handler))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

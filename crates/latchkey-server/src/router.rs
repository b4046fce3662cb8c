use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post, put};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::require_auth;
use crate::state::AppState;

/// Build the application router. Routes in the protected group run
/// behind [`require_auth`].
pub fn create_router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/refresh_token", post(handlers::refresh_token))
        .route("/sign_out", post(handlers::sign_out))
        .route("/logins/{id}/password", put(handlers::modify_password))
        .route("/users", get(handlers::list_users))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/status", get(handlers::status))
        .route("/sign_up", post(handlers::sign_up))
        .route("/sign_in", post(handlers::sign_in))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

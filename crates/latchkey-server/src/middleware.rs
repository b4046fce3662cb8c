//! Axum layer guarding protected routes.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use latchkey_core::error::LatchkeyError;

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticate the bearer token and hand the resulting
/// [`AuthIdentity`](latchkey_core::models::auth::AuthIdentity) to the
/// handler through the request extensions.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = match request.headers().get(header::AUTHORIZATION) {
        Some(value) => Some(value.to_str().map(str::to_owned).map_err(|_| {
            LatchkeyError::bad_request("the token must be associated with the auth header")
        })?),
        None => None,
    };

    let identity = state.authenticator.authenticate(header.as_deref()).await?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

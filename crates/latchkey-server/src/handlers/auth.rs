//! Sign-up, sign-in, token renewal, sign-out and password rotation.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use latchkey_auth::{ModifyPasswordInput, SignInInput, SignUpInput};
use latchkey_core::error::LatchkeyError;
use latchkey_core::models::auth::AuthIdentity;
use latchkey_core::validation::Passwords;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Credentials submitted to `/sign_up` and `/sign_in`.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ModifyPasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    let Json(request) = payload?;

    let token = state
        .auth_service
        .sign_up(SignUpInput {
            username: request.username,
            password: request.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}

pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(request) = payload?;

    let token = state
        .auth_service
        .sign_in(SignInInput {
            username: request.username,
            password: request.password,
        })
        .await?;

    Ok(Json(TokenResponse { token }))
}

pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AuthIdentity>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = state.auth_service.renew_token(identity).await?;
    Ok(Json(TokenResponse { token }))
}

pub async fn sign_out(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AuthIdentity>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.auth_service.sign_out(identity).await?;
    Ok(MessageResponse::new("signed out successfully"))
}

/// `PUT /logins/{id}/password`, where `id` is the id of the user owning
/// the login. Callers may only rotate their own password.
pub async fn modify_password(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AuthIdentity>,
    Path(id): Path<String>,
    payload: Result<Json<ModifyPasswordRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = payload?;

    if Uuid::parse_str(&id).is_ok_and(|target| target != identity.user_id) {
        warn!(user_id = %identity.user_id, target = %id, "Password change for another user refused");
        return Err(LatchkeyError::unauthorized("you can only change your own password").into());
    }

    state
        .auth_service
        .modify_password(ModifyPasswordInput {
            id,
            passwords: Passwords {
                current_password: request.current_password,
                new_password: request.new_password,
            },
        })
        .await?;

    Ok(MessageResponse::new("password modified successfully"))
}

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use latchkey_core::models::user::User;
use latchkey_core::repository::Pagination;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct ListUsersParams {
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

/// List registered users. Requires an authenticated caller.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ListUsersParams>, QueryRejection>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let Query(params) = params?;
    let defaults = Pagination::default();
    let pagination = Pagination {
        offset: params.offset.unwrap_or(defaults.offset),
        limit: params.limit.unwrap_or(defaults.limit).min(MAX_PAGE_SIZE),
    };

    let page = state.auth_service.list_users(pagination).await?;
    Ok(Json(page.items.into_iter().map(UserResponse::from).collect()))
}

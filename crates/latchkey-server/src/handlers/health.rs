use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

/// Liveness check.
pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "everything is up and running".to_string(),
    })
}

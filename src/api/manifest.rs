use axum::{extract::State, Json};

use super::AppState;
use crate::models::Manifest;

/// 能力描述
pub async fn get_manifest(State(state): State<AppState>) -> Json<Manifest> {
    Json((*state.manifest).clone())
}

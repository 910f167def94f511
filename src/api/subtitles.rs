//! 字幕列表端点
//!
//! 始终返回 200，失败时为空列表。

use axum::{
    extract::{Path, State},
    http::Uri,
    Json,
};
use tracing::info;

use super::AppState;
use crate::models::{MediaIdentifier, MediaType, SubtitlesResponse};

/// GET /subtitles/:type/:id.json
pub async fn list_subtitles(
    State(state): State<AppState>,
    Path((media_type, id)): Path<(String, String)>,
) -> Json<SubtitlesResponse> {
    respond(&state, &media_type, &id, None).await
}

/// GET /subtitles/:type/:id/:extra.json
///
/// extra 段是表单编码的字符串，只能解码一次，所以从原始 URI 中取，
/// 不用 `Path` 已解码过的值。
pub async fn list_subtitles_with_extra(
    State(state): State<AppState>,
    Path((media_type, id, _extra)): Path<(String, String, String)>,
    uri: Uri,
) -> Json<SubtitlesResponse> {
    respond(&state, &media_type, &id, raw_last_segment(uri.path())).await
}

/// 原始（未解码的）最后一个路径段
fn raw_last_segment(path: &str) -> Option<&str> {
    path.rsplit('/').next().filter(|segment| !segment.is_empty())
}

async fn respond(
    state: &AppState,
    media_type: &str,
    id: &str,
    extra: Option<&str>,
) -> Json<SubtitlesResponse> {
    let media_type = MediaType::from_route(media_type);
    let id = MediaIdentifier::from_segment(id);
    info!("Subtitle request: {} {}", media_type, id);

    let entries = state.service.list(media_type, &id, extra).await;
    Json(SubtitlesResponse::from(entries))
}

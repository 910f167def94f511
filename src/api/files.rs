use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};
use tracing::debug;

use super::error::{ApiError, ApiResult};
use super::AppState;

/// 提供已解出的字幕文件
pub async fn serve_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Response> {
    if name.contains('/') || name.contains("..") {
        return Err(ApiError::BadRequest(format!("invalid file name: {}", name)));
    }

    let stored = state
        .service
        .store()
        .get(&name)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("subtitle file {}", name)))?;
    debug!("Serving {} ({} from {})", stored.file_name, stored.member_name, stored.source_url);

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}\"", disposition_name(&stored.member_name)),
        )
        .header(
            header::LAST_MODIFIED,
            stored.stored_at.format("%a, %d %b %Y %H:%M:%S GMT").to_string(),
        )
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .body(Body::from(stored.text.to_string()))
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(response)
}

/// 压缩包内的成员名，去掉引号和非 ASCII 字符后用作下载文件名
fn disposition_name(member_name: &str) -> String {
    member_name
        .chars()
        .map(|c| {
            if c == ' ' || (c.is_ascii_graphic() && c != '"' && c != '\\') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

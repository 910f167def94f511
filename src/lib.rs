// 斯洛文尼亚语字幕插件后端
//
// 本库提供插件宿主调用的字幕接口，包括：
// - 能力描述（manifest）
// - 标题解析（IMDb 页面 / TMDB / 文件名提示）
// - 字幕站点搜索结果抓取
// - 字幕压缩包下载与解压
// - 解出文件的有界存储与下载

pub mod api;
pub mod config;
pub mod external;
pub mod models;
pub mod services;

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::AppState;
use crate::config::AppConfig;
use crate::services::SubtitleService;

/// 按配置构建应用状态
pub fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let client = external::build_http_client(config.http_timeout)?;
    let service = SubtitleService::from_config(config, client);
    Ok(AppState::new(service))
}

/// 构建路由
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "Podnapisi subtitle addon" }))
        .route("/manifest.json", get(api::manifest::get_manifest))
        .route("/health", get(api::health::health_check))
        .route(
            "/subtitles/:media_type/:id",
            get(api::subtitles::list_subtitles),
        )
        .route(
            "/subtitles/:media_type/:id/:extra",
            get(api::subtitles::list_subtitles_with_extra),
        )
        .route("/file/:name", get(api::files::serve_file))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

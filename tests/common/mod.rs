// 测试用的上游模拟站点
//
// 同一个 axum 服务同时扮演 IMDb 标题页、字幕站点搜索页、压缩包下载和登录表单。

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use podnapisi_addon::api::AppState;
use podnapisi_addon::config::AppConfig;
use podnapisi_addon::{build_router, build_state};

pub const PUBLIC_BASE: &str = "http://addon.test";

pub const TMDB_KEY: &str = "test-key";

/// 返回 403 的登录路径
pub const DENIED_LOGIN_PATH: &str = "/sl/login-denied";

pub const TITANIC_SRT: &str = "1\n00:00:01,000 --> 00:00:04,000\nŽivjo, Jack.\n\n2\n00:00:05,000 --> 00:00:07,000\nKje si?\n";

const TITANIC_SEARCH_PAGE: &str = r#"<html><body>
<table><tbody>
  <tr class="subtitle-entry">
    <td><a href="/sl/subtitles/sl-titanic-1997/AbC1">Titanic (1997) BluRay</a></td>
    <td><abbr data-language="sl">sl</abbr></td>
  </tr>
  <tr class="subtitle-entry">
    <td><a href="/sl/subtitles/sl-titanic-1997/Bad2">Titanic (1997) DVDRip</a></td>
    <td><abbr data-language="sl">sl</abbr></td>
  </tr>
  <tr class="subtitle-entry">
    <td><a href="/sl/subtitles/sl-titanic-1997/Mal3">Titanic (1997) WEB</a></td>
  </tr>
  <tr class="subtitle-entry">
    <td><a href="/sl/subtitles/sl-titanic-1997/Emp4">Titanic (1997) HDTV</a></td>
  </tr>
  <tr class="subtitle-entry">
    <td><a href="/sl/subtitles/en-titanic-1997/Eng5">Titanic (1997) English</a></td>
    <td><abbr data-language="en">en</abbr></td>
  </tr>
</tbody></table>
</body></html>"#;

/// 模拟上游
pub struct Upstream {
    pub base_url: String,
    pub logins: Arc<AtomicUsize>,
    pub searches: Arc<AtomicUsize>,
    pub queries: Arc<Mutex<Vec<String>>>,
}

#[derive(Clone)]
struct Counters {
    logins: Arc<AtomicUsize>,
    searches: Arc<AtomicUsize>,
    queries: Arc<Mutex<Vec<String>>>,
}

pub fn build_zip(members: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::FileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    for (name, content) in members {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

async fn imdb_title(Path(id): Path<String>) -> Response {
    let title = match id.as_str() {
        "tt0120338" => "Titanic (1997) - IMDb",
        "tt9999999" => "Nothing Matches (2001) - IMDb",
        _ => return StatusCode::NOT_FOUND.into_response(),
    };
    Html(format!(
        r#"<html><head><meta property="og:title" content="{}"></head><body></body></html>"#,
        title
    ))
    .into_response()
}

async fn search(
    State(counters): State<Counters>,
    Query(params): Query<HashMap<String, String>>,
) -> Html<String> {
    counters.searches.fetch_add(1, Ordering::SeqCst);
    if let Some(keywords) = params.get("keywords") {
        counters.queries.lock().unwrap().push(keywords.clone());
    }
    match (
        params.get("keywords").map(String::as_str),
        params.get("language").map(String::as_str),
    ) {
        (Some("Titanic"), Some("sl")) => Html(TITANIC_SEARCH_PAGE.to_string()),
        _ => Html("<html><body><p>Ni zadetkov.</p></body></html>".to_string()),
    }
}

async fn download(Path((_slug, id)): Path<(String, String)>) -> Response {
    match id.as_str() {
        "AbC1" => (
            [(header::CONTENT_TYPE, "application/zip")],
            build_zip(&[
                ("Release.nfo", "ripped by nobody"),
                ("Titanic.1997.SLO.srt", TITANIC_SRT),
            ]),
        )
            .into_response(),
        "Bad2" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        "Mal3" => Html("<html><body>Access denied</body></html>").into_response(),
        "Emp4" => (
            [(header::CONTENT_TYPE, "application/zip")],
            build_zip(&[("Release.nfo", "no subtitles inside")]),
        )
            .into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn movie_page(Path(slug): Path<String>) -> Html<String> {
    match slug.as_str() {
        "titanic" => Html(TITANIC_SEARCH_PAGE.to_string()),
        _ => Html("<html><body><p>Ni zadetkov.</p></body></html>".to_string()),
    }
}

/// TMDB find：同一个 IMDb ID 同时返回电影和剧集结果
async fn tmdb_find(
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if params.get("api_key").map(String::as_str) != Some(TMDB_KEY)
        || params.get("external_source").map(String::as_str) != Some("imdb_id")
    {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    match id.as_str() {
        "tt0944947" => Json(serde_json::json!({
            "movie_results": [
                { "id": 1, "title": "Nothing Matches", "release_date": "2001-05-01" }
            ],
            "tv_results": [
                { "id": 1399, "name": "Titanic", "first_air_date": "2011-04-17" }
            ],
            "person_results": []
        }))
        .into_response(),
        _ => Json(serde_json::json!({ "movie_results": [], "tv_results": [] })).into_response(),
    }
}

async fn denied_login(State(counters): State<Counters>) -> StatusCode {
    counters.logins.fetch_add(1, Ordering::SeqCst);
    StatusCode::FORBIDDEN
}

async fn login(State(counters): State<Counters>) -> impl IntoResponse {
    counters.logins.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(50)).await;
    ([(header::SET_COOKIE, "session=abc; Path=/")], "ok")
}

/// 在随机端口启动模拟上游
pub async fn spawn_upstream() -> Upstream {
    let counters = Counters {
        logins: Arc::new(AtomicUsize::new(0)),
        searches: Arc::new(AtomicUsize::new(0)),
        queries: Arc::new(Mutex::new(Vec::new())),
    };

    let app = Router::new()
        .route("/title/:id/", get(imdb_title))
        .route("/sl/subtitles/search", get(search))
        .route("/sl/subtitles/:slug/:id/download", get(download))
        .route("/sl/movies/:slug", get(movie_page))
        .route("/find/:id", get(tmdb_find))
        .route("/sl/login", post(login))
        .route(DENIED_LOGIN_PATH, post(denied_login))
        .with_state(counters.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Upstream {
        base_url: format!("http://{}", addr),
        logins: counters.logins,
        searches: counters.searches,
        queries: counters.queries,
    }
}

/// 指向模拟上游的配置
pub fn test_config(upstream: &Upstream) -> AppConfig {
    AppConfig {
        public_base_url: PUBLIC_BASE.to_string(),
        podnapisi_base_url: upstream.base_url.clone(),
        imdb_base_url: upstream.base_url.clone(),
        tmdb_base_url: upstream.base_url.clone(),
        http_timeout: Duration::from_secs(5),
        ..AppConfig::default()
    }
}

pub fn test_app(config: &AppConfig) -> Router {
    let state: AppState = build_state(config).unwrap();
    build_router(state)
}

pub mod archive;
pub mod error;
pub mod imdb;
pub mod podnapisi;
pub mod tmdb;

use std::time::Duration;

use reqwest::Client;

pub use archive::ArchiveFetcher;
pub use error::{UpstreamError, UpstreamResult};
pub use imdb::ImdbClient;
pub use podnapisi::{LoginSession, PodnapisiClient};
pub use tmdb::TmdbClient;

/// 浏览器 User-Agent，部分站点对默认 UA 直接拒绝
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// 构建共享的 HTTP 客户端
///
/// 启用 cookie 存储，登录后的会话 cookie 由所有请求共用。
pub fn build_http_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(BROWSER_USER_AGENT)
        .cookie_store(true)
        .timeout(timeout)
        .build()
}

/// GET 并返回响应文本，非 2xx 状态视为错误
pub async fn fetch_text(client: &Client, url: &str) -> UpstreamResult<String> {
    let response = client
        .get(url)
        .header("Accept-Language", "sl,en;q=0.8")
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(UpstreamError::HttpStatus(response.status().as_u16()));
    }

    Ok(response.text().await?)
}

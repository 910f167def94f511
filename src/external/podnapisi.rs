//! 字幕站点客户端
//!
//! 负责搜索页抓取、结果行解析以及可选的登录重放。
//! 页面结构全部来自 `SiteSelectors`，站点改版只需调整选择器表。

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};
use url::Url;

use super::error::{UpstreamError, UpstreamResult};
use crate::config::{AppConfig, CatalogMode, SiteSelectors};
use crate::models::SubtitleCandidate;

/// 登录会话
///
/// 进程内只获取一次，之后不刷新。登录失败同样会被记录，不再重试。
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub authenticated: bool,
    pub acquired_at: DateTime<Utc>,
}

/// 字幕站点客户端
#[derive(Clone)]
pub struct PodnapisiClient {
    client: Client,
    base_url: String,
    language: String,
    sort: String,
    mode: CatalogMode,
    selectors: Arc<SiteSelectors>,
    credentials: Option<(String, String)>,
    session: Arc<OnceCell<LoginSession>>,
}

impl PodnapisiClient {
    pub fn new(client: Client, config: &AppConfig) -> Self {
        Self {
            client,
            base_url: config.podnapisi_base_url.clone(),
            language: config.language.clone(),
            sort: config.sort.clone(),
            mode: config.catalog_mode,
            selectors: Arc::new(config.selectors.clone()),
            credentials: config
                .credentials()
                .map(|(u, p)| (u.to_string(), p.to_string())),
            session: Arc::new(OnceCell::new()),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// 当前登录状态：未配置凭据时为 None
    pub fn login_state(&self) -> Option<&LoginSession> {
        self.session.get()
    }

    /// 确保已尝试登录（仅在配置了凭据时）
    ///
    /// 并发的首批请求只会触发一次登录 POST。
    pub async fn ensure_login(&self) -> Option<&LoginSession> {
        let (username, password) = self.credentials.as_ref()?;
        let session = self
            .session
            .get_or_init(|| async move {
                match self.login(username, password).await {
                    Ok(()) => {
                        info!("Logged in to subtitle site as {}", username);
                        LoginSession {
                            authenticated: true,
                            acquired_at: Utc::now(),
                        }
                    }
                    Err(e) => {
                        warn!("Login failed, continuing anonymously: {}", e);
                        LoginSession {
                            authenticated: false,
                            acquired_at: Utc::now(),
                        }
                    }
                }
            })
            .await;
        Some(session)
    }

    async fn login(&self, username: &str, password: &str) -> UpstreamResult<()> {
        let url = format!("{}{}", self.base_url, self.selectors.login_path);
        let form = [
            (self.selectors.login_username_field.as_str(), username),
            (self.selectors.login_password_field.as_str(), password),
        ];

        let response = self.client.post(&url).form(&form).send().await?;
        if !response.status().is_success() {
            return Err(UpstreamError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }

    /// 构造列表页 URL
    pub fn listing_url(&self, query: &str) -> UpstreamResult<Url> {
        match self.mode {
            CatalogMode::Search => {
                let mut url = Url::parse(&format!("{}{}", self.base_url, self.selectors.search_path))?;
                url.query_pairs_mut()
                    .append_pair("keywords", query)
                    .append_pair("language", &self.language)
                    .append_pair("sort", &self.sort);
                Ok(url)
            }
            CatalogMode::Slug => {
                let slug = slugify(query);
                if slug.is_empty() {
                    return Err(UpstreamError::InvalidUrl(format!("empty slug for {:?}", query)));
                }
                Ok(Url::parse(&format!(
                    "{}/{}/movies/{}",
                    self.base_url,
                    self.language,
                    urlencoding::encode(&slug)
                ))?)
            }
        }
    }

    /// 搜索字幕候选项
    pub async fn search(&self, query: &str) -> UpstreamResult<Vec<SubtitleCandidate>> {
        self.ensure_login().await;

        let url = self.listing_url(query)?;
        info!("Searching subtitles: {}", url);

        let html = super::fetch_text(&self.client, url.as_str()).await?;
        let candidates = parse_candidates(&html, &self.base_url, &self.selectors, &self.language)?;

        debug!("HTML length: {}, found entries: {}", html.len(), candidates.len());
        Ok(candidates)
    }
}

fn parse_selector(css: &str) -> UpstreamResult<Selector> {
    Selector::parse(css).map_err(|e| UpstreamError::Selector(format!("{:?}: {:?}", css, e)))
}

/// 从列表页 HTML 中解析候选项
///
/// 行内存在语言标记时，只保留语言匹配的行；重复的详情链接只保留第一条。
pub fn parse_candidates(
    html: &str,
    base_url: &str,
    selectors: &SiteSelectors,
    language: &str,
) -> UpstreamResult<Vec<SubtitleCandidate>> {
    let row_selector = parse_selector(&selectors.entry_row)?;
    let link_selector = parse_selector(&selectors.detail_link)?;
    let language_selector = parse_selector(&selectors.language_marker)?;
    let base = Url::parse(base_url)?;

    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for row in document.select(&row_selector) {
        let Some(link) = row
            .select(&link_selector)
            .find(|a| a.value().attr("href").is_some())
        else {
            continue;
        };
        let Some(href) = link.value().attr("href") else {
            continue;
        };

        if let Some(marker) = row.select(&language_selector).next() {
            let row_language = marker_language(marker, &selectors.language_attribute);
            if !row_language.eq_ignore_ascii_case(language) {
                debug!("Skipping row with language {:?}", row_language);
                continue;
            }
        }

        let mut detail = match base.join(href) {
            Ok(url) => url,
            Err(e) => {
                debug!("Skipping unparsable link {:?}: {}", href, e);
                continue;
            }
        };
        detail.set_query(None);
        detail.set_fragment(None);

        let id = detail
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .unwrap_or_default()
            .to_string();
        if id.is_empty() || !seen.insert(detail.to_string()) {
            continue;
        }

        let name = normalize_whitespace(&link.text().collect::<Vec<_>>().join(" "));
        let detail_url = detail.as_str().trim_end_matches('/').to_string();
        let download_url = format!("{}{}", detail_url, selectors.download_suffix);

        candidates.push(SubtitleCandidate {
            display_name: if name.is_empty() { id.clone() } else { name },
            id,
            detail_url,
            download_url,
            language_tag: language.to_string(),
        });
    }

    Ok(candidates)
}

fn marker_language(marker: ElementRef<'_>, attribute: &str) -> String {
    marker
        .value()
        .attr(attribute)
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| marker.text().collect::<String>().trim().to_string())
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `"Titanic: Part II"` -> `"titanic-part-ii"`
pub fn slugify(title: &str) -> String {
    let mut slug = String::new();
    for ch in title.chars() {
        if ch.is_alphanumeric() {
            slug.extend(ch.to_lowercase());
        } else if (ch.is_whitespace() || ch == '-') && !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

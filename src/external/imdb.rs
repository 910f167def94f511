use reqwest::Client;
use regex::Regex;
use scraper::{Html, Selector};

use super::error::{UpstreamError, UpstreamResult};
use crate::models::ResolvedTitle;

lazy_static::lazy_static! {
    /// 标题后的装饰：`(1997) ...`、`(TV Series 2011–2019) ...`
    static ref YEAR_DECORATION: Regex =
        Regex::new(r"\s*\([^)]*?\b(\d{4})\b[^)]*\).*$").unwrap();
    static ref IMDB_SUFFIX: Regex = Regex::new(r"(?i)\s*-\s*IMDb\s*$").unwrap();
}

/// IMDb 页面客户端，读取 og:title 元标签
#[derive(Clone)]
pub struct ImdbClient {
    client: Client,
    base_url: String,
}

impl ImdbClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// 抓取标题页并解析标题
    pub async fn fetch_title(&self, imdb_id: &str) -> UpstreamResult<ResolvedTitle> {
        let url = format!("{}/title/{}/", self.base_url, imdb_id);
        let html = super::fetch_text(&self.client, &url).await?;
        parse_og_title(&html).ok_or(UpstreamError::MissingField("og:title"))
    }
}

/// 从页面 HTML 中提取 og:title 并去掉年份装饰
pub fn parse_og_title(html: &str) -> Option<ResolvedTitle> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(r#"meta[property="og:title"]"#).ok()?;
    let content = document
        .select(&selector)
        .next()
        .and_then(|meta| meta.value().attr("content"))?;

    clean_title(content)
}

/// `Titanic (1997) - IMDb` -> `Titanic` + 1997
pub fn clean_title(raw: &str) -> Option<ResolvedTitle> {
    let without_suffix = IMDB_SUFFIX.replace(raw.trim(), "");
    let year = YEAR_DECORATION
        .captures(&without_suffix)
        .and_then(|cap| cap[1].parse::<i32>().ok());
    let title = YEAR_DECORATION.replace(&without_suffix, "").trim().to_string();

    if title.is_empty() {
        None
    } else {
        Some(ResolvedTitle::new(title, year))
    }
}

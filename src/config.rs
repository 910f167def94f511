// 运行配置
//
// 所有配置均来自环境变量（可由 .env 文件提供），每一项都有默认值。
// 目标站点的页面结构映射（SiteSelectors）集中在一张表里，
// 站点改版时只需更新这张表或提供 SELECTORS_FILE。

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Result};
use scraper::Selector;
use serde::{Deserialize, Serialize};

/// 标题解析策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverKind {
    /// 抓取 IMDb 页面的 og:title
    Imdb,
    /// 调用 TMDB find 接口
    Tmdb,
    /// 不解析，直接用识别号搜索
    Passthrough,
}

impl FromStr for ResolverKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "imdb" => Ok(ResolverKind::Imdb),
            "tmdb" => Ok(ResolverKind::Tmdb),
            "passthrough" | "id" | "identifier" => Ok(ResolverKind::Passthrough),
            other => Err(anyhow!("unknown title resolver: {}", other)),
        }
    }
}

/// 字幕站点列表页的获取方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogMode {
    /// 搜索页：keywords/language/sort 查询参数
    Search,
    /// 由标题构造 slug 的影片详情页
    Slug,
}

impl FromStr for CatalogMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "search" => Ok(CatalogMode::Search),
            "slug" => Ok(CatalogMode::Slug),
            other => Err(anyhow!("unknown catalog mode: {}", other)),
        }
    }
}

/// 站点结构映射：语义字段 -> CSS 选择器 / 路径
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SiteSelectors {
    /// 每条字幕结果所在的行
    pub entry_row: String,
    /// 行内指向字幕详情页的链接
    pub detail_link: String,
    /// 行内的语言标记（可选，存在时才过滤）
    pub language_marker: String,
    /// 语言标记上承载语言代码的属性，缺失时读取文本
    pub language_attribute: String,
    /// 详情页 URL 追加该后缀得到压缩包下载地址
    pub download_suffix: String,
    /// 搜索页路径
    pub search_path: String,
    /// 登录表单提交路径
    pub login_path: String,
    pub login_username_field: String,
    pub login_password_field: String,
}

impl Default for SiteSelectors {
    fn default() -> Self {
        Self {
            entry_row: ".subtitle-entry".to_string(),
            detail_link: "a[href]".to_string(),
            language_marker: "[data-language]".to_string(),
            language_attribute: "data-language".to_string(),
            download_suffix: "/download".to_string(),
            search_path: "/sl/subtitles/search".to_string(),
            login_path: "/sl/login".to_string(),
            login_username_field: "username".to_string(),
            login_password_field: "password".to_string(),
        }
    }
}

impl SiteSelectors {
    /// 从 JSON 文件加载选择器表
    ///
    /// 文件不存在或内容损坏时使用默认值，缺失的字段取默认值。
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            tracing::warn!("Selector file {:?} not found, using defaults", path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<SiteSelectors>(&content) {
                Ok(selectors) => {
                    tracing::info!("Loaded site selectors from {:?}", path);
                    selectors
                }
                Err(e) => {
                    tracing::warn!("Selector file {:?} is corrupt, using defaults: {}", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read selector file {:?}, using defaults: {}", path, e);
                Self::default()
            }
        }
    }

    /// 校验所有 CSS 选择器可被解析
    pub fn validate(&self) -> Result<()> {
        for (field, css) in [
            ("entry_row", &self.entry_row),
            ("detail_link", &self.detail_link),
            ("language_marker", &self.language_marker),
        ] {
            Selector::parse(css)
                .map_err(|e| anyhow!("invalid selector for {}: {:?} ({:?})", field, css, e))?;
        }
        Ok(())
    }
}

/// 应用配置
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub public_base_url: String,
    pub podnapisi_base_url: String,
    pub imdb_base_url: String,
    pub tmdb_base_url: String,
    pub tmdb_api_key: Option<String>,
    pub resolvers: Vec<ResolverKind>,
    pub include_year: bool,
    pub language: String,
    pub sort: String,
    pub catalog_mode: CatalogMode,
    pub selectors: SiteSelectors,
    pub username: Option<String>,
    pub password: Option<String>,
    pub max_candidates: usize,
    pub http_timeout: Duration,
    pub store_capacity: u64,
    pub store_ttl: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 10000,
            public_base_url: "http://127.0.0.1:10000".to_string(),
            podnapisi_base_url: "https://www.podnapisi.net".to_string(),
            imdb_base_url: "https://www.imdb.com".to_string(),
            tmdb_base_url: "https://api.themoviedb.org/3".to_string(),
            tmdb_api_key: None,
            resolvers: vec![ResolverKind::Imdb],
            include_year: false,
            language: "sl".to_string(),
            sort: "downloads".to_string(),
            catalog_mode: CatalogMode::Search,
            selectors: SiteSelectors::default(),
            username: None,
            password: None,
            max_candidates: 10,
            http_timeout: Duration::from_secs(20),
            store_capacity: 500,
            store_ttl: Duration::from_secs(6 * 60 * 60),
        }
    }
}

impl AppConfig {
    /// 从环境变量读取配置
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let port = env_parse("PORT", defaults.port);
        let public_base_url = env_string("PUBLIC_BASE_URL")
            .unwrap_or_else(|| format!("http://127.0.0.1:{}", port));

        let resolvers = match env_string("TITLE_RESOLVERS") {
            Some(list) => parse_resolvers(&list)?,
            None => defaults.resolvers,
        };

        let catalog_mode = match env_string("CATALOG_MODE") {
            Some(mode) => mode.parse()?,
            None => defaults.catalog_mode,
        };

        let selectors = env_string("SELECTORS_FILE")
            .map(|p| SiteSelectors::load(&PathBuf::from(p)))
            .unwrap_or_default();
        selectors.validate()?;

        Ok(Self {
            host: env_string("HOST").unwrap_or(defaults.host),
            port,
            public_base_url: trim_slash(public_base_url),
            podnapisi_base_url: trim_slash(
                env_string("PODNAPISI_BASE_URL").unwrap_or(defaults.podnapisi_base_url),
            ),
            imdb_base_url: trim_slash(env_string("IMDB_BASE_URL").unwrap_or(defaults.imdb_base_url)),
            tmdb_base_url: trim_slash(env_string("TMDB_BASE_URL").unwrap_or(defaults.tmdb_base_url)),
            tmdb_api_key: env_string("TMDB_API_KEY"),
            resolvers,
            include_year: env_parse("INCLUDE_YEAR", defaults.include_year),
            language: env_string("SUBTITLE_LANGUAGE").unwrap_or(defaults.language),
            sort: env_string("SEARCH_SORT").unwrap_or(defaults.sort),
            catalog_mode,
            selectors,
            username: env_string("PODNAPISI_USERNAME"),
            password: env_string("PODNAPISI_PASSWORD"),
            max_candidates: env_parse("MAX_CANDIDATES", defaults.max_candidates),
            http_timeout: Duration::from_secs(env_parse("HTTP_TIMEOUT_SECS", 20u64)),
            store_capacity: env_parse("STORE_CAPACITY", defaults.store_capacity),
            store_ttl: Duration::from_secs(env_parse("STORE_TTL_SECS", 6 * 60 * 60u64)),
        })
    }

    /// 是否配置了登录凭据
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(u), Some(p)) => Some((u.as_str(), p.as_str())),
            _ => None,
        }
    }
}

/// 解析逗号分隔的策略列表
pub fn parse_resolvers(list: &str) -> Result<Vec<ResolverKind>> {
    let kinds = list
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(ResolverKind::from_str)
        .collect::<Result<Vec<_>>>()?;
    if kinds.is_empty() {
        return Err(anyhow!("TITLE_RESOLVERS is empty"));
    }
    Ok(kinds)
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: FromStr + Copy + std::fmt::Debug>(key: &str, default: T) -> T {
    match env_string(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid value for {}: {:?}, using {:?}", key, raw, default);
            default
        }),
        None => default,
    }
}

fn trim_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

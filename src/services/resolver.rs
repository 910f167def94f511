//! 标题解析
//!
//! 识别号 -> 搜索标题。多个策略按配置顺序尝试，第一个成功的结果生效；
//! 调用方提供文件名提示时优先使用文件名。

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

use super::filename_hint;
use crate::config::{AppConfig, ResolverKind};
use crate::external::{ImdbClient, TmdbClient, UpstreamError, UpstreamResult};
use crate::models::{MediaIdentifier, MediaType, ResolvedTitle};

/// 标题解析策略
#[async_trait]
pub trait TitleResolver: Send + Sync {
    fn name(&self) -> &'static str;

    async fn resolve(
        &self,
        id: &MediaIdentifier,
        media_type: MediaType,
    ) -> UpstreamResult<ResolvedTitle>;
}

/// 抓取 IMDb 标题页
pub struct ImdbPageResolver {
    client: ImdbClient,
}

impl ImdbPageResolver {
    pub fn new(client: ImdbClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TitleResolver for ImdbPageResolver {
    fn name(&self) -> &'static str {
        "imdb"
    }

    async fn resolve(
        &self,
        id: &MediaIdentifier,
        _media_type: MediaType,
    ) -> UpstreamResult<ResolvedTitle> {
        if !id.is_imdb() {
            return Err(UpstreamError::MissingField("imdb id"));
        }
        self.client.fetch_title(id.base()).await
    }
}

/// TMDB find 接口
pub struct TmdbResolver {
    client: TmdbClient,
}

impl TmdbResolver {
    pub fn new(client: TmdbClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TitleResolver for TmdbResolver {
    fn name(&self) -> &'static str {
        "tmdb"
    }

    async fn resolve(
        &self,
        id: &MediaIdentifier,
        media_type: MediaType,
    ) -> UpstreamResult<ResolvedTitle> {
        if !id.is_imdb() {
            return Err(UpstreamError::MissingField("imdb id"));
        }
        self.client.resolve_title(id.base(), media_type).await
    }
}

/// 直接使用识别号作为搜索字符串
pub struct PassthroughResolver;

#[async_trait]
impl TitleResolver for PassthroughResolver {
    fn name(&self) -> &'static str {
        "passthrough"
    }

    async fn resolve(
        &self,
        id: &MediaIdentifier,
        _media_type: MediaType,
    ) -> UpstreamResult<ResolvedTitle> {
        let base = id.base();
        if base.is_empty() {
            return Err(UpstreamError::MissingField("identifier"));
        }
        Ok(ResolvedTitle::new(base, None))
    }
}

/// 策略链
pub struct ResolverChain {
    resolvers: Vec<Box<dyn TitleResolver>>,
}

impl ResolverChain {
    pub fn new(resolvers: Vec<Box<dyn TitleResolver>>) -> Self {
        Self { resolvers }
    }

    /// 按配置构建策略链，未配置 TMDB_API_KEY 时跳过 TMDB
    pub fn from_config(config: &AppConfig, client: Client) -> Self {
        let mut resolvers: Vec<Box<dyn TitleResolver>> = Vec::new();

        for kind in &config.resolvers {
            match kind {
                ResolverKind::Imdb => resolvers.push(Box::new(ImdbPageResolver::new(
                    ImdbClient::new(client.clone(), config.imdb_base_url.clone()),
                ))),
                ResolverKind::Tmdb => match &config.tmdb_api_key {
                    Some(key) => resolvers.push(Box::new(TmdbResolver::new(TmdbClient::new(
                        client.clone(),
                        key.clone(),
                        config.tmdb_base_url.clone(),
                    )))),
                    None => warn!("TMDB resolver configured but TMDB_API_KEY is not set, skipping"),
                },
                ResolverKind::Passthrough => resolvers.push(Box::new(PassthroughResolver)),
            }
        }

        let chain = Self::new(resolvers);
        info!("Title resolvers: {:?}", chain.names());
        chain
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.resolvers.iter().map(|r| r.name()).collect()
    }

    /// 解析标题；所有策略失败时返回 None
    pub async fn resolve(
        &self,
        id: &MediaIdentifier,
        media_type: MediaType,
        filename: Option<&str>,
    ) -> Option<ResolvedTitle> {
        if let Some(filename) = filename {
            match filename_hint::title_from_filename(filename) {
                Some(title) => {
                    debug!("Resolved {} from filename hint {:?}: {:?}", id, filename, title);
                    return Some(title);
                }
                None => debug!("Filename hint {:?} yielded no title", filename),
            }
        }

        for resolver in &self.resolvers {
            match resolver.resolve(id, media_type).await {
                Ok(title) => {
                    info!("Resolved {} via {}: {:?}", id, resolver.name(), title.title);
                    return Some(title);
                }
                Err(e) => warn!("{} resolver failed for {}: {}", resolver.name(), id, e),
            }
        }

        None
    }
}

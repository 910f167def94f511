//! 字幕管线：解析标题 -> 搜索候选项 -> 下载并解压
//!
//! 对外始终返回（可能为空的）列表；内部用 `PipelineOutcome` 区分失败原因并记录日志。

use reqwest::Client;
use tokio::task::JoinSet;
use tracing::{info, warn};

use super::filename_hint;
use super::resolver::ResolverChain;
use super::subtitle_store::SubtitleStore;
use crate::config::AppConfig;
use crate::external::{
    ArchiveFetcher, LoginSession, PodnapisiClient, UpstreamError, UpstreamResult,
};
use crate::models::{
    ExtractedSubtitle, MediaIdentifier, MediaType, SubtitleCandidate, SubtitleEntry,
};

/// 一次管线执行的结果
#[derive(Debug)]
pub enum PipelineOutcome {
    /// 至少一个候选项成功解出字幕
    Found(Vec<SubtitleEntry>),
    /// 无法得到搜索标题
    TitleUnresolved,
    /// 列表页请求或解析失败
    SearchFailed(UpstreamError),
    /// 列表页没有匹配的行
    NoCandidates { query: String },
    /// 有候选项，但全部下载或解压失败
    NothingExtracted { candidates: usize },
}

impl PipelineOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineOutcome::Found(_) => "found",
            PipelineOutcome::TitleUnresolved => "title_unresolved",
            PipelineOutcome::SearchFailed(_) => "search_failed",
            PipelineOutcome::NoCandidates { .. } => "no_candidates",
            PipelineOutcome::NothingExtracted { .. } => "nothing_extracted",
        }
    }

    /// 记录结果后折叠为列表
    pub fn into_entries(self, id: &MediaIdentifier) -> Vec<SubtitleEntry> {
        let kind = self.kind();
        match self {
            PipelineOutcome::Found(entries) => {
                info!("{}: {}, returning {} subtitles", id, kind, entries.len());
                entries
            }
            PipelineOutcome::TitleUnresolved => {
                warn!("{}: {}, returning empty list", id, kind);
                Vec::new()
            }
            PipelineOutcome::SearchFailed(e) => {
                warn!("{}: {} ({}), returning empty list", id, kind, e);
                Vec::new()
            }
            PipelineOutcome::NoCandidates { query } => {
                warn!("{}: {} for {:?}, returning empty list", id, kind, query);
                Vec::new()
            }
            PipelineOutcome::NothingExtracted { candidates } => {
                warn!(
                    "{}: {} ({} candidates), returning empty list",
                    id, kind, candidates
                );
                Vec::new()
            }
        }
    }
}

/// 字幕管线服务
pub struct SubtitleService {
    resolver: ResolverChain,
    catalog: PodnapisiClient,
    archives: ArchiveFetcher,
    store: SubtitleStore,
    public_base_url: String,
    include_year: bool,
    max_candidates: usize,
}

impl SubtitleService {
    pub fn new(
        resolver: ResolverChain,
        catalog: PodnapisiClient,
        archives: ArchiveFetcher,
        store: SubtitleStore,
        config: &AppConfig,
    ) -> Self {
        Self {
            resolver,
            catalog,
            archives,
            store,
            public_base_url: config.public_base_url.clone(),
            include_year: config.include_year,
            max_candidates: config.max_candidates,
        }
    }

    /// 按配置构建全部组件，共用一个 HTTP 客户端
    pub fn from_config(config: &AppConfig, client: Client) -> Self {
        Self::new(
            ResolverChain::from_config(config, client.clone()),
            PodnapisiClient::new(client.clone(), config),
            ArchiveFetcher::new(client),
            SubtitleStore::new(config.store_capacity, config.store_ttl),
            config,
        )
    }

    pub fn store(&self) -> &SubtitleStore {
        &self.store
    }

    pub fn language(&self) -> &str {
        self.catalog.language()
    }

    pub fn login_state(&self) -> Option<&LoginSession> {
        self.catalog.login_state()
    }

    /// 列出字幕，任何失败都返回空列表
    pub async fn list(
        &self,
        media_type: MediaType,
        id: &MediaIdentifier,
        extra: Option<&str>,
    ) -> Vec<SubtitleEntry> {
        self.run(media_type, id, extra).await.into_entries(id)
    }

    /// 执行完整管线
    pub async fn run(
        &self,
        media_type: MediaType,
        id: &MediaIdentifier,
        extra: Option<&str>,
    ) -> PipelineOutcome {
        let filename = extra.and_then(filename_hint::filename_from_extra);

        let Some(title) = self.resolver.resolve(id, media_type, filename.as_deref()).await else {
            return PipelineOutcome::TitleUnresolved;
        };
        let query = title.search_string(self.include_year);

        let mut candidates = match self.catalog.search(&query).await {
            Ok(candidates) => candidates,
            Err(e) => return PipelineOutcome::SearchFailed(e),
        };
        if candidates.is_empty() {
            return PipelineOutcome::NoCandidates { query };
        }
        candidates.truncate(self.max_candidates);

        let total = candidates.len();
        let entries = self.fetch_all(candidates).await;
        if entries.is_empty() {
            PipelineOutcome::NothingExtracted { candidates: total }
        } else {
            PipelineOutcome::Found(entries)
        }
    }

    /// 并发下载所有候选项的压缩包，保持候选项原有顺序
    async fn fetch_all(&self, candidates: Vec<SubtitleCandidate>) -> Vec<SubtitleEntry> {
        let mut tasks = JoinSet::new();
        for (index, candidate) in candidates.into_iter().enumerate() {
            let fetcher = self.archives.clone();
            tasks.spawn(async move {
                let result = fetcher.fetch(&candidate.download_url).await;
                (index, candidate, result)
            });
        }

        let mut fetched: Vec<(usize, SubtitleCandidate, UpstreamResult<ExtractedSubtitle>)> =
            Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(item) => fetched.push(item),
                Err(e) => warn!("Archive task failed: {}", e),
            }
        }
        fetched.sort_by_key(|(index, _, _)| *index);

        let mut entries = Vec::new();
        for (_, candidate, result) in fetched {
            match result {
                Ok(extracted) => {
                    let file_name = self.store.insert(&candidate.download_url, extracted).await;
                    entries.push(SubtitleEntry {
                        id: candidate.id,
                        lang: candidate.language_tag,
                        title: candidate.display_name,
                        url: format!("{}/file/{}", self.public_base_url, file_name),
                    });
                }
                Err(e) => warn!(
                    "Dropping candidate {:?} ({}): {}",
                    candidate.display_name, candidate.download_url, e
                ),
            }
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str) -> SubtitleEntry {
        SubtitleEntry {
            id: id.to_string(),
            lang: "sl".to_string(),
            title: "Titanic".to_string(),
            url: format!("http://localhost:10000/file/{}.srt", id),
        }
    }

    #[test]
    fn test_failures_collapse_to_empty_list() {
        let id = MediaIdentifier::from_segment("tt0120338");
        let failures = vec![
            PipelineOutcome::TitleUnresolved,
            PipelineOutcome::SearchFailed(UpstreamError::HttpStatus(503)),
            PipelineOutcome::NoCandidates {
                query: "Titanic".to_string(),
            },
            PipelineOutcome::NothingExtracted { candidates: 3 },
        ];

        for outcome in failures {
            let kind = outcome.kind();
            assert_ne!(kind, "found");
            assert!(outcome.into_entries(&id).is_empty(), "{} should be empty", kind);
        }
    }

    #[test]
    fn test_found_keeps_entries() {
        let id = MediaIdentifier::from_segment("tt0120338");
        let outcome = PipelineOutcome::Found(vec![entry("a"), entry("b")]);
        assert_eq!(outcome.kind(), "found");

        let entries = outcome.into_entries(&id);
        assert_eq!(
            entries.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
    }

    #[tokio::test]
    async fn test_unresolvable_identifier_skips_search() {
        let config = AppConfig {
            resolvers: Vec::new(),
            ..AppConfig::default()
        };
        let service = SubtitleService::from_config(&config, Client::new());
        let id = MediaIdentifier::from_segment("tt0120338.json");

        let outcome = service.run(MediaType::Movie, &id, None).await;
        assert!(matches!(outcome, PipelineOutcome::TitleUnresolved));
        assert!(service.login_state().is_none());
    }
}

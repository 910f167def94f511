// 字幕文件存储
//
// 解出的字幕文本保存在有界的内存缓存中（容量 + TTL），由 /file 路由提供下载。
// 文件 ID 由下载地址哈希得到，同一候选项重复请求得到同一个链接。

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use sha2::{Digest, Sha256};

use crate::models::ExtractedSubtitle;

/// 已保存的字幕文件
#[derive(Debug, Clone)]
pub struct StoredSubtitle {
    pub file_name: String,
    pub member_name: String,
    pub text: Arc<str>,
    pub source_url: String,
    pub stored_at: DateTime<Utc>,
}

/// 有界字幕存储
#[derive(Clone)]
pub struct SubtitleStore {
    cache: Cache<String, StoredSubtitle>,
}

impl SubtitleStore {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// 下载地址 -> 16 位十六进制 ID
    pub fn file_id(source_url: &str) -> String {
        let digest = Sha256::digest(source_url.as_bytes());
        let hex = format!("{:x}", digest);
        hex[..16].to_string()
    }

    /// 保存字幕文本，返回对外的文件名
    pub async fn insert(&self, source_url: &str, extracted: ExtractedSubtitle) -> String {
        let file_name = format!("{}.{}", Self::file_id(source_url), extracted.extension());
        let stored = StoredSubtitle {
            file_name: file_name.clone(),
            member_name: extracted.member_name,
            text: Arc::from(extracted.text),
            source_url: source_url.to_string(),
            stored_at: Utc::now(),
        };
        self.cache.insert(file_name.clone(), stored).await;
        file_name
    }

    pub async fn get(&self, file_name: &str) -> Option<StoredSubtitle> {
        self.cache.get(file_name).await
    }

    /// 当前条目数（近似值，淘汰任务执行后才精确）
    pub fn len(&self) -> u64 {
        self.cache.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 执行挂起的淘汰任务
    pub async fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks().await;
    }
}

use serde::{Deserialize, Serialize};

/// 从字幕站点搜索结果中解析出的候选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleCandidate {
    /// 站点内的字幕 ID（详情页路径最后一段）
    pub id: String,
    pub display_name: String,
    pub detail_url: String,
    pub download_url: String,
    pub language_tag: String,
}

/// 从压缩包中解出的字幕文本
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedSubtitle {
    /// 压缩包内的成员文件名
    pub member_name: String,
    pub text: String,
}

impl ExtractedSubtitle {
    /// 成员文件的扩展名（小写，不含点），默认 srt
    pub fn extension(&self) -> String {
        self.member_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or_else(|| "srt".to_string())
    }
}

/// 字幕列表中的单条记录
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubtitleEntry {
    pub id: String,
    pub lang: String,
    pub title: String,
    pub url: String,
}

/// 字幕列表响应
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SubtitlesResponse {
    pub subtitles: Vec<SubtitleEntry>,
}

impl From<Vec<SubtitleEntry>> for SubtitlesResponse {
    fn from(subtitles: Vec<SubtitleEntry>) -> Self {
        Self { subtitles }
    }
}

// 上游调用错误类型
//
// 管线中任何一步失败都会折叠为空结果，这里的分类只用于日志。

use thiserror::Error;

/// 第三方站点调用的统一错误类型
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("HTTP error: status {0}")]
    HttpStatus(u16),

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("invalid selector: {0}")]
    Selector(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("unreadable archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("payload exceeds {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("archive contains no subtitle member")]
    NoSubtitleMember,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout
        } else if let Some(status) = err.status() {
            UpstreamError::HttpStatus(status.as_u16())
        } else {
            UpstreamError::Network(err.to_string())
        }
    }
}

impl From<url::ParseError> for UpstreamError {
    fn from(err: url::ParseError) -> Self {
        UpstreamError::InvalidUrl(err.to_string())
    }
}

pub type UpstreamResult<T> = Result<T, UpstreamError>;

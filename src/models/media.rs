use serde::{Deserialize, Serialize};

/// 媒体类型（插件宿主路由中的 type 段）
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Series,
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaType::Movie => write!(f, "movie"),
            MediaType::Series => write!(f, "series"),
        }
    }
}

impl std::str::FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "movie" => Ok(MediaType::Movie),
            "series" | "tv" => Ok(MediaType::Series),
            _ => Err(format!("Invalid media type: {}", s)),
        }
    }
}

impl MediaType {
    /// 宽松解析：未知类型按电影处理
    pub fn from_route(s: &str) -> Self {
        s.parse().unwrap_or(MediaType::Movie)
    }
}

/// 外部媒体识别号，如 `tt0120338`
///
/// 剧集请求的识别号形如 `tt0944947:1:2`，`base()` 只返回 `tt…` 部分。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaIdentifier(String);

impl MediaIdentifier {
    /// 从路由段构造，去掉 `.json` 后缀
    pub fn from_segment(segment: &str) -> Self {
        let raw = segment.strip_suffix(".json").unwrap_or(segment);
        Self(raw.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 去掉季/集后缀的基础识别号
    pub fn base(&self) -> &str {
        self.0.split(':').next().unwrap_or(&self.0)
    }

    pub fn is_imdb(&self) -> bool {
        let base = self.base();
        base.len() > 2 && base.starts_with("tt") && base[2..].chars().all(|c| c.is_ascii_digit())
    }
}

impl std::fmt::Display for MediaIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// 解析得到的搜索标题
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTitle {
    pub title: String,
    pub year: Option<i32>,
}

impl ResolvedTitle {
    pub fn new(title: impl Into<String>, year: Option<i32>) -> Self {
        Self {
            title: title.into(),
            year,
        }
    }

    /// 生成搜索字符串，可选追加年份
    pub fn search_string(&self, include_year: bool) -> String {
        match (include_year, self.year) {
            (true, Some(year)) => format!("{} {}", self.title, year),
            _ => self.title.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_from_segment() {
        let id = MediaIdentifier::from_segment("tt0120338.json");
        assert_eq!(id.as_str(), "tt0120338");
        assert!(id.is_imdb());

        let episode = MediaIdentifier::from_segment("tt0944947:1:2.json");
        assert_eq!(episode.base(), "tt0944947");
        assert!(episode.is_imdb());

        assert!(!MediaIdentifier::from_segment("kitsu:123").is_imdb());
    }

    #[test]
    fn test_media_type_from_route() {
        assert_eq!(MediaType::from_route("movie"), MediaType::Movie);
        assert_eq!(MediaType::from_route("Series"), MediaType::Series);
        assert_eq!(MediaType::from_route("channel"), MediaType::Movie);
    }

    #[test]
    fn test_search_string() {
        let title = ResolvedTitle::new("Titanic", Some(1997));
        assert_eq!(title.search_string(false), "Titanic");
        assert_eq!(title.search_string(true), "Titanic 1997");
        assert_eq!(ResolvedTitle::new("Titanic", None).search_string(true), "Titanic");
    }
}

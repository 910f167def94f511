use serde::{Deserialize, Serialize};

/// 插件宿主读取的能力描述
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub id: String,
    pub version: String,
    pub name: String,
    pub description: String,
    pub types: Vec<String>,
    pub resources: Vec<String>,
    pub id_prefixes: Vec<String>,
    pub catalogs: Vec<serde_json::Value>,
}

impl Manifest {
    /// 按语言生成描述
    pub fn for_language(language: &str) -> Self {
        Self {
            id: "org.formio.podnapisi".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            name: format!("Podnapisi.NET ({})", language),
            description: format!(
                "Subtitles in language '{}' scraped from podnapisi.net search results.",
                language
            ),
            types: vec!["movie".to_string(), "series".to_string()],
            resources: vec!["subtitles".to_string()],
            id_prefixes: vec!["tt".to_string()],
            catalogs: Vec::new(),
        }
    }
}

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::error::{UpstreamError, UpstreamResult};
use crate::models::{MediaType, ResolvedTitle};

/// TMDB API客户端
#[derive(Clone)]
pub struct TmdbClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl TmdbClient {
    pub fn new(client: Client, api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.into(),
        }
    }

    /// 通过 IMDb ID 查找条目
    pub async fn find_by_imdb_id(&self, imdb_id: &str) -> UpstreamResult<TmdbFindResponse> {
        let url = format!("{}/find/{}", self.base_url, imdb_id);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("external_source", "imdb_id"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(UpstreamError::HttpStatus(response.status().as_u16()));
        }

        let result: TmdbFindResponse = response.json().await?;
        Ok(result)
    }

    /// 解析标题，电影请求优先电影结果，剧集请求优先剧集结果
    pub async fn resolve_title(
        &self,
        imdb_id: &str,
        media_type: MediaType,
    ) -> UpstreamResult<ResolvedTitle> {
        let found = self.find_by_imdb_id(imdb_id).await?;
        found
            .best_title(media_type)
            .ok_or(UpstreamError::MissingField("movie_results/tv_results"))
    }
}

/// TMDB find 响应
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TmdbFindResponse {
    #[serde(default)]
    pub movie_results: Vec<TmdbMovie>,
    #[serde(default)]
    pub tv_results: Vec<TmdbTvShow>,
}

/// TMDB电影
#[derive(Debug, Deserialize, Serialize)]
pub struct TmdbMovie {
    pub id: u32,
    pub title: String,
    pub release_date: Option<String>,
}

/// TMDB电视剧
#[derive(Debug, Deserialize, Serialize)]
pub struct TmdbTvShow {
    pub id: u32,
    pub name: String,
    pub first_air_date: Option<String>,
}

impl TmdbFindResponse {
    pub fn best_title(&self, media_type: MediaType) -> Option<ResolvedTitle> {
        let movie = self
            .movie_results
            .first()
            .filter(|m| !m.title.trim().is_empty())
            .map(|m| ResolvedTitle::new(m.title.trim(), year_of(m.release_date.as_deref())));
        let tv = self
            .tv_results
            .first()
            .filter(|t| !t.name.trim().is_empty())
            .map(|t| ResolvedTitle::new(t.name.trim(), year_of(t.first_air_date.as_deref())));

        match media_type {
            MediaType::Movie => movie.or(tv),
            MediaType::Series => tv.or(movie),
        }
    }
}

/// "1997-11-18" -> 1997
fn year_of(date: Option<&str>) -> Option<i32> {
    date.and_then(|d| d.get(0..4)).and_then(|y| y.parse().ok())
}

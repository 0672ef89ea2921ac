/// TMDB v3 metadata source
///
/// API Flow:
/// 1. Keyword search: /search/keyword → relevance-ranked keyword ids (cached)
/// 2. Discovery: /discover/movie → one page of candidates per call, or
///    /search/movie when the filters carry a free-text query
/// 3. Availability: /movie/{id}/watch/providers → per-region offers
use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{
        DiscoverFilters, DiscoverPage, Keyword, KeywordSearchResponse, RegionProviders,
        WatchProvidersResponse,
    },
    services::providers::MovieSource,
};

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Cache,
    keyword_cache_ttl: u64,
}

impl TmdbProvider {
    /// Creates a provider whose requests all share the given timeout
    pub fn new(
        cache: Cache,
        api_key: String,
        api_url: String,
        timeout: Duration,
        keyword_cache_ttl: u64,
    ) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache,
            keyword_cache_ttl,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    /// GETs a TMDB endpoint and decodes the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> AppResult<T> {
        let response = self
            .http_client
            .get(self.endpoint(path))
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                path = %path,
                status = %status,
                body = %body,
                "TMDB request failed"
            );
            return Err(AppError::ExternalApi(format!(
                "TMDB returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait::async_trait]
impl MovieSource for TmdbProvider {
    async fn search_keyword(&self, term: &str) -> AppResult<Vec<Keyword>> {
        if term.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Keyword search term cannot be empty".to_string(),
            ));
        }

        cached!(
            self.cache,
            CacheKey::KeywordSearch(term.to_string()),
            self.keyword_cache_ttl,
            async move {
                let response: KeywordSearchResponse = self
                    .get_json(
                        "search/keyword",
                        &[("query", term.trim().to_string()), ("page", "1".to_string())],
                    )
                    .await?;

                tracing::info!(
                    term = %term,
                    results = response.results.len(),
                    source = "tmdb",
                    "Keyword search completed"
                );

                Ok::<_, AppError>(response.results)
            }
        )
    }

    async fn discover_movies(&self, filters: &DiscoverFilters) -> AppResult<DiscoverPage> {
        let page: DiscoverPage = match filters.to_search_pairs() {
            Some(search) => self.get_json("search/movie", &search).await?,
            None => self.get_json("discover/movie", &filters.to_query_pairs()).await?,
        };

        tracing::debug!(
            text_query = ?filters.text_query,
            page = page.page,
            total_pages = page.total_pages,
            results = page.results.len(),
            source = "tmdb",
            "Discovery page fetched"
        );

        Ok(page)
    }

    async fn get_watch_providers(
        &self,
        movie_id: u64,
    ) -> AppResult<HashMap<String, RegionProviders>> {
        let response: WatchProvidersResponse = self
            .get_json(&format!("movie/{}/watch/providers", movie_id), &[])
            .await?;

        tracing::debug!(
            movie_id = movie_id,
            regions = response.results.len(),
            source = "tmdb",
            "Watch providers fetched"
        );

        Ok(response.results)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_redis_client;

    async fn create_test_provider(api_url: &str) -> TmdbProvider {
        let client = create_redis_client("redis://127.0.0.1:1").unwrap();
        let (cache, _handle) = Cache::new(client).await;

        TmdbProvider::new(
            cache,
            "test_key".to_string(),
            api_url.to_string(),
            Duration::from_secs(1),
            60,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_endpoint_joins_paths() {
        let provider = create_test_provider("https://api.themoviedb.org/3/").await;

        assert_eq!(
            provider.endpoint("discover/movie"),
            "https://api.themoviedb.org/3/discover/movie"
        );
        assert_eq!(
            provider.endpoint("/movie/10719/watch/providers"),
            "https://api.themoviedb.org/3/movie/10719/watch/providers"
        );
    }

    #[tokio::test]
    async fn test_empty_keyword_term_rejected() {
        let provider = create_test_provider("http://test.local").await;

        let result = provider.search_keyword("   ").await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_unreachable_source_is_a_client_error() {
        let provider = create_test_provider("http://127.0.0.1:1").await;

        let result = provider.discover_movies(&DiscoverFilters::default()).await;
        assert!(matches!(result, Err(AppError::HttpClient(_))));
    }

    #[test]
    fn test_keyword_search_response_deserialization() {
        let json = r#"{
            "page": 1,
            "results": [
                {"id": 207317, "name": "christmas"},
                {"id": 65, "name": "holiday"}
            ],
            "total_pages": 1,
            "total_results": 2
        }"#;

        let response: KeywordSearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.results.len(), 2);
        assert_eq!(
            response.results[0],
            Keyword {
                id: 207317,
                name: "christmas".to_string()
            }
        );
    }
}

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

mod criteria;
mod movie;
mod streaming_service;
mod theme;

pub use criteria::{Category, Exclusions, FilterCriteria};
pub use movie::{CandidateMovie, ResultMovie, UNKNOWN_RELEASE_YEAR};
pub use streaming_service::{ServiceDirectory, StreamingService};
pub use theme::{CuratedKeywords, SortOrder, ThemeCatalog, ThemeSpec};

/// Opaque keyword identifier from the metadata source
pub type KeywordId = u64;

// ============================================================================
// Discovery query
// ============================================================================

/// Full set of filters for one discovery page request
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoverFilters {
    pub sort_by: SortOrder,
    /// OR-combined provider ids
    pub watch_providers: Vec<u32>,
    pub watch_region: Option<String>,
    /// OR-combined keyword ids
    pub keywords: Vec<KeywordId>,
    /// Free-text title search used in place of `discover/movie` filtering
    pub text_query: Option<String>,
    pub genre: Option<u32>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub min_rating: Option<f32>,
    pub min_vote_count: Option<u32>,
    pub language: String,
    pub original_language: Option<String>,
    pub min_runtime: Option<u32>,
    pub page: u32,
}

impl Default for DiscoverFilters {
    fn default() -> Self {
        Self {
            sort_by: SortOrder::PopularityDesc,
            watch_providers: Vec::new(),
            watch_region: None,
            keywords: Vec::new(),
            text_query: None,
            genre: None,
            year_from: None,
            year_to: None,
            min_rating: None,
            min_vote_count: None,
            language: "en-US".to_string(),
            original_language: Some("en".to_string()),
            min_runtime: Some(60),
            page: 1,
        }
    }
}

impl DiscoverFilters {
    /// Encodes the filters as `discover/movie` query parameters
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("language", self.language.clone()),
            ("sort_by", self.sort_by.as_str().to_string()),
            ("include_adult", "false".to_string()),
            ("page", self.page.to_string()),
        ];

        if let Some(language) = &self.original_language {
            pairs.push(("with_original_language", language.clone()));
        }
        if let Some(runtime) = self.min_runtime {
            pairs.push(("with_runtime.gte", runtime.to_string()));
        }
        if !self.watch_providers.is_empty() {
            pairs.push(("with_watch_providers", join_any(&self.watch_providers)));
            pairs.push(("with_watch_monetization_types", "flatrate".to_string()));
            if let Some(region) = &self.watch_region {
                pairs.push(("watch_region", region.clone()));
            }
        }
        if !self.keywords.is_empty() {
            pairs.push(("with_keywords", join_any(&self.keywords)));
        }
        if let Some(genre) = self.genre {
            pairs.push(("with_genres", genre.to_string()));
        }
        if let Some(year) = self.year_from {
            pairs.push(("primary_release_date.gte", format!("{:04}-01-01", year)));
        }
        if let Some(year) = self.year_to {
            pairs.push(("primary_release_date.lte", format!("{:04}-12-31", year)));
        }
        if let Some(rating) = self.min_rating {
            pairs.push(("vote_average.gte", rating.to_string()));
        }
        if let Some(votes) = self.min_vote_count {
            pairs.push(("vote_count.gte", votes.to_string()));
        }

        pairs
    }
}

impl DiscoverFilters {
    /// Encodes the free-text part of the filters as `search/movie` query parameters.
    ///
    /// The search endpoint has no provider, keyword or rating filters; those are
    /// checked by the caller. A single-year range is passed through as `year`.
    pub fn to_search_pairs(&self) -> Option<Vec<(&'static str, String)>> {
        let query = self.text_query.as_deref().map(str::trim).filter(|q| !q.is_empty())?;

        let mut pairs = vec![
            ("query", query.to_string()),
            ("language", self.language.clone()),
            ("include_adult", "false".to_string()),
            ("page", self.page.to_string()),
        ];

        if let (Some(from), Some(to)) = (self.year_from, self.year_to) {
            if from == to {
                pairs.push(("primary_release_year", from.to_string()));
            }
        }

        Some(pairs)
    }
}

fn join_any<T: ToString>(ids: &[T]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("|")
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// One page of `discover/movie` results
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DiscoverPage {
    #[serde(default)]
    pub results: Vec<CandidateMovie>,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
}

/// Keyword search hit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Keyword {
    pub id: KeywordId,
    pub name: String,
}

/// Response from `search/keyword`
#[derive(Debug, Clone, Deserialize)]
pub struct KeywordSearchResponse {
    #[serde(default)]
    pub results: Vec<Keyword>,
}

/// Response from `movie/{id}/watch/providers`
#[derive(Debug, Clone, Deserialize)]
pub struct WatchProvidersResponse {
    #[serde(default)]
    pub results: HashMap<String, RegionProviders>,
}

/// Offers for one region; only the subscription tier is modelled
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RegionProviders {
    #[serde(default)]
    pub flatrate: Vec<ProviderOffer>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderOffer {
    pub provider_id: u32,
    pub provider_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value<'a>(pairs: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_default_query_pairs() {
        let pairs = DiscoverFilters::default().to_query_pairs();

        assert_eq!(value(&pairs, "language"), Some("en-US"));
        assert_eq!(value(&pairs, "sort_by"), Some("popularity.desc"));
        assert_eq!(value(&pairs, "with_original_language"), Some("en"));
        assert_eq!(value(&pairs, "with_runtime.gte"), Some("60"));
        assert_eq!(value(&pairs, "page"), Some("1"));
        assert_eq!(value(&pairs, "with_keywords"), None);
        assert_eq!(value(&pairs, "with_watch_providers"), None);
        assert_eq!(value(&pairs, "watch_region"), None);
    }

    #[test]
    fn test_or_sets_and_bounds_encoded() {
        let filters = DiscoverFilters {
            sort_by: SortOrder::ReleaseDateDesc,
            watch_providers: vec![8, 9, 337],
            watch_region: Some("GB".to_string()),
            keywords: vec![207317, 9799],
            genre: Some(10751),
            year_from: Some(1990),
            year_to: Some(2005),
            min_rating: Some(6.5),
            min_vote_count: Some(50),
            page: 3,
            ..Default::default()
        };
        let pairs = filters.to_query_pairs();

        assert_eq!(value(&pairs, "with_watch_providers"), Some("8|9|337"));
        assert_eq!(value(&pairs, "with_watch_monetization_types"), Some("flatrate"));
        assert_eq!(value(&pairs, "watch_region"), Some("GB"));
        assert_eq!(value(&pairs, "with_keywords"), Some("207317|9799"));
        assert_eq!(value(&pairs, "with_genres"), Some("10751"));
        assert_eq!(value(&pairs, "primary_release_date.gte"), Some("1990-01-01"));
        assert_eq!(value(&pairs, "primary_release_date.lte"), Some("2005-12-31"));
        assert_eq!(value(&pairs, "vote_average.gte"), Some("6.5"));
        assert_eq!(value(&pairs, "vote_count.gte"), Some("50"));
        assert_eq!(value(&pairs, "sort_by"), Some("release_date.desc"));
        assert_eq!(value(&pairs, "page"), Some("3"));
    }

    #[test]
    fn test_search_pairs_only_for_text_queries() {
        assert_eq!(DiscoverFilters::default().to_search_pairs(), None);

        let blank = DiscoverFilters {
            text_query: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(blank.to_search_pairs(), None);

        let filters = DiscoverFilters {
            text_query: Some(" Summer ".to_string()),
            watch_providers: vec![8],
            year_from: Some(1999),
            year_to: Some(1999),
            page: 2,
            ..Default::default()
        };
        let pairs = filters.to_search_pairs().unwrap();

        assert_eq!(value(&pairs, "query"), Some("Summer"));
        assert_eq!(value(&pairs, "page"), Some("2"));
        assert_eq!(value(&pairs, "primary_release_year"), Some("1999"));
        assert_eq!(value(&pairs, "with_watch_providers"), None);
    }

    #[test]
    fn test_watch_providers_response_deserialization() {
        let json = r#"{
            "id": 10719,
            "results": {
                "GB": {
                    "link": "https://www.themoviedb.org/movie/10719/watch?locale=GB",
                    "flatrate": [
                        {"provider_id": 8, "provider_name": "Netflix", "logo_path": "/n.jpg", "display_priority": 1}
                    ],
                    "rent": [
                        {"provider_id": 2, "provider_name": "Apple TV", "logo_path": "/a.jpg", "display_priority": 4}
                    ]
                },
                "US": {
                    "link": "https://www.themoviedb.org/movie/10719/watch?locale=US"
                }
            }
        }"#;

        let response: WatchProvidersResponse = serde_json::from_str(json).unwrap();
        let gb = &response.results["GB"];
        assert_eq!(gb.flatrate.len(), 1);
        assert_eq!(gb.flatrate[0].provider_id, 8);
        assert!(response.results["US"].flatrate.is_empty());
    }

    #[test]
    fn test_discover_page_deserialization() {
        let json = r#"{
            "page": 1,
            "total_pages": 12,
            "total_results": 231,
            "results": [
                {"id": 10719, "title": "Elf", "release_date": "2003-10-09", "poster_path": "/elf.jpg", "vote_average": 6.6},
                {"id": 5, "title": "No Date", "release_date": ""}
            ]
        }"#;

        let page: DiscoverPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.total_pages, 12);
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[0].release_year(), 2003);
        assert_eq!(page.results[1].release_year(), UNKNOWN_RELEASE_YEAR);
    }
}

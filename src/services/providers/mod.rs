/// Movie metadata source abstraction
///
/// The discovery engine and keyword resolver only ever talk to a [`MovieSource`],
/// so TMDB can be swapped for a test double or another catalogue without touching
/// selection logic.
use std::collections::HashMap;

use crate::{
    error::AppResult,
    models::{DiscoverFilters, DiscoverPage, Keyword, RegionProviders},
};

pub mod tmdb;

/// Trait for movie metadata sources
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieSource: Send + Sync {
    /// Search keywords by free text, most relevant first
    async fn search_keyword(&self, term: &str) -> AppResult<Vec<Keyword>>;

    /// Fetch one page of movies matching the filters
    async fn discover_movies(&self, filters: &DiscoverFilters) -> AppResult<DiscoverPage>;

    /// Watch-provider offers for a movie, keyed by region code
    async fn get_watch_providers(&self, movie_id: u64)
        -> AppResult<HashMap<String, RegionProviders>>;

    /// Source name for logging and debugging
    fn name(&self) -> &'static str;
}

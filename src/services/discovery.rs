use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Datelike, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::{
    error::AppResult,
    models::{
        CandidateMovie, DiscoverFilters, DiscoverPage, Exclusions, FilterCriteria, KeywordId,
        ResultMovie, ServiceDirectory, SortOrder, ThemeCatalog,
    },
    services::{keywords::KeywordResolver, providers::MovieSource},
};

/// Decides whether an empty, keyword-filtered first page is retried without keywords.
///
/// An over-restrictive keyword OR-set is the usual cause of an empty first page,
/// but relaxing it can also hide a theme that genuinely has no matches.
pub trait RelaxationPolicy: Send + Sync {
    fn retry_without_keywords(&self, theme: &str) -> bool;
}

/// Retry the first page once without the keyword filter
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryWithoutKeywords;

impl RelaxationPolicy for RetryWithoutKeywords {
    fn retry_without_keywords(&self, _theme: &str) -> bool {
        true
    }
}

/// Keep the keyword filter even when it matches nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverRelax;

impl RelaxationPolicy for NeverRelax {
    fn retry_without_keywords(&self, _theme: &str) -> bool {
        false
    }
}

/// How subscription availability is established for the requested providers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AvailabilityCheck {
    /// Provider OR-set is part of the discovery query; results are presumed available
    #[default]
    Query,
    /// Each passing candidate is checked against its watch-provider offers
    Lookup,
}

#[derive(Debug, Clone)]
pub struct DiscoverySettings {
    /// Maximum pages fetched by one batch fill
    pub page_budget: u32,
    pub watch_region: String,
    pub availability: AvailabilityCheck,
    pub min_vote_count: Option<u32>,
    pub language: String,
    pub original_language: Option<String>,
    pub min_runtime: Option<u32>,
    /// Fixed "now" for year checks; the clock is used when unset
    pub current_year: Option<i32>,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            page_budget: 50,
            watch_region: "GB".to_string(),
            availability: AvailabilityCheck::Query,
            min_vote_count: None,
            language: "en-US".to_string(),
            original_language: Some("en".to_string()),
            min_runtime: Some(60),
            current_year: None,
        }
    }
}

/// Sort order used for each page of a run
#[derive(Debug, Clone)]
enum SortPlan {
    Fixed(SortOrder),
    /// Rotates through the orders page by page, starting at `offset`
    Cycle { orders: Vec<SortOrder>, offset: usize },
}

impl SortPlan {
    fn for_page(&self, page: u32) -> SortOrder {
        match self {
            SortPlan::Fixed(order) => *order,
            SortPlan::Cycle { orders, offset } => {
                let index = (offset + page.saturating_sub(1) as usize) % orders.len();
                orders[index]
            }
        }
    }
}

/// Query construction for one discovery call
#[derive(Debug, Clone)]
struct QueryPlan {
    theme: String,
    keywords: Vec<KeywordId>,
    genre: Option<u32>,
    /// Free-text search on the theme name, used when nothing else themes the query
    text_query: Option<String>,
    sort: SortPlan,
}

impl QueryPlan {
    /// Falls back to a free-text search when neither keywords nor a genre restrict
    /// the query, so a requested theme never becomes an unfiltered discovery.
    fn ensure_themed(&mut self) {
        if self.keywords.is_empty() && self.genre.is_none() {
            self.text_query = Some(self.theme.clone());
        }
    }
}

/// Call-local accumulation for a batch fill
struct SelectionState {
    seen: HashSet<u64>,
    accepted: Vec<ResultMovie>,
    page: u32,
    pages_remaining: u32,
}

impl SelectionState {
    fn new(page_budget: u32) -> Self {
        Self {
            seen: HashSet::new(),
            accepted: Vec::new(),
            page: 0,
            pages_remaining: page_budget,
        }
    }

    fn next_page(&mut self) -> Option<u32> {
        if self.pages_remaining == 0 {
            return None;
        }
        self.pages_remaining -= 1;
        self.page += 1;
        Some(self.page)
    }

    fn accept(&mut self, movie: ResultMovie) {
        self.seen.insert(movie.id);
        self.accepted.push(movie);
    }
}

/// Builds themed movie lists from a [`MovieSource`]
#[derive(Clone)]
pub struct DiscoveryEngine {
    source: Arc<dyn MovieSource>,
    resolver: KeywordResolver,
    catalog: Arc<ThemeCatalog>,
    services: Arc<ServiceDirectory>,
    relaxation: Arc<dyn RelaxationPolicy>,
    settings: DiscoverySettings,
}

impl DiscoveryEngine {
    pub fn new(
        source: Arc<dyn MovieSource>,
        resolver: KeywordResolver,
        catalog: Arc<ThemeCatalog>,
        services: Arc<ServiceDirectory>,
        settings: DiscoverySettings,
    ) -> Self {
        Self {
            source,
            resolver,
            catalog,
            services,
            relaxation: Arc::new(RetryWithoutKeywords),
            settings,
        }
    }

    pub fn with_relaxation(mut self, relaxation: Arc<dyn RelaxationPolicy>) -> Self {
        self.relaxation = relaxation;
        self
    }

    pub fn catalog(&self) -> &ThemeCatalog {
        &self.catalog
    }

    /// Batch fill: up to `target` movies for the theme, unique by id, in random order.
    ///
    /// Fewer than `target` is a normal outcome. A failed page fetch, including the
    /// first, is treated as an empty page: paging stops and what was accepted so far
    /// is returned.
    pub async fn discover<R: Rng + Send>(
        &self,
        theme: &str,
        target: usize,
        criteria: &FilterCriteria,
        rng: &mut R,
    ) -> AppResult<Vec<ResultMovie>> {
        if target == 0 {
            return Ok(Vec::new());
        }

        let current_year = self.current_year();
        let mut plan = self.plan_query(theme, criteria, rng).await;
        let mut state = SelectionState::new(self.settings.page_budget);

        tracing::info!(
            theme = %plan.theme,
            wanted = target,
            keywords = plan.keywords.len(),
            genre = ?plan.genre,
            text_query = ?plan.text_query,
            category = ?criteria.category,
            "Starting discovery"
        );

        while state.accepted.len() < target {
            let Some(page) = state.next_page() else {
                tracing::info!(
                    theme = %plan.theme,
                    accepted = state.accepted.len(),
                    "Page budget exhausted"
                );
                break;
            };

            let results = match self.fetch_page(&mut plan, criteria, page).await {
                Ok(results) => results,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        page = page,
                        accepted = state.accepted.len(),
                        "Discovery page failed, keeping accumulated results"
                    );
                    break;
                }
            };

            if results.results.is_empty() {
                tracing::debug!(page = page, "Empty discovery page");
                break;
            }

            let availability = self.availability_for(&plan);
            for candidate in &results.results {
                if state.accepted.len() >= target {
                    break;
                }
                if state.seen.contains(&candidate.id)
                    || !self.admits(candidate, criteria, &criteria.exclusions, current_year)
                {
                    continue;
                }
                let providers = self.available_on(candidate, criteria, availability).await;
                if let Some(providers) = providers {
                    state.accept(ResultMovie::from_candidate(candidate, providers));
                }
            }

            tracing::debug!(
                page = page,
                raw = results.results.len(),
                accepted = state.accepted.len(),
                "Discovery page scanned"
            );

            if results.total_pages > 0 && page >= results.total_pages {
                break;
            }
        }

        let mut movies = state.accepted;
        movies.shuffle(rng);
        movies.truncate(target);

        tracing::info!(
            theme = %plan.theme,
            wanted = target,
            found = movies.len(),
            pages = state.page,
            "Discovery completed"
        );

        Ok(movies)
    }

    /// Single replacement: one movie from a single page that is not excluded.
    ///
    /// `Ok(None)` means no candidate on the page qualified.
    pub async fn discover_one<R: Rng + Send>(
        &self,
        theme: &str,
        criteria: &FilterCriteria,
        exclusions: &Exclusions,
        rng: &mut R,
    ) -> AppResult<Option<ResultMovie>> {
        let current_year = self.current_year();
        let exclusions = criteria.exclusions.merged(exclusions);
        let mut plan = self.plan_query(theme, criteria, rng).await;

        let mut page = self.fetch_page(&mut plan, criteria, 1).await?;
        page.results.shuffle(rng);
        let availability = self.availability_for(&plan);

        for candidate in &page.results {
            if !self.admits(candidate, criteria, &exclusions, current_year) {
                continue;
            }
            let providers = self.available_on(candidate, criteria, availability).await;
            if let Some(providers) = providers {
                tracing::info!(
                    theme = %plan.theme,
                    movie_id = candidate.id,
                    title = %candidate.display_title(),
                    "Replacement selected"
                );
                return Ok(Some(ResultMovie::from_candidate(candidate, providers)));
            }
        }

        tracing::info!(
            theme = %plan.theme,
            scanned = page.results.len(),
            excluded = exclusions.titles.len() + exclusions.ids.len(),
            "No replacement found"
        );

        Ok(None)
    }

    fn current_year(&self) -> i32 {
        self.settings
            .current_year
            .unwrap_or_else(|| Utc::now().year())
    }

    async fn plan_query<R: Rng + Send>(
        &self,
        theme: &str,
        criteria: &FilterCriteria,
        rng: &mut R,
    ) -> QueryPlan {
        if self.catalog.is_all_movies(theme) {
            let orders = self.catalog.sentinel_sorts().to_vec();
            let offset = rng.random_range(0..orders.len());
            return QueryPlan {
                theme: self.catalog.all_movies_theme().to_string(),
                keywords: Vec::new(),
                genre: criteria.genre,
                text_query: None,
                sort: SortPlan::Cycle { orders, offset },
            };
        }

        let spec = self.catalog.theme(theme);
        let keywords = self.resolver.resolve(&spec.name).await;

        let mut plan = QueryPlan {
            genre: criteria.genre.or(spec.genre),
            sort: SortPlan::Fixed(spec.sort),
            keywords,
            text_query: None,
            theme: spec.name,
        };
        plan.ensure_themed();
        plan
    }

    /// Free-text searches cannot carry a provider filter, so they are always looked up
    fn availability_for(&self, plan: &QueryPlan) -> AvailabilityCheck {
        if plan.text_query.is_some() {
            AvailabilityCheck::Lookup
        } else {
            self.settings.availability
        }
    }

    fn filters_for(&self, plan: &QueryPlan, criteria: &FilterCriteria, page: u32) -> DiscoverFilters {
        let watch_providers = match self.availability_for(plan) {
            AvailabilityCheck::Query => criteria.providers.clone(),
            AvailabilityCheck::Lookup => Vec::new(),
        };
        let watch_region =
            (!watch_providers.is_empty()).then(|| self.settings.watch_region.clone());

        DiscoverFilters {
            sort_by: plan.sort.for_page(page),
            watch_providers,
            watch_region,
            keywords: plan.keywords.clone(),
            text_query: plan.text_query.clone(),
            genre: plan.genre,
            year_from: criteria.year_from,
            year_to: criteria.year_to,
            min_rating: criteria.min_rating,
            min_vote_count: self.settings.min_vote_count,
            language: self.settings.language.clone(),
            original_language: self.settings.original_language.clone(),
            min_runtime: self.settings.min_runtime,
            page,
        }
    }

    /// Fetches a page, relaxing the keyword filter once if the first page comes back empty.
    ///
    /// Once relaxed, the plan stays unkeyworded for the rest of the call. Without a
    /// genre to fall back on, the relaxed query searches the theme name instead.
    async fn fetch_page(
        &self,
        plan: &mut QueryPlan,
        criteria: &FilterCriteria,
        page: u32,
    ) -> AppResult<DiscoverPage> {
        let results = self
            .source
            .discover_movies(&self.filters_for(plan, criteria, page))
            .await?;

        if results.results.is_empty()
            && page == 1
            && !plan.keywords.is_empty()
            && self.relaxation.retry_without_keywords(&plan.theme)
        {
            tracing::info!(
                theme = %plan.theme,
                keywords = plan.keywords.len(),
                "Empty first page, retrying without keyword filter"
            );
            plan.keywords.clear();
            plan.ensure_themed();
            return self
                .source
                .discover_movies(&self.filters_for(plan, criteria, page))
                .await;
        }

        Ok(results)
    }

    /// Exclusion, release-year and rating checks shared by both modes.
    ///
    /// The rating floor is also part of `discover/movie` queries; free-text
    /// searches are not rating-filtered by the source.
    fn admits(
        &self,
        candidate: &CandidateMovie,
        criteria: &FilterCriteria,
        exclusions: &Exclusions,
        current_year: i32,
    ) -> bool {
        !exclusions.excludes(candidate)
            && criteria.admits_year(candidate.release_year(), current_year)
            && criteria
                .min_rating
                .map_or(true, |rating| candidate.vote_average >= rating)
    }

    /// Provider names the candidate streams on, `None` if it is not available
    async fn available_on(
        &self,
        candidate: &CandidateMovie,
        criteria: &FilterCriteria,
        availability: AvailabilityCheck,
    ) -> Option<Vec<String>> {
        if criteria.providers.is_empty() {
            return Some(Vec::new());
        }

        match availability {
            AvailabilityCheck::Query => Some(self.services.names_for(&criteria.providers)),
            AvailabilityCheck::Lookup => {
                let regions = match self.source.get_watch_providers(candidate.id).await {
                    Ok(regions) => regions,
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            movie_id = candidate.id,
                            "Watch provider lookup failed, skipping candidate"
                        );
                        return None;
                    }
                };

                let names: Vec<String> = regions
                    .get(&self.settings.watch_region)
                    .map(|offers| {
                        offers
                            .flatrate
                            .iter()
                            .filter(|offer| criteria.providers.contains(&offer.provider_id))
                            .map(|offer| {
                                self.services
                                    .name_of(offer.provider_id)
                                    .unwrap_or(offer.provider_name.as_str())
                                    .to_string()
                            })
                            .collect()
                    })
                    .unwrap_or_default();

                (!names.is_empty()).then_some(names)
            }
        }
    }
}

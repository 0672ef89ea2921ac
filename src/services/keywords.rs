use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    models::{CuratedKeywords, KeywordId, ThemeCatalog},
    services::providers::MovieSource,
};

/// Matches kept from a free-text theme search
const MAX_FREE_TEXT_KEYWORDS: usize = 10;

/// Resolves a theme name into keyword ids used to restrict discovery
#[derive(Clone)]
pub struct KeywordResolver {
    source: Arc<dyn MovieSource>,
    catalog: Arc<ThemeCatalog>,
    /// Pause between consecutive curated lookups, to stay under the source's rate limit
    lookup_delay: Duration,
}

impl KeywordResolver {
    pub fn new(
        source: Arc<dyn MovieSource>,
        catalog: Arc<ThemeCatalog>,
        lookup_delay: Duration,
    ) -> Self {
        Self {
            source,
            catalog,
            lookup_delay,
        }
    }

    /// Keyword ids for a theme, in lookup order and without duplicates.
    ///
    /// Curated themes never resolve to an empty set. Other themes may, in which
    /// case the caller should discover without a keyword filter.
    pub async fn resolve(&self, theme: &str) -> Vec<KeywordId> {
        let spec = self.catalog.theme(theme);

        let ids = match &spec.curated {
            Some(curated) => self.resolve_curated(&spec.name, curated).await,
            None => self.resolve_free_text(&spec.name).await,
        };

        tracing::info!(
            theme = %spec.name,
            keywords = ids.len(),
            source = self.source.name(),
            "Theme keywords resolved"
        );

        ids
    }

    async fn resolve_curated(&self, theme: &str, curated: &CuratedKeywords) -> Vec<KeywordId> {
        let mut seen = HashSet::new();
        let mut ids = Vec::new();

        for (index, term) in curated.terms.iter().enumerate() {
            if index > 0 && !self.lookup_delay.is_zero() {
                tokio::time::sleep(self.lookup_delay).await;
            }

            match self.source.search_keyword(term).await {
                Ok(matches) => match matches.first() {
                    Some(keyword) => {
                        if seen.insert(keyword.id) {
                            ids.push(keyword.id);
                        }
                    }
                    None => tracing::debug!(theme = %theme, term = %term, "No keyword match"),
                },
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        theme = %theme,
                        term = %term,
                        "Keyword lookup failed, skipping term"
                    );
                }
            }
        }

        if ids.is_empty() {
            tracing::warn!(
                theme = %theme,
                fallback = curated.fallback,
                "No curated term matched, using fallback keyword"
            );
            ids.push(curated.fallback);
        }

        ids
    }

    async fn resolve_free_text(&self, theme: &str) -> Vec<KeywordId> {
        if theme.trim().is_empty() {
            return Vec::new();
        }

        match self.source.search_keyword(theme).await {
            Ok(matches) => matches
                .into_iter()
                .take(MAX_FREE_TEXT_KEYWORDS)
                .map(|keyword| keyword.id)
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, theme = %theme, "Keyword lookup failed");
                Vec::new()
            }
        }
    }
}

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Discovery sort orders understood by the metadata source
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SortOrder {
    #[serde(rename = "popularity.desc")]
    PopularityDesc,
    #[serde(rename = "vote_average.desc")]
    VoteAverageDesc,
    #[serde(rename = "release_date.desc")]
    ReleaseDateDesc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::PopularityDesc => "popularity.desc",
            SortOrder::VoteAverageDesc => "vote_average.desc",
            SortOrder::ReleaseDateDesc => "release_date.desc",
        }
    }
}

/// Curated search terms for a theme and the keyword used when none of them match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CuratedKeywords {
    pub terms: Vec<String>,
    pub fallback: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeSpec {
    pub name: String,
    pub genre: Option<u32>,
    pub curated: Option<CuratedKeywords>,
    pub sort: SortOrder,
}

impl ThemeSpec {
    /// A theme with no genre and no curated terms, resolved by free-text keyword search
    pub fn generic(name: &str) -> Self {
        Self {
            name: name.to_string(),
            genre: None,
            curated: None,
            sort: SortOrder::PopularityDesc,
        }
    }

    fn curated(name: &str, genre: u32, terms: &[&str], fallback: u64) -> Self {
        Self {
            name: name.to_string(),
            genre: Some(genre),
            curated: Some(CuratedKeywords {
                terms: terms.iter().map(|term| term.to_string()).collect(),
                fallback,
            }),
            sort: SortOrder::PopularityDesc,
        }
    }
}

/// Immutable theme table shared by the keyword resolver and the discovery engine
#[derive(Debug, Clone)]
pub struct ThemeCatalog {
    themes: HashMap<String, ThemeSpec>,
    /// Theme for each month, January first
    month_themes: [String; 12],
    all_movies: String,
    sentinel_sorts: Vec<SortOrder>,
}

impl Default for ThemeCatalog {
    fn default() -> Self {
        let themes = [
            ThemeSpec::curated(
                "Halloween",
                27,
                &["halloween", "haunted house", "trick or treat"],
                616,
            ),
            ThemeSpec::curated(
                "Christmas",
                10751,
                &["christmas", "christmas eve", "santa claus", "holiday season"],
                207317,
            ),
            ThemeSpec::generic("Winter"),
            ThemeSpec::generic("Spring"),
            ThemeSpec::generic("Summer"),
            ThemeSpec::generic("Autumn"),
        ];

        let month_themes = [
            "Winter", "Winter", "Spring", "Spring", "Spring", "Summer", "Summer", "Summer",
            "Autumn", "Halloween", "Autumn", "Christmas",
        ]
        .map(str::to_string);

        Self::new(
            themes,
            month_themes,
            "Movies",
            vec![
                SortOrder::PopularityDesc,
                SortOrder::VoteAverageDesc,
                SortOrder::ReleaseDateDesc,
            ],
        )
    }
}

impl ThemeCatalog {
    pub fn new(
        themes: impl IntoIterator<Item = ThemeSpec>,
        month_themes: [String; 12],
        all_movies: &str,
        sentinel_sorts: Vec<SortOrder>,
    ) -> Self {
        let themes = themes
            .into_iter()
            .map(|spec| (spec.name.to_lowercase(), spec))
            .collect();
        let sentinel_sorts = if sentinel_sorts.is_empty() {
            vec![SortOrder::PopularityDesc]
        } else {
            sentinel_sorts
        };

        Self {
            themes,
            month_themes,
            all_movies: all_movies.to_string(),
            sentinel_sorts,
        }
    }

    /// Looks up a theme by name, case-insensitively; unknown names get a generic spec
    pub fn theme(&self, name: &str) -> ThemeSpec {
        let name = name.trim();
        self.themes
            .get(&name.to_lowercase())
            .cloned()
            .unwrap_or_else(|| ThemeSpec::generic(name))
    }

    /// The "all movies" sentinel; a blank theme counts as the sentinel too
    pub fn is_all_movies(&self, theme: &str) -> bool {
        let theme = theme.trim();
        theme.is_empty() || theme.eq_ignore_ascii_case(&self.all_movies)
    }

    pub fn all_movies_theme(&self) -> &str {
        &self.all_movies
    }

    /// Theme for a 1-based month number; out-of-range months get the sentinel
    pub fn month_theme(&self, month: u32) -> &str {
        month
            .checked_sub(1)
            .and_then(|index| self.month_themes.get(index as usize))
            .map(String::as_str)
            .unwrap_or(&self.all_movies)
    }

    pub fn sentinel_sorts(&self) -> &[SortOrder] {
        &self.sentinel_sorts
    }
}

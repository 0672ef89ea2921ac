use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::CandidateMovie;

/// Recency bucket applied on top of the release-year bounds
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    All,
    /// Released within the last ten years
    Modern,
    /// Released at least twenty years ago
    Classics,
}

impl Category {
    pub fn admits(self, year: i32, current_year: i32) -> bool {
        match self {
            Category::All => true,
            Category::Modern => year >= current_year - 10,
            Category::Classics => year < current_year - 20,
        }
    }
}

/// Titles and ids a caller has already picked
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exclusions {
    pub titles: HashSet<String>,
    pub ids: HashSet<u64>,
}

impl Exclusions {
    pub fn from_titles<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            titles: titles.into_iter().map(Into::into).collect(),
            ids: HashSet::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty() && self.ids.is_empty()
    }

    pub fn excludes(&self, candidate: &CandidateMovie) -> bool {
        self.ids.contains(&candidate.id) || self.titles.contains(candidate.display_title())
    }

    pub fn merged(&self, other: &Exclusions) -> Exclusions {
        Exclusions {
            titles: self.titles.union(&other.titles).cloned().collect(),
            ids: self.ids.union(&other.ids).copied().collect(),
        }
    }
}

/// Caller filters for one discovery call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub category: Category,
    pub min_rating: Option<f32>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    /// Overrides the theme's own genre when set
    pub genre: Option<u32>,
    /// Empty means no provider filtering
    pub providers: Vec<u32>,
    pub exclusions: Exclusions,
}

impl FilterCriteria {
    /// Whether a release year passes the future-date, category and bound checks.
    ///
    /// Inverted bounds admit nothing.
    pub fn admits_year(&self, year: i32, current_year: i32) -> bool {
        if year > current_year {
            return false;
        }
        if !self.category.admits(year, current_year) {
            return false;
        }
        if self.year_from.is_some_and(|from| year < from) {
            return false;
        }
        if self.year_to.is_some_and(|to| year > to) {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UNKNOWN_RELEASE_YEAR;

    const NOW: i32 = 2024;

    #[test]
    fn test_category_serialization() {
        assert_eq!(serde_json::to_string(&Category::Classics).unwrap(), "\"classics\"");
        let parsed: Category = serde_json::from_str("\"modern\"").unwrap();
        assert_eq!(parsed, Category::Modern);
    }

    #[test]
    fn test_modern_boundary() {
        assert!(Category::Modern.admits(2014, NOW));
        assert!(!Category::Modern.admits(2013, NOW));
    }

    #[test]
    fn test_classics_boundary() {
        assert!(Category::Classics.admits(2003, NOW));
        assert!(!Category::Classics.admits(2004, NOW));
    }

    #[test]
    fn test_future_years_rejected() {
        let criteria = FilterCriteria::default();
        assert!(criteria.admits_year(NOW, NOW));
        assert!(!criteria.admits_year(NOW + 1, NOW));
    }

    #[test]
    fn test_unknown_year_sentinel() {
        let all = FilterCriteria::default();
        assert!(all.admits_year(UNKNOWN_RELEASE_YEAR, NOW));

        let modern = FilterCriteria {
            category: Category::Modern,
            ..Default::default()
        };
        assert!(!modern.admits_year(UNKNOWN_RELEASE_YEAR, NOW));

        let classics = FilterCriteria {
            category: Category::Classics,
            ..Default::default()
        };
        assert!(classics.admits_year(UNKNOWN_RELEASE_YEAR, NOW));
    }

    #[test]
    fn test_inverted_year_bounds_admit_nothing() {
        let criteria = FilterCriteria {
            year_from: Some(2010),
            year_to: Some(2000),
            ..Default::default()
        };
        for year in 1990..=2020 {
            assert!(!criteria.admits_year(year, NOW));
        }
    }

    #[test]
    fn test_exclusions_match_title_or_id() {
        let mut exclusions = Exclusions::from_titles(["Elf"]);
        exclusions.ids.insert(42);

        let elf = CandidateMovie {
            id: 1,
            title: "Elf".to_string(),
            release_date: None,
            poster_path: None,
            vote_average: 0.0,
        };
        let other = CandidateMovie {
            id: 42,
            title: "Krampus".to_string(),
            ..elf.clone()
        };
        let free = CandidateMovie {
            id: 7,
            title: "Klaus".to_string(),
            ..elf.clone()
        };

        assert!(exclusions.excludes(&elf));
        assert!(exclusions.excludes(&other));
        assert!(!exclusions.excludes(&free));
    }
}

use serde::{Deserialize, Serialize};

/// Year assigned to candidates whose release date is missing or malformed
pub const UNKNOWN_RELEASE_YEAR: i32 = 1900;

const UNTITLED: &str = "Untitled";
const UNKNOWN_RELEASE_DATE: &str = "Unknown";

/// Raw movie record from a discovery page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateMovie {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: f32,
}

impl CandidateMovie {
    /// Release year from the leading four characters of the date.
    ///
    /// Missing, empty or non-numeric dates map to [`UNKNOWN_RELEASE_YEAR`] so the
    /// candidate is still considered rather than dropped.
    pub fn release_year(&self) -> i32 {
        self.release_date
            .as_deref()
            .map(|date| date.chars().take(4).collect::<String>())
            .and_then(|year| year.parse().ok())
            .unwrap_or(UNKNOWN_RELEASE_YEAR)
    }

    pub fn display_title(&self) -> &str {
        let title = self.title.trim();
        if title.is_empty() {
            UNTITLED
        } else {
            title
        }
    }
}

/// A movie as returned to callers of the discovery engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultMovie {
    pub id: u64,
    pub title: String,
    pub release_date: String,
    pub poster_path: Option<String>,
    pub providers: Vec<String>,
}

impl ResultMovie {
    pub fn from_candidate(candidate: &CandidateMovie, providers: Vec<String>) -> Self {
        let release_date = candidate
            .release_date
            .as_deref()
            .filter(|date| !date.trim().is_empty())
            .unwrap_or(UNKNOWN_RELEASE_DATE)
            .to_string();

        Self {
            id: candidate.id,
            title: candidate.display_title().to_string(),
            release_date,
            poster_path: candidate.poster_path.clone(),
            providers,
        }
    }
}

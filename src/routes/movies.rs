use axum::{extract::State, Json};
use chrono::Utc;
use rand::{rngs::StdRng, SeedableRng};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::{fmt::Display, str::FromStr, sync::Arc};

use crate::{
    error::{AppError, AppResult},
    models::{Category, Exclusions, FilterCriteria, ResultMovie},
    routes::AppState,
    services::calendar,
};

/// Filters shared by list and replacement requests.
///
/// Numeric fields accept numbers or numeric strings; blank strings mean "not set".
#[derive(Debug, Default, Deserialize)]
pub struct MovieListRequest {
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub category: Category,
    #[serde(default, deserialize_with = "lenient_number")]
    pub genre: Option<u32>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub min_rating: Option<f32>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub year_from: Option<i32>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub year_to: Option<i32>,
    #[serde(default = "default_only_streaming")]
    pub only_streaming: bool,
    #[serde(default, deserialize_with = "lenient_ids")]
    pub services: Option<Vec<u32>>,
}

fn default_only_streaming() -> bool {
    true
}

impl MovieListRequest {
    fn criteria(&self, default_services: &[u32]) -> FilterCriteria {
        let providers = if self.only_streaming {
            self.services
                .clone()
                .unwrap_or_else(|| default_services.to_vec())
        } else {
            Vec::new()
        };

        FilterCriteria {
            category: self.category,
            min_rating: self.min_rating,
            year_from: self.year_from,
            year_to: self.year_to,
            genre: self.genre,
            providers,
            exclusions: Exclusions::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReplacementRequest {
    #[serde(flatten)]
    pub filters: MovieListRequest,
    /// Titles already on the caller's list
    #[serde(default)]
    pub current_titles: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MovieListResponse {
    pub movies: Vec<ResultMovie>,
    pub month: String,
    pub category: Category,
    /// Empty unless fewer movies than requested were found
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ReplacementResponse {
    pub movie: ResultMovie,
}

/// Handler for the movie list endpoint
pub async fn list_movies(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MovieListRequest>,
) -> AppResult<Json<MovieListResponse>> {
    let plan = calendar::plan(
        state.engine.catalog(),
        request.month.as_deref(),
        request.theme.as_deref(),
        Utc::now().date_naive(),
    );
    let criteria = request.criteria(&state.default_services);

    tracing::info!(
        theme = %plan.theme,
        wanted = plan.target,
        category = ?criteria.category,
        providers = ?criteria.providers,
        "Processing movie list request"
    );

    let mut rng = StdRng::from_os_rng();
    let movies = state
        .engine
        .discover(&plan.theme, plan.target, &criteria, &mut rng)
        .await?;
    let message = calendar::shortfall_message(movies.len(), plan.target).unwrap_or_default();

    Ok(Json(MovieListResponse {
        movies,
        month: plan.label,
        category: criteria.category,
        message,
    }))
}

/// Handler for the single replacement endpoint
pub async fn replacement_movie(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ReplacementRequest>,
) -> AppResult<Json<ReplacementResponse>> {
    let plan = calendar::plan(
        state.engine.catalog(),
        request.filters.month.as_deref(),
        request.filters.theme.as_deref(),
        Utc::now().date_naive(),
    );
    let criteria = request.filters.criteria(&state.default_services);
    let exclusions = Exclusions::from_titles(request.current_titles);

    tracing::info!(
        theme = %plan.theme,
        excluded = exclusions.titles.len(),
        "Processing replacement request"
    );

    let mut rng = StdRng::from_os_rng();
    state
        .engine
        .discover_one(&plan.theme, &criteria, &exclusions, &mut rng)
        .await?
        .map(|movie| Json(ReplacementResponse { movie }))
        .ok_or_else(|| AppError::NotFound("No replacement movie found".to_string()))
}

fn lenient_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s.trim().parse().map(Some).map_err(de::Error::custom),
        Some(Value::Number(n)) => n.to_string().parse().map(Some).map_err(de::Error::custom),
        Some(other) => Err(de::Error::custom(format!("expected a number, got {}", other))),
    }
}

fn lenient_ids<'de, D>(deserializer: D) -> Result<Option<Vec<u32>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(values) = Option::<Vec<Value>>::deserialize(deserializer)? else {
        return Ok(None);
    };

    values
        .into_iter()
        .map(|value| match value {
            Value::Number(n) => n.to_string().parse().map_err(de::Error::custom),
            Value::String(s) => s.trim().parse().map_err(de::Error::custom),
            other => Err(de::Error::custom(format!("expected a provider id, got {}", other))),
        })
        .collect::<Result<Vec<u32>, D::Error>>()
        .map(Some)
}

use std::time::Duration;

use axum::extract::{rejection::PathRejection, Path, Query, State};

use crate::db::{Database, DistinctField};
use crate::models::*;

use super::envelope::{ApiError, ApiResponse};
use super::params::{ListParams, RandomParams};
use super::AppState;

// Stable `error` labels, one per operation.
const LIST_FAILED: &str = "Failed to fetch exercises";
const RANDOM_FAILED: &str = "Failed to fetch random exercises";
const GET_FAILED: &str = "Failed to fetch exercise";
const EQUIPMENT_FAILED: &str = "Failed to fetch equipment list";
const MUSCLES_FAILED: &str = "Failed to fetch muscle list";
const HEALTH_FAILED: &str = "Health check failed";

/// Raw decoded query pairs; repeated keys are preserved.
type RawPairs = Query<Vec<(String, String)>>;

// ============================================================
// Store access
// ============================================================

/// Run a store call on the blocking pool, bounded by the configured timeout.
async fn run_store<T, F>(state: &AppState, label: &'static str, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let db = state.db.clone();
    with_timeout(state.store_timeout, label, move || f(&db)).await
}

/// A timed-out query keeps running on its blocking thread; only the response
/// is given up on.
async fn with_timeout<T, F>(limit: Duration, label: &'static str, f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::time::timeout(limit, tokio::task::spawn_blocking(f)).await {
        Ok(Ok(result)) => result.map_err(|e| ApiError::internal(label, e)),
        Ok(Err(join)) => Err(ApiError::internal(
            label,
            anyhow::Error::new(join).context("store task failed"),
        )),
        Err(_) => Err(ApiError::internal(
            label,
            anyhow::anyhow!("store query timed out after {:?}", limit),
        )),
    }
}

// ============================================================
// Health
// ============================================================

#[derive(Debug, serde::Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub exercises: u64,
}

pub async fn health(State(state): State<AppState>) -> Result<ApiResponse<HealthStatus>, ApiError> {
    let exercises =
        run_store(&state, HEALTH_FAILED, |db| db.count(&ExerciseFilter::default())).await?;
    Ok(ApiResponse::ok(HealthStatus {
        status: "ok",
        exercises,
    }))
}

// ============================================================
// Exercises
// ============================================================

pub async fn list_exercises(
    State(state): State<AppState>,
    Query(pairs): RawPairs,
) -> Result<ApiResponse<Vec<Exercise>>, ApiError> {
    let ListParams { filter, page } = ListParams::from_pairs(&pairs);

    // Count first so the page math and the page contents use the same filter.
    let (total, exercises) = run_store(&state, LIST_FAILED, move |db| {
        let total = db.count(&filter)?;
        let exercises = db.find(&filter, page.skip(), page.limit)?;
        Ok((total, exercises))
    })
    .await?;

    Ok(ApiResponse::paginated(exercises, Pagination::new(total, page)))
}

pub async fn random_exercises(
    State(state): State<AppState>,
    Query(pairs): RawPairs,
) -> Result<ApiResponse<Vec<Exercise>>, ApiError> {
    let RandomParams { filter, count } = RandomParams::from_pairs(&pairs);

    run_store(&state, RANDOM_FAILED, move |db| db.sample(&filter, count))
        .await
        .map(ApiResponse::ok)
}

/// Ids that cannot even be decoded from the path are just unknown ids.
pub async fn get_exercise(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<ApiResponse<Exercise>, ApiError> {
    let Ok(Path(id)) = id else {
        return Err(ApiError::ExerciseNotFound);
    };

    run_store(&state, GET_FAILED, move |db| db.find_by_id(&id))
        .await?
        .map(ApiResponse::ok)
        .ok_or(ApiError::ExerciseNotFound)
}

pub async fn list_equipment(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<String>>, ApiError> {
    run_store(&state, EQUIPMENT_FAILED, |db| {
        db.distinct_values(DistinctField::Equipment)
    })
    .await
    .map(ApiResponse::ok)
}

/// Muscles that appear as a primary target somewhere in the catalog.
pub async fn list_muscles(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<String>>, ApiError> {
    run_store(&state, MUSCLES_FAILED, |db| {
        db.distinct_values(DistinctField::PrimaryMuscles)
    })
    .await
    .map(ApiResponse::ok)
}

pub async fn not_found() -> ApiError {
    ApiError::RouteNotFound
}

//! Report route definitions.

use super::{ApiError, AppState};
use crate::persistence::{NewReport, PersistenceError, ReportQuery, ReportStore, StoredReport};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/report", post(create_report))
        .route("/report/{id}", get(get_report).delete(delete_report))
        .route("/reports", get(list_reports))
}

fn not_found() -> ApiError {
    ApiError::NotFound("Report not found".to_string())
}

/// Run a store call on the blocking pool; SQLite access holds a lock and does disk I/O.
async fn with_store<T, F>(state: AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&dyn ReportStore) -> Result<T, PersistenceError> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || f(state.store.as_ref())).await?;
    Ok(result?)
}

async fn create_report(
    State(state): State<AppState>,
    Json(report): Json<NewReport>,
) -> Result<(StatusCode, Json<StoredReport>), ApiError> {
    let stored = with_store(state, move |store| store.create(report)).await?;
    log::info!("Created report {}", stored.id);
    Ok((StatusCode::CREATED, Json(stored)))
}

async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<StoredReport>, ApiError> {
    with_store(state, move |store| store.get(id))
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

async fn list_reports(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Vec<StoredReport>>, ApiError> {
    let reports = with_store(state, move |store| store.list(&query)).await?;
    Ok(Json(reports))
}

async fn delete_report(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if with_store(state, move |store| store.delete(id)).await? {
        log::info!("Deleted report {}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found())
    }
}

//! Report API -- axum routes over the report store.

mod auth;
mod error;
mod routes;

pub use auth::constant_time_eq;
pub use error::ApiError;

use crate::persistence::ReportStore;
use axum::{middleware, routing::get, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;

/// Header carrying the shared secret
pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ReportStore>,
    pub api_key: Arc<str>,
}

impl AppState {
    pub fn new(store: Arc<dyn ReportStore>, api_key: impl Into<Arc<str>>) -> Self {
        AppState {
            store,
            api_key: api_key.into(),
        }
    }
}

/// Build the application router. Report routes require the API key; the
/// root liveness route does not.
pub fn router(state: AppState) -> Router {
    let protected = routes::report_routes().layer(middleware::from_fn_with_state(
        state.clone(),
        auth::require_api_key,
    ));

    Router::new()
        .route("/", get(root))
        .merge(protected)
        .fallback(fallback)
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "RSecurity backend is running" }))
}

async fn fallback() -> ApiError {
    ApiError::NotFound("Not found".to_string())
}

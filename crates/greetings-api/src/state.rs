use std::sync::Arc;

use axum::{Json, extract::rejection::JsonRejection};
use tracing::{error, warn};

use greetings_db::Database;

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
}

impl AppStateInner {
    pub fn new(db: Database) -> AppState {
        Arc::new(Self { db })
    }
}

/// Runs blocking database work off the async runtime.
pub async fn run_db<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.into())
        })?
}

/// Unwraps a JSON body, treating a missing or malformed body like missing fields.
pub fn json_body<T>(
    payload: Result<Json<T>, JsonRejection>,
    missing: &'static str,
) -> Result<T, ApiError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            warn!("Rejected request body: {}", rejection.body_text());
            Err(ApiError::Validation(missing))
        }
    }
}

/// An id that does not parse cannot name an existing row.
pub fn parse_id(raw: &str, not_found: &'static str) -> Result<i64, ApiError> {
    raw.parse().map_err(|_| ApiError::NotFound(not_found))
}

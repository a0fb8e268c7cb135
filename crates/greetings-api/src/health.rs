use axum::{Json, extract::State, response::IntoResponse};

use greetings_types::api::HealthResponse;

use crate::error::ApiError;
use crate::state::{AppState, run_db};

/// GET /health. Round-trips a query through the pool.
pub async fn health(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    run_db(&state, |db| Ok(db.ping()?)).await?;
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
    }))
}

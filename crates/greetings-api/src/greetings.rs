use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use greetings_db::models::GreetingRow;
use greetings_types::api::{Greeting, GreetingRequest, required};

use crate::error::ApiError;
use crate::state::{AppState, json_body, parse_id, run_db};

const NOT_FOUND: &str = "Greeting card not found";
const FIELDS_REQUIRED: &str = "Title and message are required";

fn to_greeting(row: GreetingRow) -> Greeting {
    Greeting {
        id: row.id,
        title: row.title,
        message: row.message,
    }
}

fn fields(req: &GreetingRequest) -> Result<(String, String), ApiError> {
    match (required(&req.title), required(&req.message)) {
        (Some(title), Some(message)) => Ok((title.to_string(), message.to_string())),
        _ => Err(ApiError::Validation(FIELDS_REQUIRED)),
    }
}

/// GET /greetings
pub async fn list_greetings(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = run_db(&state, |db| Ok(db.list_greetings()?)).await?;
    Ok(Json(rows.into_iter().map(to_greeting).collect::<Vec<_>>()))
}

/// GET /greetings/{id}
pub async fn get_greeting(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id, NOT_FOUND)?;
    let row = run_db(&state, move |db| Ok(db.get_greeting(id)?))
        .await?
        .ok_or(ApiError::NotFound(NOT_FOUND))?;
    Ok(Json(to_greeting(row)))
}

/// POST /greetings
pub async fn create_greeting(
    State(state): State<AppState>,
    payload: Result<Json<GreetingRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = json_body(payload, FIELDS_REQUIRED)?;
    let (title, message) = fields(&req)?;

    let row = run_db(&state, move |db| Ok(db.create_greeting(&title, &message)?)).await?;
    info!("Created greeting {}", row.id);

    Ok((StatusCode::CREATED, Json(to_greeting(row))))
}

/// PUT /greetings/{id}
pub async fn update_greeting(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<GreetingRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = json_body(payload, FIELDS_REQUIRED)?;
    let (title, message) = fields(&req)?;
    let id = parse_id(&id, NOT_FOUND)?;

    let row = run_db(&state, move |db| Ok(db.update_greeting(id, &title, &message)?))
        .await?
        .ok_or(ApiError::NotFound(NOT_FOUND))?;

    Ok(Json(to_greeting(row)))
}

/// DELETE /greetings/{id}
pub async fn delete_greeting(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id, NOT_FOUND)?;
    if !run_db(&state, move |db| Ok(db.delete_greeting(id)?)).await? {
        return Err(ApiError::NotFound(NOT_FOUND));
    }
    info!("Deleted greeting {}", id);
    Ok(StatusCode::NO_CONTENT)
}

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{info, warn};

use greetings_db::{DbError, models::UserRow};
use greetings_types::api::{LoginRequest, LoginResponse, SignupRequest, UserResponse, required};

use crate::error::ApiError;
use crate::password::{hash_password, verify_password};
use crate::state::{AppState, json_body, parse_id, run_db};

const NOT_FOUND: &str = "User not found";
const FIELDS_REQUIRED: &str = "Name, email and password are required";
const LOGIN_FIELDS_REQUIRED: &str = "Email and password are required";
const EMAIL_TAKEN: &str = "Email already exists";
const BAD_PASSWORD: &str = "Invalid password";

/// Drops the password hash.
fn to_response(row: UserRow) -> UserResponse {
    UserResponse {
        id: row.id,
        name: row.name,
        email: row.email,
    }
}

fn email_conflict(err: DbError) -> ApiError {
    if err.is_unique_violation() {
        ApiError::Conflict(EMAIL_TAKEN)
    } else {
        err.into()
    }
}

struct UserFields {
    name: String,
    email: String,
    password: String,
}

fn fields(req: &SignupRequest) -> Result<UserFields, ApiError> {
    match (
        required(&req.name),
        required(&req.email),
        required(&req.password),
    ) {
        (Some(name), Some(email), Some(password)) => Ok(UserFields {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }),
        _ => Err(ApiError::Validation(FIELDS_REQUIRED)),
    }
}

/// POST /users/signup
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = json_body(payload, FIELDS_REQUIRED)?;
    let f = fields(&req)?;

    let row = run_db(&state, move |db| {
        let hash = hash_password(&f.password)?;
        db.create_user(&f.name, &f.email, &hash).map_err(email_conflict)
    })
    .await
    .inspect_err(|e| {
        if matches!(e, ApiError::Conflict(_)) {
            warn!("Signup rejected: email already registered");
        }
    })?;
    info!("User {} signed up", row.id);

    Ok((StatusCode::CREATED, Json(to_response(row))))
}

/// POST /users/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = json_body(payload, LOGIN_FIELDS_REQUIRED)?;
    let (email, password) = match (required(&req.email), required(&req.password)) {
        (Some(email), Some(password)) => (email.to_string(), password.to_string()),
        _ => return Err(ApiError::Validation(LOGIN_FIELDS_REQUIRED)),
    };

    let user = run_db(&state, move |db| {
        let user = db
            .get_user_by_email(&email)?
            .ok_or(ApiError::NotFound(NOT_FOUND))?;
        if !verify_password(&password, &user.password)? {
            warn!("Failed login for user {}", user.id);
            return Err(ApiError::Unauthorized(BAD_PASSWORD));
        }
        Ok(user)
    })
    .await?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        user: to_response(user),
    }))
}

/// GET /users
pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = run_db(&state, |db| Ok(db.list_users()?)).await?;
    Ok(Json(rows.into_iter().map(to_response).collect::<Vec<_>>()))
}

/// GET /users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id, NOT_FOUND)?;
    let row = run_db(&state, move |db| Ok(db.get_user_by_id(id)?))
        .await?
        .ok_or(ApiError::NotFound(NOT_FOUND))?;
    Ok(Json(to_response(row)))
}

/// PUT /users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = json_body(payload, FIELDS_REQUIRED)?;
    let f = fields(&req)?;
    let id = parse_id(&id, NOT_FOUND)?;

    let row = run_db(&state, move |db| {
        let hash = hash_password(&f.password)?;
        db.update_user(id, &f.name, &f.email, &hash)
            .map_err(email_conflict)
    })
    .await?
    .ok_or(ApiError::NotFound(NOT_FOUND))?;

    Ok(Json(to_response(row)))
}

/// DELETE /users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id, NOT_FOUND)?;
    if !run_db(&state, move |db| Ok(db.delete_user(id)?)).await? {
        return Err(ApiError::NotFound(NOT_FOUND));
    }
    info!("Deleted user {}", id);
    Ok(StatusCode::NO_CONTENT)
}

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{greetings, health, users};

/// Builds the full HTTP surface: greetings, users and the health probe.
pub fn router(state: AppState) -> Router {
    // CORS: any origin, no credentials
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(false);

    Router::new()
        .route("/health", get(health::health))
        .route(
            "/greetings",
            get(greetings::list_greetings).post(greetings::create_greeting),
        )
        .route(
            "/greetings/{id}",
            get(greetings::get_greeting)
                .put(greetings::update_greeting)
                .delete(greetings::delete_greeting),
        )
        .route("/users", get(users::list_users))
        .route("/users/signup", post(users::signup))
        .route("/users/login", post(users::login))
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

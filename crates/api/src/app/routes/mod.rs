use axum::{
    Router,
    routing::{get, post, put},
};

pub mod auth;
pub mod system;
pub mod users;

/// Public sign-up / sign-in endpoints.
pub fn auth_router() -> Router {
    Router::new()
        .route("/register", post(auth::register))
        .route("/verify-email", post(auth::verify_email))
        .route("/login", post(auth::login))
}

/// Endpoints that require a session token (the caller layers the auth middleware).
pub fn users_router() -> Router {
    Router::new()
        .route("/profile", get(users::get_profile).put(users::update_profile))
        .route("/change-password", put(users::change_password))
}

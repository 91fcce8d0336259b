//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: shared state (config, user store, mailer, token codec)
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response bodies
//! - `email.rs`: transactional email templates
//! - `errors.rs`: consistent `{"message": ...}` error responses

use std::any::Any;
use std::sync::Arc;

use axum::{Extension, Router, http::StatusCode, response::Response, routing::get};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::cors;
use crate::middleware;

pub mod dto;
pub mod email;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: AppConfig) -> anyhow::Result<Router> {
    let services = services::build_services(config).await?;
    Ok(router(Arc::new(services)))
}

/// Router over already-wired services.
pub fn router(services: Arc<AppServices>) -> Router {
    let auth_state = middleware::AuthState {
        jwt: services.jwt.clone(),
    };
    let allowed = Arc::new(services.config.allowed_origins());
    tracing::info!(origins = ?allowed.iter().collect::<Vec<_>>(), "cors origins");

    // Protected routes: require a session token.
    let users = routes::users_router().route_layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    let api = Router::new()
        .nest("/auth", routes::auth_router())
        .nest("/users", users);

    let app = Router::new()
        .route("/", get(routes::system::welcome))
        .route("/health", get(routes::system::health))
        .nest("/api-v1", api)
        .layer(Extension(services));

    with_edge_layers(app, allowed)
}

/// Layers every response passes through, including 404s and panics.
///
/// Order, outermost first: CORS, tracing, panic capture, then the not-found fallback.
pub fn with_edge_layers(app: Router, allowed: Arc<cors::AllowedOrigins>) -> Router {
    app.fallback(routes::system::not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors::cors_layer(allowed))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(%detail, "handler panicked");

    errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, errors::INTERNAL_ERROR_MESSAGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, header};
    use tower::ServiceExt;

    fn edge(app: Router) -> Router {
        with_edge_layers(app, Arc::new(cors::AllowedOrigins::new(None)))
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn boom() -> &'static str {
        panic!("database password is hunter2")
    }

    #[tokio::test]
    async fn panic_becomes_opaque_500() {
        let app = edge(Router::new().route("/boom", get(boom)));

        let response = app
            .oneshot(Request::get("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await,
            serde_json::json!({ "message": "Internal server error" })
        );
    }

    #[tokio::test]
    async fn unmatched_path_is_json_404_with_cors() {
        let app = edge(Router::new());

        let response = app
            .oneshot(
                Request::get("/api-v1/nope")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:5173"
        );
        assert_eq!(json_body(response).await, serde_json::json!({ "message": "Not found" }));
    }
}

//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: marketplace wiring shared by all handlers
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Router backed by a fresh in-memory marketplace whose notifications are
/// discarded.
pub fn build_app(jwt_secret: String) -> Router {
    build_app_with(jwt_secret, AppServices::in_memory())
}

/// Build the full HTTP router around existing services (used by `main.rs`).
pub fn build_app_with(jwt_secret: String, services: AppServices) -> Router {
    let jwt = Arc::new(procura_auth::Hs256JwtValidator::new(jwt_secret.into_bytes()));
    let auth_state = middleware::AuthState { jwt };

    // Protected routes: require a bearer token.
    let protected = routes::router()
        .layer(Extension(Arc::new(services)))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .layer(ServiceBuilder::new())
}

use axum::{Router, routing::get};

pub mod basket;
pub mod contacts;
pub mod orders;
pub mod partner;
pub mod products;
pub mod system;
pub mod users;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/products", products::router())
        .nest("/basket", basket::router())
        .nest("/contacts", contacts::router())
        .nest("/orders", orders::router())
        .nest("/partner", partner::router())
        .nest("/users", users::router())
}

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/update", post(update_catalog))
        .route("/state", post(set_state))
}

/// Replace the caller's shop catalog from a YAML document body.
pub async fn update_catalog(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: String,
) -> axum::response::Response {
    match services
        .marketplace
        .import_catalog_yaml(principal.principal(), &body)
    {
        Ok(summary) => (StatusCode::OK, Json(dto::import_summary_to_json(summary))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// Open or close the caller's shop for ordering.
pub async fn set_state(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::ShopStateRequest>,
) -> axum::response::Response {
    match services
        .marketplace
        .set_shop_active(principal.principal(), body.state)
    {
        Ok(shop) => (StatusCode::OK, Json(dto::shop_to_json(shop))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use procura_core::OrderId;
use procura_infra::OrderView;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_orders))
        .route("/confirm", post(confirm_order))
        .route("/:id", get(get_order))
        .route("/:id/status", post(set_status))
}

pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.marketplace.list_orders(principal.user_id()) {
        Ok(orders) => {
            let items = orders.into_iter().map(dto::order_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let order_id: OrderId = match errors::parse_id(&id, "order") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.marketplace.get_order(principal.user_id(), order_id) {
        Ok(view) => (StatusCode::OK, Json(dto::order_to_json(view))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// Turn the caller's basket into a placed order.
pub async fn confirm_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::ConfirmOrderRequest>,
) -> axum::response::Response {
    match services
        .marketplace
        .confirm(principal.user_id(), body.contact_id)
    {
        Ok(order) => {
            let total = order.total();
            (StatusCode::OK, Json(dto::order_to_json(OrderView { order, total }))).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// Staff and suppliers move orders along the status table.
pub async fn set_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::SetStatusRequest>,
) -> axum::response::Response {
    let order_id: OrderId = match errors::parse_id(&id, "order") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.marketplace.set_status(
        principal.principal(),
        order_id,
        &body.status,
        body.expected_status.as_deref(),
    ) {
        Ok(order) => {
            let total = order.total();
            (StatusCode::OK, Json(dto::order_to_json(OrderView { order, total }))).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

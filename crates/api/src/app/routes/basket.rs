use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};

use procura_core::{DomainResult, StockRecordId, UserId};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(view_basket))
        .route("/items", post(add_item))
        .route("/items/:stock_record_id", patch(update_item).delete(remove_item))
}

fn basket_response(services: &AppServices, user: UserId, result: DomainResult<()>) -> axum::response::Response {
    match result.and_then(|()| services.marketplace.view_basket(user)) {
        Ok(view) => (StatusCode::OK, Json(dto::basket_to_json(view))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn view_basket(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    basket_response(&services, principal.user_id(), Ok(()))
}

pub async fn add_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::AddBasketItemRequest>,
) -> axum::response::Response {
    let user = principal.user_id();
    let result = services
        .marketplace
        .add_item(user, body.stock_record_id, body.quantity)
        .map(|_| ());
    basket_response(&services, user, result)
}

pub async fn update_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(stock_record_id): Path<String>,
    Json(body): Json<dto::UpdateBasketItemRequest>,
) -> axum::response::Response {
    let stock_record: StockRecordId = match errors::parse_id(&stock_record_id, "stock record") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let user = principal.user_id();
    let result = services
        .marketplace
        .update_item(user, stock_record, body.quantity)
        .map(|_| ());
    basket_response(&services, user, result)
}

pub async fn remove_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(stock_record_id): Path<String>,
) -> axum::response::Response {
    let stock_record: StockRecordId = match errors::parse_id(&stock_record_id, "stock record") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let user = principal.user_id();
    let result = services.marketplace.remove_item(user, stock_record).map(|_| ());
    basket_response(&services, user, result)
}

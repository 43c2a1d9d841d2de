use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use procura_catalog::OfferFilter;
use procura_core::{CategoryId, ShopId};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/", get(list_products))
}

/// Purchasable listings, optionally narrowed by category and shop.
pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::OffersQuery>,
) -> axum::response::Response {
    let shop_id = match query.shop_id.as_deref().map(|raw| errors::parse_id::<ShopId>(raw, "shop")) {
        Some(Ok(id)) => Some(id),
        Some(Err(resp)) => return resp,
        None => None,
    };
    let filter = OfferFilter {
        category_id: query.category_id.map(CategoryId),
        shop_id,
    };

    match services.marketplace.list_offers(filter) {
        Ok(offers) => {
            let items = offers.into_iter().map(dto::offer_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

use serde::Deserialize;

use procura_auth::UserProfile;
use procura_catalog::{Offer, Shop};
use procura_core::{ContactId, StockRecordId};
use procura_infra::{BasketView, ImportSummary, OrderView};
use procura_orders::Contact;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct OffersQuery {
    pub category_id: Option<u64>,
    pub shop_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddBasketItemRequest {
    pub stock_record_id: StockRecordId,
    #[serde(default = "one")]
    pub quantity: u32,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UpdateBasketItemRequest {
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmOrderRequest {
    pub contact_id: ContactId,
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
    /// Optimistic guard: fail with 409 unless the order is still in this status.
    pub expected_status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ShopStateRequest {
    pub state: bool,
}

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub position: String,
}

// -------------------------
// JSON mapping
// -------------------------

pub fn offer_to_json(offer: Offer) -> serde_json::Value {
    let quantity = offer.record.quantity();
    serde_json::json!({
        "id": offer.record.id.to_string(),
        "external_id": offer.record.external_id,
        "model": offer.record.model,
        "product": {
            "id": offer.product.id.to_string(),
            "name": offer.product.name,
        },
        "category": {
            "id": offer.product.category.0,
            "name": offer.category_name,
        },
        "shop": {
            "id": offer.shop.id.to_string(),
            "name": offer.shop.name,
        },
        "price": offer.record.price.to_string(),
        "price_rrc": offer.record.price_rrc.to_string(),
        "quantity": quantity,
        "parameters": offer.record.parameters,
    })
}

pub fn basket_to_json(view: BasketView) -> serde_json::Value {
    serde_json::json!({
        "order_id": view.order_id.map(|id| id.to_string()),
        "lines": view.lines.into_iter().map(|l| serde_json::json!({
            "stock_record_id": l.stock_record.to_string(),
            "product_name": l.product_name,
            "shop_name": l.shop_name,
            "unit_price": l.unit_price.to_string(),
            "quantity": l.quantity,
            "available": l.available,
            "line_total": l.line_total.to_string(),
        })).collect::<Vec<_>>(),
        "total": view.total.to_string(),
    })
}

pub fn order_to_json(view: OrderView) -> serde_json::Value {
    let order = view.order;
    serde_json::json!({
        "id": order.id.to_string(),
        "status": order.status.as_str(),
        "contact_id": order.contact.map(|id| id.to_string()),
        "created_at": order.created_at.to_rfc3339(),
        "confirmed_at": order.confirmed_at.map(|at| at.to_rfc3339()),
        "total": view.total.to_string(),
        "items": order.items.into_iter().map(|l| {
            let line_total = l.total().map(|p| p.to_string());
            let snapshot = l.snapshot;
            serde_json::json!({
                "stock_record_id": l.stock_record.to_string(),
                "quantity": l.quantity,
                "product_name": snapshot.as_ref().map(|s| s.product_name.clone()),
                "shop_name": snapshot.as_ref().map(|s| s.shop_name.clone()),
                "unit_price": snapshot.as_ref().map(|s| s.unit_price.to_string()),
                "line_total": line_total,
            })
        }).collect::<Vec<_>>()
    })
}

pub fn contact_to_json(c: Contact) -> serde_json::Value {
    serde_json::json!({
        "id": c.id.to_string(),
        "address": c.address_line(),
        "city": c.city,
        "street": c.street,
        "house": c.house,
        "building": c.building,
        "apartment": c.apartment,
        "phone": c.phone,
    })
}

pub fn shop_to_json(shop: Shop) -> serde_json::Value {
    serde_json::json!({
        "id": shop.id.to_string(),
        "name": shop.name,
        "url": shop.url,
        "state": shop.is_active,
    })
}

pub fn import_summary_to_json(s: ImportSummary) -> serde_json::Value {
    serde_json::json!({
        "shop_id": s.shop_id.to_string(),
        "shop_name": s.shop_name,
        "created_shop": s.created_shop,
        "categories": s.categories,
        "goods": s.goods,
        "removed_records": s.removed_records,
        "dropped_basket_lines": s.dropped_basket_lines,
    })
}

pub fn profile_to_json(p: UserProfile) -> serde_json::Value {
    serde_json::json!({
        "user_id": p.user_id.to_string(),
        "email": p.email,
        "first_name": p.first_name,
        "last_name": p.last_name,
        "company": p.company,
        "position": p.position,
        "type": p.user_type.as_str(),
    })
}

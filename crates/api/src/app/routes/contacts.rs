use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};

use procura_core::ContactId;
use procura_orders::ContactDraft;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_contacts).post(add_contact))
        .route("/:id", put(update_contact).delete(delete_contact))
}

pub async fn list_contacts(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.marketplace.list_contacts(principal.user_id()) {
        Ok(contacts) => {
            let items = contacts.into_iter().map(dto::contact_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn add_contact(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<ContactDraft>,
) -> axum::response::Response {
    match services.marketplace.add_contact(principal.user_id(), body) {
        Ok(contact) => (StatusCode::CREATED, Json(dto::contact_to_json(contact))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_contact(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<ContactDraft>,
) -> axum::response::Response {
    let contact_id: ContactId = match errors::parse_id(&id, "contact") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services
        .marketplace
        .update_contact(principal.user_id(), contact_id, body)
    {
        Ok(contact) => (StatusCode::OK, Json(dto::contact_to_json(contact))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_contact(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let contact_id: ContactId = match errors::parse_id(&id, "contact") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.marketplace.delete_contact(principal.user_id(), contact_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

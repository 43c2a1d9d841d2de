use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use procura_auth::UserProfile;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new().route("/profile", get(get_profile).post(register_profile))
}

pub async fn get_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.marketplace.profile(principal.user_id()) {
        Ok(profile) => (StatusCode::OK, Json(dto::profile_to_json(profile))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// Store the caller's display profile; the first call sends a welcome mail.
pub async fn register_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::ProfileRequest>,
) -> axum::response::Response {
    let profile = UserProfile {
        user_id: principal.user_id(),
        email: body.email,
        first_name: body.first_name,
        last_name: body.last_name,
        company: body.company,
        position: body.position,
        user_type: principal.user_type(),
    };
    match services.marketplace.register_profile(profile) {
        Ok(profile) => (StatusCode::OK, Json(dto::profile_to_json(profile))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

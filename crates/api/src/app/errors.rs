use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::error;

use procura_core::{DomainError, ErrorKind};

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::InsufficientStock | ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::StorageFailure => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let kind = err.kind();
    if kind == ErrorKind::StorageFailure {
        error!(error = %err, "storage failure while serving request");
    }
    json_error(status_for(kind), kind.as_str(), err.to_string())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Parse a path segment, answering 400 with `invalid_id` on failure.
pub fn parse_id<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T, axum::response::Response> {
    raw.parse()
        .map_err(|_| json_error(StatusCode::BAD_REQUEST, "invalid_id", format!("invalid {what} id")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_status_codes() {
        let cases = [
            (DomainError::not_found("order"), StatusCode::NOT_FOUND),
            (DomainError::forbidden("nope"), StatusCode::FORBIDDEN),
            (DomainError::InvalidStatus("teleported".into()), StatusCode::BAD_REQUEST),
            (DomainError::insufficient_stock("A"), StatusCode::CONFLICT),
            (DomainError::conflict("stale"), StatusCode::CONFLICT),
            (DomainError::storage("poisoned"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(domain_error_to_response(err).status(), status);
        }
    }

    #[test]
    fn malformed_ids_are_bad_requests() {
        let res = parse_id::<procura_core::OrderId>("not-a-uuid", "order").unwrap_err();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}

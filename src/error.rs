use std::time::Duration;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::validate::FieldError;

// Errors a submission endpoint can surface to the client
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("validation error")]
    Validation(Vec<FieldError>),

    #[error("too many requests")]
    RateLimited { retry_after: Duration },

    /// CRM answered with a non-success status. The upstream body is logged,
    /// never relayed; `message` is the per-endpoint retry text.
    #[error("CRM rejected the request")]
    CrmRejected { message: &'static str },

    #[error("CRM unreachable: {detail}")]
    CrmUnreachable {
        message: &'static str,
        detail: String,
    },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "message": "Validation error",
                    "errors": errors,
                })),
            )
                .into_response(),

            ApiError::RateLimited { retry_after } => {
                // Round up so the client never retries a second too early
                let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    [("retry-after", secs.to_string())],
                    Json(json!({
                        "message": format!("Too many requests. Please try again in {secs} seconds.")
                    })),
                )
                    .into_response()
            }

            ApiError::CrmRejected { message }
            | ApiError::CrmUnreachable { message, .. } => (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "message": message })),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400() {
        let err = ApiError::Validation(vec![FieldError::new("email", "invalid email address")]);
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn rate_limited_maps_to_429_with_retry_after() {
        let err = ApiError::RateLimited {
            retry_after: Duration::from_millis(59_500),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()["retry-after"], "60");
    }

    #[tokio::test]
    async fn crm_failures_map_to_502_with_the_endpoint_message() {
        let rejected = ApiError::CrmRejected {
            message: "Failed to update application. Please try again later.",
        }
        .into_response();
        assert_eq!(rejected.status(), StatusCode::BAD_GATEWAY);
        let bytes = axum::body::to_bytes(rejected.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body["message"],
            "Failed to update application. Please try again later."
        );

        let unreachable = ApiError::CrmUnreachable {
            message: "Failed to submit application. Please try again later.",
            detail: "connect timeout".into(),
        };
        assert_eq!(unreachable.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}

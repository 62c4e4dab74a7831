use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

// Messages the presentation layer shows verbatim. Validation messages are
// localized; the generic failure message is not.
const MSG_REQUIREMENT_REQUIRED: &str = "Requirement is required";
const MSG_REQUIREMENT_TOO_SHORT: &str = "需求描述至少需要2个字";
const MSG_REQUIREMENT_TOO_LONG: &str = "需求描述最长100个字";
const MSG_GENERATE_FAILED: &str = "Failed to generate prompt";

// Everything that can go wrong before streaming starts. Once the stream has
// begun there is no error channel left; mid-stream failures truncate output.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("requirement is missing")]
    MissingRequirement,

    #[error("requirement is shorter than 2 characters")]
    RequirementTooShort,

    #[error("requirement is longer than 100 characters")]
    RequirementTooLong,

    #[error("cooldown active, retry in {remaining_seconds}s")]
    Throttled { remaining_seconds: u64 },

    #[error("failed to read prompt template: {0}")]
    Template(#[from] std::io::Error),

    #[error("upstream completion request failed: {0}")]
    Upstream(#[from] reqwest::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::MissingRequirement => (
                StatusCode::BAD_REQUEST,
                json!({ "error": MSG_REQUIREMENT_REQUIRED }),
            ),
            ApiError::RequirementTooShort => (
                StatusCode::BAD_REQUEST,
                json!({ "error": MSG_REQUIREMENT_TOO_SHORT }),
            ),
            ApiError::RequirementTooLong => (
                StatusCode::BAD_REQUEST,
                json!({ "error": MSG_REQUIREMENT_TOO_LONG }),
            ),
            ApiError::Throttled { remaining_seconds } => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({
                    "error": format!("请求过于频繁，请{remaining_seconds}秒后重试"),
                    "retry_after_seconds": remaining_seconds,
                }),
            ),
            ApiError::Template(err) => {
                error!(error = %err, "failed to read prompt template");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": MSG_GENERATE_FAILED }),
                )
            }
            ApiError::Upstream(err) => {
                error!(error = %err, "upstream completion request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": MSG_GENERATE_FAILED }),
                )
            }
        };

        let mut response = (status, Json(body)).into_response();
        if let ApiError::Throttled { remaining_seconds } = self {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(remaining_seconds));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn validation_errors_are_bad_requests() {
        assert_eq!(
            ApiError::MissingRequirement.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::RequirementTooShort.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::RequirementTooLong.into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn throttled_maps_to_429_with_retry_after() {
        let response = ApiError::Throttled {
            remaining_seconds: 3,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "3");
    }

    #[tokio::test]
    async fn missing_requirement_body_matches_contract() {
        let body = body_json(ApiError::MissingRequirement.into_response()).await;
        assert_eq!(body["error"], "Requirement is required");
    }

    #[tokio::test]
    async fn template_failures_hide_details_behind_generic_body() {
        let err = ApiError::Template(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Failed to generate prompt");
    }

    #[tokio::test]
    async fn throttled_body_reports_remaining_seconds() {
        let body = body_json(
            ApiError::Throttled {
                remaining_seconds: 5,
            }
            .into_response(),
        )
        .await;
        assert_eq!(body["retry_after_seconds"], 5);
        assert!(body["error"].as_str().unwrap().contains('5'));
    }
}

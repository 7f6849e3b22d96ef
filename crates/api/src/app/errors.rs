use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use agora_core::{DomainError, ServiceError, StoreError, ValidationErrors};

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Domain(e) => domain_error_to_response(e),
        ServiceError::Store(StoreError::Duplicate(detail)) => {
            tracing::warn!(detail = %detail, "duplicate record");
            json_error(StatusCode::CONFLICT, "conflict", "Record already exists.")
        }
        ServiceError::Store(e) => {
            tracing::error!(error = %e, "store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", "Storage is unavailable")
        }
        ServiceError::Internal(msg) => {
            tracing::error!(error = %msg, "internal failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "Something went wrong")
        }
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    service_error_to_response(err.into())
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(errors) => validation_error(&errors),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DomainError::Forbidden(msg) => json_error(StatusCode::FORBIDDEN, "forbidden", msg),
        DomainError::Unauthorized => json_error(StatusCode::UNAUTHORIZED, "unauthorized", "Unauthorized"),
    }
}

pub fn validation_error(errors: &ValidationErrors) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        axum::Json(json!({
            "success": false,
            "error": "validation_error",
            "message": "Validation failed",
            "errors": errors,
        })),
    )
        .into_response()
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "success": false,
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// `axum::Json` whose rejections use the error envelope.
///
/// Well-formed JSON of the wrong shape is a `validation_error`; anything that is
/// not JSON at all is `invalid_body`.
pub struct ApiJson<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(json_rejection_to_response(rejection)),
        }
    }
}

fn json_rejection_to_response(rejection: JsonRejection) -> Response {
    tracing::debug!(error = %rejection.body_text(), "request body rejected");
    match rejection {
        JsonRejection::JsonDataError(e) => json_error(StatusCode::BAD_REQUEST, "validation_error", e.body_text()),
        JsonRejection::JsonSyntaxError(e) => json_error(StatusCode::BAD_REQUEST, "invalid_body", e.body_text()),
        other => json_error(other.status(), "invalid_body", other.body_text()),
    }
}

/// Parse a path/body identifier, mapping failures to a 400 response.
pub fn parse_id<T>(raw: &str) -> Result<T, axum::response::Response>
where
    T: std::str::FromStr<Err = DomainError>,
{
    raw.parse::<T>().map_err(domain_error_to_response)
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::header::CONTENT_TYPE;
    use serde::Deserialize;
    use serde_json::Value;

    async fn body_json(res: Response) -> Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[derive(Debug, Deserialize)]
    struct StatusBody {
        status: String,
    }

    async fn extract(body: &'static str, content_type: &str) -> Result<ApiJson<StatusBody>, Response> {
        let req = Request::builder()
            .method("PUT")
            .uri("/")
            .header(CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap();
        ApiJson::<StatusBody>::from_request(req, &()).await
    }

    #[tokio::test]
    async fn duplicate_store_errors_are_conflicts_without_store_detail() {
        let res = service_error_to_response(StoreError::duplicate("agents_email_key").into());
        assert_eq!(res.status(), StatusCode::CONFLICT);
        let body = body_json(res).await;
        assert_eq!(body["message"], "Record already exists.");
        assert!(!body.to_string().contains("agents_email_key"));
    }

    #[tokio::test]
    async fn well_formed_bodies_pass_through() {
        let Ok(ApiJson(body)) = extract(r#"{"status":"ACCEPTED"}"#, "application/json").await else {
            panic!("expected body to parse");
        };
        assert_eq!(body.status, "ACCEPTED");
    }

    #[tokio::test]
    async fn wrong_shaped_body_is_a_validation_envelope() {
        let Err(res) = extract(r#"{"status": 1}"#, "application/json").await else {
            panic!("expected rejection");
        };
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = body_json(res).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "validation_error");
        assert!(body["message"].as_str().unwrap().contains("status"));
    }

    #[tokio::test]
    async fn non_json_bodies_use_the_envelope() {
        let Err(res) = extract("{not json", "application/json").await else {
            panic!("expected rejection");
        };
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(res).await["error"], "invalid_body");

        let Err(res) = extract(r#"{"status":"ACCEPTED"}"#, "text/plain").await else {
            panic!("expected rejection");
        };
        assert_eq!(res.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body_json(res).await["success"], false);
    }

    #[test]
    fn domain_errors_map_to_expected_statuses() {
        let cases = [
            (DomainError::invalid_field("status", "bad"), StatusCode::BAD_REQUEST),
            (DomainError::invalid_id("nope"), StatusCode::BAD_REQUEST),
            (DomainError::not_found("x"), StatusCode::NOT_FOUND),
            (DomainError::conflict("x"), StatusCode::CONFLICT),
            (DomainError::forbidden("x"), StatusCode::FORBIDDEN),
            (DomainError::Unauthorized, StatusCode::UNAUTHORIZED),
        ];
        for (err, status) in cases {
            assert_eq!(domain_error_to_response(err).status(), status);
        }
    }

    #[test]
    fn unavailable_store_is_server_error() {
        let res = service_error_to_response(StoreError::unavailable("down").into());
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

//! Response writing
//!
//! Exactly one body is written per request. If the envelope cannot be
//! serialized, or the handler panicked, the client gets a fixed internal
//! error envelope instead.

use crate::core::error::ERR_INTERNAL;
use crate::core::reshaper::Reshaped;
use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::any::Any;

/// Message of the fixed internal error envelope
pub const WRITE_FAILURE_MESSAGE: &str = "unexpected error: unmarshal or write response error";

impl IntoResponse for Reshaped {
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self.envelope) {
            Ok(body) => (
                self.status,
                [(header::CONTENT_TYPE, "application/json")],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize response envelope");
                internal_error_response()
            }
        }
    }
}

/// The fixed internal error envelope
pub fn internal_error_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "code": ERR_INTERNAL,
            "message": WRITE_FAILURE_MESSAGE,
        })),
    )
        .into_response()
}

/// Panic handler for `CatchPanicLayer`
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    tracing::error!(panic = %detail, "request handler panicked");
    internal_error_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reshaper::Envelope;
    use crate::core::response::RestEnvelope;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_reshaped_keeps_status_and_body() {
        let reshaped = Reshaped {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            envelope: Envelope::Rest(RestEnvelope {
                code: 422,
                codestr: None,
                message: Some("bad".into()),
                data: Value::Null,
                total: None,
            }),
        };
        let response = reshaped.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        assert_eq!(
            body_json(response).await,
            json!({"code": 422, "message": "bad", "data": null})
        );
    }

    #[tokio::test]
    async fn test_panic_becomes_fixed_envelope() {
        let response = handle_panic(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({"code": 500, "message": WRITE_FAILURE_MESSAGE})
        );
    }
}

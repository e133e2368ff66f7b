//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Domain errors keep their machine-readable kind and bilingual message
//! all the way to the response body; they are never flattened into a
//! generic success or an opaque 500.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use yeto_core::text::LocalizedText;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// A domain validation or lifecycle error, surfaced as a structured
  /// response with its kind and bilingual message.
  #[error("{}", .message.en)]
  Domain {
    kind:    &'static str,
    message: LocalizedText,
  },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<yeto_core::Error> for ApiError {
  fn from(e: yeto_core::Error) -> Self {
    Self::Domain { kind: e.kind(), message: e.message() }
  }
}

impl ApiError {
  /// Wrap a store-layer failure. Domain errors found anywhere in the
  /// source chain come back as structured [`ApiError::Domain`] responses
  /// instead of opaque 500s.
  pub fn from_store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    if let Some(domain) = find_domain(&err) {
      return Self::Domain { kind: domain.kind(), message: domain.message() };
    }
    Self::Store(Box::new(err))
  }
}

/// Walk an error's source chain looking for a [`yeto_core::Error`].
fn find_domain<'a>(
  err: &'a (dyn std::error::Error + 'static),
) -> Option<&'a yeto_core::Error> {
  let mut current: Option<&(dyn std::error::Error + 'static)> = Some(err);
  while let Some(e) = current {
    if let Some(domain) = e.downcast_ref::<yeto_core::Error>() {
      return Some(domain);
    }
    current = e.source();
  }
  None
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, kind, message, message_ar) = match self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m, None),
      ApiError::BadRequest(m) => {
        (StatusCode::BAD_REQUEST, "bad_request", m, None)
      }
      ApiError::Domain { kind, message } => {
        let status = match kind {
          "not_found" => StatusCode::NOT_FOUND,
          "internal" => StatusCode::INTERNAL_SERVER_ERROR,
          // insufficient_evidence, unknown_source, invalid_transition
          _ => StatusCode::UNPROCESSABLE_ENTITY,
        };
        (status, kind, message.en, Some(message.ar))
      }
      ApiError::Store(e) => {
        (StatusCode::INTERNAL_SERVER_ERROR, "internal", e.to_string(), None)
      }
    };

    (
      status,
      Json(json!({
        "error": { "kind": kind, "message": message, "message_ar": message_ar }
      })),
    )
      .into_response()
  }
}

//! Response encoding.
//!
//! # Responsibilities
//! - Map pipeline errors to HTTP status codes
//! - Render error bodies as `{"error": ..., "stage": ...}`
//!
//! # Design Decisions
//! - Caller mistakes (bad JSON, invalid transfers) are 400
//! - Everything else, including node rejections and timeouts, is 500
//! - Node acknowledgements are returned verbatim, never wrapped

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::blockchain::types::{PipelineError, Stage};

/// JSON error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub stage: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, stage: Stage) -> Self {
        Self {
            error: error.into(),
            stage: stage.as_str().to_string(),
        }
    }
}

pub fn status_for(err: &PipelineError) -> StatusCode {
    match err {
        PipelineError::InvalidTransfer(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        let body = ErrorBody::new(self.to_string(), self.stage());
        (status, Json(body)).into_response()
    }
}

/// Response for a body that is not a JSON transfer list.
pub fn decode_failure(rejection: JsonRejection) -> Response {
    let body = ErrorBody::new(
        format!("Invalid request body: {}", rejection.body_text()),
        Stage::Batch,
    );
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

//! Service error types and their HTTP mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use formula_calc::EvalError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CalcSrvError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("API error: {0}")]
    Api(String),

    /// The request body could not be deserialized; the evaluator is
    /// never invoked for these
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error(transparent)]
    Evaluation(#[from] EvalError),
}

impl CalcSrvError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, CalcSrvError>;

impl IntoResponse for CalcSrvError {
    fn into_response(self) -> Response {
        let status = match &self {
            CalcSrvError::MalformedRequest(_) | CalcSrvError::Evaluation(_) => {
                StatusCode::BAD_REQUEST
            }
            CalcSrvError::Config(_) | CalcSrvError::Api(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

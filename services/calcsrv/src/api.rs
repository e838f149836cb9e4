//! HTTP API for formula evaluation

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use formula_calc::{FormulaEngine, Number, VariableEnv};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{CalcSrvError, Result};
use crate::{SERVICE_NAME, SERVICE_VERSION};

/// Shared state for request handlers
///
/// The engine is reentrant, so one instance serves all requests; each
/// request builds its own variable environment.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<FormulaEngine>,
}

/// Evaluation request body
#[derive(Debug, Deserialize)]
pub struct CalculateRequest {
    pub formula: String,
    /// Variable bindings; a sorted map keeps validation order stable
    #[serde(default)]
    pub variables: BTreeMap<String, Value>,
}

/// Successful evaluation response
#[derive(Debug, Serialize)]
pub struct CalculateResponse {
    pub result: Number,
}

pub struct ApiServer {
    engine: Arc<FormulaEngine>,
    config: Config,
}

impl ApiServer {
    pub fn new(engine: Arc<FormulaEngine>, config: Config) -> Self {
        Self { engine, config }
    }

    /// Build the router; exposed so tests can drive it without a listener
    pub fn router(&self) -> Router {
        let state = AppState {
            engine: self.engine.clone(),
        };

        Router::new()
            .route("/health", get(health_check))
            .route("/calculate", post(calculate))
            // Browser clients may call from any origin
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    pub async fn start(self) -> Result<()> {
        let addr = self.config.bind_addr();
        let app = self.router();

        info!("Starting API server on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| CalcSrvError::api(format!("failed to bind to {}: {}", addr, e)))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| CalcSrvError::api(format!("server error: {}", e)))?;

        Ok(())
    }
}

/// Health check
async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": SERVICE_NAME,
        "version": SERVICE_VERSION,
    }))
}

/// Evaluate a formula against the supplied variable bindings
///
/// A request that fails to deserialize is answered without ever
/// reaching the evaluator.
async fn calculate(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CalculateRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => {
            return CalcSrvError::MalformedRequest(rejection.body_text()).into_response();
        }
    };

    debug!(
        formula = %request.formula,
        variables = request.variables.len(),
        "calculate request"
    );

    match evaluate_request(&state.engine, &request) {
        Ok(result) => Json(CalculateResponse { result }).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Bind variables into a fresh environment and run the evaluator
fn evaluate_request(engine: &FormulaEngine, request: &CalculateRequest) -> Result<Number> {
    let env = VariableEnv::from_json(&request.variables)?;
    Ok(engine.evaluate(&request.formula, &env)?)
}

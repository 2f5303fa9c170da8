/// Health check endpoint
use axum::{Json, extract::State};
use leadflow_core::pipeline::LeadContext;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    /// "configured" when outbound mail can be attempted, otherwise
    /// "unconfigured" (the service still accepts traffic in that state)
    pub mail: String,
}

pub async fn handler(State(ctx): State<Arc<LeadContext>>) -> Json<HealthResponse> {
    let mail = if ctx.is_configured() {
        "configured"
    } else {
        "unconfigured"
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        version: leadflow_core::VERSION.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        checks: HealthChecks {
            mail: mail.to_string(),
        },
    })
}

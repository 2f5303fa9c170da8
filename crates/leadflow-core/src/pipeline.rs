/// Hosting-agnostic request pipeline
///
/// Both hosting shells (the long-running server and the one-shot Lambda)
/// feed raw method + body into `respond` and map the returned descriptor
/// onto their HTTP response type verbatim. Shells add
/// `Content-Type: application/json` for JSON bodies and
/// `X-Content-Type-Options: nosniff` on every response.
use futures::FutureExt;
use http::{Method, StatusCode};
use serde_json::{Value, json};
use std::panic::AssertUnwindSafe;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::mailer::{DeliveryEngine, DeliveryOptions, DeliveryOutcome};
use crate::models::MailConfig;
use crate::validator::{ValidationResult, validate};

/// Shared per-process state: the engine (configuration snapshot plus
/// transport) and the retry tuning
pub struct LeadContext {
    engine: DeliveryEngine,
    options: DeliveryOptions,
}

impl LeadContext {
    pub fn new(config: MailConfig) -> Self {
        Self {
            engine: DeliveryEngine::new(config),
            options: DeliveryOptions::default(),
        }
    }

    pub fn with_engine(engine: DeliveryEngine, options: DeliveryOptions) -> Self {
        Self { engine, options }
    }

    pub fn is_configured(&self) -> bool {
        self.engine.config().is_usable()
    }
}

/// HTTP response descriptor: status plus optional JSON body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadResponse {
    pub status: StatusCode,
    pub body: Option<Value>,
}

impl LeadResponse {
    fn json(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    fn empty(status: StatusCode) -> Self {
        Self { status, body: None }
    }
}

/// Runs the full validate-then-deliver pipeline for one request.
///
/// Infallible by contract: every outcome, including a panic anywhere in the
/// pipeline, is folded into a response descriptor.
pub async fn respond(ctx: &LeadContext, method: &Method, body: &[u8]) -> LeadResponse {
    if method != Method::POST {
        return LeadResponse::json(
            StatusCode::METHOD_NOT_ALLOWED,
            json!({ "ok": false, "error": "METHOD_NOT_ALLOWED" }),
        );
    }

    // Generated before validation so even early rejections are correlatable
    let request_id = Uuid::new_v4().to_string();

    match AssertUnwindSafe(run(ctx, body, &request_id))
        .catch_unwind()
        .await
    {
        Ok(response) => response,
        Err(_) => {
            error!(request_id = %request_id, "lead pipeline panicked");
            LeadResponse::json(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "ok": false, "error": "INTERNAL_ERROR", "requestId": request_id }),
            )
        }
    }
}

async fn run(ctx: &LeadContext, body: &[u8], request_id: &str) -> LeadResponse {
    let raw: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(_) => {
            info!(request_id = %request_id, "request body is not parseable JSON");
            return LeadResponse::json(
                StatusCode::BAD_REQUEST,
                json!({ "ok": false, "error": "INVALID_JSON", "requestId": request_id }),
            );
        }
    };

    match validate(&raw) {
        ValidationResult::Invalid { issues } => {
            info!(
                request_id = %request_id,
                issue_count = issues.len(),
                "rejected invalid lead payload"
            );
            LeadResponse::json(
                StatusCode::BAD_REQUEST,
                json!({ "ok": false, "error": "INVALID_REQUEST", "requestId": request_id }),
            )
        }
        ValidationResult::Spam => {
            // Deliberately success-shaped so automated senders learn nothing
            info!(request_id = %request_id, "honeypot tripped, dropping submission");
            LeadResponse::empty(StatusCode::NO_CONTENT)
        }
        ValidationResult::Valid(fields) => {
            let lead = fields.with_request_id(request_id);
            match ctx.engine.deliver(&lead, &ctx.options).await {
                DeliveryOutcome::NotConfigured => {
                    warn!(request_id = %request_id, "lead dropped, mail delivery not configured");
                    LeadResponse::json(
                        StatusCode::SERVICE_UNAVAILABLE,
                        json!({ "ok": false, "error": "SERVICE_NOT_CONFIGURED", "requestId": request_id }),
                    )
                }
                DeliveryOutcome::Delivered { attempts } => {
                    info!(request_id = %request_id, attempts = attempts, "lead accepted");
                    LeadResponse::json(StatusCode::OK, json!({ "ok": true, "requestId": request_id }))
                }
                DeliveryOutcome::SendFailed {
                    attempts,
                    retriable,
                } => {
                    error!(
                        request_id = %request_id,
                        attempts = attempts,
                        retriable = retriable,
                        "lead delivery failed"
                    );
                    LeadResponse::json(
                        StatusCode::BAD_GATEWAY,
                        json!({
                            "ok": false,
                            "error": "SEND_FAILED",
                            "requestId": request_id,
                            "retriable": retriable,
                        }),
                    )
                }
            }
        }
    }
}

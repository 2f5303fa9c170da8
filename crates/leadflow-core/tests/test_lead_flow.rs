/// End-to-end pipeline tests: raw body in, response descriptor out, with a
/// capturing transport standing in for SMTP
use async_trait::async_trait;
use http::{Method, StatusCode};
use leadflow_core::error::{TransportError, TransportErrorKind};
use leadflow_core::mailer::{DeliveryEngine, DeliveryOptions, OutgoingMessage};
use leadflow_core::models::MailConfig;
use leadflow_core::pipeline::{LeadContext, respond};
use leadflow_core::MailTransport;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

struct CapturingTransport {
    sent: Arc<Mutex<Vec<OutgoingMessage>>>,
    fail_kind: Option<TransportErrorKind>,
}

impl CapturingTransport {
    fn working() -> Arc<Self> {
        Arc::new(Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            fail_kind: None,
        })
    }

    fn broken(kind: TransportErrorKind) -> Arc<Self> {
        Arc::new(Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            fail_kind: Some(kind),
        })
    }

    async fn sent(&self) -> Vec<OutgoingMessage> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl MailTransport for CapturingTransport {
    async fn send(&self, message: &OutgoingMessage) -> Result<(), TransportError> {
        self.sent.lock().await.push(message.clone());
        match self.fail_kind {
            Some(kind) => Err(TransportError::new(kind, "induced failure")),
            None => Ok(()),
        }
    }
}

fn usable_config() -> MailConfig {
    MailConfig::from_lookup(|key| {
        let value = match key {
            "SMTP_HOST" => "mail.example.com",
            "SMTP_PORT" => "587",
            "SMTP_SECURE" => "false",
            "SMTP_USER" => "mailer",
            "SMTP_PASS" => "secret",
            "MAIL_TO" => "vertrieb@example.com",
            "MAIL_FROM" => "noreply@example.com",
            _ => return None,
        };
        Some(value.to_string())
    })
}

fn context(config: MailConfig, transport: Arc<CapturingTransport>) -> LeadContext {
    let engine = DeliveryEngine::with_transport(config, transport);
    let options = DeliveryOptions {
        max_attempts: 2,
        initial_backoff: Duration::from_millis(10),
    };
    LeadContext::with_engine(engine, options)
}

fn valid_body() -> Vec<u8> {
    serde_json::json!({
        "email": "arzt@example.com",
        "organisation": "Praxis Dr. Beispiel",
        "consent": true,
    })
    .to_string()
    .into_bytes()
}

#[tokio::test]
async fn test_valid_lead_is_delivered() {
    let transport = CapturingTransport::working();
    let ctx = context(usable_config(), transport.clone());

    let response = respond(&ctx, &Method::POST, &valid_body()).await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.body.unwrap();
    assert_eq!(body["ok"], true);
    let request_id = body["requestId"].as_str().unwrap();
    assert!(Uuid::parse_str(request_id).is_ok());

    // Exactly one send, carrying the correlation id in the message text
    let sent = transport.sent().await;
    assert_eq!(sent.len(), 1);
    assert!(
        sent[0]
            .text
            .contains(&format!("Request-ID: {}", request_id))
    );
    assert_eq!(sent[0].to, "vertrieb@example.com");
    assert_eq!(sent[0].from, "noreply@example.com");
}

#[tokio::test]
async fn test_spam_submission_gets_silent_204() {
    let transport = CapturingTransport::working();
    let ctx = context(usable_config(), transport.clone());

    let body = serde_json::json!({
        "email": "arzt@example.com",
        "organisation": "Praxis Dr. Beispiel",
        "consent": true,
        "hp": "filled",
    })
    .to_string();

    let response = respond(&ctx, &Method::POST, body.as_bytes()).await;

    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert!(response.body.is_none());
    assert!(transport.sent().await.is_empty());
}

#[tokio::test]
async fn test_empty_payload_is_invalid() {
    let transport = CapturingTransport::working();
    let ctx = context(usable_config(), transport.clone());

    let response = respond(&ctx, &Method::POST, b"{}").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let body = response.body.unwrap();
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"], "INVALID_REQUEST");
    assert!(Uuid::parse_str(body["requestId"].as_str().unwrap()).is_ok());
    assert!(transport.sent().await.is_empty());
}

#[tokio::test]
async fn test_unknown_field_is_invalid() {
    let transport = CapturingTransport::working();
    let ctx = context(usable_config(), transport.clone());

    let body = serde_json::json!({
        "email": "arzt@example.com",
        "organisation": "Praxis Dr. Beispiel",
        "consent": true,
        "unexpected": "field",
    })
    .to_string();

    let response = respond(&ctx, &Method::POST, body.as_bytes()).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body.unwrap()["error"], "INVALID_REQUEST");
}

#[tokio::test]
async fn test_unconfigured_service_returns_503() {
    let transport = CapturingTransport::working();
    let ctx = context(MailConfig::default(), transport.clone());

    let response = respond(&ctx, &Method::POST, &valid_body()).await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    let body = response.body.unwrap();
    assert_eq!(body["error"], "SERVICE_NOT_CONFIGURED");
    assert!(body["requestId"].is_string());
    assert!(transport.sent().await.is_empty());
}

#[tokio::test]
async fn test_exhausted_retries_surface_send_failed() {
    let transport = CapturingTransport::broken(TransportErrorKind::ConnectionTimedOut);
    let ctx = context(usable_config(), transport.clone());

    let response = respond(&ctx, &Method::POST, &valid_body()).await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    let body = response.body.unwrap();
    assert_eq!(body["error"], "SEND_FAILED");
    assert_eq!(body["retriable"], true);
    // max_attempts = 2 in the test context
    assert_eq!(transport.sent().await.len(), 2);
}

#[tokio::test]
async fn test_terminal_error_reports_not_retriable() {
    let transport = CapturingTransport::broken(TransportErrorKind::Auth);
    let ctx = context(usable_config(), transport.clone());

    let response = respond(&ctx, &Method::POST, &valid_body()).await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    let body = response.body.unwrap();
    assert_eq!(body["error"], "SEND_FAILED");
    assert_eq!(body["retriable"], false);
    assert_eq!(transport.sent().await.len(), 2);
}

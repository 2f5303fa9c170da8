/// Mail delivery: transport abstraction, message composition, retry engine
pub mod engine;
pub mod message;

pub use engine::{DeliveryEngine, DeliveryOptions, DeliveryOutcome};
pub use message::{OutgoingMessage, compose};

use async_trait::async_trait;
use lettre::message::header;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;

use crate::constants::SMTP_TIMEOUT_SECONDS;
use crate::error::{TransportError, TransportErrorKind};
use crate::models::UsableMail;

/// Seam between the delivery engine and the wire.
///
/// Exactly one send call per delivery attempt; implementations classify
/// their failures into the transport taxonomy.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: &OutgoingMessage) -> Result<(), TransportError>;
}

/// SMTP transport backed by lettre.
///
/// Constructed once per process from a usable configuration and passed into
/// the engine explicitly; there is no lazily-created module-level transport.
pub struct SmtpMailTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailTransport {
    pub fn new(mail: &UsableMail<'_>) -> Result<Self, TransportError> {
        // secure = implicit TLS (SMTPS); otherwise STARTTLS on the
        // submission port
        let builder = if mail.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(mail.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(mail.host)
        }
        .map_err(TransportError::from_smtp)?;

        let transport = builder
            .port(mail.port)
            .credentials(Credentials::new(mail.user.to_string(), mail.pass.to_string()))
            .timeout(Some(Duration::from_secs(SMTP_TIMEOUT_SECONDS)))
            .build();

        Ok(Self { transport })
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send(&self, message: &OutgoingMessage) -> Result<(), TransportError> {
        let email = Message::builder()
            .from(message.from.parse().map_err(|_| {
                TransportError::new(TransportErrorKind::BadAddress, "invalid sender address")
            })?)
            .to(message.to.parse().map_err(|_| {
                TransportError::new(TransportErrorKind::BadAddress, "invalid recipient address")
            })?)
            .subject(message.subject.as_str())
            .header(header::ContentType::TEXT_PLAIN)
            .body(message.text.clone())
            .map_err(|e| {
                TransportError::new(
                    TransportErrorKind::Other,
                    format!("failed to build message: {}", e),
                )
            })?;

        self.transport
            .send(email)
            .await
            .map(|_| ())
            .map_err(TransportError::from_smtp)
    }
}

/// Delivery engine with bounded, linearly backed-off retries
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::{MailTransport, SmtpMailTransport, compose};
use crate::constants::{DEFAULT_BACKOFF_MS, DEFAULT_MAX_ATTEMPTS};
use crate::models::{Lead, MailConfig};
use crate::utils::logging::redact_email;

/// Per-call retry tuning
#[derive(Debug, Clone)]
pub struct DeliveryOptions {
    pub max_attempts: u32,
    /// Base delay; the wait after attempt n is `n * initial_backoff`
    pub initial_backoff: Duration,
}

impl Default for DeliveryOptions {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_backoff: Duration::from_millis(DEFAULT_BACKOFF_MS),
        }
    }
}

/// Outcome of one delivery call. Missing configuration is a recognized
/// degraded state, not a fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    NotConfigured,
    Delivered { attempts: u32 },
    SendFailed { attempts: u32, retriable: bool },
}

/// Owns the configuration snapshot and the process-wide transport.
///
/// Stateless between calls: each `deliver` runs its own independent attempt
/// sequence.
pub struct DeliveryEngine {
    config: MailConfig,
    transport: Option<Arc<dyn MailTransport>>,
}

impl DeliveryEngine {
    /// Builds the engine with an SMTP transport when the configuration
    /// permits. Unconfigured processes still get an engine; it reports
    /// `NotConfigured` instead of failing startup.
    pub fn new(config: MailConfig) -> Self {
        let transport = match config.usable() {
            Some(mail) => match SmtpMailTransport::new(&mail) {
                Ok(transport) => {
                    info!(
                        host = %mail.host,
                        port = mail.port,
                        to = %redact_email(mail.to),
                        "SMTP transport ready"
                    );
                    Some(Arc::new(transport) as Arc<dyn MailTransport>)
                }
                Err(err) => {
                    warn!(
                        kind = %err.kind(),
                        "failed to initialize SMTP transport, mail delivery disabled"
                    );
                    None
                }
            },
            None => {
                info!("mail delivery not configured, running in demo mode");
                None
            }
        };

        Self { config, transport }
    }

    /// Builds the engine around an injected transport
    pub fn with_transport(config: MailConfig, transport: Arc<dyn MailTransport>) -> Self {
        Self {
            config,
            transport: Some(transport),
        }
    }

    pub fn config(&self) -> &MailConfig {
        &self.config
    }

    /// Attempts delivery of one lead.
    ///
    /// Never returns an error: every failure mode is folded into the
    /// outcome. Terminal errors currently still consume the full attempt
    /// budget before `SendFailed` is reported.
    pub async fn deliver(&self, lead: &Lead, options: &DeliveryOptions) -> DeliveryOutcome {
        // Readiness is re-checked on every call so that missing
        // configuration stays a normal outcome no matter how the engine was
        // constructed
        let Some(mail) = self.config.usable() else {
            return DeliveryOutcome::NotConfigured;
        };
        let Some(transport) = &self.transport else {
            return DeliveryOutcome::NotConfigured;
        };

        let message = compose(&mail, lead);
        let max_attempts = options.max_attempts.max(1);

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match transport.send(&message).await {
                Ok(()) => {
                    info!(
                        request_id = %lead.request_id,
                        attempts = attempt,
                        "lead delivered"
                    );
                    return DeliveryOutcome::Delivered { attempts: attempt };
                }
                Err(err) => {
                    warn!(
                        request_id = %lead.request_id,
                        attempt = attempt,
                        max_attempts = max_attempts,
                        kind = %err.kind(),
                        retriable = err.is_retriable(),
                        "delivery attempt failed"
                    );

                    if attempt >= max_attempts {
                        return DeliveryOutcome::SendFailed {
                            attempts: attempt,
                            retriable: err.is_retriable(),
                        };
                    }

                    tokio::time::sleep(options.initial_backoff * attempt).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{TransportError, TransportErrorKind};
    use crate::mailer::OutgoingMessage;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct MockTransport {
        calls: AtomicU32,
        fail_kind: Option<TransportErrorKind>,
        succeed_after: u32,
    }

    impl MockTransport {
        fn succeeding() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
                fail_kind: None,
                succeed_after: 0,
            })
        }

        fn failing(kind: TransportErrorKind) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
                fail_kind: Some(kind),
                succeed_after: u32::MAX,
            })
        }

        fn flaky(kind: TransportErrorKind, succeed_after: u32) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
                fail_kind: Some(kind),
                succeed_after,
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MailTransport for MockTransport {
        async fn send(&self, _message: &OutgoingMessage) -> Result<(), TransportError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            match self.fail_kind {
                Some(kind) if call < self.succeed_after => {
                    Err(TransportError::new(kind, "mock failure"))
                }
                _ => Ok(()),
            }
        }
    }

    fn usable_config() -> MailConfig {
        MailConfig {
            smtp_host: Some("mail.example.com".to_string()),
            smtp_port: Some(587),
            smtp_secure: Some(false),
            smtp_user: Some("mailer".to_string()),
            smtp_pass: Some("secret".to_string()),
            mail_to: Some("vertrieb@example.com".to_string()),
            mail_from: Some("noreply@example.com".to_string()),
            subject_prefix: "[Leadflow Anfrage]".to_string(),
        }
    }

    fn lead() -> Lead {
        Lead {
            email: "arzt@example.com".to_string(),
            organisation: "Praxis Dr. Beispiel".to_string(),
            phone: String::new(),
            message: String::new(),
            product_id: String::new(),
            request_id: "req-1".to_string(),
        }
    }

    fn fast_options(max_attempts: u32) -> DeliveryOptions {
        DeliveryOptions {
            max_attempts,
            initial_backoff: Duration::from_millis(10),
        }
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let transport = MockTransport::succeeding();
        let engine = DeliveryEngine::with_transport(usable_config(), transport.clone());

        let outcome = engine.deliver(&lead(), &fast_options(3)).await;

        assert_eq!(outcome, DeliveryOutcome::Delivered { attempts: 1 });
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_retriable_failure_exhausts_budget() {
        let transport = MockTransport::failing(TransportErrorKind::ConnectionRefused);
        let engine = DeliveryEngine::with_transport(usable_config(), transport.clone());

        let outcome = engine.deliver(&lead(), &fast_options(2)).await;

        assert_eq!(
            outcome,
            DeliveryOutcome::SendFailed {
                attempts: 2,
                retriable: true
            }
        );
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_terminal_failure_still_consumes_budget() {
        // Non-retriable errors do not fail fast
        let transport = MockTransport::failing(TransportErrorKind::Auth);
        let engine = DeliveryEngine::with_transport(usable_config(), transport.clone());

        let outcome = engine.deliver(&lead(), &fast_options(3)).await;

        assert_eq!(
            outcome,
            DeliveryOutcome::SendFailed {
                attempts: 3,
                retriable: false
            }
        );
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn test_success_after_transient_failures() {
        let transport = MockTransport::flaky(TransportErrorKind::ConnectionTimedOut, 2);
        let engine = DeliveryEngine::with_transport(usable_config(), transport.clone());

        let outcome = engine.deliver(&lead(), &fast_options(3)).await;

        assert_eq!(outcome, DeliveryOutcome::Delivered { attempts: 3 });
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn test_unusable_config_short_circuits() {
        // Even with a working transport injected, an unusable configuration
        // must yield NotConfigured without touching the network
        let transport = MockTransport::succeeding();
        let engine = DeliveryEngine::with_transport(MailConfig::default(), transport.clone());

        let outcome = engine.deliver(&lead(), &fast_options(3)).await;

        assert_eq!(outcome, DeliveryOutcome::NotConfigured);
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_zero_max_attempts_still_tries_once() {
        let transport = MockTransport::succeeding();
        let engine = DeliveryEngine::with_transport(usable_config(), transport.clone());

        let outcome = engine.deliver(&lead(), &fast_options(0)).await;

        assert_eq!(outcome, DeliveryOutcome::Delivered { attempts: 1 });
        assert_eq!(transport.calls(), 1);
    }
}

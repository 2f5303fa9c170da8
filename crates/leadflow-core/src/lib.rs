/// Leadflow Core - hosting-agnostic lead-submission pipeline
///
/// This crate contains the whole pipeline shared by the server and Lambda
/// shells: payload validation with honeypot spam rejection, the environment
/// configuration gate, and SMTP delivery with bounded retries.
pub mod constants;
pub mod error;
pub mod mailer;
pub mod models;
pub mod pipeline;
pub mod utils;
pub mod validator;

// Re-export commonly used types
pub use error::{TransportError, TransportErrorKind};
pub use mailer::{DeliveryEngine, DeliveryOptions, DeliveryOutcome, MailTransport};
pub use models::{Lead, LeadFields, MailConfig};
pub use pipeline::{LeadContext, LeadResponse, respond};
pub use validator::{ValidationResult, validate};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

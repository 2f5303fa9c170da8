/// Application constants
///
/// This module contains all hardcoded values used throughout the pipeline.
/// Constants are organized by category for easy maintenance.
// ============================================================================
// Lead Field Limits
// ============================================================================
/// Maximum email address length (RFC 5321 mailbox limit)
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Minimum organisation name length
pub const MIN_ORGANISATION_LENGTH: usize = 2;

/// Maximum organisation name length
pub const MAX_ORGANISATION_LENGTH: usize = 200;

/// Maximum phone number length
pub const MAX_PHONE_LENGTH: usize = 50;

/// Maximum free-text message length
pub const MAX_MESSAGE_LENGTH: usize = 2000;

/// Maximum product identifier length
pub const MAX_PRODUCT_ID_LENGTH: usize = 80;

/// Maximum honeypot field length
pub const MAX_HONEYPOT_LENGTH: usize = 200;

// ============================================================================
// Mail Configuration
// ============================================================================

/// Default subject prefix when MAIL_SUBJECT_PREFIX is not set
pub const DEFAULT_SUBJECT_PREFIX: &str = "[Leadflow Anfrage]";

/// Maximum subject prefix length
pub const MAX_SUBJECT_PREFIX_LENGTH: usize = 80;

// ============================================================================
// Retry Configuration
// ============================================================================

/// Default number of delivery attempts before giving up
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default base delay between attempts in milliseconds; the wait after
/// attempt n is `n * DEFAULT_BACKOFF_MS` (linear backoff)
pub const DEFAULT_BACKOFF_MS: u64 = 1000;

/// SMTP connection timeout in seconds, so a single attempt cannot hang
pub const SMTP_TIMEOUT_SECONDS: u64 = 10;

// ============================================================================
// Validation Constants
// ============================================================================

/// Email validation regex (RFC 5322 simplified)
pub const EMAIL_REGEX_PATTERN: &str = r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$";

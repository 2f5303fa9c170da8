/// Mail configuration - loaded from environment variables
///
/// Every field is optional: a missing or blank variable degrades the service
/// into unconfigured mode instead of failing startup. `is_usable` is the
/// single readiness predicate and is re-checked by the delivery engine on
/// every call.
use lazy_static::lazy_static;
use regex::Regex;

use crate::constants::{DEFAULT_SUBJECT_PREFIX, EMAIL_REGEX_PATTERN, MAX_SUBJECT_PREFIX_LENGTH};

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(EMAIL_REGEX_PATTERN).unwrap();
}

/// Typed configuration snapshot, immutable for the process lifetime
#[derive(Debug, Clone, Default)]
pub struct MailConfig {
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    /// `Some(true)` only for the literal value "true"; any other non-blank
    /// value is `Some(false)`, blank or absent is `None`
    pub smtp_secure: Option<bool>,
    pub smtp_user: Option<String>,
    pub smtp_pass: Option<String>,
    pub mail_to: Option<String>,
    pub mail_from: Option<String>,
    pub subject_prefix: String,
}

/// Borrowed view of a fully configured snapshot
#[derive(Debug, Clone, Copy)]
pub struct UsableMail<'a> {
    pub host: &'a str,
    pub port: u16,
    pub secure: bool,
    pub user: &'a str,
    pub pass: &'a str,
    pub to: &'a str,
    pub from: &'a str,
    pub subject_prefix: &'a str,
}

impl MailConfig {
    /// Loads configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary variable mapping
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let host = non_blank(lookup("SMTP_HOST"));
        let port = non_blank(lookup("SMTP_PORT"))
            .and_then(|raw| raw.parse::<u16>().ok())
            .filter(|port| *port > 0);
        let secure = non_blank(lookup("SMTP_SECURE")).map(|raw| raw == "true");
        let user = non_blank(lookup("SMTP_USER"));
        let pass = non_blank(lookup("SMTP_PASS"));
        let mail_to = non_blank(lookup("MAIL_TO")).filter(|addr| EMAIL_REGEX.is_match(addr));
        let mail_from = non_blank(lookup("MAIL_FROM")).filter(|addr| EMAIL_REGEX.is_match(addr));
        let subject_prefix = non_blank(lookup("MAIL_SUBJECT_PREFIX"))
            .filter(|prefix| prefix.len() <= MAX_SUBJECT_PREFIX_LENGTH)
            .unwrap_or_else(|| DEFAULT_SUBJECT_PREFIX.to_string());

        Self {
            smtp_host: host,
            smtp_port: port,
            smtp_secure: secure,
            smtp_user: user,
            smtp_pass: pass,
            mail_to,
            mail_from,
            subject_prefix,
        }
    }

    /// Returns the configured transport view, or None while any of the seven
    /// required fields is missing
    pub fn usable(&self) -> Option<UsableMail<'_>> {
        Some(UsableMail {
            host: self.smtp_host.as_deref()?,
            port: self.smtp_port?,
            secure: self.smtp_secure?,
            user: self.smtp_user.as_deref()?,
            pass: self.smtp_pass.as_deref()?,
            to: self.mail_to.as_deref()?,
            from: self.mail_from.as_deref()?,
            subject_prefix: &self.subject_prefix,
        })
    }

    /// True iff outbound mail delivery can be attempted
    pub fn is_usable(&self) -> bool {
        self.usable().is_some()
    }
}

/// Normalizes an environment value: trims it and treats a blank string the
/// same as an unset variable. Applied before any typed parsing.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

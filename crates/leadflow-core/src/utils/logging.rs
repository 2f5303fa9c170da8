/// Logging utilities for PII redaction
///
/// Lead submissions carry personal data; these helpers make sure log output
/// never does. The delivery engine logs attempt counts and error kinds only,
/// and any address that must appear in logs goes through `redact_email`.
use regex::Regex;
use std::sync::LazyLock;

// Email redaction regex
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}\b").unwrap());

/// Redacts email addresses from text, preserving the domain for debugging
///
/// # Examples
/// ```
/// use leadflow_core::utils::logging::redact_email;
///
/// assert_eq!(redact_email("user@example.com"), "***@example.com");
/// assert_eq!(redact_email("Lead from test@acme.com received"), "Lead from ***@acme.com received");
/// ```
pub fn redact_email(text: &str) -> String {
    EMAIL_PATTERN
        .replace_all(text, |caps: &regex::Captures| {
            let email = &caps[0];
            if let Some(at_pos) = email.find('@') {
                format!("***{}", &email[at_pos..])
            } else {
                "***@***".to_string()
            }
        })
        .to_string()
}

/// Redacts a free-text body for logging (shows length only)
pub fn redact_body(body: &str) -> String {
    format!("[{} bytes]", body.len())
}

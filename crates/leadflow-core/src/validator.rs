/// Payload validation for inbound lead submissions
///
/// The validator is schema-strict: unknown top-level keys reject the payload.
/// Honeypot inspection runs only after the schema checks pass, so a
/// structurally broken submission is reported as invalid input, never as
/// spam.
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

use crate::constants::{
    EMAIL_REGEX_PATTERN, MAX_EMAIL_LENGTH, MAX_HONEYPOT_LENGTH, MAX_MESSAGE_LENGTH,
    MAX_ORGANISATION_LENGTH, MAX_PHONE_LENGTH, MAX_PRODUCT_ID_LENGTH, MIN_ORGANISATION_LENGTH,
};
use crate::models::LeadFields;

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(EMAIL_REGEX_PATTERN).unwrap();
}

/// Top-level keys the inbound body may carry
const ALLOWED_FIELDS: &[&str] = &[
    "email",
    "organisation",
    "phone",
    "message",
    "productId",
    "consent",
    "hp",
];

/// A single schema violation, addressed by field path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub path: String,
    pub message: String,
}

impl FieldIssue {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Outcome of validating one raw payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid(LeadFields),
    Invalid { issues: Vec<FieldIssue> },
    /// Structurally valid but the honeypot field was filled in. Carries no
    /// field detail so automated senders get no validation oracle.
    Spam,
}

/// Validates an untyped request body into a well-formed lead field set.
///
/// Pure and stateless: the same payload always yields the same result.
pub fn validate(raw: &Value) -> ValidationResult {
    let Some(object) = raw.as_object() else {
        return ValidationResult::Invalid {
            issues: vec![FieldIssue::new("", "expected a JSON object")],
        };
    };

    let mut issues = Vec::new();

    for key in object.keys() {
        if !ALLOWED_FIELDS.contains(&key.as_str()) {
            issues.push(FieldIssue::new(key.clone(), "unexpected field"));
        }
    }

    let email = required_string(object, "email", &mut issues);
    if let Some(email) = &email {
        if email.is_empty() {
            issues.push(FieldIssue::new("email", "is required"));
        } else if email.chars().count() > MAX_EMAIL_LENGTH {
            issues.push(FieldIssue::new("email", "is too long"));
        } else if !EMAIL_REGEX.is_match(email) {
            issues.push(FieldIssue::new("email", "is not a valid email address"));
        }
    }

    let organisation = required_string(object, "organisation", &mut issues);
    if let Some(organisation) = &organisation {
        let length = organisation.chars().count();
        if length < MIN_ORGANISATION_LENGTH {
            issues.push(FieldIssue::new("organisation", "is too short"));
        } else if length > MAX_ORGANISATION_LENGTH {
            issues.push(FieldIssue::new("organisation", "is too long"));
        }
    }

    let phone = optional_string(object, "phone", MAX_PHONE_LENGTH, &mut issues);
    let message = optional_string(object, "message", MAX_MESSAGE_LENGTH, &mut issues);
    let product_id = optional_string(object, "productId", MAX_PRODUCT_ID_LENGTH, &mut issues);
    let honeypot = optional_string(object, "hp", MAX_HONEYPOT_LENGTH, &mut issues);

    if !matches!(object.get("consent"), Some(Value::Bool(true))) {
        issues.push(FieldIssue::new("consent", "consent must be granted"));
    }

    if !issues.is_empty() {
        return ValidationResult::Invalid { issues };
    }

    if !honeypot.is_empty() {
        return ValidationResult::Spam;
    }

    match (email, organisation) {
        (Some(email), Some(organisation)) => ValidationResult::Valid(LeadFields {
            email,
            organisation,
            phone,
            message,
            product_id,
        }),
        // Unreachable while the checks above report every missing field,
        // kept as a guard instead of unwrapping
        _ => ValidationResult::Invalid { issues },
    }
}

fn required_string(
    object: &Map<String, Value>,
    path: &str,
    issues: &mut Vec<FieldIssue>,
) -> Option<String> {
    match object.get(path) {
        Some(Value::String(value)) => Some(value.trim().to_string()),
        Some(_) => {
            issues.push(FieldIssue::new(path, "expected a string"));
            None
        }
        None => {
            issues.push(FieldIssue::new(path, "is required"));
            None
        }
    }
}

/// Optional fields collapse to the empty string: an absent key and a blank
/// value are indistinguishable downstream
fn optional_string(
    object: &Map<String, Value>,
    path: &str,
    max_length: usize,
    issues: &mut Vec<FieldIssue>,
) -> String {
    match object.get(path) {
        Some(Value::String(value)) => {
            let trimmed = value.trim().to_string();
            if trimmed.chars().count() > max_length {
                issues.push(FieldIssue::new(path, "is too long"));
            }
            trimmed
        }
        Some(_) => {
            issues.push(FieldIssue::new(path, "expected a string"));
            String::new()
        }
        None => String::new(),
    }
}

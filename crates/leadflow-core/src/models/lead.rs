/// Lead models
use serde::Serialize;

/// The validated field set of a contact request, before a request id is
/// attached. Produced exclusively by the payload validator; there is no
/// partially-valid value of this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadFields {
    pub email: String,
    pub organisation: String,
    /// Empty string when not provided
    pub phone: String,
    /// Empty string when not provided
    pub message: String,
    /// Empty string when not provided
    pub product_id: String,
}

impl LeadFields {
    /// Attaches the handler-generated correlation id, completing the Lead
    pub fn with_request_id(self, request_id: impl Into<String>) -> Lead {
        Lead {
            email: self.email,
            organisation: self.organisation,
            phone: self.phone,
            message: self.message,
            product_id: self.product_id,
            request_id: request_id.into(),
        }
    }
}

/// A validated contact request ready for delivery.
///
/// Ephemeral: constructed per request, never persisted, and never logged in
/// full. The free-text fields must not appear in log output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lead {
    pub email: String,
    pub organisation: String,
    pub phone: String,
    pub message: String,
    pub product_id: String,
    pub request_id: String,
}

/// Outgoing message construction
///
/// The composed message is the only durable record of an inquiry (there is
/// no database), so the body layout is part of the external contract and
/// must stay stable.
use crate::models::{Lead, UsableMail};

/// A fully composed plain-text message, independent of any transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

/// Composes the outgoing message. Pure: the same lead and configuration
/// always produce the same message.
pub fn compose(mail: &UsableMail<'_>, lead: &Lead) -> OutgoingMessage {
    OutgoingMessage {
        from: mail.from.to_string(),
        to: mail.to.to_string(),
        subject: subject_line(mail.subject_prefix, lead),
        text: body_text(lead),
    }
}

fn subject_line(prefix: &str, lead: &Lead) -> String {
    let subject = if lead.product_id.is_empty() {
        format!("{} {}", prefix, lead.organisation)
    } else {
        format!("{} ({}) {}", prefix, lead.product_id, lead.organisation)
    };
    subject.trim().to_string()
}

fn body_text(lead: &Lead) -> String {
    format!(
        "Request-ID: {}\n\n\
         Organisation: {}\n\
         E-Mail: {}\n\
         Telefon: {}\n\
         Produkt-ID: {}\n\n\
         Nachricht:\n{}\n",
        lead.request_id,
        lead.organisation,
        lead.email,
        or_dash(&lead.phone),
        or_dash(&lead.product_id),
        or_dash(&lead.message),
    )
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

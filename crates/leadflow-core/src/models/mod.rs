/// Data models
pub mod config;
pub mod lead;

pub use config::{MailConfig, UsableMail};
pub use lead::{Lead, LeadFields};

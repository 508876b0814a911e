use crate::api;
use crate::config::Credentials;
use crate::message::{Mailbox, Message, RecipientKind};

/// Flat set of form fields sent to the provider. Field order is stable.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RequestPayload {
    fields: Vec<(&'static str, String)>,
}

impl RequestPayload {
    /// Flatten a message into the Elastic Email send fields.
    ///
    /// Every field is always present. Optional values that are missing
    /// from the message are sent as empty strings.
    pub fn build(message: &Message, credentials: &Credentials) -> Self {
        let from = message.from();
        let reply_to = message.reply_to();

        let mut payload = Self::default();

        payload.push("api_key", &credentials.key);
        payload.push("account", &credentials.account);
        payload.push("msgTo", &addresses(message, RecipientKind::To));
        payload.push("msgCC", &addresses(message, RecipientKind::Cc));
        payload.push("msgBcc", &addresses(message, RecipientKind::Bcc));
        payload.push("msgFrom", &from.address);
        payload.push("msgFromName", display_name(from));
        payload.push("from", &from.address);
        payload.push("fromName", display_name(from));
        payload.push("replyTo", &reply_to.address);
        payload.push("replyToName", display_name(reply_to));
        payload.push("subject", message.subject());
        payload.push("body_html", message.body());
        payload.push("body_text", message.text().unwrap_or_default());
        payload.push(
            "postBack",
            message.headers().get(api::POST_BACK_HEADER).unwrap_or_default(),
        );
        payload.push("isTransactional", &is_transactional(message));

        payload
    }

    fn push(&mut self, name: &'static str, value: &str) {
        self.fields.push((name, value.to_string()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn fields(&self) -> &[(&'static str, String)] {
        &self.fields
    }
}

#[inline]
fn addresses(message: &Message, kind: RecipientKind) -> String {
    message.recipients(kind).addresses()
}

#[inline]
fn display_name(mailbox: &Mailbox) -> &str {
    mailbox.name.as_deref().unwrap_or_default()
}

/// Literal header value, or "true" when the header is missing or blank
fn is_transactional(message: &Message) -> String {
    match message.headers().get(api::TRANSACTIONAL_HEADER) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "true".to_string(),
    }
}

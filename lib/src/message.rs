//! Outgoing message model.
//!
//! Address lists behave like ordered maps keyed by address: inserting an
//! address that is already present replaces its display name in place.

pub const TEXT_PLAIN: &str = "text/plain";
pub const TEXT_HTML: &str = "text/html";

/// A single address with an optional display name
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mailbox {
    pub address: String,
    pub name: Option<String>,
}

impl Mailbox {
    pub fn new(address: &str, name: Option<&str>) -> Self {
        Self {
            address: address.to_string(),
            name: name.map(|s| s.to_string()),
        }
    }
}

/// Ordered address -> display name map
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mailboxes(Vec<Mailbox>);

impl Mailboxes {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn insert(&mut self, mailbox: Mailbox) {
        match self.0.iter_mut().find(|m| m.address == mailbox.address) {
            Some(existing) => existing.name = mailbox.name,
            None => self.0.push(mailbox),
        }
    }

    pub fn first(&self) -> Option<&Mailbox> {
        self.0.first()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Comma-joined addresses in insertion order. Display names are dropped.
    pub fn addresses(&self) -> String {
        self.0
            .iter()
            .map(|m| m.address.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl From<Vec<Mailbox>> for Mailboxes {
    fn from(mailboxes: Vec<Mailbox>) -> Self {
        let mut map = Self::new();
        for m in mailboxes {
            map.insert(m);
        }
        map
    }
}

/// Recipient list selector
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RecipientKind {
    To,
    Cc,
    Bcc,
}

/// Child part of a message: either an alternative body or an attachment
#[derive(Clone, Debug, PartialEq)]
pub enum Part {
    Text {
        content_type: String,
        body: String,
    },
    Attachment {
        content_type: String,
        filename: String,
        data: Vec<u8>,
    },
}

impl Part {
    pub fn content_type(&self) -> &str {
        match self {
            Part::Text { content_type, .. } => content_type,
            Part::Attachment { content_type, .. } => content_type,
        }
    }

    pub fn is_attachment(&self) -> bool {
        matches!(self, Part::Attachment { .. })
    }
}

/// Ordered header bag. Lookup is case-insensitive, adding never replaces.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Default::default()
    }

    /// First value stored under `name`, if any
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn add(&mut self, name: &str, value: &str) {
        self.0.push((name.to_string(), value.to_string()));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    from: Mailbox,
    reply_to: Mailboxes,
    to: Mailboxes,
    cc: Mailboxes,
    bcc: Mailboxes,
    subject: String,
    body: String,
    children: Vec<Part>,
    headers: Headers,
}

impl Message {
    /// A message always has a sender, so it is required up front
    pub fn new(from: Mailbox) -> Self {
        Self {
            from,
            reply_to: Mailboxes::new(),
            to: Mailboxes::new(),
            cc: Mailboxes::new(),
            bcc: Mailboxes::new(),
            subject: String::new(),
            body: String::new(),
            children: Vec::new(),
            headers: Headers::new(),
        }
    }

    pub fn with_to(mut self, mailbox: Mailbox) -> Self {
        self.to.insert(mailbox);
        self
    }

    pub fn with_cc(mut self, mailbox: Mailbox) -> Self {
        self.cc.insert(mailbox);
        self
    }

    pub fn with_bcc(mut self, mailbox: Mailbox) -> Self {
        self.bcc.insert(mailbox);
        self
    }

    pub fn with_reply_to(mut self, mailbox: Mailbox) -> Self {
        self.reply_to.insert(mailbox);
        self
    }

    pub fn with_subject(mut self, subject: &str) -> Self {
        self.subject = subject.to_string();
        self
    }

    /// Primary (HTML) body
    pub fn with_html(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }

    pub fn with_text_part(mut self, content_type: &str, body: &str) -> Self {
        self.children.push(Part::Text {
            content_type: content_type.to_string(),
            body: body.to_string(),
        });
        self
    }

    pub fn with_attachment(mut self, filename: &str, content_type: &str, data: Vec<u8>) -> Self {
        self.children.push(Part::Attachment {
            content_type: content_type.to_string(),
            filename: filename.to_string(),
            data,
        });
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.add(name, value);
        self
    }

    pub fn from(&self) -> &Mailbox {
        &self.from
    }

    /// Explicit reply-to if set, otherwise the sender
    pub fn reply_to(&self) -> &Mailbox {
        self.reply_to.first().unwrap_or(&self.from)
    }

    pub fn recipients(&self, kind: RecipientKind) -> &Mailboxes {
        match kind {
            RecipientKind::To => &self.to,
            RecipientKind::Cc => &self.cc,
            RecipientKind::Bcc => &self.bcc,
        }
    }

    pub fn recipients_mut(&mut self, kind: RecipientKind) -> &mut Mailboxes {
        match kind {
            RecipientKind::To => &mut self.to,
            RecipientKind::Cc => &mut self.cc,
            RecipientKind::Bcc => &mut self.bcc,
        }
    }

    /// Sum of to, cc and bcc entries. The same address appearing in two
    /// lists counts twice.
    pub fn recipient_count(&self) -> usize {
        self.to.len() + self.cc.len() + self.bcc.len()
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn set_subject(&mut self, subject: &str) {
        self.subject = subject.to_string();
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn set_body(&mut self, body: &str) {
        self.body = body.to_string();
    }

    pub fn children(&self) -> &[Part] {
        &self.children
    }

    pub fn push_child(&mut self, part: Part) {
        self.children.push(part);
    }

    /// Body of the `text/plain` child part. When there are several, the
    /// last one wins.
    pub fn text(&self) -> Option<&str> {
        let mut text = None;

        for child in &self.children {
            if let Part::Text { content_type, body } = child {
                if content_type == TEXT_PLAIN {
                    text = Some(body.as_str());
                }
            }
        }

        text
    }

    /// Attachments paired with their position among all child parts
    pub fn attachments(&self) -> impl Iterator<Item = (usize, &Part)> {
        self.children
            .iter()
            .enumerate()
            .filter(|(_, part)| part.is_attachment())
    }

    pub fn has_attachments(&self) -> bool {
        self.children.iter().any(Part::is_attachment)
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }
}

use mailparse::{DispositionType, MailAddr, MailHeaderMap, ParsedMail};

use crate::api;
use crate::message::{Mailbox, Message, Part, RecipientKind, TEXT_HTML, TEXT_PLAIN};
use crate::Error;

/// Headers that carry request flags and must survive ingestion
const FLAG_HEADERS: &[&str] = &[api::POST_BACK_HEADER, api::TRANSACTIONAL_HEADER];

impl Message {
    /// Convert a raw MIME email into a structured message
    pub fn from_mime(mime_content: &[u8]) -> Result<Message, Error> {
        Self::from_mime_with_sender(mime_content, None)
    }

    /// Same as `from_mime`, with a fallback sender for mail that has no
    /// usable From header (e.g., the envelope sender of a filter).
    pub fn from_mime_with_sender(
        mime_content: &[u8],
        sender: Option<Mailbox>,
    ) -> Result<Message, Error> {
        let parsed = mailparse::parse_mail(mime_content)?;

        let from = header_mailboxes(&parsed, "From")?
            .into_iter()
            .next()
            .or(sender)
            .ok_or_else(|| Error::InvalidMessage("No From address found".to_string()))?;

        let mut mail = Message::new(from);

        for mailbox in header_mailboxes(&parsed, "Reply-To")? {
            mail = mail.with_reply_to(mailbox);
        }

        let lists = [
            ("To", RecipientKind::To),
            ("Cc", RecipientKind::Cc),
            ("Bcc", RecipientKind::Bcc),
        ];

        for (name, kind) in lists.iter() {
            for mailbox in header_mailboxes(&parsed, name)? {
                mail.recipients_mut(*kind).insert(mailbox);
            }
        }

        if let Some(subject) = parsed.headers.get_first_value("Subject") {
            mail.set_subject(&subject);
        }

        for name in FLAG_HEADERS {
            if let Some(value) = parsed.headers.get_first_value(name) {
                mail.headers_mut().add(name, value.trim());
            }
        }

        parse_recursive(&mut mail, &parsed)?;

        Ok(mail)
    }
}

/// Flatten an address header, groups included. Missing header is empty.
fn header_mailboxes(parsed: &ParsedMail, name: &str) -> Result<Vec<Mailbox>, Error> {
    let header = match parsed.headers.get_first_header(name) {
        Some(h) => h,
        None => return Ok(Vec::new()),
    };

    let mut mailboxes = Vec::new();

    for addr in mailparse::addrparse_header(header)?.iter() {
        match addr {
            MailAddr::Single(info) => {
                mailboxes.push(Mailbox::new(&info.addr, info.display_name.as_deref()))
            }
            MailAddr::Group(group) => {
                for info in &group.addrs {
                    mailboxes.push(Mailbox::new(&info.addr, info.display_name.as_deref()));
                }
            }
        }
    }

    Ok(mailboxes)
}

/// Recursively walk the MIME parts and extract the following:
///
/// 1. HTML body (first one found)
/// 2. Plaintext alternatives
/// 3. Attachments, inline or regular
///
fn parse_recursive(mail: &mut Message, part: &ParsedMail) -> Result<(), Error> {
    let mimetype = part.ctype.mimetype.to_lowercase();

    if let Some(filename) = attachment_name(part) {
        mail.push_child(Part::Attachment {
            content_type: mimetype,
            filename,
            data: part.get_body_raw()?,
        });
        return Ok(());
    }

    if mimetype.starts_with("multipart/") {
        for subpart in part.subparts.iter() {
            parse_recursive(mail, subpart)?;
        }
    } else if mimetype == TEXT_HTML && mail.body().is_empty() {
        mail.set_body(&part.get_body()?);
    } else {
        mail.push_child(Part::Text {
            content_type: mimetype,
            body: part.get_body()?,
        });
    }

    Ok(())
}

/// Filename of the part if it should be sent as an attachment.
///
/// Every non-text leaf is an attachment, named or not (e.g. an embedded
/// image only referenced by its Content-ID).
fn attachment_name(part: &ParsedMail) -> Option<String> {
    let mimetype = part.ctype.mimetype.to_lowercase();

    if mimetype.starts_with("multipart/") {
        return None;
    }

    let disposition = part.get_content_disposition();
    let filename = disposition
        .params
        .get("filename")
        .or_else(|| part.ctype.params.get("name"))
        .cloned();

    match disposition.disposition {
        DispositionType::Attachment => Some(filename.unwrap_or_else(|| fallback_name(part))),
        // Inline text without a name is a body, not an attachment
        DispositionType::Inline if mimetype.starts_with("text/") => None,
        _ if mimetype.starts_with("text/") => filename,
        _ => Some(filename.unwrap_or_else(|| fallback_name(part))),
    }
}

/// Content-ID without angle brackets, or a generic name
fn fallback_name(part: &ParsedMail) -> String {
    part.headers
        .get_first_value("Content-ID")
        .map(|cid| cid.trim().trim_start_matches('<').trim_end_matches('>').to_string())
        .filter(|cid| !cid.is_empty())
        .unwrap_or_else(|| "attachment".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    static SAMPLE_EMAIL_PATHS: &[&str] = &[
        // multipart/mixed: alternative (text, html), PDF attachment, text attachment
        concat!(env!("CARGO_MANIFEST_DIR"), "/resources", "/sample_email_1.txt"),
        // Single part text/plain with flag headers
        concat!(env!("CARGO_MANIFEST_DIR"), "/resources", "/sample_email_2.txt"),
        // multipart/related: html, unnamed inline image, unnamed octet-stream attachment
        concat!(env!("CARGO_MANIFEST_DIR"), "/resources", "/sample_email_3.txt"),
    ];

    fn get_mail(path: &str) -> Message {
        let content = fs::read(path).unwrap();
        Message::from_mime(&content).unwrap()
    }

    #[test]
    fn parse_addresses() {
        let mail = get_mail(SAMPLE_EMAIL_PATHS[0]);

        assert_eq!(mail.from(), &Mailbox::new("alice@example.com", Some("Alice Sender")));
        assert_eq!(mail.reply_to().address, "support@example.com");
        assert_eq!(mail.recipients(RecipientKind::To).addresses(), "bob@example.com,carol@example.com");
        assert_eq!(mail.recipients(RecipientKind::Cc).addresses(), "dave@example.com");
        assert!(mail.recipients(RecipientKind::Bcc).is_empty());
        assert_eq!(mail.subject(), "Quarterly report");
    }

    #[test]
    fn parse_bodies() {
        let mail = get_mail(SAMPLE_EMAIL_PATHS[0]);

        assert_eq!(mail.text().map(str::trim), Some("Report attached."));
        assert_eq!(mail.body().trim(), "<p>Report attached.</p>");
    }

    #[test]
    fn parse_attachments() {
        let mail = get_mail(SAMPLE_EMAIL_PATHS[0]);
        let attachments: Vec<(usize, &Part)> = mail.attachments().collect();

        assert_eq!(attachments.len(), 2);
        assert_eq!(attachments[0].0, 1);

        match attachments[0].1 {
            Part::Attachment { filename, content_type, data } => {
                assert_eq!(filename, "report.pdf");
                assert_eq!(content_type, "application/pdf");
                assert_eq!(data, b"%PDF-1.4 fake");
            }
            other => panic!("expected attachment, got {:?}", other),
        }

        match attachments[1].1 {
            Part::Attachment { filename, .. } => assert_eq!(filename, "notes.txt"),
            other => panic!("expected attachment, got {:?}", other),
        }
    }

    #[test]
    fn parse_single_part_with_flags() {
        let mail = get_mail(SAMPLE_EMAIL_PATHS[1]);

        assert_eq!(mail.body(), "");
        assert_eq!(mail.text().map(str::trim), Some("Plain only."));
        assert!(!mail.has_attachments());
        assert_eq!(mail.headers().get(api::TRANSACTIONAL_HEADER), Some("false"));
        assert_eq!(mail.headers().get(api::POST_BACK_HEADER), Some("https://example.com/hook"));
        assert_eq!(mail.reply_to(), mail.from());
    }

    #[test]
    fn fallback_sender_when_from_missing() {
        let raw = b"To: bob@example.com\r\nSubject: hi\r\n\r\nbody\r\n";

        assert!(Message::from_mime(raw).is_err());

        let sender = Mailbox::new("envelope@example.com", None);
        let mail = Message::from_mime_with_sender(raw, Some(sender.clone())).unwrap();
        assert_eq!(mail.from(), &sender);
    }

    #[test]
    fn parse_unnamed_inline_image() {
        let mail = get_mail(SAMPLE_EMAIL_PATHS[2]);
        let attachments: Vec<(usize, &Part)> = mail.attachments().collect();

        assert!(mail.body().contains("cid:logo@example.com"));
        assert_eq!(attachments.len(), 2);

        match attachments[0].1 {
            Part::Attachment { filename, content_type, data } => {
                assert_eq!(filename, "logo@example.com");
                assert_eq!(content_type, "image/png");
                assert_eq!(data, b"fake png");
            }
            other => panic!("expected attachment, got {:?}", other),
        }

        match attachments[1].1 {
            Part::Attachment { filename, .. } => assert_eq!(filename, "attachment"),
            other => panic!("expected attachment, got {:?}", other),
        }
    }
}

use std::io::Read;

use elastic_mail::api;
use elastic_mail::message::Mailboxes;
use elastic_mail::{ElasticTransport, Error, Mailbox, Message, RecipientKind};

use structopt::StructOpt;

mod status;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "elastic-mail-filter",
    about = "Relays mail read from stdin through the Elastic Email API."
)]
struct Opt {
    /// Path to the TOML config file
    #[structopt(short, long)]
    config: Option<String>,

    /// Envelope sender, used when the message has no From header
    #[structopt(short, long)]
    sender: Option<String>,

    /// Envelope recipients, replace the To header when given
    #[structopt(short, long)]
    recipients: Vec<String>,
}

/// Replace the header recipients with the envelope ones.
///
/// The MTA passes every envelope recipient (Cc included), so Cc and Bcc
/// are cleared to avoid delivering twice. No-op without recipients.
fn apply_envelope(mail: &mut Message, recipients: &[String]) {
    if recipients.is_empty() {
        return;
    }

    let envelope: Vec<Mailbox> = recipients.iter().map(|r| Mailbox::new(r, None)).collect();

    *mail.recipients_mut(RecipientKind::To) = Mailboxes::from(envelope);
    *mail.recipients_mut(RecipientKind::Cc) = Mailboxes::new();
    *mail.recipients_mut(RecipientKind::Bcc) = Mailboxes::new();
}

/// Parse the raw message, apply envelope overrides and send it
fn process(opt: &Opt, raw: &[u8]) -> Result<usize, Error> {
    let config = elastic_mail::load_config(opt.config.as_deref())?;
    let transport = ElasticTransport::from_config(&config)?;

    let sender = opt.sender.as_deref().map(|s| Mailbox::new(s, None));
    let mut mail = Message::from_mime_with_sender(raw, sender)?;

    apply_envelope(&mut mail, &opt.recipients);

    let count = transport.send(&mut mail)?;

    log::info!(
        "Sent \"{}\" to {} recipient(s), message ID: {}",
        mail.subject(),
        count,
        mail.headers().get(api::MSG_ID_HEADER).unwrap_or("<none>")
    );

    Ok(count)
}

fn main() {
    // Init logger
    env_logger::builder().format_timestamp_micros().init();

    let opt = Opt::from_args();

    // Get message from stdin
    let mut raw = Vec::new();
    if let Err(e) = std::io::stdin().read_to_end(&mut raw) {
        log::error!("Failed to read message from stdin: {}", e);
        std::process::exit(status::TEMPFAIL);
    }

    let code = match process(&opt, &raw) {
        Ok(_) => status::OK,
        Err(e) => {
            log::error!("Failed to send message: {}", e);
            status::exit_code(&e)
        }
    };

    std::process::exit(code);
}

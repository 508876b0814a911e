use crate::api;
use crate::config::{Config, Credentials, CredentialsUpdate};
use crate::http::{FilePart, HttpClient, ReqwestClient, RequestBody};
use crate::message::{Message, Part};
use crate::payload::RequestPayload;
use crate::Error;

/// Submits messages to the Elastic Email send endpoint through an
/// injected HTTP client.
pub struct MessageSubmitter<C> {
    client: C,
}

impl<C: HttpClient> MessageSubmitter<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Send one message and return the number of recipients.
    ///
    /// On success the provider's identifiers are added to the message
    /// headers as `X-Msg-ID` and `X-Job-ID`. On failure the message is
    /// left untouched.
    pub fn submit(&self, message: &mut Message, credentials: &Credentials) -> Result<usize, Error> {
        let payload = RequestPayload::build(message, credentials);
        let body = encode(message, payload);

        log::debug!(
            "Sending message \"{}\" to {} recipient(s) (multipart: {})",
            message.subject(),
            message.recipient_count(),
            body.is_multipart()
        );

        let resp = self.client.post(api::ELASTIC_EMAIL_SEND_URL, body)?;
        let result = api::parse_response(&resp)?;

        let headers = message.headers_mut();

        match result.message_id {
            Some(ref id) => headers.add(api::MSG_ID_HEADER, id),
            None => log::warn!("Provider accepted message without a message ID"),
        }

        match result.transaction_id {
            Some(ref id) => headers.add(api::JOB_ID_HEADER, id),
            None => log::warn!("Provider accepted message without a transaction ID"),
        }

        Ok(message.recipient_count())
    }
}

/// Multipart when the message carries attachments, a plain form otherwise
fn encode(message: &Message, payload: RequestPayload) -> RequestBody {
    let fields = payload
        .fields()
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect();

    if !message.has_attachments() {
        return RequestBody::Form(fields);
    }

    let files = message
        .attachments()
        .filter_map(|(index, part)| match part {
            Part::Attachment { filename, data, .. } => Some(FilePart {
                name: format!("file_{}", index),
                filename: filename.clone(),
                data: data.clone(),
            }),
            Part::Text { .. } => None,
        })
        .collect();

    RequestBody::Multipart { files, fields }
}

/// Elastic Email mail transport: a submitter bound to its credentials.
pub struct ElasticTransport<C> {
    submitter: MessageSubmitter<C>,
    credentials: Credentials,
}

impl<C: HttpClient> ElasticTransport<C> {
    pub fn new(client: C, key: &str, account: &str) -> Self {
        Self {
            submitter: MessageSubmitter::new(client),
            credentials: Credentials::new(key, account),
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn set_credentials(&mut self, update: CredentialsUpdate) {
        self.credentials.merge(update);
    }

    pub fn send(&self, message: &mut Message) -> Result<usize, Error> {
        self.submitter.submit(message, &self.credentials)
    }
}

impl ElasticTransport<ReqwestClient> {
    /// Build a transport backed by a blocking reqwest client
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let client = ReqwestClient::with_timeout(config.timeout)?;
        Ok(Self::new(client, &config.key, &config.account))
    }
}

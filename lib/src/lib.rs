//! Elastic Email mail transport.
//!
//! Flattens a `Message` into the fields of the Elastic Email v2
//! `email/send` call, posts it with a single request and copies the
//! provider's identifiers back onto the message.

pub mod api;
pub mod config;
pub mod http;
pub mod message;
pub mod mime;
pub mod payload;
pub mod submitter;

mod error;

pub use crate::config::{load_config, Config, Credentials, CredentialsUpdate};
pub use error::Error;
pub use http::{HttpClient, ReqwestClient, RequestBody};
pub use message::{Mailbox, Message, Part, RecipientKind};
pub use submitter::{ElasticTransport, MessageSubmitter};

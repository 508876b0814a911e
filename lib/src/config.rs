use serde::Deserialize;

use crate::api;
use crate::Error;

pub const DEFAULT_PATH: &str = "/etc/elastic-mail/elastic-mail.toml";
const ENV_PREFIX: &str = "ELASTIC_EMAIL";

/// Transport settings, read once at startup.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Elastic Email API key
    pub key: String,

    /// Elastic Email account identifier
    pub account: String,

    /// HTTP request timeout, in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_timeout() -> u64 {
    api::DEFAULT_REQUEST_TIMEOUT
}

impl Config {
    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.key, &self.account)
    }
}

/// Loads transport config from the filesystem and merges it with any
/// environment variables prefixed with ELASTIC_EMAIL_.
///
/// The file is optional so that a purely environment-driven setup works.
pub fn load_config(path: Option<&str>) -> Result<Config, Error> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(path.unwrap_or(DEFAULT_PATH)).required(false))
        .add_source(config::Environment::with_prefix(ENV_PREFIX))
        .build()?;

    let config: Config = settings.try_deserialize()?;

    if config.key.is_empty() {
        return Err(Error::Config("API key is empty".to_string()));
    }

    if config.account.is_empty() {
        return Err(Error::Config("account is empty".to_string()));
    }

    if config.timeout == 0 {
        return Err(Error::Config("timeout must be at least 1 second".to_string()));
    }

    Ok(config)
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Credentials {
    pub key: String,
    pub account: String,
}

/// Partial credentials; `None` keeps the current value
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CredentialsUpdate {
    pub key: Option<String>,
    pub account: Option<String>,
}

impl Credentials {
    pub fn new(key: &str, account: &str) -> Self {
        Self {
            key: key.to_string(),
            account: account.to_string(),
        }
    }

    pub fn merge(&mut self, update: CredentialsUpdate) {
        if let Some(key) = update.key {
            self.key = key;
        }

        if let Some(account) = update.account {
            self.account = account;
        }
    }
}

/// All possible Elastic Email transport errors
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Error {
    /// The HTTP exchange did not complete: connection failure, non-2xx
    /// status or a body that could not be parsed.
    #[error("Transport: {0}")]
    Transport(String),

    #[error("Transport: request timed out")]
    Timeout,

    /// Provider answered with `success = false`. Message is passed
    /// through verbatim.
    #[error("{0}")]
    Provider(String),

    #[error("Config: {0}")]
    Config(String),

    #[error("InvalidMessage: {0}")]
    InvalidMessage(String),
}

impl Error {
    /// True for failures where the provider never gave a verdict.
    /// The message may be retried later by the caller.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Timeout)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::error::Error> for Error {
    fn from(err: serde_json::error::Error) -> Self {
        Self::Transport(format!("malformed response body: {}", err))
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<mailparse::MailParseError> for Error {
    fn from(err: mailparse::MailParseError) -> Self {
        Self::InvalidMessage(err.to_string())
    }
}

use thiserror::Error;

/// Failure of one fetch cycle, or of starting the poller. Fetch failures are
/// transient from the store's point of view: the previous cache is kept and
/// the message is surfaced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error("request failed: {0}")]
    Http(String),

    #[error("ledger service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response: {0}")]
    Decode(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("no tokio runtime: {0}")]
    NoRuntime(String),

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for HistoryError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Http(e.to_string())
        }
    }
}

/// The address codec could not produce a contract address.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("cannot derive asset contract for {asset}: {reason}")]
    DerivationFailure { asset: String, reason: String },
}

/// A recognised token call whose arguments do not have the expected shape.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvocationError {
    #[error("{function}: missing argument {index}")]
    MissingArgument { function: &'static str, index: usize },

    #[error("{function}: argument {index} must be an address, found {found}")]
    NotAnAddress {
        function: &'static str,
        index: usize,
        found: &'static str,
    },

    #[error("undecodable contract parameter {index}: {reason}")]
    Undecodable { index: usize, reason: String },
}

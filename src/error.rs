use std::io;

use thiserror::Error;

/// Every failure a chat session or its setup can hit.
///
/// There is no recoverable tier: whoever receives one of these tears down the
/// current session (the server keeps accepting, the client exits).
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("usage: {0}")]
    Usage(String),

    #[error("DNS lookup failed for host {host}")]
    Resolution {
        host: String,
        #[source]
        source: Option<io::Error>,
    },

    #[error("{op} failed")]
    Connect {
        op: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("interrupted")]
    Cancelled,

    #[error("{op} failed")]
    Io {
        op: &'static str,
        #[source]
        source: io::Error,
    },
}

impl ChatError {
    pub fn io(op: &'static str, source: io::Error) -> Self {
        Self::Io { op, source }
    }

    pub fn connect(op: &'static str, source: io::Error) -> Self {
        Self::Connect { op, source }
    }

    /// The failing operation, as shown to the operator.
    pub fn op(&self) -> &str {
        match self {
            Self::Usage(_) => "parse arguments",
            Self::Resolution { .. } => "resolve host",
            Self::Cancelled => "interrupt",
            Self::Connect { op, .. } | Self::Io { op, .. } => op,
        }
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;

use crate::protocol::parts::{ExecutionResult, ServerError};
use thiserror::Error;

/// Abbreviation of `Result<T, HdbError>`.
pub type HdbResult<T> = std::result::Result<T, HdbError>;

/// The error categories of this driver.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HdbError {
    /// Authentication with the database failed; the boxed error carries
    /// the underlying cause.
    #[error("Authentication failed")]
    Authentication {
        /// The causing Error.
        source: Box<HdbError>,
    },

    /// A client certificate was rejected before any wire exchange,
    /// e.g. because it is outside its validity window.
    #[error("Client certificate validation failed: {}", _0)]
    CertValidation(String),

    /// Decoding CESU-8 failed. This indicates a server issue.
    #[error("Some error occured while decoding CESU-8")]
    Cesu8,

    /// Decoding CESU-8 failed, the original bytes are available.
    #[error("Some error occured while decoding CESU-8")]
    Cesu8AsBytes {
        /// The raw bytes that could not be decoded.
        bytes: Vec<u8>,
    },

    /// A host value does not fit into the parameter field it is bound to.
    /// Is returned before the wire is touched.
    #[error("Value conversion failed: {}", _0)]
    Conversion(&'static str),

    /// Erroneous connection parameters.
    #[error("Erroneous connection parameters")]
    ConnParams {
        /// The causing Error.
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// The database server responded with an error; the contained
    /// `ServerError` describes the concrete reason.
    #[error("Database server responded with an error")]
    DbError {
        /// The causing Error.
        #[from]
        source: ServerError,
    },

    /// The connection is broken and must be discarded; set after any
    /// unrecoverable I/O or protocol error, and sticky from then on.
    #[error("Connection is broken: {}", _0)]
    DeadConnection(&'static str),

    /// The database server responded with at least one error for a
    /// statement of a bulk execution.
    #[error("Database server responded with at least one error")]
    ExecutionResults(Vec<ExecutionResult>),

    /// Wire-level decode failure: short read, unknown sentinel, or a
    /// part buffer that does not match its declared length.
    #[error("Protocol error: {}", _0)]
    Impl(&'static str),

    /// Wire-level decode failure with dynamic detail.
    #[error("Protocol error: {}", _0)]
    ImplDetailed(String),

    /// Error occured in communication with the database.
    #[error(transparent)]
    Io {
        /// The causing Error.
        #[from]
        source: std::io::Error,
    },

    /// Error occured in thread synchronization.
    #[error("Error occured in thread synchronization")]
    Poison,

    /// An error occurred on the server that requires the session
    /// to be terminated.
    #[error("An error occurred on the server that requires the session to be terminated")]
    SessionClosingTransactionError,

    /// TLS set up failed because the server name was not valid.
    #[error("TLS setup failed because the server name was not valid")]
    TlsServerName,

    /// TLS protocol error.
    #[error(
        "TLS set up failed, after setting up the TCP connection; is the database prepared for TLS?"
    )]
    TlsProtocol {
        /// The causing Error.
        #[from]
        source: rustls::Error,
    },

    /// Error caused by wrong usage.
    #[error("Wrong usage: {}", _0)]
    Usage(&'static str),

    /// Error caused by wrong usage.
    #[error("Wrong usage: {}", _0)]
    UsageDetailed(String),
}

// Shortcut for building a protocol-level error.
macro_rules! impl_err {
    ($msg:literal $(,)?) => {
        $crate::HdbError::Impl($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::HdbError::ImplDetailed(format!($fmt, $($arg)*))
    };
}
pub(crate) use impl_err;

// Shortcut for building a usage error.
macro_rules! usage_err {
    ($msg:literal $(,)?) => {
        $crate::HdbError::Usage($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::HdbError::UsageDetailed(format!($fmt, $($arg)*))
    };
}
pub(crate) use usage_err;

impl HdbError {
    /// Returns the contained `ServerError`, if any.
    ///
    /// This method helps in case you need programmatic access to e.g. the
    /// error code or the statement index of a failed bulk row.
    pub fn server_error(&self) -> Option<&ServerError> {
        match self {
            Self::DbError {
                source: server_error,
            } => Some(server_error),
            _ => None,
        }
    }

    /// True if the connection must be discarded.
    pub fn is_dead_connection(&self) -> bool {
        matches!(self, Self::DeadConnection(_))
    }

    pub(crate) fn conn_params(error: Box<dyn std::error::Error + Send + Sync + 'static>) -> Self {
        Self::ConnParams { source: error }
    }
}

impl<G> From<std::sync::PoisonError<G>> for HdbError {
    fn from(_error: std::sync::PoisonError<G>) -> Self {
        Self::Poison
    }
}

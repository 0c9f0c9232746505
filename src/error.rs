//! Unified error type.

use std::net::SocketAddr;

/// A boxed error coming out of a request body stream.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type returned by sprig's fallible operations.
///
/// Most per-request failures never reach the caller: dispatch turns them into
/// HTTP responses (404, 408, 413, 500). What surfaces here is startup trouble,
/// misuse of the registration API, and the strict [`Response::try_send`]
/// variant.
///
/// [`Response::try_send`]: crate::Response::try_send
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("routes cannot be registered once the server is listening")]
    RegistrationClosed,

    #[error("server is already listening")]
    AlreadyListening,

    #[error("response has already been sent")]
    AlreadySent,

    #[error("request body exceeds the {limit} byte limit")]
    BodyTooLarge { limit: usize },

    #[error("timed out waiting for request body data")]
    BodyTimeout,

    #[error("request body stream aborted: {0}")]
    BodyAborted(#[source] BoxError),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

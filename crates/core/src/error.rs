/// Result alias that carries the custom [`CueSyncError`] type.
pub type Result<T> = std::result::Result<T, CueSyncError>;

/// Common error type for the core crate.
///
/// Only the outer boundary produces these: decoding inbound messages and
/// loading configuration. Reconciliation itself never fails.
#[derive(Debug, thiserror::Error)]
pub enum CueSyncError {
    /// Free-form message, mostly used by the command line host.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// A wire message or configuration file could not be decoded.
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
    /// A configuration value is outside its accepted range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CueSyncError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

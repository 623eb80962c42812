use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("Native call {call} rejected: {message}")]
    NativeCall { call: &'static str, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Convenience constructor used by engine adapters when a vendor call fails.
    pub fn native(call: &'static str, message: impl Into<String>) -> Self {
        Self::NativeCall {
            call,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

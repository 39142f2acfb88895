//! Error types for the vecbridge marshaling layer

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BridgeError>;

/// Failure kinds surfaced by the marshaling layer.
///
/// Structural and type validation fails locally, before any boundary call.
/// Failures reported by the engine itself are opaque
/// ([`InternalError`](BridgeError::InternalError) /
/// [`InsertFailed`](BridgeError::InsertFailed)); retry policy belongs to the
/// caller.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("not connected to an engine")]
    NotConnected,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("internal engine error")]
    InternalError,

    #[error("unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("field not found: {0}")]
    FieldNotFound(String),

    #[error("insert rejected by engine")]
    InsertFailed,

    #[error("invalid data: {0}")]
    InvalidData(String),
}

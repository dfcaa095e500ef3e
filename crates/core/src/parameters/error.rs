//! Parameter error types

/// Errors from parameter store operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParameterError {
    /// Unknown parameter or name longer than the key capacity
    #[error("unknown or malformed parameter name")]
    UnknownParameter,
    /// Store is full
    #[error("parameter store full")]
    StoreFull,
    /// Read-only parameter cannot be modified
    #[error("parameter is read-only")]
    ReadOnly,
    /// Value type differs from the registered default
    #[error("parameter value type mismatch")]
    TypeMismatch,
}

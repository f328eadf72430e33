use thiserror::Error;

/// The error taxonomy returned across the command/query boundary.
///
/// `Validation` and `DrillProtocol` are recoverable: the session is left
/// unchanged. `Invariant` indicates the session should be abandoned by the
/// caller. `ShoeExhausted` is caught internally by `Session::step`, which
/// voids the in-progress round as a push rather than propagating it; library
/// consumers calling `Shoe::deal` directly still see it as an `Err`.
/// `Configuration` only ever arises during `Session::new`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("{0} is not a legal command in the current state")]
    Validation(String),

    #[error("invariant violation: {0}")]
    Invariant(String),

    #[error("shoe exhausted: {0}")]
    ShoeExhausted(String),

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("drill protocol error: {0}")]
    DrillProtocol(String),
}

impl EngineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

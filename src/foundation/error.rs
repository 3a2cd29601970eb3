/// Convenience result type used across Tessera.
pub type TesseraResult<T> = Result<T, TesseraError>;

/// Top-level error taxonomy used by compositor APIs.
///
/// Per-item soft failures (a layer that fails to decode, a forced duplicate combination) are not
/// errors; they are logged and counted. Only whole-operation failures surface here.
#[derive(thiserror::Error, Debug)]
pub enum TesseraError {
    /// Invalid user-provided options or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// An image could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// A raster could not be encoded to a still image.
    #[error("encode error: {0}")]
    Encode(String),

    /// Archive assembly failed.
    #[error("archive error: {0}")]
    Archive(String),

    /// The run was cancelled at a batch boundary.
    #[error("operation cancelled")]
    Cancelled,

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TesseraError {
    /// Build a [`TesseraError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TesseraError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`TesseraError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`TesseraError::Archive`] value.
    pub fn archive(msg: impl Into<String>) -> Self {
        Self::Archive(msg.into())
    }

    /// Build a [`TesseraError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

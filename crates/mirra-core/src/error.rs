/// Core error types for the Mirra bridge.

/// A specialized Result type for Mirra operations.
pub type MirraResult<T> = Result<T, MirraError>;

/// Top-level error type encompassing all Mirra subsystems.
#[derive(Debug, thiserror::Error)]
pub enum MirraError {
    #[error("dom error: {0}")]
    Dom(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unsupported feature: {0}")]
    Unsupported(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl MirraError {
    /// Create a DOM error from any displayable detail.
    pub fn dom(detail: impl std::fmt::Display) -> Self {
        MirraError::Dom(detail.to_string())
    }

    /// Create an encode error from any displayable detail.
    pub fn encode(detail: impl std::fmt::Display) -> Self {
        MirraError::Encode(detail.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dom_error_display() {
        let err = MirraError::dom("query failed on flt-glass-pane");
        assert_eq!(err.to_string(), "dom error: query failed on flt-glass-pane");
    }

    #[test]
    fn test_encode_error_display() {
        let err = MirraError::encode("canvas is tainted");
        assert_eq!(err.to_string(), "encode error: canvas is tainted");
    }

    #[test]
    fn test_serialization_error_from() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err = MirraError::from(json_err);
        assert!(err.to_string().starts_with("serialization error:"));
    }
}

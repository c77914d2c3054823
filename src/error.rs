//! Error types for the vera host.

/// Top-level error type for the assistant host.
#[derive(Debug, thiserror::Error)]
pub enum VeraError {
    /// Configuration file could not be read, parsed or written.
    #[error("config error: {0}")]
    Config(String),

    /// Language model request error.
    #[error("LLM error: {0}")]
    Llm(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, VeraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes() {
        assert_eq!(
            VeraError::Config("bad toml".into()).to_string(),
            "config error: bad toml"
        );
        assert_eq!(
            VeraError::Llm("HTTP 500".into()).to_string(),
            "LLM error: HTTP 500"
        );
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: VeraError = io.into();
        assert!(err.to_string().starts_with("I/O error:"));
    }
}

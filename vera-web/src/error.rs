//! Error types for the vera-web crate.
//!
//! These errors stay inside the pipeline. The orchestrator maps every
//! terminal failure to a fixed user-facing string, so nothing here is
//! ever shown verbatim to the user.

/// Errors that can occur inside the web-answering pipeline.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// An HTTP request to a search backend or source page failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A response could not be parsed into usable results or text.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid pipeline configuration.
    #[error("config error: {0}")]
    Config(String),

    /// The language-model call failed.
    #[error("LLM error: {0}")]
    Llm(String),
}

/// Convenience type alias for vera-web results.
pub type Result<T> = std::result::Result<T, WebError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_http() {
        let err = WebError::Http("connection refused".into());
        assert_eq!(err.to_string(), "HTTP error: connection refused");
    }

    #[test]
    fn display_parse() {
        let err = WebError::Parse("no extractable content found".into());
        assert_eq!(err.to_string(), "parse error: no extractable content found");
    }

    #[test]
    fn display_config() {
        let err = WebError::Config("max_sources must be greater than 0".into());
        assert_eq!(
            err.to_string(),
            "config error: max_sources must be greater than 0"
        );
    }

    #[test]
    fn display_llm() {
        let err = WebError::Llm("model unavailable".into());
        assert_eq!(err.to_string(), "LLM error: model unavailable");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<WebError>();
    }
}

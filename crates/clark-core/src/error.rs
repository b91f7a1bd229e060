use thiserror::Error;

/// Top-level error type for the Clark service.
///
/// Subsystem crates define their own error types; the ones that surface at
/// process level (config loading, server startup) convert into this enum so
/// the `?` operator works in the composition root.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClarkError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for ClarkError {
    fn from(err: toml::de::Error) -> Self {
        ClarkError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for ClarkError {
    fn from(err: toml::ser::Error) -> Self {
        ClarkError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for ClarkError {
    fn from(err: serde_json::Error) -> Self {
        ClarkError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Clark operations.
pub type Result<T> = std::result::Result<T, ClarkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_all_variants() {
        let cases: Vec<(ClarkError, &str)> = vec![
            (
                ClarkError::Config("bad key".to_string()),
                "Configuration error: bad key",
            ),
            (
                ClarkError::Api("bind failed".to_string()),
                "API error: bind failed",
            ),
            (
                ClarkError::Serialization("invalid json".to_string()),
                "Serialization error: invalid json",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing file");
        let err: ClarkError = io_err.into();
        match &err {
            ClarkError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            _ => panic!("Expected Io variant"),
        }
        assert!(err.to_string().starts_with("I/O error:"));
    }

    #[test]
    fn test_error_from_toml_de() {
        let err: std::result::Result<toml::Value, _> = toml::from_str("invalid = [[[");
        let clark_err: ClarkError = err.unwrap_err().into();
        assert!(matches!(clark_err, ClarkError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let err: std::result::Result<serde_json::Value, _> = serde_json::from_str("{ nope }");
        let clark_err: ClarkError = err.unwrap_err().into();
        assert!(matches!(clark_err, ClarkError::Serialization(_)));
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let value = io_result?;
            Ok(value.to_string())
        }

        assert_eq!(inner().unwrap(), "42");
    }
}

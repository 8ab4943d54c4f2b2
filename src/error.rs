use thiserror::Error;

/// Failures raised by a key-value store backend
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Everything the engine can run into. None of these are fatal to a session:
/// callers absorb them with a safe default and log them.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Persisted state under '{key}' is malformed: {source}")]
    MalformedPersistedState {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Goal target must be positive, got {0}")]
    InvalidGoalConfig(i64),

    #[error("Unknown language tag '{0}'")]
    UnknownLanguageTag(String),

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_error_messages_name_the_offender() {
        assert_eq!(
            EngineError::UnknownLanguageTag("xx".into()).to_string(),
            "Unknown language tag 'xx'"
        );
        assert_eq!(
            EngineError::InvalidGoalConfig(-3).to_string(),
            "Goal target must be positive, got -3"
        );
        assert_eq!(
            EngineError::DocumentNotFound("abc".into()).to_string(),
            "Document not found: abc"
        );
    }

    #[test]
    fn malformed_state_wraps_parse_error() {
        let source = serde_json::from_str::<Vec<u32>>("{nope").unwrap_err();
        let err = EngineError::MalformedPersistedState {
            key: "wc-documents".into(),
            source,
        };
        assert!(err.to_string().starts_with("Persisted state under 'wc-documents'"));
    }

    #[test]
    fn store_errors_convert_into_engine_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: EngineError = StoreError::from(io).into();
        assert!(matches!(err, EngineError::Store(StoreError::Io(_))));
    }

    #[test]
    fn serde_failures_are_store_serialization_errors() {
        let source = serde_json::from_str::<u32>("x").unwrap_err();
        let err = StoreError::from(source);
        assert!(matches!(err, StoreError::Serialization(_)));
        assert!(err.to_string().starts_with("Serialization error"));
    }
}

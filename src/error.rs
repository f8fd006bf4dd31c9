//! Crate-level error type.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, CatchLogError>;

/// Everything that can go wrong between reading a scraped file and
/// answering a statistics query.
#[derive(Error, Debug)]
pub enum CatchLogError {
    #[error("storage error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    /// Season bounds that are malformed or run backwards.
    #[error("invalid season: {0}")]
    InvalidSeason(String),

    /// A `[stats]` value outside its allowed range.
    #[error("invalid setting `{key}`: {message}")]
    InvalidSetting { key: &'static str, message: String },

    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// A record in an import file could not be parsed.
    #[error("import failed at line {line}: {message}")]
    Import { line: usize, message: String },

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("request exceeds {0} bytes")]
    PayloadTooLarge(usize),

    /// A store mutex was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    Poisoned,
}

impl CatchLogError {
    /// HTTP status code the web layer answers with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            CatchLogError::BadRequest(_)
            | CatchLogError::InvalidDate(_)
            | CatchLogError::InvalidSeason(_)
            | CatchLogError::Json(_)
            | CatchLogError::Import { .. } => 400,
            CatchLogError::PayloadTooLarge(_) => 413,
            _ => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_error_message_includes_line() {
        let err = CatchLogError::Import {
            line: 7,
            message: "missing field `weight`".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "import failed at line 7: missing field `weight`"
        );
    }

    #[test]
    fn test_status_code_client_errors() {
        assert_eq!(CatchLogError::BadRequest("x".into()).status_code(), 400);
        assert_eq!(CatchLogError::InvalidDate("x".into()).status_code(), 400);
        assert_eq!(CatchLogError::PayloadTooLarge(1).status_code(), 413);
    }

    #[test]
    fn test_status_code_server_errors() {
        assert_eq!(CatchLogError::Poisoned.status_code(), 500);
        let setting = CatchLogError::InvalidSetting {
            key: "week_length",
            message: "must be at least 1".into(),
        };
        assert_eq!(setting.status_code(), 500);
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk");
        assert_eq!(CatchLogError::from(io).status_code(), 500);
    }
}

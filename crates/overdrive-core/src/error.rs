//! Error types.
//!
//! Simulation steps never fail; missing entities and collaborators are
//! skipped. Errors only surface at the edges where a caller can act on them:
//! loading configuration, requesting an ability and storing the last score.

use thiserror::Error;

/// Configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid JSON or does not match the config schema.
    #[error("invalid simulation config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// An ability action was refused. No point was spent and nothing changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AbilityError {
    /// The score board has no ability points to spend.
    #[error("no ability points available")]
    NoAbilityPoints,
    /// The thing the upgrade acts on does not exist.
    #[error("cannot apply upgrade: no {0}")]
    MissingTarget(&'static str),
}

/// The last score could not be read or written.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The backing file could not be accessed.
    #[error("score store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// The stored document is not valid.
    #[error("score store is corrupt: {0}")]
    Format(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_readable() {
        assert_eq!(
            AbilityError::NoAbilityPoints.to_string(),
            "no ability points available"
        );
        assert_eq!(
            AbilityError::MissingTarget("player weapon").to_string(),
            "cannot apply upgrade: no player weapon"
        );
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: PersistenceError = io.into();
        assert!(matches!(err, PersistenceError::Io(_)));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn parse_errors_convert() {
        let err: ConfigError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(err.to_string().starts_with("invalid simulation config"));
    }
}

use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the x4miner library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Snapshot document could not be located at the resolved path.
    #[error("snapshot not found at {path}")]
    SnapshotNotFound { path: PathBuf },

    /// No suitable project directories could be resolved for this platform.
    #[error("failed to resolve project directories for the default snapshot location")]
    ProjectDirsUnavailable,

    /// Raised when a station code could not be found in the snapshot.
    #[error("unknown station code: {code}{}", format_suggestions(.suggestions))]
    UnknownStation {
        code: String,
        suggestions: Vec<String>,
    },

    /// Raised when a component id is referenced but not present in the tree.
    #[error("unknown component: {id}")]
    UnknownComponent { id: String },

    /// Raised when walking a component's parents revisits a component.
    #[error("placement chain for component {id} contains a cycle")]
    PlacementCycle { id: String },

    /// Raised when a query needs the player's location but the snapshot has none.
    #[error("snapshot does not contain a player location")]
    MissingPlayer,

    /// Raised when query parameters cannot be satisfied.
    #[error("invalid query: {message}")]
    InvalidQuery { message: String },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for snapshot decoding errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_station_lists_suggestions() {
        let err = Error::UnknownStation {
            code: "ABC-12".to_string(),
            suggestions: vec!["ABC-123".to_string(), "ABD-123".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "unknown station code: ABC-12. Did you mean one of: 'ABC-123', 'ABD-123'?"
        );
    }

    #[test]
    fn unknown_station_without_suggestions() {
        let err = Error::UnknownStation {
            code: "ZZZ-999".to_string(),
            suggestions: Vec::new(),
        };
        assert_eq!(err.to_string(), "unknown station code: ZZZ-999");
    }
}

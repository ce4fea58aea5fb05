//! Error types for study data access

use std::path::PathBuf;
use thiserror::Error;

/// Data access errors.
///
/// Every failure is terminal for the request that hit it; nothing here is
/// retried.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Data source not found: {}", path.display())]
    DataSourceNotFound { path: PathBuf },

    #[error("Study not found: {curated_study_number}")]
    StudyNotFound { curated_study_number: String },

    #[error("Column {column} missing from {table}")]
    MissingColumn { table: String, column: String },

    #[error("Could not decode column {column}: {reason}")]
    Decode { column: String, reason: String },

    #[error("Database error: {reason}")]
    Database { reason: String },
}

impl StoreError {
    /// Create a Database error from anything displayable.
    pub fn database(reason: impl std::fmt::Display) -> Self {
        Self::Database {
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for data access operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_source_not_found_display() {
        let err = StoreError::DataSourceNotFound {
            path: PathBuf::from("/srv/soc/soc_data/soc_data.db"),
        };
        let msg = err.to_string();
        assert!(msg.contains("Data source not found"));
        assert!(msg.contains("soc_data.db"));
    }

    #[test]
    fn test_study_not_found_display() {
        let err = StoreError::StudyNotFound {
            curated_study_number: "CS999".to_string(),
        };
        assert!(err.to_string().contains("CS999"));
        assert_eq!(
            StoreError::database("disk I/O error").to_string(),
            "Database error: disk I/O error"
        );
    }

    #[test]
    fn test_missing_column_display() {
        let err = StoreError::MissingColumn {
            table: "studies".to_string(),
            column: "study_number".to_string(),
        };
        assert_eq!(err.to_string(), "Column study_number missing from studies");
    }
}

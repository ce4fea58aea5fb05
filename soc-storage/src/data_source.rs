//! Scoped connections to the study database

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{Connection, OpenFlags};
use soc_core::{StoreError, StoreResult};

use crate::config::DbConfig;
use crate::db_error;

/// The on-disk study database.
///
/// A `DataSource` holds no connection. [`DataSource::open`] returns an owned
/// [`Connection`] that closes when dropped, so a caller scoping it to one
/// operation releases it on every exit path, errors included.
#[derive(Debug, Clone)]
pub struct DataSource {
    path: PathBuf,
    busy_timeout: Duration,
}

impl DataSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::from_config(&DbConfig::new(path))
    }

    pub fn from_config(config: &DbConfig) -> Self {
        Self {
            path: config.path.clone(),
            busy_timeout: config.busy_timeout,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Open a read-only connection.
    ///
    /// Fails with [`StoreError::DataSourceNotFound`] when the file is absent,
    /// rather than letting SQLite report a generic open failure.
    pub fn open(&self) -> StoreResult<Connection> {
        if !self.exists() {
            tracing::error!(path = %self.path.display(), "Study database not found");
            return Err(StoreError::DataSourceNotFound {
                path: self.path.clone(),
            });
        }

        let conn = Connection::open_with_flags(&self.path, open_flags()).map_err(db_error)?;
        conn.busy_timeout(self.busy_timeout).map_err(db_error)?;

        tracing::trace!(path = %self.path.display(), "Opened study database");
        Ok(conn)
    }
}

/// Read-only, plain file path. A `file:` prefix is part of the name, not a URI.
fn open_flags() -> OpenFlags {
    OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX
}

#[cfg(test)]
mod tests {
    use super::*;
    use soc_test_utils::FixtureDb;

    #[test]
    fn test_missing_file_is_data_source_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("soc_data").join("soc_data.db");
        let source = DataSource::new(&path);

        assert!(!source.exists());
        match source.open() {
            Err(StoreError::DataSourceNotFound { path: reported }) => assert_eq!(reported, path),
            other => panic!("expected DataSourceNotFound, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_directory_is_not_a_data_source() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = DataSource::new(dir.path());
        assert!(matches!(
            source.open(),
            Err(StoreError::DataSourceNotFound { .. })
        ));
    }

    #[test]
    fn test_paths_are_not_uris() {
        let flags = open_flags();
        assert!(flags.contains(OpenFlags::SQLITE_OPEN_READ_ONLY));
        assert!(!flags.contains(OpenFlags::SQLITE_OPEN_URI));
        assert!(!flags.contains(OpenFlags::SQLITE_OPEN_CREATE));
    }

    #[test]
    fn test_open_is_read_only() -> Result<(), Box<dyn std::error::Error>> {
        let fixture = FixtureDb::new()?;
        let source = DataSource::new(fixture.path());
        let conn = source.open()?;

        let write = conn.execute("DELETE FROM studies", []);
        assert!(write.is_err());
        Ok(())
    }
}

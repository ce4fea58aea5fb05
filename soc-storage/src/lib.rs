//! soc Storage - Study Database Access
//!
//! Read-only access to the pre-built SQLite study database:
//! - [`DbConfig`] resolves where the database file lives
//! - [`DataSource`] checks the file exists and hands out scoped connections
//! - [`row_mapper`] turns result rows into ordered [`Record`]s
//! - [`StudyStore`] is the query surface the HTTP layer talks to
//!
//! Every store call opens its own connection and closes it before returning.
//! Nothing is cached and nothing is written.

pub mod config;
pub mod data_source;
pub mod queries;
pub mod row_mapper;
pub mod store;

pub use config::{install_root, DbConfig};
pub use data_source::DataSource;
pub use row_mapper::{column_names, dictify_row, dictify_rows, RecordRows};
pub use store::{SqliteStudyStore, StudyStore};

pub use soc_core::{CuratedStudyNumber, Record, StoreError, StoreResult, StudyDetail};

/// Log a SQLite failure and convert it into a [`StoreError::Database`].
pub(crate) fn db_error(err: rusqlite::Error) -> StoreError {
    tracing::error!("SQLite error: {:?}", err);
    StoreError::database(err)
}

//! soc Core - Study Data Types
//!
//! Pure data structures with no I/O. The storage and API crates depend on this.
//! Rows coming out of the study database are carried as [`Record`]s: ordered
//! column-name to value mappings whose attributes are passed through untouched.

pub mod error;
pub mod record;
pub mod schema;
pub mod study;

pub use error::{StoreError, StoreResult};
pub use record::Record;
pub use study::{CuratedStudyNumber, StudyDetail};

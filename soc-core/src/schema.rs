//! Names in the study database
//!
//! The schema is built and populated elsewhere; these are the names code
//! outside the SQL text relies on.

pub const STUDIES: &str = "studies";

/// Externally visible study identifier, used in page URLs.
pub const CURATED_STUDY_NUMBER: &str = "curated_study_number";

/// Internal study key that every child table joins on.
pub const STUDY_NUMBER: &str = "study_number";

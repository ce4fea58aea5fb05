//! SQL issued against the study database
//!
//! Child queries are keyed by the internal `study_number`, never by the
//! curated number from the URL.

/// Every study, in the engine's natural scan order.
pub const SELECT_STUDIES: &str = "SELECT * FROM studies";

pub const SELECT_STUDY_BY_CURATED_NUMBER: &str =
    "SELECT * FROM studies WHERE curated_study_number = ?1";

pub const SELECT_TREATMENTS: &str =
    "SELECT * FROM treatments WHERE study_number = ?1 ORDER BY treatment_day";

pub const SELECT_MEASUREMENTS: &str =
    "SELECT * FROM measurements WHERE study_number = ?1 ORDER BY measurement_day";

pub const SELECT_ANIMALS: &str = "SELECT * FROM animals WHERE study_number = ?1";

/// Groups with their display color. A drug without a color row still yields
/// its group, with `color` NULL.
pub const SELECT_GROUP_LABELS: &str = r#"
SELECT g.group_name, g.is_control, g.drug, g.curated_group_name, g.recist, c.color
FROM "groups" AS g
LEFT JOIN colors AS c ON g.drug = c.drug
WHERE g.study_number = ?1
"#;

/// Cheapest statement that proves the file is a readable database.
pub const PING: &str = "SELECT count(*) FROM sqlite_master";

//! soc Test Utilities
//!
//! Centralized test infrastructure for the soc workspace:
//! - A throwaway study database laid out like a real install
//! - Proptest generators for study data
//! - Assertions over record sets

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};
use tempfile::TempDir;
use thiserror::Error;

pub use soc_core::{CuratedStudyNumber, Record, StoreError, StudyDetail};

/// Errors raised while building a fixture database.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type FixtureResult<T> = Result<T, FixtureError>;

// ============================================================================
// FIXTURE DATABASE
// ============================================================================

/// Study schema as the external pipeline builds it.
///
/// `curated_study_number` is declared before `study_number` on purpose: the
/// store must find the internal key by name, not by position.
pub const FIXTURE_SCHEMA: &str = r#"
CREATE TABLE studies (
    curated_study_number TEXT NOT NULL UNIQUE,
    study_number INTEGER PRIMARY KEY,
    curated_study_name TEXT,
    tumor_type TEXT
);
CREATE TABLE treatments (
    study_number INTEGER NOT NULL,
    group_name TEXT,
    treatment_day INTEGER,
    dose_activity TEXT,
    test_material_amount REAL,
    administration_route_units TEXT
);
CREATE TABLE measurements (
    study_number INTEGER NOT NULL,
    animal_name TEXT,
    group_name TEXT,
    measurement_day INTEGER,
    measurement_value REAL
);
CREATE TABLE animals (
    study_number INTEGER NOT NULL,
    animal_name TEXT,
    group_name TEXT
);
CREATE TABLE "groups" (
    study_number INTEGER NOT NULL,
    group_name TEXT,
    is_control INTEGER,
    drug TEXT,
    curated_group_name TEXT,
    recist TEXT
);
CREATE TABLE colors (
    drug TEXT,
    color TEXT
);
"#;

/// A study database in a temporary install root.
///
/// The file sits at `<root>/soc_data/soc_data.db`. The directory is removed
/// when the fixture is dropped.
pub struct FixtureDb {
    root: TempDir,
    path: PathBuf,
    conn: Connection,
}

impl FixtureDb {
    /// Create a database with [`FIXTURE_SCHEMA`] and no rows.
    pub fn new() -> FixtureResult<Self> {
        let fixture = Self::empty()?;
        fixture.conn.execute_batch(FIXTURE_SCHEMA)?;
        Ok(fixture)
    }

    /// Create a database file with no tables at all.
    pub fn empty() -> FixtureResult<Self> {
        let root = tempfile::tempdir()?;
        let data_dir = root.path().join("soc_data");
        std::fs::create_dir_all(&data_dir)?;
        let path = data_dir.join("soc_data.db");
        let conn = Connection::open(&path)?;
        Ok(Self { root, path, conn })
    }

    /// Install root containing `soc_data/`.
    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Database file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn execute_batch(&self, sql: &str) -> FixtureResult<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    pub fn insert_study(&self, study_number: i64, curated: &str) -> FixtureResult<()> {
        self.conn.execute(
            "INSERT INTO studies (curated_study_number, study_number, curated_study_name, tumor_type)
             VALUES (?1, ?2, ?3, ?4)",
            params![curated, study_number, format!("Study {}", curated), "NSCLC"],
        )?;
        Ok(())
    }

    pub fn insert_treatment(
        &self,
        study_number: i64,
        group_name: &str,
        treatment_day: i64,
    ) -> FixtureResult<()> {
        self.conn.execute(
            "INSERT INTO treatments
                 (study_number, group_name, treatment_day, dose_activity,
                  test_material_amount, administration_route_units)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![study_number, group_name, treatment_day, "dose", 10.0, "mg/kg"],
        )?;
        Ok(())
    }

    pub fn insert_measurement(
        &self,
        study_number: i64,
        animal_name: &str,
        group_name: &str,
        measurement_day: i64,
        measurement_value: f64,
    ) -> FixtureResult<()> {
        self.conn.execute(
            "INSERT INTO measurements
                 (study_number, animal_name, group_name, measurement_day, measurement_value)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![study_number, animal_name, group_name, measurement_day, measurement_value],
        )?;
        Ok(())
    }

    pub fn insert_animal(
        &self,
        study_number: i64,
        animal_name: &str,
        group_name: &str,
    ) -> FixtureResult<()> {
        self.conn.execute(
            "INSERT INTO animals (study_number, animal_name, group_name) VALUES (?1, ?2, ?3)",
            params![study_number, animal_name, group_name],
        )?;
        Ok(())
    }

    pub fn insert_group(
        &self,
        study_number: i64,
        group_name: &str,
        drug: &str,
        is_control: bool,
    ) -> FixtureResult<()> {
        self.conn.execute(
            r#"INSERT INTO "groups"
                   (study_number, group_name, is_control, drug, curated_group_name, recist)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
            params![
                study_number,
                group_name,
                is_control,
                drug,
                format!("{} ({})", group_name, drug),
                "PD"
            ],
        )?;
        Ok(())
    }

    pub fn insert_color(&self, drug: &str, color: &str) -> FixtureResult<()> {
        self.conn.execute(
            "INSERT INTO colors (drug, color) VALUES (?1, ?2)",
            params![drug, color],
        )?;
        Ok(())
    }

    /// One study with two groups, one of whose drugs has no color:
    /// - `CS001` → study number 7
    /// - treatments on days 3, 1, 2 (inserted in that order)
    /// - measurements on days 14, 0, 7
    /// - groups `DrugA` (red) and `DrugB` (no color row)
    pub fn with_sample_study() -> FixtureResult<Self> {
        let fixture = Self::new()?;
        fixture.insert_study(7, "CS001")?;

        for day in [3, 1, 2] {
            fixture.insert_treatment(7, "Treated", day)?;
        }
        for (day, value) in [(14, 310.5), (0, 98.0), (7, 180.25)] {
            fixture.insert_measurement(7, "A-1", "Treated", day, value)?;
        }
        fixture.insert_animal(7, "A-1", "Treated")?;
        fixture.insert_animal(7, "C-1", "Control")?;

        fixture.insert_group(7, "Treated", "DrugA", false)?;
        fixture.insert_group(7, "Control", "DrugB", true)?;
        fixture.insert_color("DrugA", "red")?;

        Ok(fixture)
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for study data.

    use proptest::prelude::*;

    /// Curated study numbers shaped like the ones in page URLs.
    pub fn arb_curated_study_number() -> impl Strategy<Value = String> {
        "[A-Z]{2}[0-9]{3,5}"
    }

    /// Study days, unordered, duplicates allowed.
    pub fn arb_days(max_len: usize) -> impl Strategy<Value = Vec<i64>> {
        prop::collection::vec(-7i64..120, 0..max_len)
    }

    /// Column names usable unquoted in SQL.
    pub fn arb_column_name() -> impl Strategy<Value = String> {
        "c_[a-z]{1,10}"
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions over record sets.

    use super::Record;

    /// Integer values of `column`, in record order.
    ///
    /// Panics when a record lacks the column or holds a non-integer there.
    pub fn int_column(records: &[Record], column: &str) -> Vec<i64> {
        records
            .iter()
            .map(|record| {
                record
                    .get(column)
                    .and_then(serde_json::Value::as_i64)
                    .unwrap_or_else(|| panic!("{} is not an integer column in {:?}", column, record))
            })
            .collect()
    }

    /// Assert `records` are ordered ascending by the integer `column`.
    pub fn assert_ascending_by(records: &[Record], column: &str) {
        let values = int_column(records, column);
        assert!(
            values.windows(2).all(|pair| pair[0] <= pair[1]),
            "{} not ascending: {:?}",
            column,
            values
        );
    }
}

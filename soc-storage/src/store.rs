//! Study store
//!
//! [`StudyStore`] is the seam between the HTTP layer and the database.
//! [`SqliteStudyStore`] implements it against the study database file.

use rusqlite::types::Value as SqlValue;
use rusqlite::{params, Connection, Params};
use soc_core::{schema, CuratedStudyNumber, Record, StoreError, StoreResult, StudyDetail};

use crate::config::DbConfig;
use crate::data_source::DataSource;
use crate::queries;
use crate::row_mapper::{column_names, dictify_row, dictify_rows};
use crate::db_error;

/// Read-only queries behind the study pages.
///
/// Calls are synchronous and independent; an implementation shares no
/// mutable state between them.
pub trait StudyStore: Send + Sync {
    /// All studies.
    fn list_studies(&self) -> StoreResult<Vec<Record>>;

    /// One study and its treatments, measurements, animals and group labels.
    ///
    /// Fails with [`StoreError::StudyNotFound`] when no study carries the
    /// curated number.
    fn study_detail(&self, curated: &CuratedStudyNumber) -> StoreResult<StudyDetail>;

    /// Check the data source can be opened and read.
    fn ping(&self) -> StoreResult<()>;
}

/// [`StudyStore`] over the SQLite study database.
///
/// Each call opens a connection, runs its queries and drops the connection
/// before returning.
#[derive(Debug, Clone)]
pub struct SqliteStudyStore {
    source: DataSource,
}

impl SqliteStudyStore {
    pub fn new(source: DataSource) -> Self {
        Self { source }
    }

    pub fn from_config(config: &DbConfig) -> Self {
        Self::new(DataSource::from_config(config))
    }
}

impl StudyStore for SqliteStudyStore {
    fn list_studies(&self) -> StoreResult<Vec<Record>> {
        let conn = self.source.open()?;
        let studies = fetch_all(&conn, queries::SELECT_STUDIES, [])?;
        tracing::debug!(count = studies.len(), "Listed studies");
        Ok(studies)
    }

    fn study_detail(&self, curated: &CuratedStudyNumber) -> StoreResult<StudyDetail> {
        let conn = self.source.open()?;
        // One read transaction so all five queries see the same snapshot.
        let tx = conn.unchecked_transaction().map_err(db_error)?;

        let (study, study_number) = find_study(&tx, curated)?;
        let treatments = fetch_all(&tx, queries::SELECT_TREATMENTS, params![study_number])?;
        let measurements = fetch_all(&tx, queries::SELECT_MEASUREMENTS, params![study_number])?;
        let animals = fetch_all(&tx, queries::SELECT_ANIMALS, params![study_number])?;
        let group_labels = fetch_all(&tx, queries::SELECT_GROUP_LABELS, params![study_number])?;

        tracing::debug!(
            curated_study_number = %curated,
            treatments = treatments.len(),
            measurements = measurements.len(),
            animals = animals.len(),
            group_labels = group_labels.len(),
            "Loaded study detail"
        );

        Ok(StudyDetail {
            study,
            treatments,
            measurements,
            animals,
            group_labels,
        })
    }

    fn ping(&self) -> StoreResult<()> {
        let conn = self.source.open()?;
        conn.query_row(queries::PING, [], |row| row.get::<_, i64>(0))
            .map_err(db_error)?;
        Ok(())
    }
}

/// Run `sql` and materialize every row.
fn fetch_all<P: Params>(conn: &Connection, sql: &str, params: P) -> StoreResult<Vec<Record>> {
    let mut stmt = conn.prepare(sql).map_err(db_error)?;
    let rows = dictify_rows(&mut stmt, params)?;
    let records = rows.collect::<StoreResult<Vec<_>>>()?;
    Ok(records)
}

/// Look up the study row and its internal `study_number`, read by name.
fn find_study(
    conn: &Connection,
    curated: &CuratedStudyNumber,
) -> StoreResult<(Record, SqlValue)> {
    let mut stmt = conn
        .prepare(queries::SELECT_STUDY_BY_CURATED_NUMBER)
        .map_err(db_error)?;
    let columns = column_names(&stmt);
    let mut rows = stmt.query([curated.as_str()]).map_err(db_error)?;

    let Some(row) = rows.next().map_err(db_error)? else {
        tracing::warn!(curated_study_number = %curated, "Study not found");
        return Err(StoreError::StudyNotFound {
            curated_study_number: curated.to_string(),
        });
    };

    let study_number = row
        .get::<_, SqlValue>(schema::STUDY_NUMBER)
        .map_err(|err| match err {
            rusqlite::Error::InvalidColumnName(_) => StoreError::MissingColumn {
                table: schema::STUDIES.to_string(),
                column: schema::STUDY_NUMBER.to_string(),
            },
            other => db_error(other),
        })?;
    let study = dictify_row(&columns, row)?;

    Ok((study, study_number))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use soc_test_utils::FixtureDb;

    fn store_for(fixture: &FixtureDb) -> SqliteStudyStore {
        SqliteStudyStore::new(DataSource::new(fixture.path()))
    }

    fn curated(value: &str) -> CuratedStudyNumber {
        CuratedStudyNumber::new(value).expect("non-empty curated number")
    }

    #[test]
    fn test_study_number_read_by_name() -> Result<(), Box<dyn std::error::Error>> {
        let fixture = FixtureDb::new()?;
        fixture.insert_study(7, "CS001")?;
        fixture.insert_treatment(7, "Control", 1)?;

        let detail = store_for(&fixture).study_detail(&curated("CS001"))?;

        // curated_study_number is declared ahead of study_number in the fixture schema
        let first_column = detail.study.columns().next();
        assert_eq!(first_column, Some("curated_study_number"));
        assert_eq!(detail.study.get("study_number"), Some(&json!(7)));
        assert_eq!(detail.treatments.len(), 1);
        Ok(())
    }

    #[test]
    fn test_missing_study_number_column() -> Result<(), Box<dyn std::error::Error>> {
        let fixture = FixtureDb::empty()?;
        fixture.execute_batch(
            "CREATE TABLE studies (curated_study_number TEXT, title TEXT);
             INSERT INTO studies VALUES ('CS001', 'no internal key');",
        )?;

        let result = store_for(&fixture).study_detail(&curated("CS001"));
        assert_eq!(
            result.err(),
            Some(StoreError::MissingColumn {
                table: "studies".to_string(),
                column: "study_number".to_string(),
            })
        );
        Ok(())
    }

    #[test]
    fn test_ping() -> Result<(), Box<dyn std::error::Error>> {
        let fixture = FixtureDb::new()?;
        store_for(&fixture).ping()?;

        let missing = SqliteStudyStore::new(DataSource::new(fixture.root().join("nope.db")));
        assert!(matches!(
            missing.ping(),
            Err(StoreError::DataSourceNotFound { .. })
        ));
        Ok(())
    }
}

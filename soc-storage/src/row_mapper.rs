//! Row to record mapping
//!
//! Keys come from the statement's column metadata, in declaration order.
//! Column names repeated by a query are not disambiguated: the later value
//! replaces the earlier one in the earlier position.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rusqlite::types::ValueRef;
use rusqlite::{Params, Row, Rows, Statement};
use serde_json::{Number, Value};
use soc_core::{Record, StoreError, StoreResult};

use crate::db_error;

/// Column names of a prepared statement, in declaration order.
pub fn column_names(stmt: &Statement<'_>) -> Vec<String> {
    stmt.column_names().into_iter().map(str::to_owned).collect()
}

/// Convert one row into a [`Record`] keyed by `columns`.
pub fn dictify_row(columns: &[String], row: &Row<'_>) -> StoreResult<Record> {
    let mut record = Record::with_capacity(columns.len());
    for (idx, column) in columns.iter().enumerate() {
        let value = row.get_ref(idx).map_err(db_error)?;
        record.insert(column.as_str(), to_json(column, value)?);
    }
    Ok(record)
}

/// Run `stmt` and map its rows lazily, one [`Record`] per row.
///
/// Rows are stepped only as the iterator is advanced. Step and decode
/// failures are yielded, after which the iterator is exhausted.
pub fn dictify_rows<'stmt, P: Params>(
    stmt: &'stmt mut Statement<'_>,
    params: P,
) -> StoreResult<RecordRows<'stmt>> {
    let columns = column_names(stmt);
    let rows = stmt.query(params).map_err(db_error)?;
    Ok(RecordRows {
        rows,
        columns,
        failed: false,
    })
}

/// Lazy sequence of records over an executing statement.
pub struct RecordRows<'stmt> {
    rows: Rows<'stmt>,
    columns: Vec<String>,
    failed: bool,
}

impl RecordRows<'_> {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

impl Iterator for RecordRows<'_> {
    type Item = StoreResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let item = match self.rows.next() {
            Ok(Some(row)) => dictify_row(&self.columns, row),
            Ok(None) => return None,
            Err(err) => Err(db_error(err)),
        };

        self.failed = item.is_err();
        Some(item)
    }
}

fn to_json(column: &str, value: ValueRef<'_>) -> StoreResult<Value> {
    match value {
        ValueRef::Null => Ok(Value::Null),
        ValueRef::Integer(value) => Ok(Value::from(value)),
        ValueRef::Real(value) => Ok(Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or(Value::Null)),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .map(|text| Value::String(text.to_owned()))
            .map_err(|err| StoreError::Decode {
                column: column.to_owned(),
                reason: err.to_string(),
            }),
        ValueRef::Blob(bytes) => Ok(Value::String(STANDARD.encode(bytes))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use serde_json::json;

    fn collect(conn: &Connection, sql: &str) -> StoreResult<Vec<Record>> {
        let mut stmt = conn.prepare(sql).map_err(db_error)?;
        let rows = dictify_rows(&mut stmt, [])?;
        let records = rows.collect::<StoreResult<Vec<_>>>()?;
        Ok(records)
    }

    #[test]
    fn test_keys_follow_select_order() -> Result<(), Box<dyn std::error::Error>> {
        let conn = Connection::open_in_memory()?;
        let records = collect(&conn, "SELECT 3 AS zeta, 'x' AS alpha, NULL AS mu")?;

        assert_eq!(records.len(), 1);
        let columns: Vec<&str> = records[0].columns().collect();
        assert_eq!(columns, vec!["zeta", "alpha", "mu"]);
        assert_eq!(records[0].get("zeta"), Some(&json!(3)));
        assert_eq!(records[0].get("alpha"), Some(&json!("x")));
        assert_eq!(records[0].get("mu"), Some(&Value::Null));
        Ok(())
    }

    #[test]
    fn test_duplicate_columns_last_wins() -> Result<(), Box<dyn std::error::Error>> {
        let conn = Connection::open_in_memory()?;
        let records = collect(&conn, "SELECT 'DrugA' AS drug, 'red' AS color, 'DrugB' AS drug")?;

        let columns: Vec<&str> = records[0].columns().collect();
        assert_eq!(columns, vec!["drug", "color"]);
        assert_eq!(records[0].get("drug"), Some(&json!("DrugB")));
        Ok(())
    }

    #[test]
    fn test_storage_classes() -> Result<(), Box<dyn std::error::Error>> {
        let conn = Connection::open_in_memory()?;
        let records = collect(&conn, "SELECT 1.5 AS real_value, x'00ff10' AS blob_value")?;

        assert_eq!(records[0].get("real_value"), Some(&json!(1.5)));
        assert_eq!(records[0].get("blob_value"), Some(&json!("AP8Q")));
        Ok(())
    }

    #[test]
    fn test_rows_keep_engine_order() -> Result<(), Box<dyn std::error::Error>> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "CREATE TABLE t (n INTEGER);
             INSERT INTO t VALUES (3);
             INSERT INTO t VALUES (1);
             INSERT INTO t VALUES (2);",
        )?;
        let records = collect(&conn, "SELECT n FROM t ORDER BY rowid")?;
        let values: Vec<&Value> = records.iter().filter_map(|r| r.get("n")).collect();
        assert_eq!(values, vec![&json!(3), &json!(1), &json!(2)]);
        Ok(())
    }

    #[test]
    fn test_invalid_utf8_is_decode_error() -> Result<(), Box<dyn std::error::Error>> {
        let conn = Connection::open_in_memory()?;
        let result = collect(&conn, "SELECT CAST(x'ff' AS TEXT) AS broken");

        match result {
            Err(StoreError::Decode { column, .. }) => assert_eq!(column, "broken"),
            other => panic!("expected decode error, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_empty_result() -> Result<(), Box<dyn std::error::Error>> {
        let conn = Connection::open_in_memory()?;
        let mut stmt = conn.prepare("SELECT 1 AS one WHERE 0")?;
        let rows = dictify_rows(&mut stmt, [])?;
        assert_eq!(rows.columns(), ["one".to_string()]);
        assert_eq!(rows.count(), 0);
        Ok(())
    }

    #[test]
    fn test_iteration_is_lazy() -> Result<(), Box<dyn std::error::Error>> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "CREATE TABLE t (n INTEGER);
             INSERT INTO t VALUES (1);
             INSERT INTO t VALUES (2);",
        )?;
        let mut stmt = conn.prepare("SELECT n FROM t ORDER BY n")?;
        let mut rows = dictify_rows(&mut stmt, [])?;

        let first = rows.next().transpose()?;
        assert_eq!(first.and_then(|r| r.get("n").cloned()), Some(json!(1)));
        drop(rows);
        Ok(())
    }
}

//! SQLite-backed [`Database`]

use std::path::Path;

use futures::future::BoxFuture;
use indexmap::IndexMap;
use parking_lot::Mutex;
use rusqlite::{params_from_iter, types::Value as SqlValue, Connection};
use tracing::debug;

use super::{Database, QueryResult, StorageError};
use crate::value::Value;

pub struct SqliteDatabase {
    conn: Mutex<Connection>,
}

impl SqliteDatabase {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Rows as a list of column maps; statements without result columns
    /// report `{ "changes": n }`
    fn run(&self, sql: &str, params: &[Value]) -> rusqlite::Result<Value> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(sql)?;
        let bound: Vec<SqlValue> = params.iter().map(to_sql).collect();

        if stmt.column_count() == 0 {
            let changes = stmt.execute(params_from_iter(bound.iter()))?;
            let mut result = IndexMap::new();
            result.insert("changes".to_string(), Value::Integer(changes as i64));
            return Ok(Value::Map(result));
        }

        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let mut rows = stmt.query(params_from_iter(bound.iter()))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = IndexMap::new();
            for (index, column) in columns.iter().enumerate() {
                let value: SqlValue = row.get(index)?;
                record.insert(column.clone(), from_sql(value));
            }
            out.push(Value::Map(record));
        }
        Ok(Value::List(out))
    }
}

impl Database for SqliteDatabase {
    fn query<'a>(&'a self, sql: &'a str, params: &'a [Value]) -> BoxFuture<'a, QueryResult> {
        Box::pin(async move {
            debug!(sql, params = params.len(), "Running query");
            match self.run(sql, params) {
                Ok(data) => QueryResult::ok(data),
                Err(e) => QueryResult::failed(e.to_string()),
            }
        })
    }
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Boolean(b) => SqlValue::Integer(i64::from(*b)),
        Value::Integer(i) => SqlValue::Integer(*i),
        Value::Float(f) => SqlValue::Real(*f),
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_display_string()),
    }
}

fn from_sql(value: SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(i) => Value::Integer(i),
        SqlValue::Real(f) => Value::Float(f),
        SqlValue::Text(s) => Value::String(s),
        SqlValue::Blob(bytes) => {
            Value::List(bytes.into_iter().map(|b| Value::Integer(i64::from(b))).collect())
        }
    }
}

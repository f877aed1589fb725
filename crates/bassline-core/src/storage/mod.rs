use futures::future::BoxFuture;

use crate::value::Value;

/// Storage-related errors
#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub mod sqlite;

pub use sqlite::SqliteDatabase;

/// Outcome of a query in the `{ data, error }` shape the `query` word expects
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub data: Option<Value>,
    pub error: Option<String>,
}

impl QueryResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Database reachable from scripts through `query`.
///
/// Failures are reported in [`QueryResult::error`] rather than as Rust
/// errors; the `query` word turns them into a panic.
pub trait Database: Send + Sync {
    fn query<'a>(&'a self, sql: &'a str, params: &'a [Value]) -> BoxFuture<'a, QueryResult>;
}

use std::cell::RefCell;
use std::path::PathBuf;

use rusqlite::{params_from_iter, Connection, OptionalExtension};
use tracing::{debug, warn};

use crate::error::{RecordError, StoreError};

pub use rusqlite::types::Value;

/// One result row. Columns are addressed by position, matching the SELECT list.
#[derive(Debug, Clone, PartialEq)]
pub struct Row(Vec<Value>);

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Row(values)
    }

    fn cell(&self, index: usize, expected: &'static str) -> Result<&Value, StoreError> {
        self.0.get(index).ok_or(StoreError::Decode { index, expected })
    }

    pub fn int(&self, index: usize) -> Result<i64, StoreError> {
        match self.cell(index, "integer")? {
            Value::Integer(v) => Ok(*v),
            _ => Err(StoreError::Decode {
                index,
                expected: "integer",
            }),
        }
    }

    pub fn opt_int(&self, index: usize) -> Result<Option<i64>, StoreError> {
        match self.cell(index, "integer or null")? {
            Value::Null => Ok(None),
            Value::Integer(v) => Ok(Some(*v)),
            _ => Err(StoreError::Decode {
                index,
                expected: "integer or null",
            }),
        }
    }

    /// Reads a numeric column as f64. INTEGER cells are widened.
    pub fn real(&self, index: usize) -> Result<f64, StoreError> {
        match self.cell(index, "real")? {
            Value::Real(v) => Ok(*v),
            Value::Integer(v) => Ok(*v as f64),
            _ => Err(StoreError::Decode {
                index,
                expected: "real",
            }),
        }
    }

    pub fn text(&self, index: usize) -> Result<String, StoreError> {
        match self.cell(index, "text")? {
            Value::Text(v) => Ok(v.clone()),
            _ => Err(StoreError::Decode {
                index,
                expected: "text",
            }),
        }
    }

    pub fn opt_text(&self, index: usize) -> Result<Option<String>, StoreError> {
        match self.cell(index, "text or null")? {
            Value::Null => Ok(None),
            Value::Text(v) => Ok(Some(v.clone())),
            _ => Err(StoreError::Decode {
                index,
                expected: "text or null",
            }),
        }
    }
}

/// The statement executor the repository and reports are written against.
///
/// Placeholders are `?`, bound left to right from `params`.
pub trait Store {
    /// Establishes the session. Calling it on an open session is a no-op.
    fn connect(&self) -> Result<(), StoreError>;

    /// Releases the session. Calling it on a closed session is a no-op.
    fn disconnect(&self);

    /// Runs a DDL/DML statement and returns the number of affected rows.
    fn execute(&self, sql: &str, params: &[Value]) -> Result<usize, StoreError>;

    fn query_all(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, StoreError>;

    fn query_one(&self, sql: &str, params: &[Value]) -> Result<Option<Row>, StoreError>;
}

/// Runs `f` inside one transaction: committed when it returns `Ok`, rolled back otherwise.
pub fn with_transaction<S, T>(
    store: &S,
    f: impl FnOnce() -> Result<T, RecordError>,
) -> Result<T, RecordError>
where
    S: Store + ?Sized,
{
    store.execute("BEGIN IMMEDIATE", &[])?;
    match f() {
        Ok(v) => match store.execute("COMMIT", &[]) {
            Ok(_) => Ok(v),
            Err(e) => {
                rollback(store);
                Err(e.into())
            }
        },
        Err(e) => {
            rollback(store);
            Err(e)
        }
    }
}

fn rollback<S: Store + ?Sized>(store: &S) {
    if let Err(rb) = store.execute("ROLLBACK", &[]) {
        warn!(error = %rb, "rollback failed");
    }
}

#[derive(Debug, Clone)]
enum Target {
    File(PathBuf),
    #[cfg(test)]
    Memory,
}

/// SQLite-backed store holding a single lazily opened connection.
pub struct SqliteStore {
    target: Target,
    conn: RefCell<Option<Connection>>,
}

impl SqliteStore {
    pub fn open_file(path: impl Into<PathBuf>) -> Self {
        Self {
            target: Target::File(path.into()),
            conn: RefCell::new(None),
        }
    }

    /// Private in-memory database. Contents are dropped on `disconnect`.
    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self {
            target: Target::Memory,
            conn: RefCell::new(None),
        }
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T, StoreError> {
        self.connect()?;
        let guard = self.conn.borrow();
        let conn = guard
            .as_ref()
            .ok_or_else(|| StoreError::Open("connection unavailable".into()))?;
        f(conn).map_err(StoreError::from)
    }
}

impl Store for SqliteStore {
    fn connect(&self) -> Result<(), StoreError> {
        if self.conn.borrow().is_some() {
            return Ok(());
        }
        let conn = match &self.target {
            Target::File(path) => Connection::open(path),
            #[cfg(test)]
            Target::Memory => Connection::open_in_memory(),
        }
        .map_err(|e| StoreError::Open(e.to_string()))?;
        conn.execute("PRAGMA foreign_keys = ON", [])
            .map_err(|e| StoreError::Open(e.to_string()))?;
        debug!(target_db = ?self.target, "store connected");
        *self.conn.borrow_mut() = Some(conn);
        Ok(())
    }

    fn disconnect(&self) {
        if let Some(conn) = self.conn.borrow_mut().take() {
            if let Err((_, e)) = conn.close() {
                warn!(error = %e, "error closing store");
            }
            debug!("store disconnected");
        }
    }

    fn execute(&self, sql: &str, params: &[Value]) -> Result<usize, StoreError> {
        debug!(sql, params = params.len(), "execute");
        self.with_conn(|conn| conn.execute(sql, params_from_iter(params.iter())))
    }

    fn query_all(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, StoreError> {
        debug!(sql, params = params.len(), "query_all");
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let width = stmt.column_count();
            let rows = stmt
                .query_map(params_from_iter(params.iter()), |r| {
                    (0..width)
                        .map(|i| r.get::<_, Value>(i))
                        .collect::<Result<Vec<_>, _>>()
                        .map(Row::new)
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    fn query_one(&self, sql: &str, params: &[Value]) -> Result<Option<Row>, StoreError> {
        debug!(sql, params = params.len(), "query_one");
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let width = stmt.column_count();
            stmt.query_row(params_from_iter(params.iter()), |r| {
                (0..width)
                    .map(|i| r.get::<_, Value>(i))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Row::new)
            })
            .optional()
        })
    }
}

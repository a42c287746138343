use crate::contract::weather_schema;
use crate::error::{ProviderError, Result};
use crate::operation::{CreateOperation, ReadOperation, RowSet, Value};
use crate::schema::Schema;
use rusqlite::{params_from_iter, Connection};
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Row id a backend reports when it accepted the statement but wrote nothing.
pub const REJECTED_ROW_ID: i64 = -1;

/// Relational store the provider reads from and writes to.
///
/// Every call is a single statement that runs to completion before it
/// returns; serializing concurrent callers is the implementation's job.
pub trait Backend: Send + Sync {
    fn query(&self, operation: &ReadOperation) -> Result<RowSet>;

    /// Insert one row and return its id, or a non-positive id when the
    /// store declined to write it.
    fn insert(&self, operation: &CreateOperation) -> Result<i64>;
}

/// SQLite backend configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqliteConfig {
    /// Path to the SQLite database file, or `:memory:`
    pub db_path: String,
    /// Schema definition for the database
    #[serde(default = "weather_schema")]
    pub schema: Schema,
    /// Have SQLite enforce declared foreign keys
    #[serde(default = "enforce_foreign_keys_default")]
    pub enforce_foreign_keys: bool,
}

fn enforce_foreign_keys_default() -> bool {
    true
}

pub const MEMORY_PATH: &str = ":memory:";
pub const DB_PATH_ENV: &str = "WEATHER_DB_PATH";

impl SqliteConfig {
    /// Create a new SQLite config with path and schema
    pub fn new(db_path: impl Into<String>, schema: Schema) -> Self {
        Self {
            db_path: db_path.into(),
            schema,
            enforce_foreign_keys: true,
        }
    }

    pub fn in_memory(schema: Schema) -> Self {
        Self::new(MEMORY_PATH, schema)
    }

    /// Weather schema at the path named by `WEATHER_DB_PATH`, if set.
    pub fn from_env() -> Option<Self> {
        let db_path = env::var(DB_PATH_ENV).ok()?;
        Some(Self::new(db_path, weather_schema()))
    }

    pub fn with_foreign_keys(mut self, enforce: bool) -> Self {
        self.enforce_foreign_keys = enforce;
        self
    }
}

/// An open SQLite connection shared by all callers of one provider.
///
/// Opening creates the configured schema; [`SqliteBackend::close`] releases
/// the connection. Dropping the backend closes it as well, discarding errors.
pub struct SqliteBackend {
    config: SqliteConfig,
    connection: Mutex<Connection>,
}

impl SqliteBackend {
    pub fn open(config: SqliteConfig) -> Result<Self> {
        log::info!("opening sqlite backend at path: {}", config.db_path);
        let connection = if config.db_path == MEMORY_PATH {
            Connection::open_in_memory()?
        } else {
            Connection::open(&config.db_path)?
        };
        // bundled builds may default this on, so set it either way
        connection.pragma_update(None, "foreign_keys", config.enforce_foreign_keys)?;
        config.schema.initialize(&connection)?;
        Ok(Self {
            config,
            connection: Mutex::new(connection),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::open(SqliteConfig::in_memory(weather_schema()))
    }

    pub fn config(&self) -> &SqliteConfig {
        &self.config
    }

    pub fn close(self) -> Result<()> {
        log::info!("closing sqlite backend at path: {}", self.config.db_path);
        let connection = self
            .connection
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        connection
            .close()
            .map_err(|(_, why)| ProviderError::from(why))
    }

    /// Run `f` against the underlying connection while holding its lock.
    pub fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T> {
        Ok(f(&self.lock())?)
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.connection.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Backend for SqliteBackend {
    fn query(&self, operation: &ReadOperation) -> Result<RowSet> {
        let sql = operation.to_sql();
        log::debug!("{} {:?}", sql.statement, sql.params);

        let conn = self.lock();
        let mut stmt = conn.prepare(&sql.statement)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();
        let rows = stmt
            .query_map(params_from_iter(sql.params.iter()), |row| {
                (0..width).map(|i| row.get::<_, Value>(i)).collect()
            })?
            .collect::<rusqlite::Result<Vec<Vec<Value>>>>()?;
        Ok(RowSet { columns, rows })
    }

    fn insert(&self, operation: &CreateOperation) -> Result<i64> {
        let sql = operation.to_sql();
        log::debug!("{} {:?}", sql.statement, sql.params);

        let conn = self.lock();
        let changed = conn.execute(&sql.statement, params_from_iter(sql.params.iter()))?;
        if changed == 0 {
            // a conflict clause swallowed the row
            return Ok(REJECTED_ROW_ID);
        }
        Ok(conn.last_insert_rowid())
    }
}

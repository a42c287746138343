//! URI-addressed query and insert routing over the location/weather store.
//!
//! # Intention
//!
//! - Resolve `content://{authority}/...` URIs to one of five read strategies
//!   against the `location` and `weather` tables, and to inserts on the two
//!   base collections.
//! - Keep SQLite-specific logic, types, and error handling behind the
//!   [`sqlite::Backend`] trait.
//!
//! # Architectural Boundaries
//!
//! - Only routing, schema and SQLite code belongs here.
//! - The backend handle is opened and closed by the caller and handed to the
//!   provider; there is no process-wide connection.
//! - Observers of changed data sit behind [`notify::ChangeNotifier`].

pub mod contract;
pub mod error;
pub mod notify;
pub mod operation;
pub mod provider;
pub mod route;
pub mod schema;
pub mod sqlite;

pub use contract::{ContentKind, ContentType, ContentUris, LocationEntry, Resource, WeatherEntry};
pub use error::{ProviderError, Result};
pub use notify::{ChangeEvent, ChangeNotifier, NoopNotifier, ObserverRegistry};
pub use operation::{ColumnValues, RowSet, Selection, Value};
pub use provider::{ProviderConfig, QueryArgs, WeatherProvider};
pub use route::Route;
pub use sqlite::{Backend, SqliteBackend, SqliteConfig};

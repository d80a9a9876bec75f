pub mod loader;
pub mod models;
pub mod sqlite;

pub use loader::{load_table, LoadError};
pub use models::{ColumnType, DataTable, LoadRequest};
pub use sqlite::Database;

pub mod annotation;
pub mod config;
pub mod dates;
pub mod error;
pub mod increments;
pub mod nodes;
pub mod reconcile;
pub mod roots;
pub mod serial;
pub mod storage;
pub mod table;

pub use crate::config::AppConfig;
pub use error::Error;
pub use reconcile::{build_filenames, Reconciliation, UserIds};
pub use roots::{derive_roots, FileRoots};

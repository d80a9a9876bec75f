use thiserror::Error;

use crate::annotation::AnnotationError;
use crate::storage::loader::LoadError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Annotation error: {0}")]
    Annotation(#[from] AnnotationError),

    #[error("Load error: {0}")]
    Load(#[from] LoadError),
}

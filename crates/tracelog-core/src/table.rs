use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One tracing file, as listed in the per-file node table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    #[serde(alias = "cellname")]
    pub cell_name: String,
    #[serde(alias = "filename")]
    pub file_name: String,
    pub id: i64,
    pub num_nodes: i64,
    pub time_ms: i64,
    /// Groups the files traced from the same cell.
    pub cell_id: i64,
    pub file_id: i64,
}

/// One line of the hand-typed activity sheet, e.g.
/// `878_067_GM(Adriane),rh,3/09/16,118-121`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserActivityRecord {
    /// Must match a `cell_name` in the file table.
    pub cell_name: String,
    pub user_name: String,
    pub date: String,
    /// Serial number or inclusive range of serials, e.g. `118-121`.
    pub files: String,
}

/// A tracing file attributed to the user who worked on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledFileRecord {
    pub cell_name: String,
    pub file_name: String,
    pub date: String,
    pub user_name: String,
    pub user_id: i64,
    pub cell_id: i64,
    pub file_id: i64,
}

/// A file record with its growth since the previous file of the same cell.
///
/// Fields are spelled out rather than flattened; the csv writer cannot
/// serialize nested maps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncrementRecord {
    pub cell_name: String,
    pub file_name: String,
    pub id: i64,
    pub num_nodes: i64,
    pub time_ms: i64,
    pub cell_id: i64,
    pub file_id: i64,
    pub nodes_added: i64,
    pub time_elapsed_ms: i64,
}

impl IncrementRecord {
    pub fn new(file: &FileRecord, nodes_added: i64, time_elapsed_ms: i64) -> Self {
        Self {
            cell_name: file.cell_name.clone(),
            file_name: file.file_name.clone(),
            id: file.id,
            num_nodes: file.num_nodes,
            time_ms: file.time_ms,
            cell_id: file.cell_id,
            file_id: file.file_id,
            nodes_added,
            time_elapsed_ms,
        }
    }
}

fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, crate::Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
    let records = reader
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()?;
    debug!("Read {} rows from {}", records.len(), path.display());
    Ok(records)
}

fn write_records<T: Serialize>(records: &[T], path: &Path) -> Result<(), crate::Error> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    debug!("Wrote {} rows to {}", records.len(), path.display());
    Ok(())
}

pub fn read_file_records(path: &Path) -> Result<Vec<FileRecord>, crate::Error> {
    read_records(path)
}

pub fn read_user_activity(path: &Path) -> Result<Vec<UserActivityRecord>, crate::Error> {
    read_records(path)
}

pub fn write_reconciled(records: &[ReconciledFileRecord], path: &Path) -> Result<(), crate::Error> {
    write_records(records, path)
}

pub fn write_increments(records: &[IncrementRecord], path: &Path) -> Result<(), crate::Error> {
    write_records(records, path)
}

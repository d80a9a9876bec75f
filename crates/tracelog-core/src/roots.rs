use std::collections::HashMap;

use tracing::{info, warn};

use crate::table::FileRecord;

/// Target files are never logged, so their names can't serve as a root.
pub const DEFAULT_EXCLUDED_MARKER: &str = "target";

/// Common filename stem and extension of every cell, keyed by cell name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileRoots {
    pub roots: HashMap<String, String>,
    pub extensions: HashMap<String, String>,
    /// Cell ids in `0..=max` for which no root could be picked.
    pub unresolved: Vec<i64>,
}

impl FileRoots {
    pub fn root(&self, cell_name: &str) -> Option<&str> {
        self.roots.get(cell_name).map(String::as_str)
    }

    pub fn extension(&self, cell_name: &str) -> Option<&str> {
        self.extensions.get(cell_name).map(String::as_str)
    }

    /// Filename for serial `serial` of `cell_name`: `<root>.<serial>.<ext>`.
    pub fn file_name(&self, cell_name: &str, serial: &str) -> Option<String> {
        Some(format!(
            "{}.{}.{}",
            self.root(cell_name)?,
            serial,
            self.extension(cell_name)?
        ))
    }
}

/// Split a filename into its stem (before the first `.`) and extension
/// (after the last `.`).
fn split_file_name(file_name: &str) -> (&str, &str) {
    let stem = file_name.split('.').next().unwrap_or(file_name);
    let ext = file_name.rsplit('.').next().unwrap_or(file_name);
    (stem, ext)
}

/// Pick a root and extension for every cell.
///
/// Groups are visited by `cell_id` from 0 to the largest id present. Within a
/// group rows keep table order and the first stem not containing `excluded`
/// wins. A cell name resolved by an earlier group keeps its first root.
pub fn derive_roots(records: &[FileRecord], excluded: &str) -> FileRoots {
    let mut result = FileRoots::default();
    let Some(max_cell_id) = records.iter().map(|r| r.cell_id).max() else {
        return result;
    };

    for cell_id in 0..=max_cell_id {
        let picked = records
            .iter()
            .filter(|r| r.cell_id == cell_id)
            .find(|r| !split_file_name(&r.file_name).0.contains(excluded));

        let Some(record) = picked else {
            warn!("No usable root for cell id {}", cell_id);
            result.unresolved.push(cell_id);
            continue;
        };

        if result.roots.contains_key(&record.cell_name) {
            continue;
        }
        let (stem, ext) = split_file_name(&record.file_name);
        result
            .roots
            .insert(record.cell_name.clone(), stem.to_string());
        result
            .extensions
            .insert(record.cell_name.clone(), ext.to_string());
    }

    info!(
        "Got all {} roots (and {} extensions)",
        result.roots.len(),
        result.extensions.len()
    );
    result
}

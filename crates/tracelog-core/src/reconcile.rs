use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::roots::FileRoots;
use crate::serial::{self, SerialError};
use crate::table::{FileRecord, ReconciledFileRecord, UserActivityRecord};

/// Dense user ids handed out in first-seen order, starting at 0.
#[derive(Debug, Clone, Default)]
pub struct UserIds {
    ids: HashMap<String, i64>,
}

impl UserIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id for `user_name`, assigning the next one if the name is new.
    pub fn id_for(&mut self, user_name: &str) -> i64 {
        let next = self.ids.len() as i64;
        *self.ids.entry(user_name.to_string()).or_insert(next)
    }

    pub fn get(&self, user_name: &str) -> Option<i64> {
        self.ids.get(user_name).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Why an activity row, or one of its files, was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileMiss {
    /// The row's serial field could not be expanded.
    BadSerial { row: usize, error: SerialError },
    /// No root is known for the row's cell.
    UnknownCell { row: usize, cell_name: String },
    /// The derived filename is not in the file table.
    NoMatch { row: usize, file_name: String },
}

#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    pub records: Vec<ReconciledFileRecord>,
    pub misses: Vec<ReconcileMiss>,
}

/// Attribute tracing files to the users listed in the activity sheet.
///
/// Output keeps activity-row order, then ascending serial order within a
/// row. `user_ids` may be shared across calls to keep ids stable.
pub fn build_filenames(
    files: &[FileRecord],
    users: &[UserActivityRecord],
    roots: &FileRoots,
    user_ids: &mut UserIds,
) -> Reconciliation {
    let mut by_name: HashMap<&str, &FileRecord> = HashMap::new();
    for file in files {
        by_name.entry(file.file_name.as_str()).or_insert(file);
    }

    let mut result = Reconciliation::default();

    for (row, activity) in users.iter().enumerate() {
        let serials = match serial::parse_serials(&activity.files) {
            Ok(serials) => serials,
            Err(error) => {
                warn!("Row {}: could not expand '{}': {}", row, activity.files, error);
                result.misses.push(ReconcileMiss::BadSerial { row, error });
                continue;
            }
        };

        if roots.root(&activity.cell_name).is_none() {
            warn!("Row {}: no root known for cell {}", row, activity.cell_name);
            result.misses.push(ReconcileMiss::UnknownCell {
                row,
                cell_name: activity.cell_name.clone(),
            });
            continue;
        }

        for serial in &serials {
            let Some(file_name) = roots.file_name(&activity.cell_name, serial) else {
                continue;
            };
            let Some(file) = by_name.get(file_name.as_str()) else {
                warn!("Could not find a match for {}", file_name);
                result.misses.push(ReconcileMiss::NoMatch { row, file_name });
                continue;
            };

            let user_id = user_ids.id_for(&activity.user_name);
            debug!("{} -> {} (user {})", file_name, activity.user_name, user_id);
            result.records.push(ReconciledFileRecord {
                cell_name: activity.cell_name.clone(),
                file_name,
                date: activity.date.clone(),
                user_name: activity.user_name.clone(),
                user_id,
                cell_id: file.cell_id,
                file_id: file.file_id,
            });
        }
    }

    info!(
        "Reconciled {} files for {} users ({} misses)",
        result.records.len(),
        user_ids.len(),
        result.misses.len()
    );
    result
}

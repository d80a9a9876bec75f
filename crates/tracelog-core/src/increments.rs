use crate::table::{FileRecord, IncrementRecord};

/// Per-file growth, parallel to the input rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Increments {
    pub nodes_added: Vec<i64>,
    pub time_elapsed_ms: Vec<i64>,
}

/// Nodes and time added by each file relative to the previous file of the
/// same cell.
///
/// Rows are taken in table order and a group is a run of consecutive rows
/// with the same cell name. The first file of a group reports its absolute
/// node count and zero elapsed time.
pub fn nodes_added(records: &[FileRecord]) -> Increments {
    let mut result = Increments {
        nodes_added: Vec::with_capacity(records.len()),
        time_elapsed_ms: Vec::with_capacity(records.len()),
    };
    let mut previous: Option<&FileRecord> = None;

    for record in records {
        match previous {
            Some(prev) if prev.cell_name == record.cell_name => {
                result.nodes_added.push(record.num_nodes - prev.num_nodes);
                result.time_elapsed_ms.push(record.time_ms - prev.time_ms);
            }
            _ => {
                result.nodes_added.push(record.num_nodes);
                result.time_elapsed_ms.push(0);
            }
        }
        previous = Some(record);
    }

    result
}

/// Zip the increments back onto their file records.
pub fn increment_records(records: &[FileRecord]) -> Vec<IncrementRecord> {
    let increments = nodes_added(records);
    records
        .iter()
        .zip(increments.nodes_added)
        .zip(increments.time_elapsed_ms)
        .map(|((file, nodes), time)| IncrementRecord::new(file, nodes, time))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(cell_name: &str, num_nodes: i64, time_ms: i64) -> FileRecord {
        FileRecord {
            cell_name: cell_name.to_string(),
            file_name: format!("{}.nml", cell_name),
            id: 0,
            num_nodes,
            time_ms,
            cell_id: 0,
            file_id: 0,
        }
    }

    #[test]
    fn test_deltas_within_group() {
        let records = vec![record("A", 10, 1000), record("A", 25, 4000), record("B", 5, 700)];
        let inc = nodes_added(&records);
        assert_eq!(inc.nodes_added, vec![10, 15, 5]);
        assert_eq!(inc.time_elapsed_ms, vec![0, 3000, 0]);
    }

    #[test]
    fn test_returning_cell_starts_a_new_group() {
        let records = vec![record("A", 10, 100), record("B", 5, 50), record("A", 30, 400)];
        let inc = nodes_added(&records);
        assert_eq!(inc.nodes_added, vec![10, 5, 30]);
        assert_eq!(inc.time_elapsed_ms, vec![0, 0, 0]);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(nodes_added(&[]), Increments::default());
    }

    #[test]
    fn test_increment_records_keep_file_fields() {
        let records = vec![record("A", 10, 100), record("A", 12, 160)];
        let rows = increment_records(&records);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].file_name, "A.nml");
        assert_eq!(rows[1].nodes_added, 2);
        assert_eq!(rows[1].time_elapsed_ms, 60);
    }
}

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::annotation::{lossy_lines, AnnotationError};

const NODE_PATTERN: &str = "node id";

/// One traced node: `<node id="1" radius="1.5" x="4" y="9" z="6" inVp="0" inMag="1" time="243215762"/>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NodeTuple {
    pub id: i64,
    pub x: i64,
    pub y: i64,
    pub z: i64,
    pub time: i64,
    /// Filled in by later image lookups; always 0 when read from the file.
    pub intensity: i64,
}

/// Parse a node line by its quote-delimited positions.
pub fn parse_node_line(line: &str) -> Option<NodeTuple> {
    let fields: Vec<&str> = line.split('"').collect();
    let field = |i: usize| -> Option<i64> { fields.get(i)?.trim().parse().ok() };

    Some(NodeTuple {
        id: field(1)?,
        x: field(5)?,
        y: field(7)?,
        z: field(9)?,
        time: field(15)?,
        intensity: 0,
    })
}

/// Collect every node of an annotation, in file order.
pub fn read_node_tuples(path: &Path) -> Result<Vec<NodeTuple>, crate::Error> {
    let reader = BufReader::new(File::open(path)?);
    let mut tuples = Vec::new();

    for (idx, line) in lossy_lines(reader).enumerate() {
        let line = line?;
        if !line.contains(NODE_PATTERN) {
            continue;
        }
        let tuple = parse_node_line(&line).ok_or_else(|| AnnotationError::MalformedNode {
            path: path.to_path_buf(),
            line: idx + 1,
        })?;
        tuples.push(tuple);
    }

    debug!("{}: {} node tuples", path.display(), tuples.len());
    Ok(tuples)
}

/// Write tuples as CSV with an `id,x,y,z,time,intensity` header.
pub fn write_node_tuples(tuples: &[NodeTuple], out: &Path) -> Result<(), crate::Error> {
    let mut writer = csv::Writer::from_path(out)?;
    for tuple in tuples {
        writer.serialize(tuple)?;
    }
    writer.flush()?;
    Ok(())
}

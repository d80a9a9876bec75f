use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

const TIME_MARKER: &str = "<time ms";
const ACTIVE_NODE_MARKER: &str = "<activeNode id";

/// The two scalars the log keeps for every tracing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotationProperties {
    /// Id of the active node; nodes are numbered in creation order, so this
    /// doubles as the node count.
    pub num_nodes: i64,
    pub time_ms: i64,
}

#[derive(Error, Debug)]
pub enum AnnotationError {
    #[error("{path}: reached end of file without {missing} (time_ms: {time_ms:?}, num_nodes: {num_nodes:?})")]
    MissingMarker {
        path: PathBuf,
        missing: &'static str,
        num_nodes: Option<i64>,
        time_ms: Option<i64>,
    },

    #[error("{path}:{line}: malformed node line")]
    MalformedNode { path: PathBuf, line: usize },

    #[error("{0}: not an nml/xml file")]
    NotAnnotationFile(PathBuf),
}

/// Crude extension check: accepts anything whose path mentions `ml`.
pub fn is_annotation_path(path: &Path) -> bool {
    path.to_string_lossy().contains("ml")
}

pub fn ensure_annotation_path(path: &Path) -> Result<(), AnnotationError> {
    if is_annotation_path(path) {
        Ok(())
    } else {
        Err(AnnotationError::NotAnnotationFile(path.to_path_buf()))
    }
}

/// Payload of a marker line: the first quoted value after `=`.
fn marker_value(line: &str, marker: &str) -> Option<i64> {
    let (key, _) = line.trim().split_once('=')?;
    if key != marker {
        return None;
    }
    line.split('"').nth(1)?.trim().parse().ok()
}

/// Lines of `reader`, with undecodable bytes replaced rather than failing the read.
pub(crate) fn lossy_lines<R: BufRead>(reader: R) -> impl Iterator<Item = io::Result<String>> {
    reader.split(b'\n').map(|line| {
        line.map(|bytes| {
            String::from_utf8_lossy(&bytes)
                .trim_end_matches('\r')
                .to_string()
        })
    })
}

/// Scan an annotation for the elapsed time and active node id.
///
/// The first parseable occurrence of each marker wins and reading stops as
/// soon as both are known.
pub fn read_properties(path: &Path) -> Result<AnnotationProperties, crate::Error> {
    let reader = BufReader::new(File::open(path)?);
    let mut num_nodes: Option<i64> = None;
    let mut time_ms: Option<i64> = None;

    for line in lossy_lines(reader) {
        let line = line?;
        if time_ms.is_none() {
            time_ms = marker_value(&line, TIME_MARKER);
        }
        if num_nodes.is_none() {
            num_nodes = marker_value(&line, ACTIVE_NODE_MARKER);
        }
        if let (Some(num_nodes), Some(time_ms)) = (num_nodes, time_ms) {
            debug!("{}: {} nodes, {} ms", path.display(), num_nodes, time_ms);
            return Ok(AnnotationProperties { num_nodes, time_ms });
        }
    }

    let missing = match (num_nodes, time_ms) {
        (None, None) => "a time or active node marker",
        (None, Some(_)) => "an active node marker",
        _ => "a time marker",
    };
    Err(AnnotationError::MissingMarker {
        path: path.to_path_buf(),
        missing,
        num_nodes,
        time_ms,
    }
    .into())
}

/// Format one log record: `path,num_nodes,time_ms`.
pub fn log_line(path: &Path, props: &AnnotationProperties) -> String {
    format!("{},{},{}", path.display(), props.num_nodes, props.time_ms)
}

/// Read `path` and append its record to `log_path`, creating the log if needed.
///
/// Nothing is written when the annotation is missing either marker.
pub fn append_to_log(path: &Path, log_path: &Path) -> Result<AnnotationProperties, crate::Error> {
    let props = read_properties(path)?;
    let mut log = OpenOptions::new().append(true).create(true).open(log_path)?;
    writeln!(log, "{}", log_line(path, &props))?;
    Ok(props)
}

/// Outcome of appending every annotation under a directory.
#[derive(Debug, Default)]
pub struct DirectoryAppend {
    pub appended: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, crate::Error)>,
}

/// Walk `dir` (sorted by file name, following symlinks) and append every file
/// whose extension is in `extensions`. An entry that cannot be visited or read
/// is recorded and skipped; only an unreadable `dir` itself is an error.
pub fn append_directory(
    dir: &Path,
    log_path: &Path,
    extensions: &[String],
) -> Result<DirectoryAppend, crate::Error> {
    let extensions = crate::config::normalized_extensions(extensions);
    let mut outcome = DirectoryAppend::default();

    for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => return Err(io::Error::from(err).into()),
            Err(err) => {
                let path = err.path().unwrap_or(dir).to_path_buf();
                warn!("Skipping {}: {}", path.display(), err);
                outcome.failed.push((path, io::Error::from(err).into()));
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let matches = path
            .extension()
            .map(|ext| extensions.contains(&ext.to_string_lossy().to_lowercase()))
            .unwrap_or(false);
        if !matches {
            continue;
        }

        match append_to_log(path, log_path) {
            Ok(_) => outcome.appended.push(path.to_path_buf()),
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                outcome.failed.push((path.to_path_buf(), e));
            }
        }
    }

    info!(
        "Appended {} annotation files from {} ({} failed)",
        outcome.appended.len(),
        dir.display(),
        outcome.failed.len()
    );
    Ok(outcome)
}

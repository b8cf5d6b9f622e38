use log::{info, warn};
use snafu::prelude::*;

use std::fs;
use std::path::Path;

use crate::tally::*;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Relative paths are taken from the directory of the configuration file.
pub fn resolve_path(root: &Path, path: &str) -> String {
    if path == "stdout" || Path::new(path).is_absolute() {
        path.to_string()
    } else {
        root.join(path).display().to_string()
    }
}

fn partial_path(path: &str) -> String {
    format!("{}.partial", path)
}

fn discard(staged: &[String]) {
    for p in staged.iter() {
        if let Err(e) = fs::remove_file(p) {
            warn!("discard: could not remove {}: {}", p, e);
        }
    }
}

/// Writes every output, or leaves the destination files untouched.
///
/// Each file is first written next to its destination and only renamed once all of
/// them are on disk. Outputs sent to 'stdout' are printed last.
pub fn write_outputs(outputs: &[(String, &str)]) -> TallyResult<()> {
    let files: Vec<&(String, &str)> = outputs.iter().filter(|(p, _)| p != "stdout").collect();
    let mut staged: Vec<String> = Vec::new();
    for (path, content) in files.iter() {
        let partial = partial_path(path);
        if let Err(e) = fs::write(&partial, content) {
            discard(&staged);
            return Err(e).context(WritingFileSnafu { path: path.as_str() });
        }
        staged.push(partial);
    }
    for (idx, (path, _)) in files.iter().enumerate() {
        if let Err(e) = fs::rename(&staged[idx], path) {
            discard(&staged[idx..]);
            return Err(e).context(WritingFileSnafu { path: path.as_str() });
        }
        info!("Wrote {}", simplify_file_name(path));
    }
    for (path, content) in outputs.iter() {
        if path == "stdout" {
            print!("{}", content);
        }
    }
    Ok(())
}

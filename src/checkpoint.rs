//! Batch artifacts and checkpoint resolution
//!
//! A batch's completion is recorded solely by the existence of its artifact
//! file — there is no separate checkpoint file. On startup the resolver scans
//! the output directory for `batch_{N}.json` names and resumes after the
//! highest completed index.
//!
//! Artifacts are written to a temporary name in the same directory and
//! renamed into place, so a crash mid-write leaves at most a `.tmp` leftover
//! that the resolver never mistakes for a completed batch.

use crate::error::Result;
use crate::types::ProductRecord;
use std::fs;
use std::path::{Path, PathBuf};

const ARTIFACT_PREFIX: &str = "batch_";
const ARTIFACT_SUFFIX: &str = ".json";

/// File name of the artifact for a batch index
#[must_use]
pub fn artifact_file_name(index: usize) -> String {
    format!("{ARTIFACT_PREFIX}{index}{ARTIFACT_SUFFIX}")
}

/// Full artifact path for a batch index under the given output directory
#[must_use]
pub fn artifact_path(output_dir: &Path, index: usize) -> PathBuf {
    output_dir.join(artifact_file_name(index))
}

/// Parse a batch index out of an artifact file name
///
/// Returns `None` for anything that is not exactly `batch_{N}.json`,
/// including temporary files from interrupted writes.
fn parse_artifact_index(file_name: &str) -> Option<usize> {
    file_name
        .strip_prefix(ARTIFACT_PREFIX)?
        .strip_suffix(ARTIFACT_SUFFIX)?
        .parse()
        .ok()
}

/// Compute the first unprocessed batch index from persisted artifacts
///
/// Returns `max completed + 1`, or 1 when the directory is missing or holds
/// no artifacts. Foreign files are ignored.
pub fn next_batch_index(output_dir: &Path) -> Result<usize> {
    let entries = match fs::read_dir(output_dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(1),
        Err(err) => return Err(err.into()),
    };

    let mut last_completed = 0usize;
    for entry in entries {
        let entry = entry?;
        if let Some(index) = entry
            .file_name()
            .to_str()
            .and_then(parse_artifact_index)
        {
            last_completed = last_completed.max(index);
        }
    }

    Ok(last_completed + 1)
}

/// Persist a batch's success records as its artifact
///
/// Creates the output directory if needed, writes the JSON body to a
/// temporary file, and renames it to the final artifact name. The batch
/// counts as checkpointed only once the rename has succeeded.
pub fn write_artifact(
    output_dir: &Path,
    index: usize,
    records: &[ProductRecord],
) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;

    let final_path = artifact_path(output_dir, index);
    let tmp_path = output_dir.join(format!("{ARTIFACT_PREFIX}{index}{ARTIFACT_SUFFIX}.tmp"));

    let body = serde_json::to_vec_pretty(records)?;
    fs::write(&tmp_path, body)?;
    fs::rename(&tmp_path, &final_path)?;

    Ok(final_path)
}

/// Read a batch artifact back into records
///
/// Used by tests and resume tooling; the crawler itself never re-reads
/// completed artifacts.
pub fn read_artifact(output_dir: &Path, index: usize) -> Result<Vec<ProductRecord>> {
    let body = fs::read(artifact_path(output_dir, index))?;
    Ok(serde_json::from_slice(&body)?)
}

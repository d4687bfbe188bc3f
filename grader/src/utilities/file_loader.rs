//!
//! File Loader Utility
//!
//! Loads the metadata and outcome manifests a grading run needs.
//!
//! # Functionality
//!
//! - Checks that each manifest exists, is a regular file and is no larger than 2 MiB.
//! - Reads and parses each manifest as JSON.
//! - Returns a [`LoadedManifests`] struct holding both raw JSON values.
//!
//! # Error Handling
//!
//! File problems are logged with the full path and returned as a short
//! [`GraderError::Io`]; malformed JSON is returned as [`GraderError::InvalidJson`].

use crate::error::GraderError;
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::error;

/// Both manifests of a grading run, parsed as JSON but not yet validated.
#[derive(Debug)]
pub struct LoadedManifests {
    /// Raw JSON value for the metadata manifest.
    pub metadata_raw: Value,
    /// Raw JSON value for the outcome manifest.
    pub outcomes_raw: Value,
}

/// Largest manifest accepted, in bytes.
const MAX_JSON_SIZE: u64 = 2 * 1024 * 1024;

/// Confirms `path` names a regular file no larger than [`MAX_JSON_SIZE`].
fn check_manifest(path: &Path) -> Result<(), GraderError> {
    let meta = match fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            error!(path = %path.display(), "Manifest not found");
            return Err(GraderError::Io("File not found".to_string()));
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "Manifest unreadable");
            return Err(GraderError::Io("File unreadable".to_string()));
        }
    };

    if !meta.is_file() {
        error!(path = %path.display(), "Manifest path is not a regular file");
        return Err(GraderError::Io("Invalid file type".to_string()));
    }

    if meta.len() > MAX_JSON_SIZE {
        error!(
            path = %path.display(),
            size = meta.len(),
            max = MAX_JSON_SIZE,
            "Manifest exceeds size limit"
        );
        return Err(GraderError::Io("File too large".to_string()));
    }

    Ok(())
}

/// Reads one JSON manifest after checking it.
pub fn load_json(path: &Path) -> Result<Value, GraderError> {
    check_manifest(path)?;

    let bytes = fs::read(path).map_err(|e| {
        error!(path = %path.display(), error = %e, "Failed to read manifest");
        GraderError::Io("Failed to read manifest".to_string())
    })?;

    serde_json::from_slice(&bytes).map_err(|e| {
        error!(path = %path.display(), error = %e, "Manifest is not valid JSON");
        GraderError::InvalidJson(e)
    })
}

/// Loads and checks both manifests of a grading run.
///
/// # Errors
///
/// Returns [`GraderError`] for missing files, size violations or invalid JSON.
pub fn load_manifests(
    metadata_path: &Path,
    outcomes_path: &Path,
) -> Result<LoadedManifests, GraderError> {
    let metadata_raw = load_json(metadata_path)?;
    let outcomes_raw = load_json(outcomes_path)?;
    Ok(LoadedManifests {
        metadata_raw,
        outcomes_raw,
    })
}

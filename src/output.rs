//! Output file handling.
//!
//! Documents are persisted as pretty-printed JSON, with default file names
//! derived from the project UUID (and branch, for branch-scoped runs).

use crate::error::{Result, SbomExportError};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Serialize a document to pretty-printed JSON and write it to `path`.
pub fn write_json_pretty<T: Serialize>(path: &Path, document: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(document)?;
    std::fs::write(path, content).map_err(|e| SbomExportError::io(path, e))?;
    tracing::info!("Wrote {}", path.display());
    Ok(())
}

/// Write a raw document payload (already serialized) to `path`.
pub fn write_raw(path: &Path, payload: &str) -> Result<()> {
    std::fs::write(path, payload).map_err(|e| SbomExportError::io(path, e))?;
    tracing::info!("Wrote {}", path.display());
    Ok(())
}

/// Default output name for the generate flow: `{uuid}-spdx.json`.
pub fn generated_spdx_name(project_uuid: &str) -> PathBuf {
    PathBuf::from(format!("{project_uuid}-spdx.json"))
}

/// Default output name for the cleaned document from the clean flow:
/// `{uuid}[-{branch}]-cleaned-spdx.json`.
pub fn cleaned_spdx_name(project_uuid: &str, branch: Option<&str>) -> PathBuf {
    match branch {
        Some(branch) if !branch.eq_ignore_ascii_case("main") => {
            PathBuf::from(format!("{project_uuid}-{branch}-cleaned-spdx.json"))
        }
        _ => PathBuf::from(format!("{project_uuid}-cleaned-spdx.json")),
    }
}

/// Companion name for the unmodified document, derived from the cleaned
/// output name by replacing the `-cleaned-` marker. Names without the marker
/// get an `-original` suffix instead, so the two files never collide.
pub fn original_spdx_name(cleaned: &Path) -> PathBuf {
    let name = cleaned.to_string_lossy();
    if name.contains("-cleaned-") {
        return PathBuf::from(name.replace("-cleaned-", "-original-"));
    }
    match (cleaned.file_stem(), cleaned.extension()) {
        (Some(stem), Some(ext)) => cleaned.with_file_name(format!(
            "{}-original.{}",
            stem.to_string_lossy(),
            ext.to_string_lossy()
        )),
        _ => PathBuf::from(format!("{name}-original")),
    }
}

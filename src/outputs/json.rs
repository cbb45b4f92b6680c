//! JSON snapshots of a run.
//!
//! # Output Structure
//!
//! Files are organized by date, one file per run named after its local time:
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     ├── 081502.json
//!     └── 143005.json
//! ```

use crate::models::Snapshot;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Write a [`Snapshot`] to `{json_output_dir}/{date}/{HHMMSS}.json`.
///
/// Returns the path written.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir.display()))]
pub async fn write_snapshot(
    snapshot: &Snapshot,
    json_output_dir: &Path,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(snapshot)?;

    let full_json_dir = json_output_dir.join(&snapshot.local_date);
    info!(full_json_dir = %full_json_dir.display(), "Ensuring JSON directory exists");
    if let Err(e) = fs::create_dir_all(&full_json_dir).await {
        error!(full_json_dir = %full_json_dir.display(), error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let output_json_filename = full_json_dir.join(snapshot.file_name());
    fs::write(&output_json_filename, json).await?;
    info!(path = %output_json_filename.display(), headlines = snapshot.headlines.len(), "Wrote JSON snapshot");

    Ok(output_json_filename)
}

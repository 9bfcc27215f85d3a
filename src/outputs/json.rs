use crate::models::AggregationResult;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "snapshot.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write the snapshot as pretty JSON, replacing any previous file atomically.
///
/// The document goes to a sibling `.tmp` file first and is renamed over the
/// target, so readers never see a partial snapshot.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn write_snapshot(result: &AggregationResult, path: &str) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(result)?;

    let target = Path::new(path);
    if let Some(dir) = target.parent().filter(|d| !d.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to create output dir");
            return Err(e.into());
        }
    }

    let tmp = temp_path_for(target);
    fs::write(&tmp, json.as_bytes()).await?;
    if let Err(e) = fs::rename(&tmp, target).await {
        error!(error = %e, "Failed to move snapshot into place");
        let _ = fs::remove_file(&tmp).await;
        return Err(e.into());
    }

    info!(
        bytes = json.len(),
        categories = result.categories.len(),
        "Wrote JSON snapshot"
    );
    Ok(())
}

//! Snapshot persistence.

use amoebot_snapshot::SystemSnapshot;
use std::fs;
use std::path::{Path, PathBuf};

/// Write snapshot to file
pub fn write_snapshot(snapshot: &SystemSnapshot, path: impl AsRef<Path>) -> std::io::Result<()> {
    let json = snapshot
        .to_json_pretty()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    fs::write(path, json)?;
    Ok(())
}

/// Write snapshot into `<output_dir>/snapshots/<snapshot_id>.json`, creating
/// the directory if needed. Returns the path written.
pub fn write_snapshot_to_dir(
    snapshot: &SystemSnapshot,
    output_dir: &Path,
) -> std::io::Result<PathBuf> {
    let snapshots_dir = output_dir.join("snapshots");
    fs::create_dir_all(&snapshots_dir)?;
    let path = snapshots_dir.join(format!("{}.json", snapshot.snapshot_id));
    write_snapshot(snapshot, &path)?;
    Ok(path)
}

/// Write current state (overwrites each time)
pub fn write_current_state(snapshot: &SystemSnapshot, output_dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(output_dir)?;
    write_snapshot(snapshot, output_dir.join("current_state.json"))
}

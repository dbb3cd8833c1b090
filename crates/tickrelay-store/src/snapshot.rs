//! JSON Lines snapshots of the asset store.
//!
//! One asset per line. A snapshot is written on graceful shutdown and
//! loaded at startup, so a restart does not begin with an empty store
//! (and an empty store would stall the streaming path until the next
//! catalog sync). Partial corruption only costs the affected lines.

use crate::error::StoreResult;
use crate::store::AssetStore;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tickrelay_core::Asset;
use tracing::{info, warn};

/// Write every asset to `path`, replacing any previous snapshot.
///
/// Returns the number of records written.
pub fn save_snapshot(store: &dyn AssetStore, path: &Path) -> StoreResult<usize> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let assets = store.list();
    for asset in &assets {
        let line = serde_json::to_string(asset)?;
        writeln!(writer, "{}", line)?;
    }
    writer.flush()?;

    info!(path = %path.display(), records = assets.len(), "Saved asset snapshot");
    Ok(assets.len())
}

/// Load a snapshot into the store, if the file exists.
///
/// Missing file is not an error (first start). Lines that fail to parse
/// are logged and skipped.
pub fn load_snapshot(store: &dyn AssetStore, path: &Path) -> StoreResult<usize> {
    if !path.exists() {
        return Ok(0);
    }

    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut loaded = 0usize;
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Asset>(&line) {
            Ok(asset) => {
                store.upsert(asset);
                loaded += 1;
            }
            Err(e) => {
                warn!(path = %path.display(), line = line_no + 1, error = %e, "Skipping bad snapshot line");
            }
        }
    }

    info!(path = %path.display(), records = loaded, "Loaded asset snapshot");
    Ok(loaded)
}

//! Backing store for the address pool.
//!
//! The whole pool is one JSON document. It is read once when the pool is
//! opened and rewritten in full after every mutation.
//!
//! Single writer only: there is no locking. Writes go to a sibling temp file
//! that is synced to disk and then renamed over the store, so a crash leaves
//! either the old or the new contents.

use crate::error::PoolError;
use crate::models::{LegacyPoolFile, PoolFile};
use serde::de::DeserializeOwned;
use std::ffi::OsString;
use std::fs::File;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Read the pool store at `path`.
///
/// # Returns
/// * `Ok(None)` - The file does not exist, the pool starts uninitialized
/// * `Ok(Some(PoolFile))` - The store, legacy layouts already converted
/// * `Err` - The file could not be read or parsed
pub fn read_pool_file(path: &Path) -> Result<Option<PoolFile>, PoolError> {
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::info!("Pool store {} not found, starting uninitialized", path.display());
            return Ok(None);
        }
        Err(e) => return Err(PoolError::io(path, e)),
    };
    log::debug!("Reading pool store {} len={}", path.display(), json.len());

    let value: serde_json::Value = serde_json::from_str(&json).map_err(|e| PoolError::Parse {
        path: path.to_path_buf(),
        json_path: ".".to_string(),
        source: e,
    })?;

    if is_legacy(&value) {
        log::warn!(
            "Pool store {} uses the legacy address layout, it will be migrated on the next save",
            path.display()
        );
        let legacy: LegacyPoolFile = deserialize_at(path, value)?;
        return legacy.into_current().map(Some);
    }

    deserialize_at(path, value).map(Some)
}

/// Write the pool store to `path`, replacing any existing file.
pub fn write_pool_file(path: &Path, pool_file: &PoolFile) -> Result<(), PoolError> {
    let mut json = serde_json::to_string_pretty(pool_file)?;
    json.push('\n');

    let tmp = tmp_path(path);
    write_synced(&tmp, json.as_bytes()).map_err(|e| PoolError::io(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| {
        // best effort, the rename error is what gets reported
        let _ = std::fs::remove_file(&tmp);
        PoolError::io(path, e)
    })?;

    log::debug!(
        "Wrote pool store {} hostnames={}",
        path.display(),
        pool_file.hostnames.len()
    );
    Ok(())
}

/// Write `bytes` to a fresh file and flush it to disk before returning.
fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

fn is_legacy(value: &serde_json::Value) -> bool {
    value.get("addresses").is_some() && value.get("hostnames").is_none()
}

fn deserialize_at<T: DeserializeOwned>(path: &Path, value: serde_json::Value) -> Result<T, PoolError> {
    serde_path_to_error::deserialize(value).map_err(|e| PoolError::Parse {
        path: path.to_path_buf(),
        json_path: e.path().to_string(),
        source: e.into_inner(),
    })
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name: OsString = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("pool"));
    name.push(".tmp");
    path.with_file_name(name)
}

//! Filesystem helpers for files that must never be left half-written

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Sibling path `<path>.tmp` used while a write is in flight
pub fn temp_sibling(path: &Path) -> PathBuf {
    let mut tmp_name = OsString::from(path.as_os_str());
    tmp_name.push(".tmp");
    PathBuf::from(tmp_name)
}

/// Write `contents` to a temp sibling, then rename it over `path`.
///
/// On failure `path` is untouched and the temp sibling is removed.
pub async fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let tmp_path = temp_sibling(path);
    let result = match tokio::fs::write(&tmp_path, contents).await {
        Ok(()) => tokio::fs::rename(&tmp_path, path).await,
        Err(e) => Err(e),
    };
    if result.is_err() {
        let _ = tokio::fs::remove_file(&tmp_path).await;
    }
    result
}

/// Remove `path`, treating an already missing file as success
pub async fn remove_if_exists(path: &Path) -> std::io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

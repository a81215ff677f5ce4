// SPDX-License-Identifier: Apache-2.0

use crate::{StoreError, StoreErrorCode};
use std::io::Write as _;
use std::path::Path;

/// Writes to a sibling temp file, syncs, then renames over `path`, so readers
/// observe either the old or the new content.
pub fn write_atomic_file(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let io = |e: std::io::Error| {
        StoreError::new(
            StoreErrorCode::Io,
            format!("atomic write of {} failed: {e}", path.display()),
        )
    };
    let parent = path
        .parent()
        .ok_or_else(|| StoreError::new(StoreErrorCode::Io, "atomic write missing parent"))?;
    std::fs::create_dir_all(parent).map_err(io)?;
    let tmp = parent.join(format!(
        ".{}.tmp.{}",
        path.file_name().and_then(|s| s.to_str()).unwrap_or("file"),
        std::process::id()
    ));
    {
        let mut f = std::fs::File::create(&tmp).map_err(io)?;
        f.write_all(bytes).map_err(io)?;
        f.sync_all().map_err(io)?;
    }
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io(e));
    }
    if let Ok(dir) = std::fs::File::open(parent) {
        let _ = dir.sync_all();
    }
    Ok(())
}

// src/cache/snapshot.rs

use anyhow::{Context, Result};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use super::CacheEntry;

fn snapshot_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{}.json", key))
}

/// Load `<key>.json` from `dir`. `Ok(None)` when no snapshot exists.
pub fn read_snapshot(dir: &Path, key: &str) -> Result<Option<CacheEntry>> {
    let path = snapshot_path(dir, key);
    if !path.exists() {
        return Ok(None);
    }
    let f = fs::File::open(&path).with_context(|| format!("opening {:?}", path))?;
    let entry = serde_json::from_reader(f).with_context(|| format!("parsing {:?}", path))?;
    Ok(Some(entry))
}

/// Write `<key>.json` atomically: to a dot-prefixed tmp file, then rename over.
pub fn write_snapshot(dir: &Path, key: &str, entry: &CacheEntry) -> Result<()> {
    let path = snapshot_path(dir, key);
    let tmp_path = dir.join(format!(".{}.json.tmp", key));

    let mut tmp =
        fs::File::create(&tmp_path).with_context(|| format!("creating {:?}", tmp_path))?;
    serde_json::to_writer_pretty(&mut tmp, entry).context("serializing cache entry")?;
    tmp.write_all(b"\n")?;
    drop(tmp);

    fs::rename(&tmp_path, &path)
        .with_context(|| format!("renaming {:?} -> {:?}", tmp_path, path))?;
    Ok(())
}

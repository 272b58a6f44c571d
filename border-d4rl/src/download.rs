//! Download of dataset archives into a local cache.
use crate::D4rlError;
use anyhow::{Context, Result};
use log::info;
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

/// Environment variable overriding the default cache directory.
pub const DATASET_DIR_ENV: &str = "D4RL_DATASET_DIR";

/// Resolves the cache directory.
///
/// `cache_dir` if given, else `$D4RL_DATASET_DIR`, else `~/.border/d4rl/datasets`.
pub fn resolve_cache_dir(cache_dir: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = cache_dir {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = std::env::var_os(DATASET_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    let mut dir = dirs::home_dir().context("Couldn't find home directory")?;
    dir.push(".border/d4rl/datasets");
    Ok(dir)
}

/// Directory holding downloaded archives.
#[derive(Clone, Debug)]
pub struct ArchiveCache {
    dir: PathBuf,
}

impl ArchiveCache {
    /// Opens the cache, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if !dir.exists() {
            info!("Create directory {:?}", dir);
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create cache directory {:?}", dir))?;
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        self.dir.as_path()
    }

    /// Local path of the archive at `url`, named after the last segment of the url.
    pub fn path_for(&self, url: &str) -> Result<PathBuf> {
        let file_name = url
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| D4rlError::IoFailure(format!("No file name in url {:?}", url)))?;
        Ok(self.dir.join(file_name))
    }

    /// Returns the local path of the archive, downloading it if it is not cached.
    pub fn fetch(&self, url: &str) -> Result<PathBuf> {
        let path = self.path_for(url)?;
        if path.exists() {
            info!("Exists {:?}, skips download", path);
            return Ok(path);
        }

        info!("Download dataset {} to {:?}", url, path);
        let response = reqwest::blocking::get(url)
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("Failed to download {}", url))?;
        let content = response.bytes()?;

        // The archive appears under its final name only once fully written
        let part = path.with_extension("part");
        if let Err(e) = write_then_rename(&content, &part, &path) {
            let _ = fs::remove_file(&part);
            return Err(e);
        }

        if !path.exists() {
            return Err(D4rlError::IoFailure(format!("Failed to download dataset from {}", url)).into());
        }
        Ok(path)
    }
}

fn write_then_rename(content: &[u8], part: &Path, path: &Path) -> Result<()> {
    let mut file = File::create(part).with_context(|| format!("Failed to create file {:?}", part))?;
    file.write_all(content)?;
    file.flush()?;
    fs::rename(part, path)?;
    Ok(())
}

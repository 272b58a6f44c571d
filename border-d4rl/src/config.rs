//! Configuration of dataset ingestion.
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

/// Extra options for the library-computed transition dataset, e.g. `terminate_on_end`.
pub type EnvKwargs = BTreeMap<String, serde_yaml::Value>;

/// Configuration of [`D4rlLoader`](crate::D4rlLoader).
///
/// The provenance of the dataset is selected by `direct_download` and
/// `from_env`:
///
/// * `direct_download = true`: the archive is downloaded and decoded without
///   an environment. No spec is available, so no dtype coercion happens.
/// * `direct_download = false, from_env = true`: the dataset exported by the
///   environment is used.
/// * `direct_download = false, from_env = false`: the library-computed
///   transition dataset with pre-built next observations is used.
///
/// # Examples
///
/// ```rust
/// use border_d4rl::D4rlConfig;
///
/// let config = D4rlConfig::default()
///     .direct_download(false)
///     .from_env(false)
///     .env_kwarg("terminate_on_end", true)
///     .split_trajs(true);
/// ```
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct D4rlConfig {
    /// If `true`, `done = terminated | truncated`, otherwise `done = terminated`.
    pub use_truncated_as_done: bool,

    /// If `true`, the transitions are split into padded episodes.
    pub split_trajs: bool,

    /// Use the dataset exported by the environment instead of the
    /// library-computed transition dataset.
    pub from_env: bool,

    /// Download the archive directly. Takes precedence over `from_env`.
    pub direct_download: bool,

    /// Extra options for the library-computed transition dataset.
    #[serde(default)]
    pub env_kwargs: EnvKwargs,

    /// Directory where downloaded archives are cached.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

impl Default for D4rlConfig {
    fn default() -> Self {
        Self {
            use_truncated_as_done: true,
            split_trajs: false,
            from_env: true,
            direct_download: true,
            env_kwargs: EnvKwargs::new(),
            cache_dir: None,
        }
    }
}

impl D4rlConfig {
    /// Sets `use_truncated_as_done`.
    pub fn use_truncated_as_done(mut self, v: bool) -> Self {
        self.use_truncated_as_done = v;
        self
    }

    /// Sets `split_trajs`.
    pub fn split_trajs(mut self, v: bool) -> Self {
        self.split_trajs = v;
        self
    }

    /// Sets `from_env`.
    pub fn from_env(mut self, v: bool) -> Self {
        self.from_env = v;
        self
    }

    /// Sets `direct_download`.
    pub fn direct_download(mut self, v: bool) -> Self {
        self.direct_download = v;
        self
    }

    /// Adds an extra option for the library-computed transition dataset.
    pub fn env_kwarg(mut self, key: impl Into<String>, value: impl Into<serde_yaml::Value>) -> Self {
        self.env_kwargs.insert(key.into(), value.into());
        self
    }

    /// Sets the directory where archives are cached.
    pub fn cache_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(path.into());
        self
    }

    /// Loads the configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves the configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_d4rl_config() -> Result<()> {
        let config = D4rlConfig::default()
            .direct_download(false)
            .from_env(false)
            .env_kwarg("terminate_on_end", true)
            .split_trajs(true)
            .cache_dir("/tmp/d4rl");

        let dir = TempDir::new("d4rl_config")?;
        let path = dir.path().join("d4rl_config.yaml");
        config.save(&path)?;
        let config_ = D4rlConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }

    #[test]
    fn test_defaults() {
        let config = D4rlConfig::default();
        assert!(config.use_truncated_as_done);
        assert!(config.direct_download);
        assert!(config.from_env);
        assert!(!config.split_trajs);
        assert!(config.env_kwargs.is_empty());
    }
}

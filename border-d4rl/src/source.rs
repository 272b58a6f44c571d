//! Provenance adapters.
//!
//! A D4RL dataset can be obtained in three ways, each with its own field
//! names and next-state layout. Every adapter implements [`DatasetSource`]
//! and hands a raw table to the provenance-agnostic alignment pipeline.
//!
//! | Adapter | Raw data | Next state | Spec |
//! |---|---|---|---|
//! | [`EnvExportSource`] | [`D4rlEnv::get_dataset`] | derived | yes |
//! | [`QLearningSource`] | [`D4rlEnv::qlearning_dataset`] | pre-built | yes |
//! | [`DirectDownloadSource`] | downloaded archive | derived | no |
mod direct;
mod env_export;
mod qlearning;
use crate::{
    config::{D4rlConfig, EnvKwargs},
    env_spec::EnvSpec,
    next_state::NextStateMode,
    table::RawTable,
    D4rlError,
};
use anyhow::Result;
pub use direct::DirectDownloadSource;
pub use env_export::EnvExportSource;
use log::info;
pub use qlearning::QLearningSource;
use std::path::Path;

/// Environment providing D4RL data and the specs of its observation, action
/// and reward.
pub trait D4rlEnv {
    /// Returns the dataset exported by the environment: a flat step sequence
    /// with `observations`, `actions`, `rewards`, `terminals` and optionally
    /// `timeouts`, `infos/*` and `metadata/*`.
    fn get_dataset(&self) -> Result<RawTable>;

    /// Returns the transition dataset computed by the D4RL library, which
    /// ships `next_observations`.
    fn qlearning_dataset(&self, kwargs: &EnvKwargs) -> Result<RawTable>;

    /// Returns the dtype and shape specs of the environment.
    fn spec(&self) -> Result<EnvSpec>;
}

/// Decoder of a downloaded archive into a raw table.
///
/// Keys of nested entries are `/`-separated paths, see
/// [`Group::from_flat`](crate::column::Group::from_flat).
pub trait ArchiveDecoder {
    fn decode(&self, path: &Path) -> Result<RawTable>;
}

/// Output of a provenance adapter.
#[derive(Clone, Debug)]
pub struct SourceData {
    pub table: RawTable,
    pub spec: Option<EnvSpec>,
    pub mode: NextStateMode,
}

/// Common interface of the provenance adapters.
pub trait DatasetSource {
    /// Short description used in logs.
    fn describe(&self) -> String;

    /// Produces the raw table.
    fn load(&self) -> Result<SourceData>;
}

/// Selects the adapter for the configuration.
///
/// Fails with [`D4rlError::ProvenanceConfigError`] if the options are
/// incompatible or the required collaborator is missing, and with
/// [`D4rlError::UnknownDatasetError`] if a direct download is requested for
/// an unknown dataset.
pub fn select_source<'a>(
    name: &str,
    config: &D4rlConfig,
    env: Option<&'a dyn D4rlEnv>,
    decoder: Option<&'a dyn ArchiveDecoder>,
) -> Result<Box<dyn DatasetSource + 'a>> {
    let source: Box<dyn DatasetSource + 'a> = if config.direct_download {
        if !config.env_kwargs.is_empty() {
            return Err(provenance_error(
                "Cannot pass env_kwargs when direct_download is true",
            ));
        }
        let decoder = decoder.ok_or_else(|| {
            provenance_error("direct_download requires an archive decoder")
        })?;
        Box::new(DirectDownloadSource::new(
            name,
            config.cache_dir.as_deref(),
            decoder,
        )?)
    } else {
        let env = env.ok_or_else(|| {
            provenance_error("Loading without direct_download requires an environment")
        })?;
        if config.from_env {
            if !config.env_kwargs.is_empty() {
                return Err(provenance_error(
                    "env_kwargs cannot be passed when from_env is true",
                ));
            }
            Box::new(EnvExportSource::new(env))
        } else {
            Box::new(QLearningSource::new(env, config.env_kwargs.clone()))
        }
    };
    info!("Dataset {} is loaded from {}", name, source.describe());
    Ok(source)
}

fn provenance_error(msg: &str) -> anyhow::Error {
    D4rlError::ProvenanceConfigError(msg.to_string()).into()
}

use crate::{
    config::D4rlConfig,
    env_spec::EnvSpec,
    next_state::{construct, invalidate_terminal},
    normalize::{SchemaNormalizer, TRUNCATED},
    replay_buffer::{episode_batch, table_batch, D4rlConverter},
    shift::shift_reward_done,
    source::{select_source, ArchiveDecoder, D4rlEnv, SourceData},
    table::{Metadata, RawTable, StepTable},
    trajectory::{split_trajectories, Trajectories},
};
use anyhow::{Context, Result};
use border_core::{
    generic_replay_buffer::{SimpleReplayBuffer, SimpleReplayBufferConfig},
    ExperienceBufferBase, ReplayBufferBase,
};
use log::{info, warn};

/// Transitions of a finished dataset.
#[derive(Clone, Debug, PartialEq)]
pub enum Transitions {
    /// Flat table, one row per transition.
    Flat(StepTable),

    /// Padded episodes.
    Episodes(Trajectories),
}

/// A D4RL dataset aligned into transitions.
///
/// Besides the transitions it carries the `metadata` block of the source and
/// the environment spec used for dtype coercion, if any.
#[derive(Clone, Debug)]
pub struct D4rlDataset {
    name: String,
    transitions: Transitions,
    metadata: Metadata,
    specs: Option<EnvSpec>,
}

impl D4rlDataset {
    /// Runs the alignment pipeline on the output of a provenance adapter.
    ///
    /// Normalization, next-state construction, temporal shift, terminal
    /// invalidation and, if `config.split_trajs`, trajectory splitting.
    pub fn from_source(name: impl Into<String>, source: SourceData, config: &D4rlConfig) -> Result<Self> {
        let name = name.into();
        let SourceData { table, spec, mode } = source;

        if config.split_trajs && !has_truncated_field(&table) {
            warn!(
                "{} has no truncated flags, episodes cut off by a time limit are merged with the next episode",
                name
            );
        }

        let normalizer = SchemaNormalizer::new(config.use_truncated_as_done);
        let (steps, metadata) = normalizer
            .normalize(table, spec.as_ref())
            .context("Failed to normalize schema")?;
        let table = construct(steps, mode).context("Failed to construct next states")?;
        let table = invalidate_terminal(shift_reward_done(table));

        info!("{} transitions", table.len());
        info!("{} terminated flags", table.num_terminated_flags());
        info!("{} truncated flags", table.num_truncated_flags());
        info!("{} reward sum", table.sum_rewards());

        let transitions = if config.split_trajs {
            Transitions::Episodes(split_trajectories(table))
        } else {
            Transitions::Flat(table)
        };

        Ok(Self {
            name,
            transitions,
            metadata,
            specs: spec,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transitions(&self) -> &Transitions {
        &self.transitions
    }

    /// The transition table; padded `[episodes, max_len, ...]` if split.
    pub fn table(&self) -> &StepTable {
        match &self.transitions {
            Transitions::Flat(table) => table,
            Transitions::Episodes(trajs) => &trajs.table,
        }
    }

    /// The episodes, if the dataset was split.
    pub fn trajectories(&self) -> Option<&Trajectories> {
        match &self.transitions {
            Transitions::Flat(_) => None,
            Transitions::Episodes(trajs) => Some(trajs),
        }
    }

    /// Metadata block of the source, empty if it had none.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Spec of the environment; `None` for direct downloads.
    pub fn specs(&self) -> Option<&EnvSpec> {
        self.specs.as_ref()
    }

    /// Number of valid transitions.
    pub fn num_transitions(&self) -> usize {
        match &self.transitions {
            Transitions::Flat(table) => table.len(),
            Transitions::Episodes(trajs) => trajs.num_transitions(),
        }
    }

    /// Creates a replay buffer from the dataset.
    ///
    /// A flat table is pushed as it is, one entry per transition in the order
    /// of the dataset. Split datasets are pushed one entry per episode, keeping
    /// the padded `[max_len, ...]` rows and the mask; the reward of an entry
    /// is the return of the episode.
    ///
    /// * `converter`: converter for observation and action.
    pub fn create_replay_buffer<T: D4rlConverter>(
        &self,
        converter: &T,
    ) -> Result<SimpleReplayBuffer<T::ObsBatch, T::ActBatch>>
    where
        T::ObsBatch: std::fmt::Debug,
        T::ActBatch: std::fmt::Debug,
    {
        let (batch, capacity, unit) = match &self.transitions {
            Transitions::Flat(table) => (table_batch(table, converter)?, table.len(), "transitions"),
            Transitions::Episodes(trajs) => (
                episode_batch(trajs, converter)?,
                trajs.num_episodes(),
                "episodes",
            ),
        };

        let mut replay_buffer = SimpleReplayBuffer::build(&SimpleReplayBufferConfig {
            capacity,
            seed: 0,
            per_config: None,
        });
        if capacity > 0 {
            replay_buffer.push(batch)?;
        }

        // Stats in the replay buffer
        info!("In replay buffer:");
        info!("{} {}", replay_buffer.len(), unit);
        info!("{} terminated flags", replay_buffer.num_terminated_flags());
        info!("{} truncated flags", replay_buffer.num_truncated_flags());
        info!("{} reward sum", replay_buffer.sum_rewards());

        Ok(replay_buffer)
    }
}

fn has_truncated_field(table: &RawTable) -> bool {
    TRUNCATED.iter().any(|key| table.contains_key(key))
}

/// Loads D4RL datasets.
///
/// The environment and the archive decoder are supplied by the caller; which
/// of them is needed depends on the provenance selected by the configuration.
///
/// ```no_run
/// # use anyhow::Result;
/// # use border_d4rl::{ArchiveDecoder, RawTable};
/// # use std::path::Path;
/// # struct H5Decoder;
/// # impl ArchiveDecoder for H5Decoder {
/// #     fn decode(&self, _path: &Path) -> Result<RawTable> { unimplemented!() }
/// # }
/// use border_d4rl::{D4rlConfig, D4rlLoader, NdarrayConverter};
///
/// fn main() -> Result<()> {
///     let decoder = H5Decoder;
///     let loader = D4rlLoader::new(D4rlConfig::default()).with_decoder(&decoder);
///     let dataset = loader.load("hopper-medium-v2")?;
///     let replay_buffer = dataset.create_replay_buffer(&NdarrayConverter)?;
///     Ok(())
/// }
/// ```
pub struct D4rlLoader<'a> {
    config: D4rlConfig,
    env: Option<&'a dyn D4rlEnv>,
    decoder: Option<&'a dyn ArchiveDecoder>,
}

impl<'a> D4rlLoader<'a> {
    pub fn new(config: D4rlConfig) -> Self {
        Self {
            config,
            env: None,
            decoder: None,
        }
    }

    /// Sets the environment used when `direct_download` is `false`.
    pub fn with_env(mut self, env: &'a dyn D4rlEnv) -> Self {
        self.env = Some(env);
        self
    }

    /// Sets the decoder of downloaded archives.
    pub fn with_decoder(mut self, decoder: &'a dyn ArchiveDecoder) -> Self {
        self.decoder = Some(decoder);
        self
    }

    pub fn config(&self) -> &D4rlConfig {
        &self.config
    }

    /// Loads the dataset `name`.
    pub fn load(&self, name: &str) -> Result<D4rlDataset> {
        let source = select_source(name, &self.config, self.env, self.decoder)?;
        let data = source
            .load()
            .with_context(|| format!("Failed to load source of {}", name))?;
        D4rlDataset::from_source(name, data, &self.config)
    }
}

//! Ingestion of [D4RL](https://github.com/Farama-Foundation/D4RL) offline RL datasets.
//!
//! D4RL datasets come as flat step sequences whose field names and next-state
//! layout depend on how they were obtained. This crate aligns them into
//! transitions `(observation, action) -> next`, ready to be pushed into a
//! `border-core` replay buffer.
//!
//! # Pipeline
//!
//! 1. A provenance adapter ([`DatasetSource`]) produces a raw table:
//!    the dataset exported by the environment, the transition dataset computed
//!    by the D4RL library, or a directly downloaded archive.
//! 2. [`SchemaNormalizer`] renames the fields onto the canonical schema,
//!    moves the `metadata` block aside, casts dtypes according to the
//!    environment spec and derives `done`.
//! 3. [`construct`] attaches the `next` sub-record, either adopting
//!    pre-built next observations or deriving them from the sequence, which
//!    drops the last row.
//! 4. [`shift_reward_done`] moves reward and termination flags one row down
//!    in the top-level fields.
//! 5. [`invalidate_terminal`] zeroes the next observation of terminal steps.
//! 6. Optionally, [`split_trajectories`] packs the transitions into padded
//!    episodes with a validity mask.
//!
//! [`D4rlLoader`] runs all of the above for a dataset name.
//!
//! # Example
//!
//! ```no_run
//! # use anyhow::Result;
//! # #[cfg(feature = "python")]
//! # fn main() -> Result<()> {
//! use border_d4rl::{python::PyD4rlEnv, D4rlConfig, D4rlLoader, NdarrayConverter};
//!
//! let env = PyD4rlEnv::new("hopper-medium-v2")?;
//! let config = D4rlConfig::default()
//!     .direct_download(false)
//!     .from_env(false)
//!     .env_kwarg("terminate_on_end", true);
//! let dataset = D4rlLoader::new(config).with_env(&env).load("hopper-medium-v2")?;
//! let replay_buffer = dataset.create_replay_buffer(&NdarrayConverter)?;
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "python"))]
//! # fn main() {}
//! ```
//!
//! # Features
//!
//! - `python`: pyo3-backed [`D4rlEnv`] and [`ArchiveDecoder`] using `gym`,
//!   `d4rl` and `h5py`.
pub mod column;
mod config;
mod dataset;
pub mod download;
pub mod env_spec;
mod error;
pub mod next_state;
pub mod normalize;
#[cfg(feature = "python")]
pub mod python;
pub mod registry;
mod replay_buffer;
pub mod shift;
pub mod source;
pub mod table;
pub mod trajectory;

pub use column::{Column, Dtype, Group, Node};
pub use config::{D4rlConfig, EnvKwargs};
pub use dataset::{D4rlDataset, D4rlLoader, Transitions};
pub use env_spec::{EnvSpec, TensorSpec};
pub use error::D4rlError;
pub use next_state::{construct, invalidate_terminal, NextStateMode};
pub use normalize::SchemaNormalizer;
pub use replay_buffer::{episode_batch, table_batch, D4rlConverter, NdarrayBatch, NdarrayConverter};
pub use shift::shift_reward_done;
pub use source::{ArchiveDecoder, D4rlEnv, DatasetSource, SourceData};
pub use table::{Metadata, NextStep, RawTable, StepTable, Steps};
pub use trajectory::{split_trajectories, Trajectories};

use super::{D4rlEnv, DatasetSource, SourceData};
use crate::{config::EnvKwargs, next_state::NextStateMode};
use anyhow::{Context, Result};

/// Transition dataset computed by the D4RL library from the environment.
///
/// It ships `next_observations`, so next observations are adopted as they are.
pub struct QLearningSource<'a> {
    env: &'a dyn D4rlEnv,
    kwargs: EnvKwargs,
}

impl<'a> QLearningSource<'a> {
    pub fn new(env: &'a dyn D4rlEnv, kwargs: EnvKwargs) -> Self {
        Self { env, kwargs }
    }
}

impl<'a> DatasetSource for QLearningSource<'a> {
    fn describe(&self) -> String {
        "qlearning dataset".to_string()
    }

    fn load(&self) -> Result<SourceData> {
        let table = self
            .env
            .qlearning_dataset(&self.kwargs)
            .context("Failed to compute the qlearning dataset")?;
        let spec = self.env.spec().context("Failed to get the environment spec")?;
        Ok(SourceData {
            table,
            spec: Some(spec),
            mode: NextStateMode::Prebuilt,
        })
    }
}

use super::{D4rlEnv, DatasetSource, SourceData};
use crate::next_state::NextStateMode;
use anyhow::{Context, Result};

/// Dataset exported by the environment.
///
/// The export is a flat step sequence, so next observations are derived.
pub struct EnvExportSource<'a> {
    env: &'a dyn D4rlEnv,
}

impl<'a> EnvExportSource<'a> {
    pub fn new(env: &'a dyn D4rlEnv) -> Self {
        Self { env }
    }
}

impl<'a> DatasetSource for EnvExportSource<'a> {
    fn describe(&self) -> String {
        "environment export".to_string()
    }

    fn load(&self) -> Result<SourceData> {
        let table = self
            .env
            .get_dataset()
            .context("Failed to get the dataset from the environment")?;
        let spec = self.env.spec().context("Failed to get the environment spec")?;
        Ok(SourceData {
            table,
            spec: Some(spec),
            mode: NextStateMode::Derived,
        })
    }
}

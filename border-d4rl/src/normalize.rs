//! Schema normalization.
//!
//! Maps the provenance-specific field names of a raw table onto the canonical
//! schema, extracts the `metadata` block into a side-channel and derives
//! `done` from `terminated` and `truncated`.
use crate::{
    column::{self, Column, Group, Node},
    env_spec::EnvSpec,
    table::{Metadata, RawTable, Steps},
    D4rlError,
};
use anyhow::Result;
use log::{debug, info};
use ndarray::ArrayD;

const OBSERVATION: &[&str] = &["observations", "observation"];
const ACTION: &[&str] = &["actions", "action"];
const REWARD: &[&str] = &["rewards", "reward"];
const TERMINATED: &[&str] = &["terminals", "terminations", "terminated"];
pub(crate) const TRUNCATED: &[&str] = &["timeouts", "truncations", "truncated"];
const INFO: &[&str] = &["infos", "info"];
const NEXT_OBSERVATION: &[&str] = &["next_observations"];
const METADATA: &str = "metadata";

/// Maps raw field names onto the canonical schema.
#[derive(Clone, Debug)]
pub struct SchemaNormalizer {
    use_truncated_as_done: bool,
}

impl SchemaNormalizer {
    /// If `use_truncated_as_done` is `true`, `done = terminated | truncated`,
    /// otherwise `done = terminated`.
    pub fn new(use_truncated_as_done: bool) -> Self {
        Self {
            use_truncated_as_done,
        }
    }

    /// Normalizes a raw table.
    ///
    /// Returns the normalized steps and the metadata block (empty if the raw
    /// table has none). When `spec` is given, observations, actions and
    /// rewards are cast to the specified element types.
    pub fn normalize(&self, mut raw: RawTable, spec: Option<&EnvSpec>) -> Result<(Steps, Metadata)> {
        let metadata = match raw.remove(METADATA) {
            Some(Node::Group(group)) => group,
            Some(Node::Array(col)) => {
                let mut group = Group::new();
                group.insert(METADATA, col);
                group
            }
            None => Group::new(),
        };
        if !metadata.is_empty() {
            debug!("Metadata keys: {:?}", metadata.keys().collect::<Vec<_>>());
        }

        // Metadata is out of the way, so every remaining column is per-step data
        raw.rows()?;

        let observation = take_mandatory(&mut raw, "observation", OBSERVATION)?;
        let action = take_mandatory(&mut raw, "action", ACTION)?;
        let reward = take_mandatory(&mut raw, "reward", REWARD)?;
        let terminated = take_mandatory(&mut raw, "terminated", TERMINATED)?;
        let truncated = take_column(&mut raw, "truncated", TRUNCATED)?;
        let next_observation = take_column(&mut raw, "next_observation", NEXT_OBSERVATION)?;
        let info = take_group(&mut raw, INFO);

        for key in raw.keys() {
            debug!("Ignored field {:?}", key);
        }

        let (observation, next_observation, action, reward) = match spec {
            Some(spec) => (
                spec.observation.coerce("observation", observation),
                next_observation.map(|col| spec.observation.coerce("next_observation", col)),
                spec.action.coerce("action", action),
                spec.reward.coerce("reward", reward),
            ),
            None => (observation, next_observation, action, reward),
        };

        let reward = reward.with_trailing_unit("reward")?;
        let terminated = to_flags(&terminated, "terminated")?;
        let truncated = match truncated {
            Some(col) => Some(to_flags(&col, "truncated")?),
            None => None,
        };
        let done = match (&truncated, self.use_truncated_as_done) {
            (Some(truncated), true) => &terminated | truncated,
            _ => terminated.clone(),
        };

        if let Some(next_obs) = &next_observation {
            if next_obs.rows() != observation.rows() {
                return Err(D4rlError::SchemaError(format!(
                    "next_observations has {} rows, observations has {}",
                    next_obs.rows(),
                    observation.rows()
                ))
                .into());
            }
        }

        let steps = Steps {
            observation,
            action,
            reward,
            terminated,
            truncated,
            done,
            info,
            next_observation,
        };
        info!(
            "Normalized {} steps ({} done flags, truncated field {})",
            steps.len(),
            steps.done.iter().filter(|&&d| d).count(),
            if steps.truncated.is_some() { "present" } else { "absent" }
        );

        Ok((steps, metadata))
    }
}

/// Removes the first column found under any of `keys`.
fn take_column(raw: &mut RawTable, name: &str, keys: &[&str]) -> Result<Option<Column>> {
    for key in keys {
        match raw.remove(key) {
            Some(Node::Array(col)) => {
                debug!("Field {:?} taken from {:?}, shape {:?}", name, key, col.shape());
                return Ok(Some(col));
            }
            Some(Node::Group(_)) => {
                return Err(D4rlError::SchemaError(format!(
                    "field {:?} is a group, expected a column for {:?}",
                    key, name
                ))
                .into())
            }
            None => {}
        }
    }
    Ok(None)
}

fn take_mandatory(raw: &mut RawTable, name: &str, keys: &[&str]) -> Result<Column> {
    take_column(raw, name, keys)?.ok_or_else(|| {
        D4rlError::SchemaError(format!(
            "mandatory field {:?} not found (looked for {:?})",
            name, keys
        ))
        .into()
    })
}

/// Removes the info block, which may be missing.
fn take_group(raw: &mut RawTable, keys: &[&str]) -> Option<Group> {
    keys.iter().find_map(|key| match raw.remove(key)? {
        Node::Group(group) => Some(group),
        Node::Array(col) => {
            let mut group = Group::new();
            group.insert("info", col);
            Some(group)
        }
    })
}

/// Converts a column into `[N, 1]` flags.
fn to_flags(col: &Column, name: &str) -> Result<ArrayD<bool>> {
    column::with_trailing_unit(col.to_bool()).ok_or_else(|| {
        D4rlError::SchemaError(format!(
            "field {:?} should have shape [N] or [N, 1], got {:?}",
            name,
            col.shape()
        ))
        .into()
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{column::Dtype, env_spec::TensorSpec};
    use ndarray::{arr1, arr2};
    use test_log::test;

    fn raw(with_timeouts: bool) -> RawTable {
        let mut items = vec![
            (
                "observations",
                Column::F64(arr2(&[[0., 0.], [1., 1.], [2., 2.], [3., 3.]]).into_dyn()),
            ),
            ("actions", Column::F32(arr2(&[[0.], [1.], [2.], [3.]]).into_dyn())),
            ("rewards", Column::F32(arr1(&[1., 2., 3., 4.]).into_dyn())),
            ("terminals", Column::U8(arr1(&[0, 0, 1, 0]).into_dyn())),
            ("infos/qpos", Column::F32(arr1(&[5., 6., 7., 8.]).into_dyn())),
            ("metadata/algorithm", Column::I64(arr1(&[42]).into_dyn())),
            ("metadata/policy/fc0", Column::F32(arr2(&[[1., 2., 3.]]).into_dyn())),
        ];
        if with_timeouts {
            items.push(("timeouts", Column::Bool(arr1(&[false, true, false, false]).into_dyn())));
        }
        Group::from_flat(items).unwrap()
    }

    #[test]
    fn test_rename_and_format() -> Result<()> {
        let (steps, metadata) = SchemaNormalizer::new(true).normalize(raw(true), None)?;
        assert_eq!(steps.len(), 4);
        assert_eq!(steps.reward.shape(), &[4, 1]);
        assert_eq!(steps.terminated, arr2(&[[false], [false], [true], [false]]).into_dyn());
        assert_eq!(
            steps.truncated,
            Some(arr2(&[[false], [true], [false], [false]]).into_dyn())
        );
        assert!(steps.next_observation.is_none());
        assert!(steps.info.as_ref().unwrap().contains_key("qpos"));

        // Metadata rows differ from the steps but are not an error
        assert_eq!(metadata.len(), 2);
        assert_eq!(
            metadata.get_path("algorithm"),
            Some(&Node::Array(Column::I64(arr1(&[42]).into_dyn())))
        );
        Ok(())
    }

    #[test]
    fn test_done_policy() -> Result<()> {
        let (steps, _) = SchemaNormalizer::new(true).normalize(raw(true), None)?;
        assert_eq!(steps.done, arr2(&[[false], [true], [true], [false]]).into_dyn());

        let (steps, _) = SchemaNormalizer::new(false).normalize(raw(true), None)?;
        assert_eq!(steps.done, steps.terminated);

        // without timeouts, both policies fall back to terminated
        let (steps, _) = SchemaNormalizer::new(true).normalize(raw(false), None)?;
        assert_eq!(steps.done, steps.terminated);
        assert!(steps.truncated.is_none());
        Ok(())
    }

    #[test]
    fn test_missing_mandatory_field() {
        for key in ["observations", "actions", "rewards", "terminals"].iter() {
            let mut table = raw(false);
            table.remove(key);
            let err = SchemaNormalizer::new(true).normalize(table, None).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<D4rlError>(),
                Some(D4rlError::SchemaError(_))
            ));
        }
    }

    #[test]
    fn test_without_metadata_and_info() -> Result<()> {
        let mut table = raw(false);
        table.remove("metadata");
        table.remove("infos");
        let (steps, metadata) = SchemaNormalizer::new(true).normalize(table, None)?;
        assert!(metadata.is_empty());
        assert!(steps.info.is_none());
        Ok(())
    }

    #[test]
    fn test_inconsistent_rows() {
        let mut table = raw(false);
        table.insert("rewards", Column::F32(arr1(&[1., 2., 3.]).into_dyn()));
        let err = SchemaNormalizer::new(true).normalize(table, None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<D4rlError>(),
            Some(D4rlError::SchemaError(_))
        ));
    }

    #[test]
    fn test_spec_coercion() -> Result<()> {
        let spec = EnvSpec {
            observation: TensorSpec::new(Dtype::F32, vec![2]),
            action: TensorSpec::new(Dtype::F64, vec![1]),
            reward: TensorSpec::new(Dtype::F64, vec![]),
        };
        let (steps, _) = SchemaNormalizer::new(true).normalize(raw(false), Some(&spec))?;
        assert_eq!(steps.observation.dtype(), Dtype::F32);
        assert_eq!(steps.action.dtype(), Dtype::F64);
        assert_eq!(steps.reward.dtype(), Dtype::F64);
        assert_eq!(steps.reward.shape(), &[4, 1]);
        Ok(())
    }

    #[test]
    fn test_prebuilt_next_observations() -> Result<()> {
        let mut table = raw(false);
        table.insert(
            "next_observations",
            Column::F64(arr2(&[[1., 1.], [2., 2.], [3., 3.], [4., 4.]]).into_dyn()),
        );
        let (steps, _) = SchemaNormalizer::new(true).normalize(table, None)?;
        assert_eq!(steps.next_observation.unwrap().rows(), 4);
        Ok(())
    }
}

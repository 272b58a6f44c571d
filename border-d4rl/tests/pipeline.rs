use anyhow::Result;
use border_d4rl::{
    download::ArchiveCache, registry::dataset_url, ArchiveDecoder, Column, D4rlConfig, D4rlEnv,
    D4rlError, D4rlLoader, Dtype, EnvKwargs, EnvSpec, Group, NdarrayConverter, RawTable,
    table_batch, TensorSpec,
};
use border_core::ExperienceBufferBase;
use ndarray::{arr1, arr2, ArrayD, Axis};
use std::{cell::RefCell, fs::File, path::Path};
use tempdir::TempDir;
use test_log::test;

const NAME: &str = "hopper-medium-v2";

fn flags(v: &[bool]) -> ArrayD<bool> {
    arr1(v).insert_axis(Axis(1)).into_dyn()
}

fn column_f32(v: &[f32]) -> Column {
    Column::F32(arr1(v).insert_axis(Axis(1)).into_dyn())
}

/// Flat sequence of 4 steps, `terminals = [F, F, T, F]`.
fn raw_table(timeouts: Option<&[bool]>) -> RawTable {
    let mut items = vec![
        (
            "observations",
            Column::F64(arr2(&[[1., 1.], [2., 2.], [3., 3.], [4., 4.]]).into_dyn()),
        ),
        ("actions", Column::F32(arr2(&[[0.1], [0.2], [0.3], [0.4]]).into_dyn())),
        ("rewards", Column::F64(arr1(&[1., 2., 3., 4.]).into_dyn())),
        ("terminals", Column::Bool(arr1(&[false, false, true, false]).into_dyn())),
        ("infos/qpos", Column::F64(arr1(&[10., 20., 30., 40.]).into_dyn())),
        ("metadata/algorithm", Column::I64(arr1(&[7, 7, 7, 7]).into_dyn())),
    ];
    if let Some(timeouts) = timeouts {
        items.push(("timeouts", Column::Bool(arr1(timeouts).into_dyn())));
    }
    Group::from_flat(items).unwrap()
}

fn spec() -> EnvSpec {
    EnvSpec {
        observation: TensorSpec::new(Dtype::F32, vec![2]),
        action: TensorSpec::new(Dtype::F32, vec![1]),
        reward: TensorSpec::new(Dtype::F32, vec![]),
    }
}

struct MockEnv {
    table: RawTable,
    qlearning_kwargs: RefCell<Option<EnvKwargs>>,
}

impl MockEnv {
    fn new(table: RawTable) -> Self {
        Self {
            table,
            qlearning_kwargs: RefCell::new(None),
        }
    }
}

impl D4rlEnv for MockEnv {
    fn get_dataset(&self) -> Result<RawTable> {
        Ok(self.table.clone())
    }

    fn qlearning_dataset(&self, kwargs: &EnvKwargs) -> Result<RawTable> {
        self.qlearning_kwargs.replace(Some(kwargs.clone()));
        let mut table = self.table.clone();
        let n = table.column("observations").map(|c| c.rows()).unwrap_or(0);
        let next_observations =
            Column::F64(arr2(&[[2., 2.], [9., 9.], [4., 4.], [5., 5.]]).into_dyn());
        table.insert("next_observations", next_observations.slice_rows(0..n));
        Ok(table)
    }

    fn spec(&self) -> Result<EnvSpec> {
        Ok(spec())
    }
}

struct MockDecoder {
    table: RawTable,
}

impl ArchiveDecoder for MockDecoder {
    fn decode(&self, path: &Path) -> Result<RawTable> {
        assert!(path.exists());
        Ok(self.table.clone())
    }
}

fn env_export_config() -> D4rlConfig {
    D4rlConfig::default().direct_download(false)
}

fn qlearning_config() -> D4rlConfig {
    D4rlConfig::default()
        .direct_download(false)
        .from_env(false)
        .env_kwarg("terminate_on_end", true)
}

#[test]
fn derived_scenario() -> Result<()> {
    let env = MockEnv::new(raw_table(None));
    let dataset = D4rlLoader::new(env_export_config())
        .with_env(&env)
        .load(NAME)?;
    let table = dataset.table();

    assert_eq!(table.len(), 3);
    assert_eq!(table.next.done, flags(&[false, false, true]));
    assert_eq!(table.done, flags(&[false, false, false]));
    assert_eq!(table.reward, column_f32(&[0., 1., 2.]));
    assert_eq!(table.next.reward, column_f32(&[1., 2., 3.]));
    assert_eq!(
        table.next.observation,
        Column::F32(arr2(&[[2., 2.], [3., 3.], [0., 0.]]).into_dyn())
    );
    assert!(table.truncated.is_none());
    Ok(())
}

#[test]
fn prebuilt_scenario() -> Result<()> {
    let env = MockEnv::new(raw_table(None).slice_rows(1..4));
    let dataset = D4rlLoader::new(qlearning_config()).with_env(&env).load(NAME)?;
    let table = dataset.table();

    assert_eq!(table.len(), 3);
    assert_eq!(table.next.done, flags(&[false, true, false]));
    // the raw next observation of row 1 was [9, 9]
    assert!(table.next.observation.row_is_zero(1));
    assert!(!table.next.observation.row_is_zero(0));
    assert!(!table.next.observation.row_is_zero(2));

    let kwargs = env.qlearning_kwargs.borrow();
    assert_eq!(
        kwargs.as_ref().and_then(|kw| kw.get("terminate_on_end")),
        Some(&serde_yaml::Value::Bool(true))
    );
    Ok(())
}

#[test]
fn row_accounting() -> Result<()> {
    let env = MockEnv::new(raw_table(None));
    let derived = D4rlLoader::new(env_export_config()).with_env(&env).load(NAME)?;
    let prebuilt = D4rlLoader::new(qlearning_config()).with_env(&env).load(NAME)?;
    assert_eq!(derived.num_transitions(), 3);
    assert_eq!(prebuilt.num_transitions(), 4);
    Ok(())
}

#[test]
fn shift_and_next_observation() -> Result<()> {
    let env = MockEnv::new(raw_table(Some(&[false, false, false, false])));
    let dataset = D4rlLoader::new(env_export_config()).with_env(&env).load(NAME)?;
    let table = dataset.table();
    let reward = table.reward.to_array::<f32>();
    let next_reward = table.next.reward.to_array::<f32>();
    let observation = table.observation.to_array::<f32>();
    let next_observation = table.next.observation.to_array::<f32>();
    let next_done = table.next_done();

    assert_eq!(reward[[0, 0]], 0.);
    for t in 1..table.len() {
        assert_eq!(reward[[t, 0]], next_reward[[t - 1, 0]]);
        assert_eq!(table.done[[t, 0]], table.next.done[[t - 1, 0]]);
    }
    for t in 0..table.len() - 1 {
        if !next_done[t] {
            assert_eq!(
                next_observation.index_axis(Axis(0), t),
                observation.index_axis(Axis(0), t + 1)
            );
        }
    }
    Ok(())
}

#[test]
fn done_policy() -> Result<()> {
    let timeouts = [false, true, false, false];
    let env = MockEnv::new(raw_table(Some(&timeouts)));

    let dataset = D4rlLoader::new(env_export_config()).with_env(&env).load(NAME)?;
    let table = dataset.table();
    assert_eq!(table.next.done, flags(&[false, true, true]));
    assert_eq!(table.next.truncated, Some(flags(&[false, true, false])));
    assert_eq!(table.next.terminated, flags(&[false, false, true]));

    let config = env_export_config().use_truncated_as_done(false);
    let dataset = D4rlLoader::new(config).with_env(&env).load(NAME)?;
    let table = dataset.table();
    assert_eq!(table.next.done, flags(&[false, false, true]));
    // the truncated step keeps its successor
    assert!(!table.next.observation.row_is_zero(1));
    Ok(())
}

#[test]
fn metadata_isolation() -> Result<()> {
    let env = MockEnv::new(raw_table(None));
    let dataset = D4rlLoader::new(env_export_config()).with_env(&env).load(NAME)?;

    assert_eq!(
        dataset.metadata().column("algorithm"),
        Some(&Column::I64(arr1(&[7, 7, 7, 7]).into_dyn()))
    );
    let info = dataset.table().info.as_ref().unwrap();
    assert_eq!(info.keys().collect::<Vec<_>>(), vec!["qpos"]);
    assert!(dataset.table().next.info.is_some());
    Ok(())
}

#[test]
fn info_passthrough() -> Result<()> {
    let env = MockEnv::new(raw_table(None));
    let dataset = D4rlLoader::new(env_export_config()).with_env(&env).load(NAME)?;
    let table = dataset.table();
    assert_eq!(
        table.info.as_ref().unwrap().column("qpos"),
        Some(&Column::F64(arr1(&[10., 20., 30.]).into_dyn()))
    );
    assert_eq!(
        table.next.info.as_ref().unwrap().column("qpos"),
        Some(&Column::F64(arr1(&[20., 30., 40.]).into_dyn()))
    );
    Ok(())
}

#[test]
fn spec_coercion() -> Result<()> {
    let env = MockEnv::new(raw_table(None));
    let dataset = D4rlLoader::new(env_export_config()).with_env(&env).load(NAME)?;
    assert_eq!(dataset.table().observation.dtype(), Dtype::F32);
    assert_eq!(dataset.table().next.observation.dtype(), Dtype::F32);
    assert_eq!(dataset.specs(), Some(&spec()));
    Ok(())
}

#[test]
fn split_trajectories() -> Result<()> {
    // episodes of length 2 (timeout) and 1 (terminal), then an open tail of 3
    let mut table = raw_table(Some(&[false, true, false, false]));
    let extra = raw_table(Some(&[false, false, false, false])).slice_rows(0..3);
    table = concat(&table, &extra);
    let env = MockEnv::new(table);

    let config = env_export_config().split_trajs(true);
    let dataset = D4rlLoader::new(config).with_env(&env).load(NAME)?;
    let trajs = dataset.trajectories().unwrap();

    assert_eq!(trajs.lengths, vec![2, 1, 3]);
    assert_eq!(trajs.table.observation.shape(), &[3, 3, 2]);
    for (ep, &len) in trajs.lengths.iter().enumerate() {
        assert!(trajs.table.next.done[[ep, len - 1, 0]]);
        for t in 0..3 {
            assert_eq!(trajs.mask[[ep, t]], t < len);
        }
    }

    // one entry per episode
    let replay_buffer = dataset.create_replay_buffer(&NdarrayConverter)?;
    assert_eq!(replay_buffer.len(), 3);
    assert_eq!(replay_buffer.num_truncated_flags(), 1);
    assert_eq!(replay_buffer.num_terminated_flags(), 1);
    assert!((replay_buffer.sum_rewards() as f64 - trajs.table.sum_rewards()).abs() < 1e-6);

    let actions = replay_buffer.whole_actions();
    assert_eq!(actions.data.shape(), &[3, 3, 1]);
    assert_eq!(actions.mask.as_ref(), Some(&trajs.mask));
    Ok(())
}

fn concat(a: &RawTable, b: &RawTable) -> RawTable {
    let items = a
        .flatten()
        .into_iter()
        .filter_map(|(key, col)| {
            let other = b.get_path(&key)?;
            match (col, other) {
                (Column::F64(x), border_d4rl::Node::Array(Column::F64(y))) => Some((
                    key,
                    Column::F64(ndarray::concatenate(Axis(0), &[x.view(), y.view()]).unwrap()),
                )),
                (Column::F32(x), border_d4rl::Node::Array(Column::F32(y))) => Some((
                    key,
                    Column::F32(ndarray::concatenate(Axis(0), &[x.view(), y.view()]).unwrap()),
                )),
                (Column::I64(x), border_d4rl::Node::Array(Column::I64(y))) => Some((
                    key,
                    Column::I64(ndarray::concatenate(Axis(0), &[x.view(), y.view()]).unwrap()),
                )),
                (Column::Bool(x), border_d4rl::Node::Array(Column::Bool(y))) => Some((
                    key,
                    Column::Bool(ndarray::concatenate(Axis(0), &[x.view(), y.view()]).unwrap()),
                )),
                _ => None,
            }
        })
        .collect::<Vec<_>>();
    Group::from_flat(items).unwrap()
}

#[test]
fn replay_buffer_from_flat_table() -> Result<()> {
    let env = MockEnv::new(raw_table(None));
    let dataset = D4rlLoader::new(env_export_config()).with_env(&env).load(NAME)?;
    let replay_buffer = dataset.create_replay_buffer(&NdarrayConverter)?;
    assert_eq!(replay_buffer.len(), 3);
    assert_eq!(replay_buffer.num_terminated_flags(), 1);
    assert_eq!(replay_buffer.num_truncated_flags(), 0);
    assert_eq!(replay_buffer.sum_rewards(), 6.);
    assert_eq!(replay_buffer.whole_actions().data.shape()[0], 3);

    let batch = table_batch(dataset.table(), &NdarrayConverter)?;
    assert_eq!(batch.reward, vec![1., 2., 3.]);
    assert_eq!(batch.is_terminated, vec![0, 0, 1]);
    assert_eq!(batch.is_truncated, vec![0, 0, 0]);
    assert_eq!(batch.next_obs.data, arr2(&[[2f32, 2.], [3., 3.], [0., 0.]]).into_dyn());
    Ok(())
}

#[test]
fn direct_download_from_cache() -> Result<()> {
    let dir = TempDir::new("d4rl_direct")?;
    let cache = ArchiveCache::new(dir.path())?;
    File::create(cache.path_for(&dataset_url(NAME)?)?)?;

    let decoder = MockDecoder {
        table: raw_table(None),
    };
    let config = D4rlConfig::default().cache_dir(dir.path());
    let dataset = D4rlLoader::new(config).with_decoder(&decoder).load(NAME)?;

    assert_eq!(dataset.num_transitions(), 3);
    assert!(dataset.specs().is_none());
    // no spec, the archive dtype is kept
    assert_eq!(dataset.table().observation.dtype(), Dtype::F64);
    Ok(())
}

fn error_of(res: Result<border_d4rl::D4rlDataset>) -> Option<D4rlError> {
    res.err()
        .and_then(|e| e.downcast_ref::<D4rlError>().cloned())
}

#[test]
fn provenance_errors() {
    let env = MockEnv::new(raw_table(None));
    let decoder = MockDecoder {
        table: raw_table(None),
    };

    let config = D4rlConfig::default().env_kwarg("terminate_on_end", true);
    let res = D4rlLoader::new(config)
        .with_env(&env)
        .with_decoder(&decoder)
        .load(NAME);
    assert!(matches!(error_of(res), Some(D4rlError::ProvenanceConfigError(_))));

    let config = env_export_config().env_kwarg("terminate_on_end", true);
    let res = D4rlLoader::new(config).with_env(&env).load(NAME);
    assert!(matches!(error_of(res), Some(D4rlError::ProvenanceConfigError(_))));

    let res = D4rlLoader::new(env_export_config()).load(NAME);
    assert!(matches!(error_of(res), Some(D4rlError::ProvenanceConfigError(_))));
}

#[test]
fn unknown_dataset() {
    let decoder = MockDecoder {
        table: raw_table(None),
    };
    let res = D4rlLoader::new(D4rlConfig::default())
        .with_decoder(&decoder)
        .load("not-a-dataset-v0");
    assert!(matches!(error_of(res), Some(D4rlError::UnknownDatasetError(_))));
}

#[test]
fn missing_mandatory_field() {
    let mut table = raw_table(None);
    table.remove("terminals");
    let env = MockEnv::new(table);
    let res = D4rlLoader::new(env_export_config()).with_env(&env).load(NAME);
    assert!(matches!(error_of(res), Some(D4rlError::SchemaError(_))));
}

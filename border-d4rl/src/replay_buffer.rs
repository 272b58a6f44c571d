//! Hand-off of finished transitions to a replay buffer.
//!
//! A flat table is handed over row by row. Padded episodes are handed over
//! as they are, one replay buffer entry per episode.
use crate::{
    column::Column,
    table::{row_flags, StepTable},
    trajectory::Trajectories,
};
use anyhow::Result;
use border_core::generic_replay_buffer::{BatchBase, GenericTransitionBatch};
use ndarray::{ArrayD, ArrayViewD, Axis, Slice};

/// Converts columns of a dataset into the batches stored in a replay buffer.
///
/// The leading axis of a column runs over transitions for a flat table and
/// over episodes for padded `[num_episodes, max_len, ...]` columns. In the
/// latter case the validity mask of the episodes is given.
pub trait D4rlConverter {
    /// Batch of observations.
    type ObsBatch: BatchBase;

    /// Batch of actions.
    type ActBatch: BatchBase;

    /// Converts observations, used for both `obs` and `next_obs`.
    fn convert_observation_batch(
        &self,
        obs: &Column,
        mask: Option<&ArrayD<bool>>,
    ) -> Result<Self::ObsBatch>;

    /// Converts actions.
    fn convert_action_batch(
        &self,
        act: &Column,
        mask: Option<&ArrayD<bool>>,
    ) -> Result<Self::ActBatch>;
}

/// Batch of `f32` arrays along the leading axis.
///
/// Storage is allocated on the first push, when the shape of the rows is
/// known. `mask` is kept for padded episodes.
#[derive(Clone, Debug)]
pub struct NdarrayBatch {
    capacity: usize,
    pub data: ArrayD<f32>,
    pub mask: Option<ArrayD<bool>>,
}

impl NdarrayBatch {
    pub fn from_array(data: ArrayD<f32>, mask: Option<ArrayD<bool>>) -> Self {
        Self {
            capacity: data.len_of(Axis(0)),
            data,
            mask,
        }
    }

    pub fn len(&self) -> usize {
        if self.data.ndim() == 0 {
            0
        } else {
            self.data.len_of(Axis(0))
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn with_capacity<T: Clone + Default>(like: &ArrayD<T>, capacity: usize) -> ArrayD<T> {
    let mut shape = like.shape().to_vec();
    shape[0] = capacity;
    ArrayD::default(shape)
}

impl BatchBase for NdarrayBatch {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            data: ArrayD::zeros(vec![0]),
            mask: None,
        }
    }

    /// Rows wrap around at the capacity.
    fn push(&mut self, ix: usize, data: Self) {
        if data.is_empty() || self.capacity == 0 {
            return;
        }
        if self.data.shape()[1..] != data.data.shape()[1..] || self.len() != self.capacity {
            self.data = with_capacity(&data.data, self.capacity);
        }
        for (k, row) in data.data.outer_iter().enumerate() {
            self.data
                .index_axis_mut(Axis(0), (ix + k) % self.capacity)
                .assign(&row);
        }

        if let Some(src) = &data.mask {
            let capacity = self.capacity;
            let mask = self
                .mask
                .get_or_insert_with(|| with_capacity(src, capacity));
            for (k, row) in src.outer_iter().enumerate() {
                mask.index_axis_mut(Axis(0), (ix + k) % capacity)
                    .assign(&row);
            }
        }
    }

    fn sample(&self, ixs: &Vec<usize>) -> Self {
        Self {
            capacity: ixs.len(),
            data: self.data.select(Axis(0), ixs),
            mask: self.mask.as_ref().map(|m| m.select(Axis(0), ixs)),
        }
    }
}

/// Converter producing [`NdarrayBatch`]es of `f32`.
#[derive(Clone, Debug, Default)]
pub struct NdarrayConverter;

impl D4rlConverter for NdarrayConverter {
    type ObsBatch = NdarrayBatch;
    type ActBatch = NdarrayBatch;

    fn convert_observation_batch(
        &self,
        obs: &Column,
        mask: Option<&ArrayD<bool>>,
    ) -> Result<NdarrayBatch> {
        Ok(NdarrayBatch::from_array(obs.to_array(), mask.cloned()))
    }

    fn convert_action_batch(
        &self,
        act: &Column,
        mask: Option<&ArrayD<bool>>,
    ) -> Result<NdarrayBatch> {
        Ok(NdarrayBatch::from_array(act.to_array(), mask.cloned()))
    }
}

/// Batch of the rows of a flat table.
///
/// `reward`, `is_terminated` and `is_truncated` describe the transition out
/// of the step, i.e. they are taken from the `next` sub-record.
pub fn table_batch<T: D4rlConverter>(
    table: &StepTable,
    converter: &T,
) -> Result<GenericTransitionBatch<T::ObsBatch, T::ActBatch>> {
    let n = table.len();
    Ok(GenericTransitionBatch {
        obs: converter.convert_observation_batch(&table.observation, None)?,
        act: converter.convert_action_batch(&table.action, None)?,
        next_obs: converter.convert_observation_batch(&table.next.observation, None)?,
        reward: table.next.reward.to_array::<f32>().iter().copied().collect(),
        is_terminated: to_i8(row_flags(table.next.terminated.view())),
        is_truncated: match &table.next.truncated {
            Some(t) => to_i8(row_flags(t.view())),
            None => vec![0; n],
        },
        weight: None,
        ix_sample: None,
    })
}

/// Batch of padded episodes, one entry per episode.
///
/// `obs`, `act` and `next_obs` keep the `[num_episodes, max_len, ...]` layout
/// together with the mask. The reward of an entry is the return of the
/// episode; its flags are those of the last valid step.
pub fn episode_batch<T: D4rlConverter>(
    trajs: &Trajectories,
    converter: &T,
) -> Result<GenericTransitionBatch<T::ObsBatch, T::ActBatch>> {
    let table = &trajs.table;
    let mask = Some(&trajs.mask);
    let reward = table.next.reward.to_array::<f32>();
    let terminated = &table.next.terminated;

    let mut returns = Vec::with_capacity(trajs.num_episodes());
    let mut is_terminated = Vec::with_capacity(trajs.num_episodes());
    let mut is_truncated = Vec::with_capacity(trajs.num_episodes());
    for (ep, &len) in trajs.lengths.iter().enumerate() {
        returns.push(episode_rows(&reward, ep, len).sum());
        is_terminated.push(last_flag(terminated, ep, len));
        is_truncated.push(match &table.next.truncated {
            Some(t) => last_flag(t, ep, len),
            None => 0,
        });
    }

    Ok(GenericTransitionBatch {
        obs: converter.convert_observation_batch(&table.observation, mask)?,
        act: converter.convert_action_batch(&table.action, mask)?,
        next_obs: converter.convert_observation_batch(&table.next.observation, mask)?,
        reward: returns,
        is_terminated,
        is_truncated,
        weight: None,
        ix_sample: None,
    })
}

/// Rows `0..len` of episode `ep` of a padded `[E, L, ...]` array.
fn episode_rows<T>(arr: &ArrayD<T>, ep: usize, len: usize) -> ArrayViewD<'_, T> {
    let mut rows = arr.index_axis(Axis(0), ep);
    rows.slice_axis_inplace(Axis(0), Slice::from(0..len));
    rows
}

fn last_flag(flags: &ArrayD<bool>, ep: usize, len: usize) -> i8 {
    let rows = row_flags(episode_rows(flags, ep, len));
    rows.last().map_or(0, |&f| i8::from(f))
}

fn to_i8(flags: Vec<bool>) -> Vec<i8> {
    flags.into_iter().map(i8::from).collect()
}

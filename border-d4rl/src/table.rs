//! Raw and canonical step tables.
//!
//! Raw tables come straight from a provenance adapter and keep whatever field
//! names the source used. [`Steps`] is the normalized form produced by the
//! schema normalizer, and [`StepTable`] is the finished table of transitions
//! with its `next` sub-record. Each pipeline stage consumes its input table
//! and returns a new one.
use crate::column::{self, Column, Group};
use ndarray::{ArrayD, ArrayViewD};
use std::ops::Range;

/// Provenance-specific columns, possibly nested (`infos/...`, `metadata/...`).
pub type RawTable = Group;

/// Dataset-level side-channel extracted from the `metadata` block of a raw table.
pub type Metadata = Group;

/// Step table after schema normalization.
///
/// Scalar fields have shape `[N, 1]`. `next_observation` is set only when
/// the source ships pre-built next observations.
#[derive(Clone, Debug, PartialEq)]
pub struct Steps {
    pub observation: Column,
    pub action: Column,
    pub reward: Column,
    pub terminated: ArrayD<bool>,
    pub truncated: Option<ArrayD<bool>>,
    pub done: ArrayD<bool>,
    pub info: Option<Group>,
    pub next_observation: Option<Column>,
}

impl Steps {
    pub fn len(&self) -> usize {
        self.observation.rows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fields describing what resulted from acting at a step.
#[derive(Clone, Debug, PartialEq)]
pub struct NextStep {
    pub observation: Column,
    pub info: Option<Group>,
    pub reward: Column,
    pub done: ArrayD<bool>,
    pub terminated: ArrayD<bool>,
    pub truncated: Option<ArrayD<bool>>,
}

/// Table of transitions `(observation, action) -> next`.
///
/// The leading axis indexes transitions. After trajectory splitting the two
/// leading axes index episodes and time steps instead.
#[derive(Clone, Debug, PartialEq)]
pub struct StepTable {
    pub observation: Column,
    pub action: Column,
    pub reward: Column,
    pub terminated: ArrayD<bool>,
    pub truncated: Option<ArrayD<bool>>,
    pub done: ArrayD<bool>,
    pub info: Option<Group>,
    pub next: NextStep,
}

impl StepTable {
    /// Length of the leading axis.
    pub fn len(&self) -> usize {
        self.observation.rows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flattened `next.done` flags of a flat table.
    pub fn next_done(&self) -> Vec<bool> {
        row_flags(self.next.done.view())
    }

    /// Number of `true` flags in `next.terminated`.
    pub fn num_terminated_flags(&self) -> usize {
        self.next.terminated.iter().filter(|&&f| f).count()
    }

    /// Number of `true` flags in `next.truncated` (`0` if the field is absent).
    pub fn num_truncated_flags(&self) -> usize {
        self.next
            .truncated
            .as_ref()
            .map(|t| t.iter().filter(|&&f| f).count())
            .unwrap_or(0)
    }

    /// Sum of `next.reward`.
    pub fn sum_rewards(&self) -> f64 {
        self.next.reward.to_array::<f64>().sum()
    }

    /// Packs the given row ranges of a flat table into `[episodes, max_len, ...]`.
    pub(crate) fn split_pad(&self, episodes: &[Range<usize>], max_len: usize) -> StepTable {
        let pad = |arr: &ArrayD<bool>| column::split_pad(arr, episodes, max_len);
        let next = &self.next;
        StepTable {
            observation: self.observation.split_pad(episodes, max_len),
            action: self.action.split_pad(episodes, max_len),
            reward: self.reward.split_pad(episodes, max_len),
            terminated: pad(&self.terminated),
            truncated: self.truncated.as_ref().map(pad),
            done: pad(&self.done),
            info: self.info.as_ref().map(|g| g.split_pad(episodes, max_len)),
            next: NextStep {
                observation: next.observation.split_pad(episodes, max_len),
                info: next.info.as_ref().map(|g| g.split_pad(episodes, max_len)),
                reward: next.reward.split_pad(episodes, max_len),
                done: pad(&next.done),
                terminated: pad(&next.terminated),
                truncated: next.truncated.as_ref().map(pad),
            },
        }
    }
}

/// Per-row flags of a `[N, 1]` array.
pub(crate) fn row_flags(arr: ArrayViewD<'_, bool>) -> Vec<bool> {
    arr.outer_iter().map(|row| row.iter().any(|&f| f)).collect()
}

//! Splitting a flat table of transitions into padded episodes.
use crate::table::StepTable;
use log::info;
use ndarray::{Array2, ArrayD};
use std::ops::Range;

/// Episodes packed along the two leading axes `[num_episodes, max_len, ...]`.
///
/// Rows beyond the length of an episode are zero-filled padding; consumers
/// must check [`Trajectories::mask`] before using a row.
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectories {
    /// Padded table.
    pub table: StepTable,

    /// `true` for valid rows, `false` for padding. Shape `[num_episodes, max_len]`.
    pub mask: ArrayD<bool>,

    /// Number of valid rows of every episode.
    pub lengths: Vec<usize>,
}

impl Trajectories {
    pub fn num_episodes(&self) -> usize {
        self.lengths.len()
    }

    pub fn max_len(&self) -> usize {
        self.lengths.iter().copied().max().unwrap_or(0)
    }

    /// Total number of valid rows.
    pub fn num_transitions(&self) -> usize {
        self.lengths.iter().sum()
    }
}

/// Row ranges of the episodes in a flat table.
///
/// A `true` in `next_done` closes an episode. Rows after the last `true`
/// form a final episode of their own.
pub fn episode_ranges(next_done: &[bool]) -> Vec<Range<usize>> {
    let mut ranges = vec![];
    let mut start = 0;
    for (ix, &done) in next_done.iter().enumerate() {
        if done {
            ranges.push(start..ix + 1);
            start = ix + 1;
        }
    }
    if start < next_done.len() {
        ranges.push(start..next_done.len());
    }
    ranges
}

/// Splits a flat table into episodes on `next.done` and pads them to the
/// longest episode.
///
/// `next.done` is forced to `true` at the last valid step of every episode.
pub fn split_trajectories(table: StepTable) -> Trajectories {
    let ranges = episode_ranges(&table.next_done());
    let lengths = ranges.iter().map(|r| r.len()).collect::<Vec<_>>();
    let max_len = lengths.iter().copied().max().unwrap_or(0);

    let mut padded = table.split_pad(&ranges, max_len);
    let trailing = &padded.next.done.shape()[2..];
    let last_ix = vec![0; trailing.len()];
    for (ep, &len) in lengths.iter().enumerate() {
        let mut ix = vec![ep, len - 1];
        ix.extend_from_slice(&last_ix);
        padded.next.done[&ix[..]] = true;
    }

    let mask = Array2::from_shape_fn((lengths.len(), max_len), |(ep, t)| t < lengths[ep]).into_dyn();
    info!(
        "Split {} transitions into {} episodes (max length {})",
        table.len(),
        lengths.len(),
        max_len
    );

    Trajectories {
        table: padded,
        mask,
        lengths,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        column::Column,
        table::{NextStep, StepTable},
    };
    use ndarray::{arr1, arr2, Axis};
    use test_log::test;

    fn flags(v: &[bool]) -> ArrayD<bool> {
        arr1(v).insert_axis(Axis(1)).into_dyn()
    }

    fn table(next_done: &[bool]) -> StepTable {
        let n = next_done.len();
        let obs = Column::F32(
            ndarray::Array1::from_iter((1..=n).map(|x| x as f32))
                .insert_axis(Axis(1))
                .into_dyn(),
        );
        let no = flags(&vec![false; n]);
        StepTable {
            observation: obs.clone(),
            action: obs.clone(),
            reward: obs.clone(),
            terminated: no.clone(),
            truncated: None,
            done: no.clone(),
            info: None,
            next: NextStep {
                observation: obs.clone(),
                info: None,
                reward: obs,
                done: flags(next_done),
                terminated: flags(next_done),
                truncated: None,
            },
        }
    }

    #[test]
    fn test_episode_ranges() {
        assert_eq!(episode_ranges(&[false, true, false, false, true]), vec![0..2, 2..5]);
        assert_eq!(episode_ranges(&[false, true, false]), vec![0..2, 2..3]);
        assert_eq!(episode_ranges(&[true, true]), vec![0..1, 1..2]);
        assert!(episode_ranges(&[]).is_empty());
    }

    #[test]
    fn test_split() {
        let trajs = split_trajectories(table(&[false, true, false, false, false]));
        assert_eq!(trajs.lengths, vec![2, 3]);
        assert_eq!(trajs.table.observation.shape(), &[2, 3, 1]);
        assert_eq!(trajs.mask, arr2(&[[true, true, false], [true, true, true]]).into_dyn());

        let expected = ndarray::arr3(&[[[1.], [2.], [0.]], [[3.], [4.], [5.]]]);
        assert_eq!(trajs.table.observation, Column::F32(expected.into_dyn()));

        // the tail episode had no terminal flag, it is closed by the split
        let done = ndarray::arr3(&[[[false], [true], [false]], [[false], [false], [true]]]);
        assert_eq!(trajs.table.next.done, done.into_dyn());
        // the terminated flags themselves are untouched
        assert_eq!(
            trajs.table.next.terminated,
            ndarray::arr3(&[[[false], [true], [false]], [[false], [false], [false]]]).into_dyn()
        );
    }

    #[test]
    fn test_split_empty() {
        let trajs = split_trajectories(table(&[]));
        assert_eq!(trajs.num_episodes(), 0);
        assert_eq!(trajs.max_len(), 0);
        assert_eq!(trajs.mask.shape(), &[0, 0]);
    }
}

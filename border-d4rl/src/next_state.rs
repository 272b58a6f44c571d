//! Construction of the `next` sub-record.
//!
//! Every transition needs the observation the agent sees after acting. It is
//! either shipped by the source ([`NextStateMode::Prebuilt`]) or derived from
//! the flat observation sequence ([`NextStateMode::Derived`]). In both modes
//! the next observation of a terminal step is overwritten with zeros, since
//! the successor of such a step is undefined.
use crate::{
    table::{NextStep, StepTable, Steps},
    D4rlError,
};
use anyhow::Result;
use log::{info, warn};

/// How `next.observation` is obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NextStateMode {
    /// Adopt the `next_observations` field of the source. No row is dropped.
    Prebuilt,

    /// `next.observation[t] = observation[t + 1]`. The last row of the flat
    /// sequence has no successor and is dropped.
    Derived,
}

/// Attaches the `next` sub-record to the normalized steps.
///
/// `next.reward`, `next.done`, `next.terminated` and `next.truncated` are
/// copies of the values recorded for the step, before any temporal shift.
pub fn construct(steps: Steps, mode: NextStateMode) -> Result<StepTable> {
    let n = steps.len();
    let (steps, next_observation, next_info) = match mode {
        NextStateMode::Prebuilt => {
            let next_observation = steps.next_observation.clone().ok_or_else(|| {
                D4rlError::SchemaError(
                    "pre-built next-state mode requires a next_observations field".to_string(),
                )
            })?;
            (steps, next_observation, None)
        }
        NextStateMode::Derived => {
            if steps.next_observation.is_some() {
                warn!("next_observations is ignored, next observations are derived from the sequence");
            }
            let keep = 0..n.saturating_sub(1);
            let next_observation = steps.observation.slice_rows(1.min(n)..n);
            let next_info = steps.info.as_ref().map(|info| info.slice_rows(1.min(n)..n));
            (drop_last(steps, keep), next_observation, next_info)
        }
    };

    let next = NextStep {
        observation: next_observation,
        info: next_info,
        reward: steps.reward.clone(),
        done: steps.done.clone(),
        terminated: steps.terminated.clone(),
        truncated: steps.truncated.clone(),
    };
    let table = StepTable {
        observation: steps.observation,
        action: steps.action,
        reward: steps.reward,
        terminated: steps.terminated,
        truncated: steps.truncated,
        done: steps.done,
        info: steps.info,
        next,
    };
    info!("Constructed next states ({:?}): {} -> {} rows", mode, n, table.len());

    Ok(table)
}

/// Keeps the rows in `keep` of every per-step field.
fn drop_last(steps: Steps, keep: std::ops::Range<usize>) -> Steps {
    let slice = |arr: &ndarray::ArrayD<bool>| crate::column::slice_rows(arr, keep.clone());
    Steps {
        observation: steps.observation.slice_rows(keep.clone()),
        action: steps.action.slice_rows(keep.clone()),
        reward: steps.reward.slice_rows(keep.clone()),
        terminated: slice(&steps.terminated),
        truncated: steps.truncated.as_ref().map(slice),
        done: slice(&steps.done),
        info: steps.info.as_ref().map(|info| info.slice_rows(keep.clone())),
        next_observation: None,
    }
}

/// Overwrites `next.observation` with zeros wherever `next.done` is `true`.
pub fn invalidate_terminal(mut table: StepTable) -> StepTable {
    let mask = table.next_done();
    let num_zeroed = mask.iter().filter(|&&d| d).count();
    table.next.observation.zero_rows(&mask);
    info!("Zeroed {} terminal next observations", num_zeroed);
    table
}

//! Temporal shift of rewards and termination flags.
//!
//! The reward and flags recorded at row `t` of a D4RL archive belong to the
//! transition that produced row `t`. The shift moves every value down by one
//! row so that the top-level fields describe the transition into the step,
//! while `next.*` keeps describing the transition out of it. Row `0` gets
//! the identity value (`0` / `false`).
use crate::{column, table::StepTable};

/// Shifts the top-level `reward`, `done`, `terminated` and `truncated`.
///
/// Every shifted field is an independent copy; the `next` sub-record is not
/// touched.
pub fn shift_reward_done(table: StepTable) -> StepTable {
    StepTable {
        reward: table.reward.shifted_down(),
        done: column::shift_down(&table.done),
        terminated: column::shift_down(&table.terminated),
        truncated: table.truncated.as_ref().map(column::shift_down),
        ..table
    }
}

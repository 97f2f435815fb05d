//! Expected utility of a single action under stochastic drift.
//!
//! An action reaches its intended cell with probability 0.8 and slips one step
//! to either side of its axis with probability 0.1 each. A move that would
//! leave the grid or enter an obstacle leaves the agent where it was, so that
//! term uses the source cell's own utility.

use crate::error::PlanError;
use crate::grid::{Action, Coord, GridWorld};

pub const INTENDED_PROBABILITY: f64 = 0.8;
pub const DRIFT_PROBABILITY: f64 = 0.1;

/// Expected utility of taking `action` from `source`, read from the previous sweep's snapshot.
///
/// Fails with `OutOfBounds` when `source` is not a cell of `previous`.
pub fn expected_utility(
    previous: &GridWorld,
    source: Coord,
    action: Action,
) -> Result<f64, PlanError> {
    let own = previous.utility(source)?;

    let intended = source.offset(action.delta());
    let (dr, dc) = action.drift_axis();
    let drift_a = source.offset((dr, dc));
    let drift_b = source.offset((-dr, -dc));

    Ok(INTENDED_PROBABILITY * utility_or_own(previous, intended, own)
        + DRIFT_PROBABILITY * utility_or_own(previous, drift_a, own)
        + DRIFT_PROBABILITY * utility_or_own(previous, drift_b, own))
}

/// Utility at `target`, or the source's own utility when the move bounces back
fn utility_or_own(previous: &GridWorld, target: Coord, own: f64) -> f64 {
    if previous.is_blocked(target) {
        return own;
    }
    previous.utility(target).unwrap_or(own)
}

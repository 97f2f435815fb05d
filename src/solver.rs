//! Synchronous value iteration over a `GridWorld`.
//!
//! Each sweep reads from a full snapshot of the previous sweep, so updates
//! within a sweep never observe each other. Iteration stops at the standard
//! bound `max_delta < tolerance * (1 - discount) / discount`.

use crate::config::{SolverConfig, SolverMode};
use crate::error::PlanError;
use crate::grid::{Action, Coord, GridWorld, Policy};
use crate::utility::expected_utility;
use log::{debug, info};

/// Outcome of a converged solve
#[derive(Debug, Clone, PartialEq)]
pub struct SolveReport {
    /// Number of sweeps performed
    pub iterations: usize,
    /// Largest absolute utility change of each sweep, in order
    pub deltas: Vec<f64>,
}

impl SolveReport {
    pub fn final_delta(&self) -> f64 {
        self.deltas.last().copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone)]
pub struct ValueIterationSolver {
    discount: f64,
    tolerance: f64,
    mode: SolverMode,
}

impl ValueIterationSolver {
    pub fn new(config: &SolverConfig) -> Result<Self, PlanError> {
        config.validate()?;
        Ok(ValueIterationSolver {
            discount: config.discount,
            tolerance: config.tolerance,
            mode: config.mode,
        })
    }

    pub fn mode(&self) -> SolverMode {
        self.mode
    }

    pub fn discount(&self) -> f64 {
        self.discount
    }

    /// Sweeps stop once the largest change falls below this value
    pub fn stopping_bound(&self) -> f64 {
        self.tolerance * (1.0 - self.discount) / self.discount
    }

    /// Iterate until convergence, updating utilities (and policies in learned mode) in place
    pub fn solve(&self, world: &mut GridWorld) -> Result<SolveReport, PlanError> {
        if self.mode == SolverMode::Fixed {
            Self::check_fixed_policy(world)?;
        }

        let bound = self.stopping_bound();
        let mut deltas = Vec::new();

        loop {
            let delta = self.sweep(world)?;
            deltas.push(delta);
            debug!("[value_iteration] sweep {}: max delta {:.8}", deltas.len(), delta);

            if delta < bound {
                break;
            }
        }

        info!(
            "[value_iteration] converged after {} sweeps (gamma={}, bound={:.8})",
            deltas.len(),
            self.discount,
            bound
        );

        Ok(SolveReport {
            iterations: deltas.len(),
            deltas,
        })
    }

    /// One synchronous sweep over every free cell. Returns the largest absolute utility change.
    pub fn sweep(&self, world: &mut GridWorld) -> Result<f64, PlanError> {
        let previous = world.clone();
        let mut max_delta: f64 = 0.0;

        for coord in previous.free_cells() {
            let cell = previous.cell_at(coord)?;

            let best = match self.mode {
                SolverMode::Learned => {
                    let (action, value) = best_action(&previous, coord)?;
                    world.set_policy(coord, action)?;
                    value
                }
                SolverMode::Fixed => match cell.policy {
                    Policy::Move(action) => expected_utility(&previous, coord, action)?,
                    other => {
                        return Err(PlanError::invalid(format!(
                            "free cell ({}, {}) has no action to evaluate ({:?})",
                            coord.row, coord.col, other
                        )))
                    }
                },
            };

            let utility = cell.reward + self.discount * best;
            world.set_utility(coord, utility)?;

            let delta = (utility - cell.utility).abs();
            if delta > max_delta {
                max_delta = delta;
            }
        }

        Ok(max_delta)
    }

    fn check_fixed_policy(world: &GridWorld) -> Result<(), PlanError> {
        for (coord, cell) in world.cells() {
            if cell.is_free() && cell.policy.action().is_none() {
                return Err(PlanError::invalid(format!(
                    "fixed-policy evaluation needs an action at ({}, {})",
                    coord.row, coord.col
                )));
            }
        }
        Ok(())
    }
}

/// Action with the strictly greatest expected utility; the first one evaluated wins ties
fn best_action(previous: &GridWorld, coord: Coord) -> Result<(Action, f64), PlanError> {
    let mut best_action = Action::ALL[0];
    let mut best_value = f64::NEG_INFINITY;

    for action in Action::ALL {
        let value = expected_utility(previous, coord, action)?;
        if value > best_value {
            best_value = value;
            best_action = action;
        }
    }

    Ok((best_action, best_value))
}

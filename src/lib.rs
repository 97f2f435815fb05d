pub mod config;
pub mod error;
pub mod grid;
pub mod pathfinding;
pub mod report;
pub mod solver;
pub mod utility;

pub use config::{Config, SolverMode};
pub use error::PlanError;
pub use grid::{Action, CellKind, Coord, GridCell, GridWorld, Policy};
pub use pathfinding::{find_path, FoundPath};
pub use solver::{SolveReport, ValueIterationSolver};

use crate::grid::{Action, Coord, GridWorld, Policy};
use crate::pathfinding::FoundPath;
use crate::solver::SolveReport;
use serde::Serialize;

/// Serializable snapshot of a solved grid and the search outcome
#[derive(Debug, Clone, Serialize)]
pub struct PlanSummary {
    pub rows: i32,
    pub cols: i32,
    pub iterations: usize,
    pub utilities: Vec<Vec<f64>>,
    pub policies: Vec<Vec<Policy>>,
    pub path: Option<Vec<Coord>>,
    pub path_cost: Option<f64>,
}

impl PlanSummary {
    pub fn new(world: &GridWorld, report: &SolveReport, path: Option<&FoundPath>) -> Self {
        let mut utilities = vec![Vec::with_capacity(world.cols() as usize); world.rows() as usize];
        let mut policies = vec![Vec::with_capacity(world.cols() as usize); world.rows() as usize];
        for (coord, cell) in world.cells() {
            utilities[coord.row as usize].push(cell.utility);
            policies[coord.row as usize].push(cell.policy);
        }

        PlanSummary {
            rows: world.rows(),
            cols: world.cols(),
            iterations: report.iterations,
            utilities,
            policies,
            path: path.map(|p| p.cells.clone()),
            path_cost: path.map(|p| p.path_cost),
        }
    }
}

/// Arrow used when printing a policy table
pub fn policy_symbol(policy: &Policy) -> &'static str {
    match policy {
        Policy::Move(action) => match action {
            Action::Left => "<-",
            Action::Right => "->",
            Action::Up => "^",
            Action::Down => "v",
        },
        Policy::Unassigned => "?",
        Policy::Obstacle => "#",
        Policy::Terminal => "T",
    }
}

/// Utility table, one row per line
pub fn format_utilities(world: &GridWorld) -> String {
    let mut result = String::new();
    for (coord, cell) in world.cells() {
        result.push_str(&format!("{:>10.6}", cell.utility));
        if coord.col == world.cols() - 1 {
            result.push('\n');
        } else {
            result.push(' ');
        }
    }
    result
}

/// Policy table, one row per line
pub fn format_policies(world: &GridWorld) -> String {
    let mut result = String::new();
    for (coord, cell) in world.cells() {
        result.push_str(&format!("{:^4}", policy_symbol(&cell.policy)));
        if coord.col == world.cols() - 1 {
            result.push('\n');
        }
    }
    result
}

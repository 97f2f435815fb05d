#![allow(dead_code)]

use gridplan::config::{SolverConfig, SolverMode, TerminalConfig};
use gridplan::{Coord, GridWorld, PlanError};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Scenario fixture: a grid, solver settings, and the expected solve and search results
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub layout: Vec<String>,
    pub terminals: Vec<TerminalConfig>,
    pub step_reward: f64,
    pub discount: f64,
    pub tolerance: f64,
    pub mode: SolverMode,
    pub start: Coord,
    pub expected_iterations: usize,
    pub expected_policy: Vec<String>,
    pub expected_utilities: Vec<Vec<f64>>,
    pub expected_path: Option<Vec<(i32, i32)>>,
    pub expected_path_cost: Option<f64>,
}

impl Scenario {
    pub fn world(&self) -> Result<GridWorld, PlanError> {
        GridWorld::parse(self.layout.as_slice(), &self.terminals, self.step_reward)
    }

    pub fn solver_config(&self) -> SolverConfig {
        SolverConfig {
            discount: self.discount,
            tolerance: self.tolerance,
            mode: self.mode,
        }
    }
}

/// Load a scenario from JSON file
pub fn load_scenario(path: &Path) -> Result<Scenario, Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(path)?;
    let scenario: Scenario = serde_json::from_str(&contents)?;
    Ok(scenario)
}

/// Load one named scenario from ./test_data
pub fn scenario(name: &str) -> Scenario {
    let path = Path::new("./test_data").join(format!("{}.json", name));
    load_scenario(&path).unwrap_or_else(|e| panic!("failed to load {}: {}", path.display(), e))
}

/// All scenarios in ./test_data, sorted by file name
pub fn all_scenarios() -> Vec<Scenario> {
    let mut entries: Vec<_> = fs::read_dir("./test_data")
        .expect("test_data directory")
        .filter_map(Result::ok)
        .collect();
    entries.sort_by_key(|e| e.file_name());

    entries
        .iter()
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("json"))
        .map(|p| load_scenario(&p).unwrap_or_else(|e| panic!("{}: {}", p.display(), e)))
        .collect()
}

/// Policy table as layout-style rows ('<' '>' '^' 'v' '#' 'T')
pub fn policy_rows(world: &GridWorld) -> Vec<String> {
    let mut rows = vec![String::new(); world.rows() as usize];
    for (coord, cell) in world.cells() {
        rows[coord.row as usize].push(cell.policy.layout_char());
    }
    rows
}

/// Path checks that hold for any successful search
pub fn assert_valid_path(world: &GridWorld, path: &[Coord], start: Coord) {
    assert!(!path.is_empty(), "path must not be empty");
    assert_eq!(path[0], start, "path must begin at the start");

    let goal = *path.last().unwrap();
    assert!(
        world.policy(goal).unwrap().is_terminal(),
        "path must end on a terminal, ended at ({},{})",
        goal.row,
        goal.col
    );

    for cell in path {
        assert!(!world.is_blocked(*cell), "path steps onto blocked cell ({},{})", cell.row, cell.col);
    }
    for pair in path.windows(2) {
        assert!(
            pair[0].is_adjacent(&pair[1]),
            "({},{}) -> ({},{}) is not a 4-directional move",
            pair[0].row,
            pair[0].col,
            pair[1].row,
            pair[1].col
        );
    }
}

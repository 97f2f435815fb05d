use crate::config::{GridConfig, TerminalConfig};
use crate::error::PlanError;
use serde::{Deserialize, Serialize};

/// A cell coordinate on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: i32,
    pub col: i32,
}

impl Coord {
    pub fn new(row: i32, col: i32) -> Self {
        Coord { row, col }
    }

    /// Coordinate one step away by (row, col) delta
    pub fn offset(&self, (dr, dc): (i32, i32)) -> Coord {
        Coord::new(self.row + dr, self.col + dc)
    }

    /// True when the two coordinates are 4-directional neighbours
    pub fn is_adjacent(&self, other: &Coord) -> bool {
        (self.row - other.row).abs() + (self.col - other.col).abs() == 1
    }
}

/// Movement actions available in every free cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Left,
    Right,
    Up,
    Down,
}

impl Action {
    /// Evaluation order used when learning a policy
    pub const ALL: [Action; 4] = [Action::Left, Action::Right, Action::Up, Action::Down];

    /// (row, col) delta of the intended move
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Action::Left => (0, -1),
            Action::Right => (0, 1),
            Action::Up => (-1, 0),
            Action::Down => (1, 0),
        }
    }

    /// Unit step along the axis orthogonal to this action.
    /// Drift goes one step in each signed direction of this axis.
    pub fn drift_axis(&self) -> (i32, i32) {
        match self {
            Action::Left | Action::Right => (1, 0),
            Action::Up | Action::Down => (0, 1),
        }
    }

    /// Layout character for a free cell carrying this action
    pub fn layout_char(&self) -> char {
        match self {
            Action::Left => '<',
            Action::Right => '>',
            Action::Up => '^',
            Action::Down => 'v',
        }
    }

    pub fn from_layout_char(c: char) -> Option<Action> {
        match c {
            '<' => Some(Action::Left),
            '>' => Some(Action::Right),
            '^' => Some(Action::Up),
            'v' => Some(Action::Down),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellKind {
    Free,
    Obstacle,
    Terminal,
}

/// Action label stored per cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Policy {
    Move(Action),
    /// Free cell whose action has not been decided yet
    Unassigned,
    Obstacle,
    Terminal,
}

impl Policy {
    pub fn action(&self) -> Option<Action> {
        match self {
            Policy::Move(action) => Some(*action),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Policy::Terminal)
    }

    pub fn layout_char(&self) -> char {
        match self {
            Policy::Move(action) => action.layout_char(),
            Policy::Unassigned => '.',
            Policy::Obstacle => '#',
            Policy::Terminal => 'T',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    pub kind: CellKind,
    pub reward: f64,
    pub utility: f64,
    pub policy: Policy,
}

impl GridCell {
    pub fn free(step_reward: f64, policy: Policy) -> Self {
        GridCell {
            kind: CellKind::Free,
            reward: step_reward,
            utility: 0.0,
            policy,
        }
    }

    pub fn obstacle() -> Self {
        GridCell {
            kind: CellKind::Obstacle,
            reward: 0.0,
            utility: 0.0,
            policy: Policy::Obstacle,
        }
    }

    pub fn terminal(value: f64) -> Self {
        GridCell {
            kind: CellKind::Terminal,
            reward: value,
            utility: value,
            policy: Policy::Terminal,
        }
    }

    pub fn is_free(&self) -> bool {
        self.kind == CellKind::Free
    }
}

/// Rectangular grid world: cell kinds, rewards, and the solver's utilities and policies
#[derive(Debug, Clone, PartialEq)]
pub struct GridWorld {
    rows: i32,
    cols: i32,
    cells: Vec<GridCell>,
}

impl GridWorld {
    /// Build a grid from layout rows.
    ///
    /// `.` free, `<` `>` `^` `v` free with an initial policy, `#` obstacle,
    /// `T` terminal (value taken from the matching entry in `terminals`).
    pub fn parse<S: AsRef<str>>(
        layout: &[S],
        terminals: &[TerminalConfig],
        step_reward: f64,
    ) -> Result<Self, PlanError> {
        if layout.is_empty() {
            return Err(PlanError::invalid("grid layout has no rows"));
        }
        let width = layout[0].as_ref().chars().count();
        if width == 0 {
            return Err(PlanError::invalid("grid layout has no columns"));
        }
        if !step_reward.is_finite() {
            return Err(PlanError::invalid(format!("step reward {} is not finite", step_reward)));
        }

        let rows = layout.len() as i32;
        let cols = width as i32;
        let mut cells = Vec::with_capacity(layout.len() * width);

        for (row, line) in layout.iter().enumerate() {
            let line = line.as_ref();
            if line.chars().count() != width {
                return Err(PlanError::invalid(format!(
                    "layout row {} has {} cells, expected {}",
                    row,
                    line.chars().count(),
                    width
                )));
            }

            for (col, c) in line.chars().enumerate() {
                let cell = match c {
                    '.' => GridCell::free(step_reward, Policy::Unassigned),
                    '#' => GridCell::obstacle(),
                    'T' => {
                        let mut matching = terminals
                            .iter()
                            .filter(|t| t.row == row as i32 && t.col == col as i32);
                        let value = match (matching.next(), matching.next()) {
                            (Some(t), None) => t.utility,
                            (None, _) => {
                                return Err(PlanError::invalid(format!(
                                    "terminal cell ({}, {}) has no terminal value",
                                    row, col
                                )))
                            }
                            (Some(_), Some(_)) => {
                                return Err(PlanError::invalid(format!(
                                    "terminal cell ({}, {}) has more than one terminal value",
                                    row, col
                                )))
                            }
                        };
                        if !value.is_finite() {
                            return Err(PlanError::invalid(format!(
                                "terminal value at ({}, {}) is not finite",
                                row, col
                            )));
                        }
                        GridCell::terminal(value)
                    }
                    other => match Action::from_layout_char(other) {
                        Some(action) => GridCell::free(step_reward, Policy::Move(action)),
                        None => {
                            return Err(PlanError::invalid(format!(
                                "unknown layout character '{}' at ({}, {})",
                                other, row, col
                            )))
                        }
                    },
                };
                cells.push(cell);
            }
        }

        let grid = GridWorld { rows, cols, cells };

        // Every terminal entry must land on a 'T' cell
        for t in terminals {
            let coord = Coord::new(t.row, t.col);
            if !grid.in_bounds(coord) {
                return Err(PlanError::invalid(format!(
                    "terminal value given for ({}, {}) which is outside the {}x{} grid",
                    t.row, t.col, rows, cols
                )));
            }
            if grid.kind(coord)? != CellKind::Terminal {
                return Err(PlanError::invalid(format!(
                    "terminal value given for ({}, {}) which is not a 'T' cell",
                    t.row, t.col
                )));
            }
        }

        Ok(grid)
    }

    pub fn from_config(config: &GridConfig) -> Result<Self, PlanError> {
        Self::parse(config.layout.as_slice(), &config.terminals, config.step_reward)
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn in_bounds(&self, coord: Coord) -> bool {
        coord.row >= 0 && coord.row < self.rows && coord.col >= 0 && coord.col < self.cols
    }

    /// Convert a coordinate to its index in the row-major cell vector
    fn index(&self, coord: Coord) -> Result<usize, PlanError> {
        if !self.in_bounds(coord) {
            return Err(PlanError::OutOfBounds {
                row: coord.row,
                col: coord.col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok((coord.col + coord.row * self.cols) as usize)
    }

    fn coord_of(&self, index: usize) -> Coord {
        let index = index as i32;
        Coord::new(index / self.cols, index % self.cols)
    }

    pub fn cell_at(&self, coord: Coord) -> Result<&GridCell, PlanError> {
        let id = self.index(coord)?;
        Ok(&self.cells[id])
    }

    /// Obstacles and out-of-bounds coordinates are both blocked
    pub fn is_blocked(&self, coord: Coord) -> bool {
        match self.cell_at(coord) {
            Ok(cell) => cell.kind == CellKind::Obstacle,
            Err(_) => true,
        }
    }

    pub fn kind(&self, coord: Coord) -> Result<CellKind, PlanError> {
        Ok(self.cell_at(coord)?.kind)
    }

    pub fn utility(&self, coord: Coord) -> Result<f64, PlanError> {
        Ok(self.cell_at(coord)?.utility)
    }

    pub fn policy(&self, coord: Coord) -> Result<Policy, PlanError> {
        Ok(self.cell_at(coord)?.policy)
    }

    pub fn reward(&self, coord: Coord) -> Result<f64, PlanError> {
        Ok(self.cell_at(coord)?.reward)
    }

    /// All cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (Coord, &GridCell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(id, cell)| (self.coord_of(id), cell))
    }

    /// Coordinates of free cells in row-major order
    pub fn free_cells(&self) -> Vec<Coord> {
        self.cells()
            .filter(|(_, cell)| cell.is_free())
            .map(|(coord, _)| coord)
            .collect()
    }

    /// Update the utility of a free cell. Obstacles and terminals are left untouched.
    pub(crate) fn set_utility(&mut self, coord: Coord, utility: f64) -> Result<(), PlanError> {
        let id = self.index(coord)?;
        let cell = &mut self.cells[id];
        if cell.is_free() {
            cell.utility = utility;
        }
        Ok(())
    }

    /// Update the policy of a free cell. Obstacles and terminals are left untouched.
    pub(crate) fn set_policy(&mut self, coord: Coord, action: Action) -> Result<(), PlanError> {
        let id = self.index(coord)?;
        let cell = &mut self.cells[id];
        if cell.is_free() {
            cell.policy = Policy::Move(action);
        }
        Ok(())
    }

    /// Overwrite a utility on any cell kind, for tests that poison placeholders
    #[cfg(test)]
    pub(crate) fn force_utility(&mut self, coord: Coord, utility: f64) {
        if let Ok(id) = self.index(coord) {
            self.cells[id].utility = utility;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terminal(row: i32, col: i32, utility: f64) -> TerminalConfig {
        TerminalConfig { row, col, utility }
    }

    fn reference() -> GridWorld {
        GridWorld::parse(
            &["...T", ".#.T", "...."],
            &[terminal(0, 3, 1.0), terminal(1, 3, -1.0)],
            -0.04,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_reference_layout() {
        let grid = reference();
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.cols(), 4);

        assert_eq!(grid.kind(Coord::new(1, 1)).unwrap(), CellKind::Obstacle);
        assert_eq!(grid.kind(Coord::new(0, 3)).unwrap(), CellKind::Terminal);
        assert_eq!(grid.utility(Coord::new(0, 3)).unwrap(), 1.0);
        assert_eq!(grid.utility(Coord::new(1, 3)).unwrap(), -1.0);
        assert_eq!(grid.reward(Coord::new(2, 0)).unwrap(), -0.04);
        assert_eq!(grid.policy(Coord::new(2, 0)).unwrap(), Policy::Unassigned);
        assert_eq!(grid.free_cells().len(), 9);
    }

    #[test]
    fn test_out_of_bounds_is_an_error() {
        let grid = reference();
        let err = grid.cell_at(Coord::new(3, 0)).unwrap_err();
        assert_eq!(
            err,
            PlanError::OutOfBounds { row: 3, col: 0, rows: 3, cols: 4 }
        );
        assert!(grid.cell_at(Coord::new(0, -1)).is_err());
    }

    #[test]
    fn test_is_blocked() {
        let grid = reference();
        assert!(grid.is_blocked(Coord::new(1, 1)));
        assert!(grid.is_blocked(Coord::new(-1, 0)));
        assert!(grid.is_blocked(Coord::new(0, 4)));
        assert!(!grid.is_blocked(Coord::new(0, 3)));
        assert!(!grid.is_blocked(Coord::new(2, 2)));
    }

    #[test]
    fn test_policy_arrows_in_layout() {
        let grid = GridWorld::parse(
            &[">>>T", "^#^T", "^<<<"],
            &[terminal(0, 3, 1.0), terminal(1, 3, -1.0)],
            -0.04,
        )
        .unwrap();
        assert_eq!(grid.policy(Coord::new(0, 0)).unwrap(), Policy::Move(Action::Right));
        assert_eq!(grid.policy(Coord::new(2, 1)).unwrap(), Policy::Move(Action::Left));
        assert_eq!(grid.policy(Coord::new(1, 2)).unwrap(), Policy::Move(Action::Up));
        assert_eq!(grid.policy(Coord::new(1, 1)).unwrap(), Policy::Obstacle);
    }

    #[test]
    fn test_rejects_malformed_layouts() {
        let ragged = GridWorld::parse(&["...", ".."], &[], -0.04);
        assert!(matches!(ragged, Err(PlanError::InvalidConfiguration { .. })));

        let empty: [&str; 0] = [];
        assert!(GridWorld::parse(&empty, &[], -0.04).is_err());

        let unknown = GridWorld::parse(&["..x"], &[], -0.04);
        assert!(matches!(unknown, Err(PlanError::InvalidConfiguration { .. })));

        let missing_value = GridWorld::parse(&["..T"], &[], -0.04);
        assert!(matches!(missing_value, Err(PlanError::InvalidConfiguration { .. })));

        let stray_value = GridWorld::parse(&["..T"], &[terminal(0, 2, 1.0), terminal(0, 0, 1.0)], -0.04);
        assert!(matches!(stray_value, Err(PlanError::InvalidConfiguration { .. })));

        let outside_value = GridWorld::parse(&["..T"], &[terminal(0, 2, 1.0), terminal(5, 5, 1.0)], -0.04);
        assert!(matches!(outside_value, Err(PlanError::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_setters_skip_non_free_cells() {
        let mut grid = reference();
        grid.set_utility(Coord::new(0, 3), 42.0).unwrap();
        grid.set_policy(Coord::new(1, 1), Action::Left).unwrap();
        assert_eq!(grid.utility(Coord::new(0, 3)).unwrap(), 1.0);
        assert_eq!(grid.policy(Coord::new(1, 1)).unwrap(), Policy::Obstacle);

        grid.set_utility(Coord::new(2, 0), 0.5).unwrap();
        grid.set_policy(Coord::new(2, 0), Action::Up).unwrap();
        assert_eq!(grid.utility(Coord::new(2, 0)).unwrap(), 0.5);
        assert_eq!(grid.policy(Coord::new(2, 0)).unwrap(), Policy::Move(Action::Up));

        assert!(grid.set_utility(Coord::new(9, 9), 1.0).is_err());
    }

    #[test]
    fn test_adjacency() {
        let a = Coord::new(2, 0);
        assert!(a.is_adjacent(&Coord::new(1, 0)));
        assert!(a.is_adjacent(&Coord::new(2, 1)));
        assert!(!a.is_adjacent(&Coord::new(1, 1)));
        assert!(!a.is_adjacent(&a));
    }
}

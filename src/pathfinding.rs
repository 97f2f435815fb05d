use crate::error::PlanError;
use crate::grid::{CellKind, Coord, GridWorld};
use log::{debug, trace};
use std::collections::HashSet;

/// A node in the best-first search tree
#[derive(Debug, Clone)]
pub struct SearchNode {
    pub cell: Coord,
    /// Accumulated reward from the start (g)
    pub path_cost: f64,
    /// `path_cost` plus the heuristic (f)
    pub total_score: f64,
    /// Index of the parent node in the search arena; `None` only for the start
    pub parent: Option<usize>,
}

/// A path from the start to a terminal cell
#[derive(Debug, Clone, PartialEq)]
pub struct FoundPath {
    pub cells: Vec<Coord>,
    /// Accumulated reward of the goal node
    pub path_cost: f64,
}

impl FoundPath {
    pub fn start(&self) -> Option<Coord> {
        self.cells.first().copied()
    }

    pub fn goal(&self) -> Option<Coord> {
        self.cells.last().copied()
    }
}

/// Best-first search that expands the frontier node with the highest total score.
///
/// Utilities from value iteration act as the heuristic, so a larger score means
/// a more rewarding route.
pub struct PathSearch<'a> {
    world: &'a GridWorld,
    nodes: Vec<SearchNode>,
    frontier: Vec<usize>,
    closed: HashSet<Coord>,
}

impl<'a> PathSearch<'a> {
    pub fn new(world: &'a GridWorld) -> Self {
        PathSearch {
            world,
            nodes: Vec::new(),
            frontier: Vec::new(),
            closed: HashSet::new(),
        }
    }

    /// Nodes created so far, in creation order
    pub fn nodes(&self) -> &[SearchNode] {
        &self.nodes
    }

    pub fn run(&mut self, start: Coord) -> Result<FoundPath, PlanError> {
        if self.world.kind(start)? == CellKind::Obstacle {
            return Err(PlanError::invalid(format!(
                "search start ({}, {}) is an obstacle",
                start.row, start.col
            )));
        }

        self.nodes.clear();
        self.frontier.clear();
        self.closed.clear();

        self.push_node(SearchNode {
            cell: start,
            path_cost: 0.0,
            total_score: 0.0,
            parent: None,
        });

        let mut expansions = 0;
        while let Some(current) = self.pop_best() {
            expansions += 1;
            let node = self.nodes[current].clone();

            trace!(
                "[path_search] expansion {}: ({},{}) g={:.4} f={:.4}",
                expansions,
                node.cell.row,
                node.cell.col,
                node.path_cost,
                node.total_score
            );

            if self.world.policy(node.cell)?.is_terminal() {
                let cells = self.backtrack(current);
                debug!(
                    "[path_search] reached terminal ({},{}) after {} expansions: {}",
                    node.cell.row,
                    node.cell.col,
                    expansions,
                    format_path(&cells)
                );
                return Ok(FoundPath {
                    cells,
                    path_cost: node.path_cost,
                });
            }

            for neighbour in self.neighbours(node.cell) {
                if self.closed.contains(&neighbour) {
                    continue;
                }

                let target = self.world.cell_at(neighbour)?;
                let (cost, heuristic) = if target.kind == CellKind::Terminal {
                    (target.utility, 0.0)
                } else {
                    (target.reward, target.utility)
                };
                let path_cost = node.path_cost + cost;
                let total_score = path_cost + heuristic;

                // A frontier entry for this cell with a strictly larger g already beats the candidate
                let dominated = self.frontier.iter().any(|&id| {
                    let existing = &self.nodes[id];
                    existing.cell == neighbour && path_cost < existing.path_cost
                });
                if dominated {
                    continue;
                }

                self.push_node(SearchNode {
                    cell: neighbour,
                    path_cost,
                    total_score,
                    parent: Some(current),
                });
            }

            self.closed.insert(node.cell);
        }

        debug!(
            "[path_search] NO PATH from ({},{}) after {} expansions",
            start.row, start.col, expansions
        );
        Err(PlanError::NoPathFound {
            row: start.row,
            col: start.col,
        })
    }

    fn push_node(&mut self, node: SearchNode) {
        self.nodes.push(node);
        self.frontier.push(self.nodes.len() - 1);
    }

    /// Remove and return the frontier node with the highest total score.
    /// On ties the node added earliest wins.
    fn pop_best(&mut self) -> Option<usize> {
        let mut best_pos = 0;
        let mut best_score = self.nodes[*self.frontier.first()?].total_score;

        for (pos, &id) in self.frontier.iter().enumerate() {
            if self.nodes[id].total_score > best_score {
                best_score = self.nodes[id].total_score;
                best_pos = pos;
            }
        }

        Some(self.frontier.remove(best_pos))
    }

    /// In-bounds, non-obstacle neighbours in the order left, right, up, down
    fn neighbours(&self, cell: Coord) -> Vec<Coord> {
        [(0, -1), (0, 1), (-1, 0), (1, 0)]
            .into_iter()
            .map(|delta| cell.offset(delta))
            .filter(|next| !self.world.is_blocked(*next))
            .collect()
    }

    /// Follow parent links from `goal` back to the start and return the cells start-first
    fn backtrack(&self, goal: usize) -> Vec<Coord> {
        let mut cells = Vec::new();
        let mut cursor = Some(goal);
        while let Some(id) = cursor {
            cells.push(self.nodes[id].cell);
            cursor = self.nodes[id].parent;
        }
        cells.reverse();
        cells
    }
}

/// Search from `start` to the first terminal cell reached
pub fn find_path(world: &GridWorld, start: Coord) -> Result<FoundPath, PlanError> {
    PathSearch::new(world).run(start)
}

/// Format path for display
pub fn format_path(path: &[Coord]) -> String {
    if path.is_empty() {
        return "No path".to_string();
    }

    let mut result = String::new();
    for (i, pos) in path.iter().enumerate() {
        if i > 0 {
            result.push_str(" -> ");
        }
        result.push_str(&format!("({},{})", pos.row, pos.col));
    }
    result
}

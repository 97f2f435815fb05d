use crate::error::PlanError;
use crate::grid::Coord;
use log::{info, warn};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GridConfig {
    /// One string per row, see `GridWorld::parse` for the cell characters
    #[serde(default = "default_layout")]
    pub layout: Vec<String>,
    #[serde(default = "default_terminals")]
    pub terminals: Vec<TerminalConfig>,
    /// Reward received for every step through a free cell
    #[serde(default = "default_step_reward")]
    pub step_reward: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TerminalConfig {
    pub row: i32,
    pub col: i32,
    pub utility: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverMode {
    /// Search all actions and record the best one as the policy
    Learned,
    /// Evaluate the policy already stored in each free cell
    Fixed,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SolverConfig {
    #[serde(default = "default_discount")]
    pub discount: f64,
    /// Convergence tolerance (epsilon) of the stopping bound
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_mode")]
    pub mode: SolverMode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_start_row")]
    pub start_row: i32,
    #[serde(default = "default_start_col")]
    pub start_col: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

// Default values
fn default_layout() -> Vec<String> {
    vec!["...T".to_string(), ".#.T".to_string(), "....".to_string()]
}
fn default_terminals() -> Vec<TerminalConfig> {
    vec![
        TerminalConfig { row: 0, col: 3, utility: 1.0 },
        TerminalConfig { row: 1, col: 3, utility: -1.0 },
    ]
}
fn default_step_reward() -> f64 { -0.04 }
fn default_discount() -> f64 { 0.2 }
fn default_tolerance() -> f64 { 0.0001 }
fn default_mode() -> SolverMode { SolverMode::Learned }
fn default_start_row() -> i32 { 2 }
fn default_start_col() -> i32 { 0 }
fn default_format() -> OutputFormat { OutputFormat::Table }

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            layout: default_layout(),
            terminals: default_terminals(),
            step_reward: default_step_reward(),
        }
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            discount: default_discount(),
            tolerance: default_tolerance(),
            mode: default_mode(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            start_row: default_start_row(),
            start_col: default_start_col(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            solver: SolverConfig::default(),
            search: SearchConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl SolverConfig {
    /// Discount must lie in (0, 1) and the tolerance must be positive
    pub fn validate(&self) -> Result<(), PlanError> {
        if !(self.discount > 0.0 && self.discount < 1.0) {
            return Err(PlanError::invalid(format!(
                "discount factor {} must lie strictly between 0 and 1",
                self.discount
            )));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(PlanError::invalid(format!(
                "convergence tolerance {} must be positive",
                self.tolerance
            )));
        }
        Ok(())
    }
}

impl SearchConfig {
    pub fn start(&self) -> Coord {
        Coord::new(self.start_row, self.start_col)
    }
}

impl Config {
    /// Load configuration from file, or use defaults if file doesn't exist
    pub fn load() -> Self {
        match Self::load_from("config.toml") {
            Ok(config) => {
                info!("Loaded configuration from config.toml");
                config
            }
            Err(e) => {
                if Path::new("config.toml").exists() {
                    warn!("Failed to use config.toml: {}", e);
                    warn!("Using default configuration");
                } else {
                    info!("No config.toml found, using default configuration");
                }
                Config::default()
            }
        }
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, PlanError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            PlanError::invalid(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, PlanError> {
        toml::from_str(contents)
            .map_err(|e| PlanError::invalid(format!("failed to parse configuration: {}", e)))
    }
}

use thiserror::Error;

/// Errors surfaced by grid construction, solving and path search
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    #[error("cell ({row}, {col}) is outside the {rows}x{cols} grid")]
    OutOfBounds {
        row: i32,
        col: i32,
        rows: i32,
        cols: i32,
    },

    #[error("no path from ({row}, {col}) reaches a terminal cell")]
    NoPathFound { row: i32, col: i32 },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl PlanError {
    pub fn invalid(message: impl Into<String>) -> Self {
        PlanError::InvalidConfiguration {
            message: message.into(),
        }
    }
}

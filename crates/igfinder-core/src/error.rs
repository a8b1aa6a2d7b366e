//! Statistical test errors.
//!
//! A failing test never aborts a run: the error is carried to the report and
//! printed in place of the test's numbers.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatsError {
    #[error("insufficient sample: {0}")]
    InsufficientSample(String),

    #[error("degenerate contingency table: {0}")]
    DegenerateTable(String),

    #[error("both groups have zero variance")]
    ZeroVariance,
}

pub type Result<T> = std::result::Result<T, StatsError>;

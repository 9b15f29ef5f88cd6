// =============================================================================
// Error Types
// =============================================================================
//
// Every fallible operation in this crate returns `Result<T>` with the error
// enum below. The variants are deliberately coarse: callers mostly want to
// print the message and stop, not branch on the failure mode.
//
// =============================================================================

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, VeloStatsError>;

/// All the ways an analysis can fail.
#[derive(Debug, Error)]
pub enum VeloStatsError {
    /// Could not read the data file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The csv reader rejected the file (ragged rows, bad UTF-8, ...).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A formula or argument referenced a column the frame does not have.
    #[error("column not found: '{0}'")]
    MissingColumn(String),

    /// A string column was used where a numeric one is required.
    #[error("column '{0}' is not numeric")]
    NotNumeric(String),

    /// Array shapes disagree (e.g. X rows vs y length).
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// An operation received no data to work on.
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// An argument was out of range or otherwise unusable.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// The model formula could not be parsed.
    #[error("invalid formula: {0}")]
    InvalidFormula(String),

    /// A linear system could not be solved (usually collinearity).
    #[error("linear algebra error: {0}")]
    LinearAlgebra(String),
}

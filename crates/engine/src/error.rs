//! Engine error types

use persistence::DbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// A table lacks the column every filter and join is keyed on
    #[error("Table '{table}' is missing required key column '{column}'")]
    MissingKeyColumn {
        table: &'static str,
        column: &'static str,
    },

    #[error(transparent)]
    Db(#[from] DbError),
}

pub type EngineResult<T> = Result<T, EngineError>;

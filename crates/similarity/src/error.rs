use thiserror::Error;

/// Errors raised when querying the similarity index
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexError {
    #[error("query has {found} dimensions but the index holds {expected}-dimensional vectors")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("row {row} is out of range for an index of {len} rows")]
    RowOutOfRange { row: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, IndexError>;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A value could not be converted to the declared element type
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// Mutation of an immutable segment, or an operation the engine cannot express
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Index {index} out of range for {what} of length {len}")]
    OutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    pub(crate) fn out_of_range(what: &'static str, index: usize, len: usize) -> Self {
        Error::OutOfRange { what, index, len }
    }
}

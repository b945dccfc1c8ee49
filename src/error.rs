use crate::types::GpType;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GpError {
    #[error("Unsupported operation: {node} cannot produce {requested:?} (returns {actual:?})")]
    UnsupportedOperation {
        node: String,
        requested: GpType,
        actual: GpType,
    },

    #[error("Illegal configuration: {0}")]
    IllegalConfiguration(String),

    #[error("Invalid fitness {value} for program")]
    InvalidFitness { value: f64 },

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),

    #[error("Call depth limit of {0} exceeded")]
    RecursionLimit(usize),

    #[error("Node {index} has no child {child}")]
    MissingChild { index: usize, child: usize },

    #[error("Argument {0} is not bound in the current frame")]
    MissingArgument(usize),

    #[error("Runtime memory error: {0}")]
    Memory(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Config source error: {0}")]
    ConfigSource(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, GpError>;

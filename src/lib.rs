//! Typed genetic programming: evolves populations of strongly typed
//! program trees under type- and depth-constrained crossover.

pub mod config;
pub mod engines;
pub mod error;
pub mod functions;
pub mod types;
pub mod utils;

pub use error::{GpError, Result};
pub use types::{GpType, Literal, Value};

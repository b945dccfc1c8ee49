pub mod context;
pub mod fitness;
pub mod memory;
pub mod regression;

pub use context::ExecutionContext;
pub use fitness::{evaluate_population, evaluate_program, FitnessFunction};
pub use memory::RuntimeMemory;
pub use regression::RegressionFitness;

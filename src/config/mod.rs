pub mod evolution;
pub mod execution;
pub mod manager;
pub mod problem;
pub mod traits;

pub use evolution::{EvolutionConfig, SelectionMethod};
pub use execution::ExecutionConfig;
pub use manager::{AppConfig, ConfigManager};
pub use problem::{ProblemConfig, TargetFunction};
pub use traits::ConfigSection;

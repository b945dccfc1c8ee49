pub mod chromosome;
pub mod crossover;
pub mod evolution_engine;
pub mod hall_of_fame;
pub mod operators;
pub mod population;
pub mod program;
pub mod progress;
pub mod shape;
pub mod visitor;

pub use chromosome::{Chromosome, InitMethod};
pub use crossover::{crossover, CrossoverConfig, Splice};
pub use evolution_engine::{EvolutionEngine, EvolutionOutcome, GenerationReport, ProgressCallback};
pub use hall_of_fame::{HallOfFame, HallOfFameEntry};
pub use operators::{roulette_index, RouletteSelection, SelectionStrategy, TournamentSelection};
pub use population::Population;
pub use program::Program;
pub use progress::{ChannelProgressCallback, LoggingProgressCallback, ProgressMessage};
pub use shape::{ChromosomeShape, ProgramShape};
pub use visitor::{to_formula, to_formula_short, FormulaWriter, TreeVisitor};

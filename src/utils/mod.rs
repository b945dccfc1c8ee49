pub mod snapshot;

pub use snapshot::{ChromosomeSnapshot, NodeDescriptor, ProgramSnapshot};

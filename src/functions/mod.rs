pub mod adf;
pub mod argument;
pub mod memory;
pub mod primitives;
pub mod registry;
pub mod traits;

pub use registry::NodeRegistry;
pub use traits::{ArityClass, Node, NodeRef};

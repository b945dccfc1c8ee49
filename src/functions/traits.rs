use crate::engines::evaluation::context::ExecutionContext;
use crate::engines::generation::chromosome::Chromosome;
use crate::engines::generation::program::Program;
use crate::engines::generation::shape::ProgramShape;
use crate::error::Result;
use crate::types::{GpType, Literal, Value};
use rand::RngCore;
use std::fmt;
use std::sync::Arc;

/// Shared handle to a node. Nodes are immutable, so trees share them freely.
pub type NodeRef = Arc<dyn Node>;

/// Contract every operation or terminal implements.
///
/// A node's shape (arity, return type, child types) is fixed once it is
/// constructed. Arity and child types take the program shape because ADF
/// nodes derive them from the subroutine they call.
pub trait Node: Send + Sync + fmt::Debug {
    /// Stable identifier used by the registry, renderer and snapshots
    fn name(&self) -> &str;

    fn arity(&self, shape: &ProgramShape) -> usize;

    fn return_type(&self) -> GpType;

    fn child_type(&self, shape: &ProgramShape, child: usize) -> GpType;

    /// Optional tag refining the return type beyond its primitive kind
    fn sub_return_type(&self) -> Option<&str> {
        None
    }

    /// Sub-type a child slot requires, if any
    fn sub_child_type(&self, _shape: &ProgramShape, _child: usize) -> Option<&str> {
        None
    }

    fn affects_global_state(&self) -> bool {
        false
    }

    /// Unique nodes may appear at most once per program
    fn is_unique(&self) -> bool {
        false
    }

    /// Non-local structural constraint checked after construction and crossover
    fn is_valid(&self, _program: &Program) -> bool {
        true
    }

    /// Index of the chromosome this node calls, for ADF nodes
    fn invokes(&self) -> Option<usize> {
        None
    }

    /// Literal value for constant terminals
    fn literal(&self) -> Option<Literal> {
        None
    }

    /// Fresh node to place in a tree instead of this palette entry.
    ///
    /// Ephemeral random constants return a new constant; everything else
    /// returns `None` and the palette entry itself is placed.
    fn instantiate(&self, _rng: &mut dyn RngCore) -> Option<NodeRef> {
        None
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext<'_>,
        chromosome: &Chromosome,
        index: usize,
    ) -> Result<Value>;
}

/// Whether a construction slot needs a function, a terminal, or either
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArityClass {
    Function,
    Terminal,
    Any,
}

impl ArityClass {
    pub fn accepts(&self, arity: usize) -> bool {
        match self {
            ArityClass::Function => arity > 0,
            ArityClass::Terminal => arity == 0,
            ArityClass::Any => true,
        }
    }
}

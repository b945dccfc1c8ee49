use super::traits::Node;
use crate::engines::evaluation::context::ExecutionContext;
use crate::engines::generation::chromosome::Chromosome;
use crate::engines::generation::shape::ProgramShape;
use crate::error::Result;
use crate::types::{GpType, Value};

/// Terminal reading one formal parameter of the enclosing tree.
///
/// These are appended to a chromosome's palette automatically, one per
/// declared argument type.
#[derive(Debug, Clone)]
pub struct Argument {
    index: usize,
    gp_type: GpType,
    name: String,
}

impl Argument {
    pub fn new(index: usize, gp_type: GpType) -> Self {
        Self {
            index,
            gp_type,
            name: format!("arg{}", index),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl Node for Argument {
    fn name(&self) -> &str {
        &self.name
    }

    fn arity(&self, _shape: &ProgramShape) -> usize {
        0
    }

    fn return_type(&self) -> GpType {
        self.gp_type
    }

    fn child_type(&self, _shape: &ProgramShape, _child: usize) -> GpType {
        GpType::Void
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext<'_>,
        _chromosome: &Chromosome,
        _index: usize,
    ) -> Result<Value> {
        ctx.argument(self.index)
    }
}

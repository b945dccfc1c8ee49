use super::traits::Node;
use crate::engines::evaluation::context::ExecutionContext;
use crate::engines::generation::chromosome::Chromosome;
use crate::engines::generation::shape::ProgramShape;
use crate::error::Result;
use crate::types::{GpType, Value};

/// Automatically defined function: calls a sibling chromosome of the same
/// program as a subroutine.
///
/// Arity and child types come from the target chromosome's declared
/// argument types, so they are resolved against the program shape. The
/// return type is fixed at construction and must match the target tree.
#[derive(Debug, Clone)]
pub struct Adf {
    target: usize,
    gp_type: GpType,
    name: String,
}

impl Adf {
    pub fn new(target: usize, gp_type: GpType) -> Self {
        Self {
            target,
            gp_type,
            name: format!("adf{}", target),
        }
    }

    pub fn target(&self) -> usize {
        self.target
    }
}

impl Node for Adf {
    fn name(&self) -> &str {
        &self.name
    }

    fn arity(&self, shape: &ProgramShape) -> usize {
        shape
            .chromosome(self.target)
            .map(|c| c.arg_types.len())
            .unwrap_or(0)
    }

    fn return_type(&self) -> GpType {
        self.gp_type
    }

    fn child_type(&self, shape: &ProgramShape, child: usize) -> GpType {
        shape
            .chromosome(self.target)
            .and_then(|c| c.arg_types.get(child).copied())
            .unwrap_or(GpType::Void)
    }

    fn invokes(&self) -> Option<usize> {
        Some(self.target)
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext<'_>,
        chromosome: &Chromosome,
        index: usize,
    ) -> Result<Value> {
        let arity = self.arity(ctx.program().shape());
        let mut args = Vec::with_capacity(arity);
        for child in 0..arity {
            args.push(chromosome.eval_child(ctx, index, child)?);
        }
        ctx.call(self.target, args)
    }
}

//! Nodes operating on the per-evaluation runtime memory: the operand
//! stack, indexed cells and the 2-D matrix.

use super::traits::Node;
use crate::engines::evaluation::context::ExecutionContext;
use crate::engines::generation::chromosome::Chromosome;
use crate::engines::generation::program::Program;
use crate::engines::generation::shape::ProgramShape;
use crate::error::{GpError, Result};
use crate::types::{GpType, Value};

// --- Operand stack ---
#[derive(Debug, Clone)]
pub struct Push {
    gp_type: GpType,
}

impl Push {
    pub fn new(gp_type: GpType) -> Self {
        Self { gp_type }
    }
}

impl Node for Push {
    fn name(&self) -> &str { "Push" }
    fn arity(&self, _shape: &ProgramShape) -> usize { 1 }
    fn return_type(&self) -> GpType { GpType::Void }
    fn child_type(&self, _shape: &ProgramShape, _child: usize) -> GpType { self.gp_type }
    fn affects_global_state(&self) -> bool { true }
    fn execute(
        &self,
        ctx: &mut ExecutionContext<'_>,
        chromosome: &Chromosome,
        index: usize,
    ) -> Result<Value> {
        let value = chromosome.eval_child(ctx, index, 0)?;
        ctx.memory().push(value);
        Ok(Value::Void)
    }
}

#[derive(Debug, Clone)]
pub struct Pop {
    gp_type: GpType,
}

impl Pop {
    pub fn new(gp_type: GpType) -> Self {
        Self { gp_type }
    }
}

impl Node for Pop {
    fn name(&self) -> &str { "Pop" }
    fn arity(&self, _shape: &ProgramShape) -> usize { 0 }
    fn return_type(&self) -> GpType { self.gp_type }
    fn child_type(&self, _shape: &ProgramShape, _child: usize) -> GpType { GpType::Void }
    fn affects_global_state(&self) -> bool { true }
    fn execute(
        &self,
        ctx: &mut ExecutionContext<'_>,
        _chromosome: &Chromosome,
        _index: usize,
    ) -> Result<Value> {
        let value = ctx.memory().pop(self.gp_type);
        if value.gp_type() == self.gp_type {
            Ok(value)
        } else {
            Err(GpError::Memory(format!(
                "stack holds no {} value and the kind has no zero",
                self.gp_type
            )))
        }
    }
}

// --- Indexed cells ---

/// Writes its child's value into a cell and yields it.
///
/// Only valid when the program also contains a `ReadCell` for the same
/// cell; a store nobody reads is rejected as a structural error.
#[derive(Debug, Clone)]
pub struct StoreCell {
    cell: usize,
    gp_type: GpType,
    name: String,
}

impl StoreCell {
    pub fn new(cell: usize, gp_type: GpType) -> Self {
        Self {
            cell,
            gp_type,
            name: format!("Store{}", cell),
        }
    }
}

impl Node for StoreCell {
    fn name(&self) -> &str { &self.name }
    fn arity(&self, _shape: &ProgramShape) -> usize { 1 }
    fn return_type(&self) -> GpType { self.gp_type }
    fn child_type(&self, _shape: &ProgramShape, _child: usize) -> GpType { self.gp_type }
    fn affects_global_state(&self) -> bool { true }

    fn is_valid(&self, program: &Program) -> bool {
        let reader = format!("Read{}", self.cell);
        program
            .chromosomes()
            .iter()
            .flat_map(|c| c.nodes().iter())
            .any(|n| n.name() == reader)
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext<'_>,
        chromosome: &Chromosome,
        index: usize,
    ) -> Result<Value> {
        let value = chromosome.eval_child(ctx, index, 0)?;
        ctx.memory().write_cell(self.cell, value.clone())?;
        Ok(value)
    }
}

#[derive(Debug, Clone)]
pub struct ReadCell {
    cell: usize,
    gp_type: GpType,
    name: String,
}

impl ReadCell {
    pub fn new(cell: usize, gp_type: GpType) -> Self {
        Self {
            cell,
            gp_type,
            name: format!("Read{}", cell),
        }
    }
}

impl Node for ReadCell {
    fn name(&self) -> &str { &self.name }
    fn arity(&self, _shape: &ProgramShape) -> usize { 0 }
    fn return_type(&self) -> GpType { self.gp_type }
    fn child_type(&self, _shape: &ProgramShape, _child: usize) -> GpType { GpType::Void }
    fn execute(
        &self,
        ctx: &mut ExecutionContext<'_>,
        _chromosome: &Chromosome,
        _index: usize,
    ) -> Result<Value> {
        let value = ctx.memory().read_cell(self.cell)?;
        // A cell never written holds the zero of whatever kind is asked for
        if value.gp_type() == self.gp_type {
            return Ok(value);
        }
        let zero = Value::default_for(self.gp_type);
        if zero.gp_type() == self.gp_type {
            Ok(zero)
        } else {
            Err(GpError::Memory(format!(
                "{} holds no {} value and the kind has no zero",
                self.name, self.gp_type
            )))
        }
    }
}

// --- Matrix ---
#[derive(Debug, Clone)]
pub struct MatrixRead;

impl Node for MatrixRead {
    fn name(&self) -> &str { "MatrixRead" }
    fn arity(&self, _shape: &ProgramShape) -> usize { 2 }
    fn return_type(&self) -> GpType { GpType::Double }
    fn child_type(&self, _shape: &ProgramShape, _child: usize) -> GpType { GpType::Int }
    fn execute(
        &self,
        ctx: &mut ExecutionContext<'_>,
        chromosome: &Chromosome,
        index: usize,
    ) -> Result<Value> {
        let row = chromosome.eval_child(ctx, index, 0)?.as_int()?;
        let col = chromosome.eval_child(ctx, index, 1)?.as_int()?;
        Ok(Value::Double(ctx.memory().matrix_get(row, col)?))
    }
}

#[derive(Debug, Clone)]
pub struct MatrixWrite;

impl Node for MatrixWrite {
    fn name(&self) -> &str { "MatrixWrite" }
    fn arity(&self, _shape: &ProgramShape) -> usize { 3 }
    fn return_type(&self) -> GpType { GpType::Double }
    fn child_type(&self, _shape: &ProgramShape, child: usize) -> GpType {
        if child < 2 { GpType::Int } else { GpType::Double }
    }
    fn affects_global_state(&self) -> bool { true }
    fn execute(
        &self,
        ctx: &mut ExecutionContext<'_>,
        chromosome: &Chromosome,
        index: usize,
    ) -> Result<Value> {
        let row = chromosome.eval_child(ctx, index, 0)?.as_int()?;
        let col = chromosome.eval_child(ctx, index, 1)?.as_int()?;
        let value = chromosome.eval_child(ctx, index, 2)?.as_double()?;
        ctx.memory().matrix_set(row, col, value)?;
        Ok(Value::Double(value))
    }
}

use super::traits::{Node, NodeRef};
use crate::engines::evaluation::context::ExecutionContext;
use crate::engines::generation::chromosome::Chromosome;
use crate::engines::generation::shape::ProgramShape;
use crate::error::{GpError, Result};
use crate::types::{GpType, Literal, Value};
use rand::{Rng, RngCore};
use std::sync::Arc;

fn wrong_kind(node: &dyn Node, requested: GpType) -> GpError {
    GpError::UnsupportedOperation {
        node: node.name().to_string(),
        requested,
        actual: node.return_type(),
    }
}

// --- Arithmetic ---
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    /// Protected division: a zero divisor yields 1
    Div,
}

/// Binary arithmetic over one numeric kind
#[derive(Debug, Clone)]
pub struct Arithmetic {
    op: ArithOp,
    gp_type: GpType,
}

impl Arithmetic {
    pub fn int(op: ArithOp) -> Self {
        Self { op, gp_type: GpType::Int }
    }

    pub fn long(op: ArithOp) -> Self {
        Self { op, gp_type: GpType::Long }
    }

    pub fn float(op: ArithOp) -> Self {
        Self { op, gp_type: GpType::Float }
    }

    pub fn double(op: ArithOp) -> Self {
        Self { op, gp_type: GpType::Double }
    }
}

impl Node for Arithmetic {
    fn name(&self) -> &str {
        match self.op {
            ArithOp::Add => "Add",
            ArithOp::Sub => "Sub",
            ArithOp::Mul => "Mul",
            ArithOp::Div => "Div",
        }
    }
    fn arity(&self, _shape: &ProgramShape) -> usize { 2 }
    fn return_type(&self) -> GpType { self.gp_type }
    fn child_type(&self, _shape: &ProgramShape, _child: usize) -> GpType { self.gp_type }

    fn execute(
        &self,
        ctx: &mut ExecutionContext<'_>,
        chromosome: &Chromosome,
        index: usize,
    ) -> Result<Value> {
        let a = chromosome.eval_child(ctx, index, 0)?;
        let b = chromosome.eval_child(ctx, index, 1)?;
        match self.gp_type {
            GpType::Int => {
                let (a, b) = (a.as_int()?, b.as_int()?);
                Ok(Value::Int(match self.op {
                    ArithOp::Add => a.wrapping_add(b),
                    ArithOp::Sub => a.wrapping_sub(b),
                    ArithOp::Mul => a.wrapping_mul(b),
                    ArithOp::Div => if b == 0 { 1 } else { a.wrapping_div(b) },
                }))
            }
            GpType::Long => {
                let (a, b) = (a.as_long()?, b.as_long()?);
                Ok(Value::Long(match self.op {
                    ArithOp::Add => a.wrapping_add(b),
                    ArithOp::Sub => a.wrapping_sub(b),
                    ArithOp::Mul => a.wrapping_mul(b),
                    ArithOp::Div => if b == 0 { 1 } else { a.wrapping_div(b) },
                }))
            }
            GpType::Float => {
                let (a, b) = (a.as_float()?, b.as_float()?);
                Ok(Value::Float(match self.op {
                    ArithOp::Add => a + b,
                    ArithOp::Sub => a - b,
                    ArithOp::Mul => a * b,
                    ArithOp::Div => if b == 0.0 { 1.0 } else { a / b },
                }))
            }
            GpType::Double => {
                let (a, b) = (a.as_double()?, b.as_double()?);
                Ok(Value::Double(match self.op {
                    ArithOp::Add => a + b,
                    ArithOp::Sub => a - b,
                    ArithOp::Mul => a * b,
                    ArithOp::Div => if b == 0.0 { 1.0 } else { a / b },
                }))
            }
            other => Err(wrong_kind(self, other)),
        }
    }
}

// --- Comparison ---
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Gt,
    Lt,
    Eq,
}

#[derive(Debug, Clone)]
pub struct Comparison {
    op: CmpOp,
    operand: GpType,
}

impl Comparison {
    pub fn new(op: CmpOp, operand: GpType) -> Self {
        Self { op, operand }
    }
}

impl Node for Comparison {
    fn name(&self) -> &str {
        match self.op {
            CmpOp::Gt => "Gt",
            CmpOp::Lt => "Lt",
            CmpOp::Eq => "Eq",
        }
    }
    fn arity(&self, _shape: &ProgramShape) -> usize { 2 }
    fn return_type(&self) -> GpType { GpType::Boolean }
    fn child_type(&self, _shape: &ProgramShape, _child: usize) -> GpType { self.operand }

    fn execute(
        &self,
        ctx: &mut ExecutionContext<'_>,
        chromosome: &Chromosome,
        index: usize,
    ) -> Result<Value> {
        let a = chromosome.eval_child(ctx, index, 0)?;
        let b = chromosome.eval_child(ctx, index, 1)?;
        let ordering = match self.operand {
            GpType::Int => a.as_int()?.partial_cmp(&b.as_int()?),
            GpType::Long => a.as_long()?.partial_cmp(&b.as_long()?),
            GpType::Float => a.as_float()?.partial_cmp(&b.as_float()?),
            GpType::Double => a.as_double()?.partial_cmp(&b.as_double()?),
            other => return Err(wrong_kind(self, other)),
        };
        // NaN operands compare false
        let result = match (self.op, ordering) {
            (_, None) => false,
            (CmpOp::Gt, Some(o)) => o.is_gt(),
            (CmpOp::Lt, Some(o)) => o.is_lt(),
            (CmpOp::Eq, Some(o)) => o.is_eq(),
        };
        Ok(Value::Boolean(result))
    }
}

// --- Logical operators ---
#[derive(Debug, Clone)]
pub struct And;
impl Node for And {
    fn name(&self) -> &str { "And" }
    fn arity(&self, _shape: &ProgramShape) -> usize { 2 }
    fn return_type(&self) -> GpType { GpType::Boolean }
    fn child_type(&self, _shape: &ProgramShape, _child: usize) -> GpType { GpType::Boolean }
    fn execute(
        &self,
        ctx: &mut ExecutionContext<'_>,
        chromosome: &Chromosome,
        index: usize,
    ) -> Result<Value> {
        if !chromosome.eval_child(ctx, index, 0)?.as_boolean()? {
            return Ok(Value::Boolean(false));
        }
        Ok(Value::Boolean(chromosome.eval_child(ctx, index, 1)?.as_boolean()?))
    }
}

#[derive(Debug, Clone)]
pub struct Or;
impl Node for Or {
    fn name(&self) -> &str { "Or" }
    fn arity(&self, _shape: &ProgramShape) -> usize { 2 }
    fn return_type(&self) -> GpType { GpType::Boolean }
    fn child_type(&self, _shape: &ProgramShape, _child: usize) -> GpType { GpType::Boolean }
    fn execute(
        &self,
        ctx: &mut ExecutionContext<'_>,
        chromosome: &Chromosome,
        index: usize,
    ) -> Result<Value> {
        if chromosome.eval_child(ctx, index, 0)?.as_boolean()? {
            return Ok(Value::Boolean(true));
        }
        Ok(Value::Boolean(chromosome.eval_child(ctx, index, 1)?.as_boolean()?))
    }
}

#[derive(Debug, Clone)]
pub struct Not;
impl Node for Not {
    fn name(&self) -> &str { "Not" }
    fn arity(&self, _shape: &ProgramShape) -> usize { 1 }
    fn return_type(&self) -> GpType { GpType::Boolean }
    fn child_type(&self, _shape: &ProgramShape, _child: usize) -> GpType { GpType::Boolean }
    fn execute(
        &self,
        ctx: &mut ExecutionContext<'_>,
        chromosome: &Chromosome,
        index: usize,
    ) -> Result<Value> {
        Ok(Value::Boolean(!chromosome.eval_child(ctx, index, 0)?.as_boolean()?))
    }
}

// --- Control flow ---

/// `If(cond, then, else)`; only the selected branch is executed
#[derive(Debug, Clone)]
pub struct If {
    gp_type: GpType,
}

impl If {
    pub fn new(gp_type: GpType) -> Self {
        Self { gp_type }
    }
}

impl Node for If {
    fn name(&self) -> &str { "If" }
    fn arity(&self, _shape: &ProgramShape) -> usize { 3 }
    fn return_type(&self) -> GpType { self.gp_type }
    fn child_type(&self, _shape: &ProgramShape, child: usize) -> GpType {
        if child == 0 { GpType::Boolean } else { self.gp_type }
    }
    fn execute(
        &self,
        ctx: &mut ExecutionContext<'_>,
        chromosome: &Chromosome,
        index: usize,
    ) -> Result<Value> {
        let branch = if chromosome.eval_child(ctx, index, 0)?.as_boolean()? { 1 } else { 2 };
        chromosome.eval_child(ctx, index, branch)
    }
}

/// Runs a void child for its side effects, then yields the second child
#[derive(Debug, Clone)]
pub struct Sequence {
    gp_type: GpType,
}

impl Sequence {
    pub fn new(gp_type: GpType) -> Self {
        Self { gp_type }
    }
}

impl Node for Sequence {
    fn name(&self) -> &str { "Seq" }
    fn arity(&self, _shape: &ProgramShape) -> usize { 2 }
    fn return_type(&self) -> GpType { self.gp_type }
    fn child_type(&self, _shape: &ProgramShape, child: usize) -> GpType {
        if child == 0 { GpType::Void } else { self.gp_type }
    }
    fn execute(
        &self,
        ctx: &mut ExecutionContext<'_>,
        chromosome: &Chromosome,
        index: usize,
    ) -> Result<Value> {
        chromosome.eval_child(ctx, index, 0)?.as_void()?;
        chromosome.eval_child(ctx, index, 1)
    }
}

// --- Constants ---
#[derive(Debug, Clone)]
pub struct Constant {
    literal: Literal,
    name: String,
}

impl Constant {
    pub fn new(literal: Literal) -> Self {
        let name = literal.to_string();
        Self { literal, name }
    }

    pub fn int(value: i32) -> Self {
        Self::new(Literal::Int(value))
    }

    pub fn double(value: f64) -> Self {
        Self::new(Literal::Double(value))
    }

    pub fn boolean(value: bool) -> Self {
        Self::new(Literal::Boolean(value))
    }
}

impl Node for Constant {
    fn name(&self) -> &str { &self.name }
    fn arity(&self, _shape: &ProgramShape) -> usize { 0 }
    fn return_type(&self) -> GpType { self.literal.gp_type() }
    fn child_type(&self, _shape: &ProgramShape, _child: usize) -> GpType { GpType::Void }
    fn literal(&self) -> Option<Literal> { Some(self.literal.clone()) }
    fn execute(
        &self,
        _ctx: &mut ExecutionContext<'_>,
        _chromosome: &Chromosome,
        _index: usize,
    ) -> Result<Value> {
        Ok(Value::from(&self.literal))
    }
}

/// Ephemeral random constant: each placement in a tree draws a fresh
/// `Constant` uniformly from `[low, high)`
#[derive(Debug, Clone)]
pub struct RandomConstant {
    gp_type: GpType,
    low: f64,
    high: f64,
    name: String,
}

impl RandomConstant {
    pub fn int(low: i32, high: i32) -> Self {
        Self {
            gp_type: GpType::Int,
            low: f64::from(low),
            high: f64::from(high),
            name: "erc_int".to_string(),
        }
    }

    pub fn double(low: f64, high: f64) -> Self {
        Self {
            gp_type: GpType::Double,
            low,
            high,
            name: "erc_double".to_string(),
        }
    }
}

impl Node for RandomConstant {
    fn name(&self) -> &str { &self.name }
    fn arity(&self, _shape: &ProgramShape) -> usize { 0 }
    fn return_type(&self) -> GpType { self.gp_type }
    fn child_type(&self, _shape: &ProgramShape, _child: usize) -> GpType { GpType::Void }

    fn instantiate(&self, rng: &mut dyn RngCore) -> Option<NodeRef> {
        let literal = match self.gp_type {
            GpType::Int if self.high > self.low => {
                Literal::Int(rng.gen_range(self.low as i32..self.high as i32))
            }
            GpType::Int => Literal::Int(self.low as i32),
            _ if self.high > self.low => Literal::Double(rng.gen_range(self.low..self.high)),
            _ => Literal::Double(self.low),
        };
        Some(Arc::new(Constant::new(literal)))
    }

    fn execute(
        &self,
        _ctx: &mut ExecutionContext<'_>,
        _chromosome: &Chromosome,
        index: usize,
    ) -> Result<Value> {
        Err(GpError::InvalidStructure(format!(
            "random constant template {} at {} was never instantiated",
            self.name, index
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_constant_instantiates_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        let erc = RandomConstant::double(-1.0, 1.0);
        for _ in 0..50 {
            let node = erc.instantiate(&mut rng).unwrap();
            match node.literal() {
                Some(Literal::Double(v)) => assert!((-1.0..1.0).contains(&v)),
                other => panic!("unexpected literal {:?}", other),
            }
        }
    }

    #[test]
    fn test_constant_name_is_literal() {
        assert_eq!(Constant::int(4).name(), "4");
        assert_eq!(Constant::boolean(true).return_type(), GpType::Boolean);
    }
}

use super::chromosome::{Chromosome, InitMethod};
use super::shape::ProgramShape;
use super::visitor::to_formula;
use crate::engines::evaluation::context::ExecutionContext;
use crate::engines::evaluation::memory::RuntimeMemory;
use crate::error::{GpError, Result};
use crate::types::{GpType, Value};
use rand::Rng;
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// One individual: an ordered set of chromosomes plus its cached fitness.
///
/// Chromosome 0 is the main tree; the others are reachable through ADF
/// nodes. `fitness` is `None` until the program has been evaluated.
#[derive(Debug, Clone)]
pub struct Program {
    shape: Arc<ProgramShape>,
    chromosomes: Vec<Chromosome>,
    fitness: Option<f64>,
}

impl Program {
    pub fn new(shape: Arc<ProgramShape>, chromosomes: Vec<Chromosome>) -> Result<Self> {
        if chromosomes.len() != shape.len() {
            return Err(GpError::InvalidStructure(format!(
                "program has {} chromosomes but its shape declares {}",
                chromosomes.len(),
                shape.len()
            )));
        }
        Ok(Self {
            shape,
            chromosomes,
            fitness: None,
        })
    }

    /// Random individual. Each chromosome draws its depth uniformly from
    /// `[min_depth, max(min_depth, min(max_depth, depth_cap))]`.
    pub fn random<R: Rng>(
        shape: &Arc<ProgramShape>,
        method: InitMethod,
        depth_cap: usize,
        rng: &mut R,
    ) -> Result<Self> {
        let mut used_unique = HashSet::new();
        let mut chromosomes = Vec::with_capacity(shape.len());
        for (tree, tree_shape) in shape.chromosomes().iter().enumerate() {
            let upper = tree_shape
                .min_depth
                .max(tree_shape.max_depth.min(depth_cap));
            let depth = rng.gen_range(tree_shape.min_depth..=upper);
            chromosomes.push(Chromosome::build(
                method,
                shape,
                tree,
                depth,
                &mut used_unique,
                rng,
            )?);
        }

        let program = Self::new(Arc::clone(shape), chromosomes)?;
        program.validate()?;
        Ok(program)
    }

    pub fn shape(&self) -> &Arc<ProgramShape> {
        &self.shape
    }

    pub fn chromosome(&self, index: usize) -> Option<&Chromosome> {
        self.chromosomes.get(index)
    }

    pub fn chromosomes(&self) -> &[Chromosome] {
        &self.chromosomes
    }

    /// Copy with chromosome `index` replaced; the copy starts unevaluated
    pub fn with_chromosome(&self, index: usize, chromosome: Chromosome) -> Result<Self> {
        if index >= self.chromosomes.len() {
            return Err(GpError::InvalidStructure(format!(
                "program has no chromosome {}",
                index
            )));
        }
        let mut chromosomes = self.chromosomes.clone();
        chromosomes[index] = chromosome;
        Ok(Self {
            shape: Arc::clone(&self.shape),
            chromosomes,
            fitness: None,
        })
    }

    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = Some(fitness);
    }

    pub fn clear_fitness(&mut self) {
        self.fitness = None;
    }

    /// Total node count over all chromosomes
    pub fn size(&self) -> usize {
        self.chromosomes.iter().map(Chromosome::len).sum()
    }

    /// Name of a unique node placed more than once, if any
    pub fn unique_violation(&self) -> Option<String> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for node in self.chromosomes.iter().flat_map(|c| c.nodes().iter()) {
            if node.is_unique() {
                *counts.entry(node.name()).or_insert(0) += 1;
            }
        }
        counts
            .into_iter()
            .find(|(_, count)| *count > 1)
            .map(|(name, _)| name.to_string())
    }

    /// Runs every node's non-local `is_valid` check
    pub fn validate(&self) -> Result<()> {
        for (tree, chromosome) in self.chromosomes.iter().enumerate() {
            for (index, node) in chromosome.nodes().iter().enumerate() {
                if !node.is_valid(self) {
                    return Err(GpError::InvalidStructure(format!(
                        "{} at {} in chromosome {} failed its validity check",
                        node.name(),
                        index,
                        tree
                    )));
                }
            }
        }
        Ok(())
    }

    /// S-expression of every chromosome; subroutines are labelled by the
    /// ADF name that calls them
    pub fn formula(&self) -> String {
        self.chromosomes
            .iter()
            .enumerate()
            .map(|(tree, chromosome)| {
                if tree == 0 {
                    to_formula(chromosome)
                } else {
                    format!("adf{} = {}", tree, to_formula(chromosome))
                }
            })
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Executes the main tree with `args` bound to its parameters
    pub fn execute(
        &self,
        memory: &mut RuntimeMemory,
        args: Vec<Value>,
        max_call_depth: usize,
    ) -> Result<Value> {
        let main = self.main()?;
        let mut ctx = ExecutionContext::new(self, memory, args, max_call_depth);
        main.execute(&mut ctx)
    }

    fn main(&self) -> Result<&Chromosome> {
        self.chromosomes
            .first()
            .ok_or_else(|| GpError::InvalidStructure("program has no chromosomes".to_string()))
    }

    fn execute_as(
        &self,
        memory: &mut RuntimeMemory,
        args: Vec<Value>,
        max_call_depth: usize,
        kind: GpType,
    ) -> Result<Value> {
        let main = self.main()?;
        let mut ctx = ExecutionContext::new(self, memory, args, max_call_depth);
        main.execute_as(&mut ctx, kind)
    }

    pub fn execute_boolean(
        &self,
        memory: &mut RuntimeMemory,
        args: Vec<Value>,
        max_call_depth: usize,
    ) -> Result<bool> {
        self.execute_as(memory, args, max_call_depth, GpType::Boolean)?.as_boolean()
    }

    pub fn execute_int(
        &self,
        memory: &mut RuntimeMemory,
        args: Vec<Value>,
        max_call_depth: usize,
    ) -> Result<i32> {
        self.execute_as(memory, args, max_call_depth, GpType::Int)?.as_int()
    }

    pub fn execute_long(
        &self,
        memory: &mut RuntimeMemory,
        args: Vec<Value>,
        max_call_depth: usize,
    ) -> Result<i64> {
        self.execute_as(memory, args, max_call_depth, GpType::Long)?.as_long()
    }

    pub fn execute_float(
        &self,
        memory: &mut RuntimeMemory,
        args: Vec<Value>,
        max_call_depth: usize,
    ) -> Result<f32> {
        self.execute_as(memory, args, max_call_depth, GpType::Float)?.as_float()
    }

    pub fn execute_double(
        &self,
        memory: &mut RuntimeMemory,
        args: Vec<Value>,
        max_call_depth: usize,
    ) -> Result<f64> {
        self.execute_as(memory, args, max_call_depth, GpType::Double)?.as_double()
    }

    pub fn execute_object(
        &self,
        memory: &mut RuntimeMemory,
        args: Vec<Value>,
        max_call_depth: usize,
    ) -> Result<Arc<dyn Any + Send + Sync>> {
        self.execute_as(memory, args, max_call_depth, GpType::Object)?.as_object()
    }

    pub fn execute_void(
        &self,
        memory: &mut RuntimeMemory,
        args: Vec<Value>,
        max_call_depth: usize,
    ) -> Result<()> {
        self.execute_as(memory, args, max_call_depth, GpType::Void)?.as_void()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::generation::shape::ChromosomeShape;
    use crate::functions::adf::Adf;
    use crate::functions::memory::{ReadCell, StoreCell};
    use crate::functions::primitives::{ArithOp, Arithmetic, Constant};
    use crate::functions::traits::NodeRef;

    fn adf_shape() -> Arc<ProgramShape> {
        // main: Double, calls adf1(Double) which doubles its argument
        let add: NodeRef = Arc::new(Arithmetic::double(ArithOp::Add));
        Arc::new(
            ProgramShape::new(64)
                .with_chromosome(ChromosomeShape::new(
                    GpType::Double,
                    vec![],
                    vec![Arc::new(Adf::new(1, GpType::Double)), Arc::new(Constant::double(2.5))],
                    1,
                    3,
                ))
                .with_chromosome(ChromosomeShape::new(
                    GpType::Double,
                    vec![GpType::Double],
                    vec![add],
                    1,
                    3,
                )),
        )
    }

    #[test]
    fn test_adf_call_binds_arguments() {
        let shape = adf_shape();
        let main_palette = &shape.chromosome(0).unwrap().palette;
        let sub_palette = &shape.chromosome(1).unwrap().palette;

        // adf1(2.5)
        let main_nodes = vec![main_palette[0].clone(), main_palette[1].clone()];
        let main = Chromosome::from_nodes(&shape, 0, main_nodes).unwrap();
        // arg0 + arg0
        let arg0 = sub_palette[1].clone();
        let sub_nodes = vec![sub_palette[0].clone(), arg0.clone(), arg0];
        let sub = Chromosome::from_nodes(&shape, 1, sub_nodes).unwrap();

        let program = Program::new(shape, vec![main, sub]).unwrap();
        let mut memory = RuntimeMemory::default();
        assert_eq!(program.execute_double(&mut memory, vec![], 64).unwrap(), 5.0);
        assert_eq!(program.formula(), "(adf1 2.5); adf1 = (Add arg0 arg0)");
    }

    #[test]
    fn test_wrong_kind_is_unsupported() {
        let shape = adf_shape();
        let palette = &shape.chromosome(0).unwrap().palette;
        let main = Chromosome::from_nodes(&shape, 0, vec![palette[1].clone()]).unwrap();
        let sub_palette = &shape.chromosome(1).unwrap().palette;
        let sub = Chromosome::from_nodes(&shape, 1, vec![sub_palette[1].clone()]).unwrap();
        let program = Program::new(shape, vec![main, sub]).unwrap();

        let mut memory = RuntimeMemory::default();
        assert!(matches!(
            program.execute_int(&mut memory, vec![], 64),
            Err(GpError::UnsupportedOperation { .. })
        ));
    }

    #[test]
    fn test_store_without_read_is_invalid() {
        let shape = Arc::new(ProgramShape::new(16).with_chromosome(ChromosomeShape::new(
            GpType::Double,
            vec![],
            vec![
                Arc::new(StoreCell::new(0, GpType::Double)),
                Arc::new(ReadCell::new(0, GpType::Double)),
                Arc::new(Constant::double(1.0)),
            ],
            1,
            3,
        )));
        let palette = &shape.chromosome(0).unwrap().palette;

        let lonely_nodes = vec![palette[0].clone(), palette[2].clone()];
        let lonely = Chromosome::from_nodes(&shape, 0, lonely_nodes).unwrap();
        let program = Program::new(Arc::clone(&shape), vec![lonely]).unwrap();
        assert!(matches!(program.validate(), Err(GpError::InvalidStructure(_))));

        let paired_nodes = vec![palette[0].clone(), palette[1].clone()];
        let paired = Chromosome::from_nodes(&shape, 0, paired_nodes).unwrap();
        let program = Program::new(shape, vec![paired]).unwrap();
        assert!(program.validate().is_ok());
    }
}

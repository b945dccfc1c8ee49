//! One typed expression tree, stored as a flat pre-order node array with a
//! parallel depth array.
//!
//! For node `i` with arity `k`, its children are the first `k` indices after
//! `i` whose depth is `depth[i] + 1`; the scan stops at the first index whose
//! depth is `<= depth[i]`. The subtree rooted at `i` is the contiguous range
//! `i..i + size(i)`, which is what makes crossover a pair of slice copies.

use super::shape::ProgramShape;
use super::visitor::TreeVisitor;
use crate::engines::evaluation::context::ExecutionContext;
use crate::error::{GpError, Result};
use crate::functions::traits::{ArityClass, NodeRef};
use crate::types::{GpType, Value};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::HashSet;
use std::ops::Range;
use std::sync::Arc;

/// Tree construction strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitMethod {
    /// Terminals may appear at any level; irregular, shallower trees
    Grow,
    /// Functions down to the last level; every leaf at the same depth
    Full,
}

#[derive(Debug, Clone)]
pub struct Chromosome {
    nodes: Vec<NodeRef>,
    depth: Vec<usize>,
    return_type: GpType,
    arg_types: Vec<GpType>,
}

/// Open position waiting for a node during construction
struct Slot {
    gp_type: GpType,
    sub_type: Option<String>,
    level: usize,
}

impl Chromosome {
    pub fn grow<R: Rng>(
        shape: &ProgramShape,
        tree: usize,
        depth: usize,
        used_unique: &mut HashSet<String>,
        rng: &mut R,
    ) -> Result<Self> {
        Self::build(InitMethod::Grow, shape, tree, depth, used_unique, rng)
    }

    pub fn full<R: Rng>(
        shape: &ProgramShape,
        tree: usize,
        depth: usize,
        used_unique: &mut HashSet<String>,
        rng: &mut R,
    ) -> Result<Self> {
        Self::build(InitMethod::Full, shape, tree, depth, used_unique, rng)
    }

    /// Builds a random tree for chromosome `tree` of `shape` with at most
    /// `depth` levels.
    ///
    /// Nodes are drawn uniformly from the palette entries whose return type
    /// (and sub-type, when the slot asks for one) matches and whose arity
    /// fits the slot. Unique nodes already in `used_unique` are skipped and
    /// the ones placed here are added to it. An empty candidate set or a
    /// tree larger than `max_nodes` is an `IllegalConfiguration` error.
    pub fn build<R: Rng>(
        method: InitMethod,
        shape: &ProgramShape,
        tree: usize,
        depth: usize,
        used_unique: &mut HashSet<String>,
        rng: &mut R,
    ) -> Result<Self> {
        let tree_shape = shape.chromosome(tree).ok_or_else(|| {
            GpError::IllegalConfiguration(format!("program shape has no chromosome {}", tree))
        })?;
        if depth == 0 {
            return Err(GpError::IllegalConfiguration(
                "tree depth must be at least 1".to_string(),
            ));
        }

        let mut nodes: Vec<NodeRef> = Vec::new();
        let mut pending = vec![Slot {
            gp_type: tree_shape.return_type,
            sub_type: None,
            level: 0,
        }];

        while let Some(slot) = pending.pop() {
            if nodes.len() >= shape.max_nodes() {
                return Err(GpError::IllegalConfiguration(format!(
                    "chromosome {} exceeds max_nodes {} at depth {}",
                    tree,
                    shape.max_nodes(),
                    depth
                )));
            }

            let class = if slot.level + 1 >= depth {
                ArityClass::Terminal
            } else {
                match method {
                    InitMethod::Full => ArityClass::Function,
                    InitMethod::Grow => ArityClass::Any,
                }
            };

            let candidates: Vec<&NodeRef> = tree_shape
                .palette
                .iter()
                .filter(|n| {
                    n.return_type() == slot.gp_type
                        && slot
                            .sub_type
                            .as_deref()
                            .map_or(true, |sub| n.sub_return_type() == Some(sub))
                        && class.accepts(n.arity(shape))
                        && !(n.is_unique() && used_unique.contains(n.name()))
                })
                .collect();

            if candidates.is_empty() {
                return Err(GpError::IllegalConfiguration(format!(
                    "no {:?} node returning {} available for chromosome {} at depth {}",
                    class, slot.gp_type, tree, slot.level
                )));
            }

            let choice = candidates[rng.gen_range(0..candidates.len())];
            let node = choice
                .instantiate(&mut *rng)
                .unwrap_or_else(|| Arc::clone(choice));
            if node.is_unique() {
                used_unique.insert(node.name().to_string());
            }

            // Children are pushed in reverse so the first child pops first
            let arity = node.arity(shape);
            for child in (0..arity).rev() {
                pending.push(Slot {
                    gp_type: node.child_type(shape, child),
                    sub_type: node.sub_child_type(shape, child).map(str::to_string),
                    level: slot.level + 1,
                });
            }
            nodes.push(node);
        }

        let mut chromosome = Self {
            nodes,
            depth: Vec::new(),
            return_type: tree_shape.return_type,
            arg_types: tree_shape.arg_types.clone(),
        };
        chromosome.redepth(shape)?;
        Ok(chromosome)
    }

    /// Assembles a tree from an explicit pre-order node list
    pub fn from_nodes(shape: &ProgramShape, tree: usize, nodes: Vec<NodeRef>) -> Result<Self> {
        let tree_shape = shape.chromosome(tree).ok_or_else(|| {
            GpError::IllegalConfiguration(format!("program shape has no chromosome {}", tree))
        })?;
        let root = nodes
            .first()
            .ok_or_else(|| GpError::InvalidStructure("empty node list".to_string()))?;
        if root.return_type() != tree_shape.return_type {
            return Err(GpError::InvalidStructure(format!(
                "root {} returns {} but chromosome {} returns {}",
                root.name(),
                root.return_type(),
                tree,
                tree_shape.return_type
            )));
        }

        let mut chromosome = Self {
            nodes,
            depth: Vec::new(),
            return_type: tree_shape.return_type,
            arg_types: tree_shape.arg_types.clone(),
        };
        chromosome.redepth(shape)?;
        Ok(chromosome)
    }

    /// Recomputes the depth array from the node arities in one pre-order pass.
    ///
    /// Must run after any structural edit. Fails if the node list is not
    /// exactly one complete tree.
    pub fn redepth(&mut self, shape: &ProgramShape) -> Result<()> {
        let mut depth = Vec::with_capacity(self.nodes.len());
        // Remaining child slots of every open ancestor
        let mut open: Vec<usize> = Vec::new();

        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 && open.is_empty() {
                return Err(GpError::InvalidStructure(format!(
                    "node {} lies outside the tree rooted at 0",
                    i
                )));
            }
            depth.push(open.len());
            if let Some(remaining) = open.last_mut() {
                *remaining -= 1;
            }

            let arity = node.arity(shape);
            if arity > 0 {
                open.push(arity);
            } else {
                while open.last() == Some(&0) {
                    open.pop();
                }
            }
        }

        if !open.is_empty() {
            return Err(GpError::InvalidStructure(format!(
                "tree is missing children for {} open nodes",
                open.len()
            )));
        }
        self.depth = depth;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[NodeRef] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Option<&NodeRef> {
        self.nodes.get(index)
    }

    pub fn depths(&self) -> &[usize] {
        &self.depth
    }

    pub fn depth_at(&self, index: usize) -> usize {
        self.depth[index]
    }

    pub fn return_type(&self) -> GpType {
        self.return_type
    }

    pub fn arg_types(&self) -> &[GpType] {
        &self.arg_types
    }

    /// Number of levels in the tree (a single terminal has height 1)
    pub fn height(&self) -> usize {
        self.depth.iter().max().map_or(0, |d| d + 1)
    }

    /// Child `child` of node `index`, if it exists
    pub fn get_child(&self, index: usize, child: usize) -> Option<usize> {
        let parent_depth = *self.depth.get(index)?;
        let mut seen = 0;
        for j in index + 1..self.depth.len() {
            if self.depth[j] <= parent_depth {
                break;
            }
            if self.depth[j] == parent_depth + 1 {
                if seen == child {
                    return Some(j);
                }
                seen += 1;
            }
        }
        None
    }

    pub fn children(&self, index: usize) -> Vec<usize> {
        let parent_depth = self.depth[index];
        (index + 1..self.depth.len())
            .take_while(|&j| self.depth[j] > parent_depth)
            .filter(|&j| self.depth[j] == parent_depth + 1)
            .collect()
    }

    /// Nodes in the subtree rooted at `index`, the root included
    pub fn size(&self, index: usize) -> usize {
        let parent_depth = self.depth[index];
        1 + self.depth[index + 1..]
            .iter()
            .take_while(|&&d| d > parent_depth)
            .count()
    }

    pub fn subtree(&self, index: usize) -> Range<usize> {
        index..index + self.size(index)
    }

    /// Height of the subtree rooted at `index`
    pub fn subtree_height(&self, index: usize) -> usize {
        let base = self.depth[index];
        self.depth[self.subtree(index)]
            .iter()
            .map(|d| d - base + 1)
            .max()
            .unwrap_or(1)
    }

    pub fn is_function(&self, shape: &ProgramShape, index: usize) -> bool {
        self.nodes[index].arity(shape) > 0
    }

    pub fn function_indices(&self, shape: &ProgramShape) -> Vec<usize> {
        (0..self.nodes.len())
            .filter(|&i| self.is_function(shape, i))
            .collect()
    }

    pub fn terminal_indices(&self, shape: &ProgramShape) -> Vec<usize> {
        (0..self.nodes.len())
            .filter(|&i| !self.is_function(shape, i))
            .collect()
    }

    /// New tree: `self` with the subtree at `cut` replaced by the subtree of
    /// `donor` rooted at `donor_index`
    pub fn splice(
        &self,
        shape: &ProgramShape,
        cut: usize,
        donor: &Chromosome,
        donor_index: usize,
    ) -> Result<Self> {
        let excised = self.subtree(cut);
        let inserted = donor.subtree(donor_index);

        let mut nodes = Vec::with_capacity(self.len() - excised.len() + inserted.len());
        nodes.extend(self.nodes[..excised.start].iter().cloned());
        nodes.extend(donor.nodes[inserted].iter().cloned());
        nodes.extend(self.nodes[excised.end..].iter().cloned());

        let mut offspring = Self {
            nodes,
            depth: Vec::new(),
            return_type: self.return_type,
            arg_types: self.arg_types.clone(),
        };
        offspring.redepth(shape)?;
        Ok(offspring)
    }

    /// Checks the depth/arity invariants and child types of every node
    pub fn validate_structure(&self, shape: &ProgramShape) -> Result<()> {
        if self.nodes.is_empty() || self.depth.len() != self.nodes.len() {
            return Err(GpError::InvalidStructure(
                "node and depth arrays disagree".to_string(),
            ));
        }
        if self.depth[0] != 0 {
            return Err(GpError::InvalidStructure("root is not at depth 0".to_string()));
        }

        for (i, node) in self.nodes.iter().enumerate() {
            let arity = node.arity(shape);
            let children = self.children(i);
            if children.len() != arity {
                return Err(GpError::InvalidStructure(format!(
                    "{} at {} has {} children, expected {}",
                    node.name(),
                    i,
                    children.len(),
                    arity
                )));
            }
            let mut total = 1;
            for (k, &c) in children.iter().enumerate() {
                let expected = node.child_type(shape, k);
                if self.nodes[c].return_type() != expected {
                    return Err(GpError::InvalidStructure(format!(
                        "child {} of {} at {} returns {}, expected {}",
                        k,
                        node.name(),
                        i,
                        self.nodes[c].return_type(),
                        expected
                    )));
                }
                total += self.size(c);
            }
            if total != self.size(i) {
                return Err(GpError::InvalidStructure(format!(
                    "subtree size mismatch at {}",
                    i
                )));
            }
        }
        Ok(())
    }

    /// Pre-order walk; `leave` fires once a node's whole subtree was visited
    pub fn walk<V: TreeVisitor + ?Sized>(&self, visitor: &mut V) {
        let mut open: Vec<(usize, usize)> = Vec::new();
        for i in 0..self.nodes.len() {
            while let Some(&(index, end)) = open.last() {
                if end > i {
                    break;
                }
                visitor.leave(self, index);
                open.pop();
            }
            visitor.enter(self, i);
            open.push((i, i + self.size(i)));
        }
        while let Some((index, _)) = open.pop() {
            visitor.leave(self, index);
        }
    }

    // --- Execution ---

    pub fn execute(&self, ctx: &mut ExecutionContext<'_>) -> Result<Value> {
        self.eval_at(ctx, 0)
    }

    /// Executes the node at `index`, guarding the interpreter call depth
    pub fn eval_at(&self, ctx: &mut ExecutionContext<'_>, index: usize) -> Result<Value> {
        let node = self.nodes.get(index).ok_or_else(|| {
            GpError::InvalidStructure(format!("no node at index {}", index))
        })?;
        ctx.enter()?;
        let result = node.execute(ctx, self, index);
        ctx.leave();
        result
    }

    /// Executes child `child` of the node at `index`
    pub fn eval_child(
        &self,
        ctx: &mut ExecutionContext<'_>,
        index: usize,
        child: usize,
    ) -> Result<Value> {
        let c = self
            .get_child(index, child)
            .ok_or(GpError::MissingChild { index, child })?;
        self.eval_at(ctx, c)
    }

    /// Executes the tree after checking it is declared to return `kind`
    pub fn execute_as(&self, ctx: &mut ExecutionContext<'_>, kind: GpType) -> Result<Value> {
        if self.return_type != kind {
            let root = self.nodes.first().map_or("<empty>", |n| n.name());
            return Err(GpError::UnsupportedOperation {
                node: root.to_string(),
                requested: kind,
                actual: self.return_type,
            });
        }
        self.execute(ctx)
    }

    pub fn execute_boolean(&self, ctx: &mut ExecutionContext<'_>) -> Result<bool> {
        self.execute_as(ctx, GpType::Boolean)?.as_boolean()
    }

    pub fn execute_int(&self, ctx: &mut ExecutionContext<'_>) -> Result<i32> {
        self.execute_as(ctx, GpType::Int)?.as_int()
    }

    pub fn execute_long(&self, ctx: &mut ExecutionContext<'_>) -> Result<i64> {
        self.execute_as(ctx, GpType::Long)?.as_long()
    }

    pub fn execute_float(&self, ctx: &mut ExecutionContext<'_>) -> Result<f32> {
        self.execute_as(ctx, GpType::Float)?.as_float()
    }

    pub fn execute_double(&self, ctx: &mut ExecutionContext<'_>) -> Result<f64> {
        self.execute_as(ctx, GpType::Double)?.as_double()
    }

    pub fn execute_object(
        &self,
        ctx: &mut ExecutionContext<'_>,
    ) -> Result<Arc<dyn Any + Send + Sync>> {
        self.execute_as(ctx, GpType::Object)?.as_object()
    }

    pub fn execute_void(&self, ctx: &mut ExecutionContext<'_>) -> Result<()> {
        self.execute_as(ctx, GpType::Void)?.as_void()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::generation::shape::ChromosomeShape;
    use crate::functions::primitives::{ArithOp, Arithmetic, Constant};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn int_shape() -> ProgramShape {
        ProgramShape::new(200).with_chromosome(ChromosomeShape::new(
            GpType::Int,
            vec![],
            vec![
                Arc::new(Arithmetic::int(ArithOp::Add)),
                Arc::new(Constant::int(1)),
            ],
            1,
            4,
        ))
    }

    #[test]
    fn test_redepth_of_nested_add() {
        let shape = int_shape();
        let add: NodeRef = Arc::new(Arithmetic::int(ArithOp::Add));
        let one: NodeRef = Arc::new(Constant::int(1));
        // Add(Add(1, 1), 1)
        let nodes = vec![add.clone(), add, one.clone(), one.clone(), one];
        let chromosome = Chromosome::from_nodes(&shape, 0, nodes).unwrap();

        assert_eq!(chromosome.depths(), &[0, 1, 2, 2, 1]);
        assert_eq!(chromosome.get_child(0, 0), Some(1));
        assert_eq!(chromosome.get_child(0, 1), Some(4));
        assert_eq!(chromosome.get_child(0, 2), None);
        assert_eq!(chromosome.size(0), 5);
        assert_eq!(chromosome.size(1), 3);
        assert_eq!(chromosome.height(), 3);
    }

    #[test]
    fn test_redepth_rejects_truncated_tree() {
        let shape = int_shape();
        let nodes: Vec<NodeRef> = vec![
            Arc::new(Arithmetic::int(ArithOp::Add)),
            Arc::new(Constant::int(1)),
        ];
        assert!(matches!(
            Chromosome::from_nodes(&shape, 0, nodes),
            Err(GpError::InvalidStructure(_))
        ));
    }

    #[test]
    fn test_full_reaches_exact_depth() {
        let shape = int_shape();
        let mut rng = StdRng::seed_from_u64(7);
        let mut used = HashSet::new();
        let chromosome = Chromosome::full(&shape, 0, 4, &mut used, &mut rng).unwrap();
        // Binary adds only: a complete tree of 4 levels
        assert_eq!(chromosome.len(), 15);
        chromosome.validate_structure(&shape).unwrap();
    }
}

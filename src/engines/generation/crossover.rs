//! Typed, depth-constrained subtree crossover.

use super::chromosome::Chromosome;
use super::program::Program;
use super::shape::ProgramShape;
use crate::error::{GpError, Result};
use rand::Rng;

#[derive(Debug, Clone, Copy)]
pub struct CrossoverConfig {
    /// Probability of cutting at a function node rather than a terminal
    pub function_bias: f64,
    /// Maximum number of levels of an offspring tree
    pub max_depth: usize,
}

impl Default for CrossoverConfig {
    fn default() -> Self {
        Self {
            function_bias: 0.9,
            max_depth: 17,
        }
    }
}

/// Result of splicing a donor subtree into a receiving tree
#[derive(Debug)]
pub enum Splice {
    Spliced(Chromosome),
    /// The donor has no node of the cut point's type
    NoDonor,
    /// The offspring would break the depth or node bound
    Rejected,
}

/// Picks an index among those accepted by `filter`, preferring function
/// nodes with probability `bias`. Falls back to the other class when the
/// preferred one is empty.
fn pick_point<R: Rng, P: Fn(usize) -> bool>(
    chromosome: &Chromosome,
    shape: &ProgramShape,
    bias: f64,
    filter: P,
    rng: &mut R,
) -> Option<usize> {
    let mut functions = chromosome.function_indices(shape);
    let mut terminals = chromosome.terminal_indices(shape);
    functions.retain(|&i| filter(i));
    terminals.retain(|&i| filter(i));

    let prefer_functions = rng.gen::<f64>() < bias;
    let pool = match (prefer_functions, functions.is_empty(), terminals.is_empty()) {
        (_, true, true) => return None,
        (true, false, _) | (false, false, true) => functions,
        _ => terminals,
    };
    Some(pool[rng.gen_range(0..pool.len())])
}

/// Replaces a randomly chosen subtree of `receiver` with a type-compatible
/// subtree of `donor`
pub fn splice_chromosomes<R: Rng>(
    receiver: &Chromosome,
    donor: &Chromosome,
    shape: &ProgramShape,
    config: &CrossoverConfig,
    rng: &mut R,
) -> Result<Splice> {
    let cut = pick_point(receiver, shape, config.function_bias, |_| true, rng)
        .ok_or_else(|| GpError::InvalidStructure("cannot cross an empty tree".to_string()))?;
    let cut_node = &receiver.nodes()[cut];
    let required = cut_node.return_type();
    let sub_type = cut_node.sub_return_type();

    let donor_index = pick_point(
        donor,
        shape,
        config.function_bias,
        |j| {
            let candidate = &donor.nodes()[j];
            candidate.return_type() == required && candidate.sub_return_type() == sub_type
        },
        rng,
    );
    let Some(donor_index) = donor_index else {
        return Ok(Splice::NoDonor);
    };

    let offspring_len = receiver.len() - receiver.size(cut) + donor.size(donor_index);
    if offspring_len > shape.max_nodes() {
        return Ok(Splice::Rejected);
    }
    if receiver.depth_at(cut) + donor.subtree_height(donor_index) > config.max_depth {
        return Ok(Splice::Rejected);
    }

    let offspring = receiver.splice(shape, cut, donor, donor_index)?;
    if offspring.height() > config.max_depth {
        return Ok(Splice::Rejected);
    }
    Ok(Splice::Spliced(offspring))
}

/// Produces the two offspring `a ⊕ b` and `b ⊕ a`.
///
/// One chromosome index is chosen for both. An offspring without a donor is
/// a copy of its receiving parent; one over the depth/size bound, or one
/// that would repeat a unique node, is a copy of the other parent.
pub fn crossover<R: Rng>(
    a: &Program,
    b: &Program,
    config: &CrossoverConfig,
    rng: &mut R,
) -> Result<(Program, Program)> {
    let shape = a.shape();
    if shape.is_empty() {
        return Err(GpError::InvalidStructure(
            "cannot cross programs without chromosomes".to_string(),
        ));
    }
    let tree = rng.gen_range(0..shape.len());
    let first = offspring(a, b, tree, config, rng)?;
    let second = offspring(b, a, tree, config, rng)?;
    Ok((first, second))
}

fn offspring<R: Rng>(
    receiver: &Program,
    donor: &Program,
    tree: usize,
    config: &CrossoverConfig,
    rng: &mut R,
) -> Result<Program> {
    let missing = || GpError::InvalidStructure(format!("parent has no chromosome {}", tree));
    let receiving = receiver.chromosome(tree).ok_or_else(missing)?;
    let giving = donor.chromosome(tree).ok_or_else(missing)?;

    match splice_chromosomes(receiving, giving, receiver.shape(), config, rng)? {
        Splice::NoDonor => {
            log::debug!(
                "crossover on chromosome {}: no compatible donor, copying receiver",
                tree
            );
            Ok(receiver.clone())
        }
        Splice::Rejected => {
            log::debug!(
                "crossover on chromosome {}: offspring over bound, copying donor",
                tree
            );
            Ok(donor.clone())
        }
        Splice::Spliced(chromosome) => {
            let child = receiver.with_chromosome(tree, chromosome)?;
            if let Some(name) = child.unique_violation() {
                log::debug!(
                    "crossover on chromosome {}: {} repeated, copying donor",
                    tree,
                    name
                );
                return Ok(donor.clone());
            }
            child.validate()?;
            Ok(child)
        }
    }
}

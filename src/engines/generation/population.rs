use super::program::Program;
use crate::error::{GpError, Result};

/// Ordered set of programs plus the cumulative-fitness rank used by
/// roulette selection.
///
/// After `sort_and_rank`, programs are in ascending fitness order and
/// `fitness_rank[i]` is the sum of the fitness of programs `0..i`.
#[derive(Debug, Clone, Default)]
pub struct Population {
    programs: Vec<Program>,
    fitness_rank: Vec<f64>,
    total_fitness: f64,
}

impl Population {
    pub fn new(programs: Vec<Program>) -> Self {
        Self {
            programs,
            fitness_rank: Vec::new(),
            total_fitness: 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    pub fn programs(&self) -> &[Program] {
        &self.programs
    }

    pub fn programs_mut(&mut self) -> &mut [Program] {
        &mut self.programs
    }

    pub fn get(&self, index: usize) -> Option<&Program> {
        self.programs.get(index)
    }

    pub fn into_programs(self) -> Vec<Program> {
        self.programs
    }

    /// Sorts ascending by fitness and rebuilds the rank array. Every
    /// program must already be evaluated.
    pub fn sort_and_rank(&mut self) -> Result<()> {
        if let Some(index) = self.programs.iter().position(|p| !p.is_evaluated()) {
            return Err(GpError::InvalidStructure(format!(
                "cannot rank population: program {} is unevaluated",
                index
            )));
        }

        self.programs.sort_by(|a, b| {
            let fa = a.fitness().unwrap_or(f64::INFINITY);
            let fb = b.fitness().unwrap_or(f64::INFINITY);
            fa.total_cmp(&fb)
        });

        self.fitness_rank.clear();
        let mut running = 0.0;
        for program in &self.programs {
            self.fitness_rank.push(running);
            running += program.fitness().unwrap_or(0.0);
        }
        self.total_fitness = running;
        Ok(())
    }

    pub fn fitness_rank(&self) -> &[f64] {
        &self.fitness_rank
    }

    pub fn total_fitness(&self) -> f64 {
        self.total_fitness
    }

    /// Lowest-fitness program; only meaningful after `sort_and_rank`
    pub fn best(&self) -> Option<&Program> {
        self.programs.first()
    }

    pub fn worst(&self) -> Option<&Program> {
        self.programs.last()
    }

    pub fn mean_fitness(&self) -> f64 {
        if self.programs.is_empty() {
            0.0
        } else {
            self.total_fitness / self.programs.len() as f64
        }
    }

    pub fn unevaluated(&self) -> usize {
        self.programs.iter().filter(|p| !p.is_evaluated()).count()
    }
}

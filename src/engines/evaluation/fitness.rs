use super::memory::RuntimeMemory;
use crate::config::ExecutionConfig;
use crate::engines::generation::program::Program;
use crate::error::{GpError, Result};
use rayon::prelude::*;

/// Scores a program; lower is better and the score must be finite and
/// non-negative.
///
/// Implementations may be called from several threads at once, each call
/// with its own `RuntimeMemory`.
pub trait FitnessFunction: Sync {
    fn evaluate(&self, program: &Program, memory: &mut RuntimeMemory) -> Result<f64>;
}

impl<T> FitnessFunction for T
where
    T: Fn(&Program, &mut RuntimeMemory) -> Result<f64> + Sync,
{
    fn evaluate(&self, program: &Program, memory: &mut RuntimeMemory) -> Result<f64> {
        self(program, memory)
    }
}

pub fn checked_fitness(value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(GpError::InvalidFitness { value })
    }
}

/// Evaluates one program against fresh runtime memory
pub fn evaluate_program<F: FitnessFunction + ?Sized>(
    program: &Program,
    fitness: &F,
    execution: &ExecutionConfig,
) -> Result<f64> {
    let mut memory = RuntimeMemory::new(execution);
    checked_fitness(fitness.evaluate(program, &mut memory)?)
}

/// Evaluates every program whose fitness is not cached yet and returns how
/// many were evaluated. `progress` receives the running count.
pub fn evaluate_population<F, P>(
    programs: &mut [Program],
    fitness: &F,
    execution: &ExecutionConfig,
    parallel: bool,
    mut progress: P,
) -> Result<usize>
where
    F: FitnessFunction + ?Sized,
    P: FnMut(usize),
{
    let pending = programs.iter().filter(|p| !p.is_evaluated()).count();

    if parallel {
        programs
            .par_iter_mut()
            .filter(|p| !p.is_evaluated())
            .try_for_each(|program| -> Result<()> {
                let value = evaluate_program(program, fitness, execution)?;
                program.set_fitness(value);
                Ok(())
            })?;
        (1..=pending).for_each(&mut progress);
    } else {
        let mut done = 0;
        for program in programs.iter_mut().filter(|p| !p.is_evaluated()) {
            let value = evaluate_program(program, fitness, execution)?;
            program.set_fitness(value);
            done += 1;
            progress(done);
        }
    }

    Ok(pending)
}

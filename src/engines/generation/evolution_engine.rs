use crate::config::{EvolutionConfig, ExecutionConfig};
use crate::config::traits::ConfigSection;
use crate::engines::evaluation::fitness::{evaluate_population, FitnessFunction};
use crate::engines::generation::{
    chromosome::InitMethod,
    crossover::{crossover, CrossoverConfig},
    hall_of_fame::{HallOfFame, HallOfFameEntry},
    operators::{selection_for, SelectionStrategy},
    population::Population,
    program::Program,
    shape::ProgramShape,
};
use crate::error::Result;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::sync::Arc;

pub trait ProgressCallback: Send {
    fn on_generation_start(&mut self, generation: usize);
    fn on_generation_complete(&mut self, report: &GenerationReport);
    fn on_program_evaluated(&mut self, current: usize, total: usize);
}

/// Summary of one evaluated generation
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub generation: usize,
    pub best_fitness: f64,
    pub mean_fitness: f64,
    pub worst_fitness: f64,
    pub evaluated: usize,
    pub hall_of_fame_size: usize,
    pub best_formula: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct EvolutionOutcome {
    /// All-time best, absent only when no generation was evaluated
    pub best: Option<HallOfFameEntry>,
    pub generations: usize,
    pub solved: bool,
    pub reports: Vec<GenerationReport>,
}

/// Generational GP loop: evaluate, rank, select, breed, replace
pub struct EvolutionEngine<F: FitnessFunction> {
    config: EvolutionConfig,
    execution: ExecutionConfig,
    shape: Arc<ProgramShape>,
    fitness: F,
    selection: Box<dyn SelectionStrategy>,
    population: Population,
    hall_of_fame: HallOfFame,
    generation: usize,
    rng: StdRng,
}

impl<F: FitnessFunction> EvolutionEngine<F> {
    pub fn new(
        config: EvolutionConfig,
        execution: ExecutionConfig,
        shape: ProgramShape,
        fitness: F,
    ) -> Result<Self> {
        config.validate()?;
        execution.validate()?;
        shape.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let selection = selection_for(&config.selection_method, config.tournament_size);
        let hall_of_fame = HallOfFame::new(config.hall_of_fame_size);

        Ok(Self {
            config,
            execution,
            shape: Arc::new(shape),
            fitness,
            selection,
            population: Population::default(),
            hall_of_fame,
            generation: 0,
            rng,
        })
    }

    /// Replaces the selection strategy chosen by the configuration
    pub fn with_selection(mut self, selection: Box<dyn SelectionStrategy>) -> Self {
        self.selection = selection;
        self
    }

    /// Ramped half-and-half: individuals alternate between full and grow
    pub fn initialize_population(&mut self) -> Result<()> {
        let mut programs = Vec::with_capacity(self.config.population_size);
        for i in 0..self.config.population_size {
            let method = if i % 2 == 0 { InitMethod::Full } else { InitMethod::Grow };
            programs.push(Program::random(
                &self.shape,
                method,
                self.config.max_initial_depth,
                &mut self.rng,
            )?);
        }
        log::info!(
            "Initialized population of {} programs ({} nodes)",
            programs.len(),
            programs.iter().map(Program::size).sum::<usize>()
        );
        self.population = Population::new(programs);
        Ok(())
    }

    /// Run the configured number of generations
    pub fn run<C: ProgressCallback>(&mut self, callback: &mut C) -> Result<EvolutionOutcome> {
        let generations = self.config.num_generations;
        self.evolve(generations, callback)
    }

    /// Evolves until the generation counter reaches `generations` or the
    /// best fitness drops below the success epsilon.
    pub fn evolve<C: ProgressCallback>(
        &mut self,
        generations: usize,
        callback: &mut C,
    ) -> Result<EvolutionOutcome> {
        if self.population.is_empty() {
            self.initialize_population()?;
        }

        let mut reports = Vec::new();
        let mut solved = false;

        while self.generation < generations {
            callback.on_generation_start(self.generation);

            let report = self.evaluate_generation(callback)?;
            callback.on_generation_complete(&report);
            let best_fitness = report.best_fitness;
            reports.push(report);

            if best_fitness < self.config.success_epsilon {
                log::info!(
                    "Success at generation {}: fitness {:.6} below {}",
                    self.generation,
                    best_fitness,
                    self.config.success_epsilon
                );
                solved = true;
                break;
            }

            // Check termination
            if self.generation + 1 >= generations {
                self.generation += 1;
                break;
            }

            self.next_generation()?;
            self.generation += 1;
        }

        Ok(EvolutionOutcome {
            best: self.hall_of_fame.best().cloned(),
            generations: self.generation,
            solved,
            reports,
        })
    }

    /// Evaluates pending programs, ranks the population and updates the
    /// hall of fame
    fn evaluate_generation<C: ProgressCallback>(
        &mut self,
        callback: &mut C,
    ) -> Result<GenerationReport> {
        let total = self.population.len();
        let evaluated = evaluate_population(
            self.population.programs_mut(),
            &self.fitness,
            &self.execution,
            self.config.parallel_evaluation,
            |current| callback.on_program_evaluated(current, total),
        )?;
        self.population.sort_and_rank()?;

        if self.population.total_fitness() <= 0.0 {
            log::warn!(
                "Generation {}: total fitness is zero, roulette selection is uniform",
                self.generation
            );
        }

        for program in self.population.programs().iter().take(self.config.hall_of_fame_size) {
            if let Some(fitness) = program.fitness() {
                self.hall_of_fame
                    .try_add(HallOfFameEntry::new(program.clone(), fitness, self.generation));
            }
        }

        let fitness_of = |p: Option<&Program>| p.and_then(Program::fitness).unwrap_or(f64::NAN);
        let report = GenerationReport {
            generation: self.generation,
            best_fitness: fitness_of(self.population.best()),
            mean_fitness: self.population.mean_fitness(),
            worst_fitness: fitness_of(self.population.worst()),
            evaluated,
            hall_of_fame_size: self.hall_of_fame.len(),
            best_formula: self
                .population
                .best()
                .map(Program::formula)
                .unwrap_or_default(),
            timestamp: Utc::now(),
        };
        log::info!(
            "Generation {} complete. Best: {:.6}, mean: {:.6}, evaluated: {}, hall of fame: {}",
            report.generation,
            report.best_fitness,
            report.mean_fitness,
            report.evaluated,
            report.hall_of_fame_size
        );
        Ok(report)
    }

    /// Builds the next population from the ranked current one
    fn next_generation(&mut self) -> Result<()> {
        let size = self.config.population_size;
        let p_cross = self.config.crossover_probability;
        let p_repro = self.config.reproduction_probability;
        let crossover_config = CrossoverConfig {
            function_bias: self.config.function_bias,
            max_depth: self.config.max_crossover_depth,
        };

        let mut next = Vec::with_capacity(size);
        let (mut crossed, mut copied, mut fresh) = (0, 0, 0);

        while next.len() < size {
            let v: f64 = self.rng.gen();
            if v < p_cross {
                let a = self.selection.select(&self.population, &mut self.rng);
                let b = self.selection.select(&self.population, &mut self.rng);
                let programs = self.population.programs();
                let (first, second) =
                    crossover(&programs[a], &programs[b], &crossover_config, &mut self.rng)?;
                next.push(first);
                if next.len() < size {
                    next.push(second);
                }
                crossed += 1;
            } else if v < p_cross + p_repro {
                // Reproduction (copy), cached fitness travels along
                let a = self.selection.select(&self.population, &mut self.rng);
                next.push(self.population.programs()[a].clone());
                copied += 1;
            } else {
                let method = if self.rng.gen_bool(0.5) {
                    InitMethod::Full
                } else {
                    InitMethod::Grow
                };
                next.push(Program::random(
                    &self.shape,
                    method,
                    self.config.max_initial_depth,
                    &mut self.rng,
                )?);
                fresh += 1;
            }
        }

        log::debug!(
            "Generation {} bred: {} crossovers, {} copies, {} fresh",
            self.generation + 1,
            crossed,
            copied,
            fresh
        );
        self.population = Population::new(next);
        Ok(())
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn get_hall_of_fame(&self) -> &HallOfFame {
        &self.hall_of_fame
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn shape(&self) -> &Arc<ProgramShape> {
        &self.shape
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }
}

use super::traits::ConfigSection;
use crate::error::{GpError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub num_generations: usize,
    pub crossover_probability: f64,
    pub reproduction_probability: f64,
    /// Maximum number of levels of a crossover offspring
    pub max_crossover_depth: usize,
    /// Depth cap for initial and fresh random programs
    pub max_initial_depth: usize,
    pub function_bias: f64,
    /// Evolution stops once the best fitness drops below this
    pub success_epsilon: f64,
    pub selection_method: SelectionMethod,
    pub tournament_size: usize,
    pub hall_of_fame_size: usize,
    pub seed: Option<u64>,
    pub parallel_evaluation: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionMethod {
    Roulette,
    Tournament,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 500,
            num_generations: 50,
            crossover_probability: 0.9,
            reproduction_probability: 0.1,
            max_crossover_depth: 17,
            max_initial_depth: 6,
            function_bias: 0.9,
            success_epsilon: 1e-6,
            selection_method: SelectionMethod::Roulette,
            tournament_size: 7,
            hall_of_fame_size: 10,
            seed: None,
            parallel_evaluation: false,
        }
    }
}

impl ConfigSection for EvolutionConfig {
    fn section_name() -> &'static str {
        "evolution"
    }

    fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(GpError::Configuration(
                "Population size must be at least 2".to_string(),
            ));
        }
        for (name, p) in [
            ("Crossover probability", self.crossover_probability),
            ("Reproduction probability", self.reproduction_probability),
            ("Function bias", self.function_bias),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(GpError::Configuration(format!(
                    "{} must be between 0 and 1",
                    name
                )));
            }
        }
        if self.crossover_probability + self.reproduction_probability > 1.0 {
            return Err(GpError::Configuration(
                "Crossover and reproduction probabilities must sum to at most 1".to_string(),
            ));
        }
        if self.max_crossover_depth == 0 || self.max_initial_depth == 0 {
            return Err(GpError::Configuration(
                "Tree depth limits must be at least 1".to_string(),
            ));
        }
        if self.tournament_size == 0 {
            return Err(GpError::Configuration(
                "Tournament size must be at least 1".to_string(),
            ));
        }
        if self.hall_of_fame_size == 0 {
            return Err(GpError::Configuration(
                "Hall of fame must hold at least one program".to_string(),
            ));
        }
        if self.success_epsilon.is_nan() || self.success_epsilon < 0.0 {
            return Err(GpError::Configuration(
                "Success epsilon must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

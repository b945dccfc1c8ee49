use super::population::Population;
use crate::config::evolution::SelectionMethod;
use rand::{Rng, RngCore};

/// Picks the index of a parent from a ranked population
pub trait SelectionStrategy: Send + Sync {
    fn select(&self, population: &Population, rng: &mut dyn RngCore) -> usize;
}

/// Index whose cumulative-fitness bucket contains `r`: the exact match if
/// `r` equals a rank entry, otherwise the insertion point minus one.
pub fn roulette_index(fitness_rank: &[f64], r: f64) -> usize {
    match fitness_rank.binary_search_by(|probe| probe.total_cmp(&r)) {
        Ok(index) => index,
        Err(insertion) => insertion.saturating_sub(1),
    }
}

/// Roulette wheel selection: probability proportional to fitness
#[derive(Debug, Clone, Default)]
pub struct RouletteSelection;

impl SelectionStrategy for RouletteSelection {
    fn select(&self, population: &Population, rng: &mut dyn RngCore) -> usize {
        let len = population.len();
        if len <= 1 {
            return 0;
        }

        let total = population.total_fitness();
        if total <= 0.0 || !total.is_finite() {
            // All zero fitness or an overflowed sum, pick random
            return rng.gen_range(0..len);
        }

        let r = rng.gen_range(0.0..total);
        let index = roulette_index(population.fitness_rank(), r);
        if index == len - 1 {
            rng.gen_range(0..len)
        } else {
            index
        }
    }
}

/// Tournament selection: lowest fitness of K uniform draws
#[derive(Debug, Clone)]
pub struct TournamentSelection {
    size: usize,
}

impl TournamentSelection {
    pub fn new(size: usize) -> Self {
        Self { size: size.max(1) }
    }
}

impl SelectionStrategy for TournamentSelection {
    fn select(&self, population: &Population, rng: &mut dyn RngCore) -> usize {
        let len = population.len();
        if len <= 1 {
            return 0;
        }

        let fitness = |i: usize| {
            population
                .get(i)
                .and_then(|p| p.fitness())
                .unwrap_or(f64::INFINITY)
        };

        let mut best_idx = rng.gen_range(0..len);
        let mut best_fitness = fitness(best_idx);
        for _ in 1..self.size {
            let idx = rng.gen_range(0..len);
            let candidate = fitness(idx);
            if candidate < best_fitness {
                best_idx = idx;
                best_fitness = candidate;
            }
        }
        best_idx
    }
}

pub fn selection_for(
    method: &SelectionMethod,
    tournament_size: usize,
) -> Box<dyn SelectionStrategy> {
    match method {
        SelectionMethod::Roulette => Box::new(RouletteSelection),
        SelectionMethod::Tournament => Box::new(TournamentSelection::new(tournament_size)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roulette_index_lookup() {
        // fitness [1.0, 3.0]
        let rank = [0.0, 1.0];
        assert_eq!(roulette_index(&rank, 0.5), 0);
        assert_eq!(roulette_index(&rank, 2.0), 1);
        assert_eq!(roulette_index(&rank, 0.0), 0);
        assert_eq!(roulette_index(&rank, 1.0), 1);
    }

    #[test]
    fn test_roulette_index_empty_rank() {
        assert_eq!(roulette_index(&[], 0.3), 0);
    }
}

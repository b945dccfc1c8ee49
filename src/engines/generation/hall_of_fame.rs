use super::program::Program;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

#[derive(Clone, Debug)]
pub struct HallOfFameEntry {
    pub program: Program,
    pub fitness: f64,
    pub formula: String, // For deduplication
    pub generation: usize,
    pub discovered_at: DateTime<Utc>,
}

impl HallOfFameEntry {
    pub fn new(program: Program, fitness: f64, generation: usize) -> Self {
        let formula = program.formula();
        Self {
            program,
            fitness,
            formula,
            generation,
            discovered_at: Utc::now(),
        }
    }
}

/// Best programs seen across all generations, ascending by fitness
pub struct HallOfFame {
    entries: Vec<HallOfFameEntry>,
    max_size: usize,
    seen_formulas: HashSet<String>,
}

impl HallOfFame {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_size: max_size.max(1),
            seen_formulas: HashSet::new(),
        }
    }

    /// Attempt to add a program to the Hall of Fame
    pub fn try_add(&mut self, entry: HallOfFameEntry) -> bool {
        if self.seen_formulas.contains(&entry.formula) {
            return false;
        }
        if self.entries.len() >= self.max_size
            && self
                .entries
                .last()
                .map_or(false, |worst| entry.fitness >= worst.fitness)
        {
            return false;
        }

        self.seen_formulas.insert(entry.formula.clone());
        self.entries.push(entry);
        self.entries
            .sort_by(|a, b| a.fitness.total_cmp(&b.fitness));

        while self.entries.len() > self.max_size {
            if let Some(removed) = self.entries.pop() {
                self.seen_formulas.remove(&removed.formula);
            }
        }
        true
    }

    /// All-time best program
    pub fn best(&self) -> Option<&HallOfFameEntry> {
        self.entries.first()
    }

    pub fn get_all(&self) -> &[HallOfFameEntry] {
        &self.entries
    }

    pub fn get_top_n(&self, n: usize) -> &[HallOfFameEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    /// Entries at or below a fitness threshold
    pub fn filter_by_threshold(&self, max_fitness: f64) -> Vec<HallOfFameEntry> {
        self.entries
            .iter()
            .filter(|e| e.fitness <= max_fitness)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::generation::chromosome::Chromosome;
    use crate::engines::generation::shape::{ChromosomeShape, ProgramShape};
    use crate::functions::primitives::Constant;
    use crate::functions::traits::NodeRef;
    use crate::types::GpType;
    use std::sync::Arc;

    fn constant_program(value: i32) -> Program {
        let constant: NodeRef = Arc::new(Constant::int(value));
        let shape = Arc::new(ProgramShape::new(4).with_chromosome(ChromosomeShape::new(
            GpType::Int,
            vec![],
            vec![constant.clone()],
            1,
            1,
        )));
        let chromosome = Chromosome::from_nodes(&shape, 0, vec![constant]).unwrap();
        Program::new(shape, vec![chromosome]).unwrap()
    }

    #[test]
    fn test_keeps_best_and_deduplicates() {
        let mut hof = HallOfFame::new(2);
        assert!(hof.try_add(HallOfFameEntry::new(constant_program(1), 5.0, 0)));
        assert!(!hof.try_add(HallOfFameEntry::new(constant_program(1), 4.0, 1)));
        assert!(hof.try_add(HallOfFameEntry::new(constant_program(2), 3.0, 1)));
        assert!(hof.try_add(HallOfFameEntry::new(constant_program(3), 1.0, 2)));
        assert!(!hof.try_add(HallOfFameEntry::new(constant_program(4), 9.0, 2)));

        assert_eq!(hof.len(), 2);
        assert_eq!(hof.best().unwrap().formula, "3");
        assert_eq!(hof.get_all()[1].formula, "2");
        assert_eq!(hof.filter_by_threshold(2.0).len(), 1);
        assert_eq!(hof.get_top_n(1)[0].formula, "3");
        assert_eq!(hof.get_top_n(10).len(), 2);
    }
}

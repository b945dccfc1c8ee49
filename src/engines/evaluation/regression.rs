use super::fitness::FitnessFunction;
use super::memory::RuntimeMemory;
use crate::config::problem::TargetFunction;
use crate::engines::generation::program::Program;
use crate::error::Result;
use crate::types::Value;

/// Error charged for a sample whose output is not finite
const NON_FINITE_PENALTY: f64 = 1.0e6;

/// Symbolic regression over one double input: fitness is the sum of
/// absolute errors against the sampled target.
#[derive(Debug, Clone)]
pub struct RegressionFitness {
    samples: Vec<(f64, f64)>,
    max_call_depth: usize,
}

impl RegressionFitness {
    pub fn new(samples: Vec<(f64, f64)>, max_call_depth: usize) -> Self {
        Self {
            samples,
            max_call_depth,
        }
    }

    /// `count` evenly spaced samples of `target` over `[low, high]`
    pub fn sampled(
        target: TargetFunction,
        low: f64,
        high: f64,
        count: usize,
        max_call_depth: usize,
    ) -> Self {
        let step = if count > 1 {
            (high - low) / (count - 1) as f64
        } else {
            0.0
        };
        let samples = (0..count)
            .map(|i| {
                let x = low + step * i as f64;
                (x, target.eval(x))
            })
            .collect();
        Self::new(samples, max_call_depth)
    }

    pub fn samples(&self) -> &[(f64, f64)] {
        &self.samples
    }
}

impl FitnessFunction for RegressionFitness {
    fn evaluate(&self, program: &Program, memory: &mut RuntimeMemory) -> Result<f64> {
        let mut total = 0.0;
        for &(x, y) in &self.samples {
            memory.reset();
            let output =
                program.execute_double(memory, vec![Value::Double(x)], self.max_call_depth)?;
            let error = (output - y).abs();
            total += if error.is_finite() {
                error.min(NON_FINITE_PENALTY)
            } else {
                NON_FINITE_PENALTY
            };
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_cover_interval() {
        let fitness = RegressionFitness::sampled(TargetFunction::Quadratic, -1.0, 1.0, 5, 64);
        let xs: Vec<f64> = fitness.samples().iter().map(|(x, _)| *x).collect();
        assert_eq!(xs, vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
        assert_eq!(fitness.samples()[0].1, 1.0 - 1.0);
    }
}

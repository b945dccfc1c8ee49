use super::traits::ConfigSection;
use crate::engines::generation::shape::{ChromosomeShape, ProgramShape};
use crate::error::{GpError, Result};
use crate::functions::adf::Adf;
use crate::functions::registry::NodeRegistry;
use crate::types::GpType;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Demonstration symbolic regression problem
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProblemConfig {
    pub target: TargetFunction,
    pub sample_count: usize,
    pub sample_low: f64,
    pub sample_high: f64,
    /// Registry names of the main tree's nodes
    pub palette: Vec<String>,
    pub min_depth: usize,
    pub max_depth: usize,
    pub max_nodes: usize,
    /// Adds a one-argument subroutine tree callable as `adf1`
    pub use_adf: bool,
    pub adf_palette: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetFunction {
    /// x^2 + x
    Quadratic,
    /// x^3 + x^2 + x
    Cubic,
    /// x^4 + x^3 + x^2 + x
    Quartic,
    Sine,
}

impl TargetFunction {
    pub fn eval(&self, x: f64) -> f64 {
        match self {
            TargetFunction::Quadratic => x * x + x,
            TargetFunction::Cubic => x * x * x + x * x + x,
            TargetFunction::Quartic => x * x * x * x + x * x * x + x * x + x,
            TargetFunction::Sine => x.sin(),
        }
    }
}

impl Default for ProblemConfig {
    fn default() -> Self {
        let names = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        Self {
            target: TargetFunction::Quartic,
            sample_count: 20,
            sample_low: -1.0,
            sample_high: 1.0,
            palette: names(&["add_double", "sub_double", "mul_double", "div_double", "erc_double"]),
            min_depth: 2,
            max_depth: 17,
            max_nodes: 1000,
            use_adf: false,
            adf_palette: names(&["add_double", "mul_double"]),
        }
    }
}

impl ProblemConfig {
    /// Program shape of the demo: `Double main(Double)` plus the optional
    /// `Double adf1(Double)` subroutine
    pub fn build_shape(&self, registry: &NodeRegistry) -> Result<ProgramShape> {
        let mut main_palette = registry.palette(&self.palette)?;
        if self.use_adf {
            main_palette.push(Arc::new(Adf::new(1, GpType::Double)));
        }

        let mut shape = ProgramShape::new(self.max_nodes).with_chromosome(ChromosomeShape::new(
            GpType::Double,
            vec![GpType::Double],
            main_palette,
            self.min_depth,
            self.max_depth,
        ));
        if self.use_adf {
            shape = shape.with_chromosome(ChromosomeShape::new(
                GpType::Double,
                vec![GpType::Double],
                registry.palette(&self.adf_palette)?,
                self.min_depth.min(3),
                self.max_depth.min(5),
            ));
        }
        shape.validate()?;
        Ok(shape)
    }
}

impl ConfigSection for ProblemConfig {
    fn section_name() -> &'static str {
        "problem"
    }

    fn validate(&self) -> Result<()> {
        if self.sample_count == 0 {
            return Err(GpError::Configuration(
                "Sample count must be at least 1".to_string(),
            ));
        }
        if self.sample_low > self.sample_high {
            return Err(GpError::Configuration(
                "Sample range is empty".to_string(),
            ));
        }
        if self.min_depth == 0 || self.min_depth > self.max_depth {
            return Err(GpError::Configuration(format!(
                "Depth range {}..={} is invalid",
                self.min_depth, self.max_depth
            )));
        }
        if self.palette.is_empty() {
            return Err(GpError::Configuration("Palette must not be empty".to_string()));
        }
        Ok(())
    }
}

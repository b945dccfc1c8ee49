use super::traits::ConfigSection;
use crate::error::{GpError, Result};
use serde::{Deserialize, Serialize};

/// Limits of the tree interpreter and sizes of the per-evaluation memory
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    pub max_call_depth: usize,
    pub stack_capacity: usize,
    pub memory_cells: usize,
    pub matrix_rows: usize,
    pub matrix_cols: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            max_call_depth: 512,
            stack_capacity: 64,
            memory_cells: 16,
            matrix_rows: 8,
            matrix_cols: 8,
        }
    }
}

impl ConfigSection for ExecutionConfig {
    fn section_name() -> &'static str {
        "execution"
    }

    fn validate(&self) -> Result<()> {
        if self.max_call_depth == 0 {
            return Err(GpError::Configuration(
                "Max call depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

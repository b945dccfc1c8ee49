use crate::config::ExecutionConfig;
use crate::error::{GpError, Result};
use crate::types::{GpType, Value};

/// Mutable runtime state consumed by stack and memory nodes.
///
/// One instance belongs to one evaluation. Concurrent evaluations each get
/// their own, so nothing here is synchronised.
#[derive(Debug, Clone)]
pub struct RuntimeMemory {
    stack: Vec<Value>,
    stack_capacity: usize,
    cells: Vec<Value>,
    matrix: Vec<f64>,
    rows: usize,
    cols: usize,
}

impl RuntimeMemory {
    pub fn new(config: &ExecutionConfig) -> Self {
        Self {
            stack: Vec::with_capacity(config.stack_capacity),
            stack_capacity: config.stack_capacity,
            cells: vec![Value::Double(0.0); config.memory_cells],
            matrix: vec![0.0; config.matrix_rows * config.matrix_cols],
            rows: config.matrix_rows,
            cols: config.matrix_cols,
        }
    }

    /// Pushes onto the operand stack; a push onto a full stack is dropped
    pub fn push(&mut self, value: Value) -> bool {
        if self.stack.len() >= self.stack_capacity {
            log::trace!("operand stack full ({}), dropping push", self.stack_capacity);
            return false;
        }
        self.stack.push(value);
        true
    }

    /// Pops a value of the given kind; an empty stack yields the kind's zero.
    /// Values of a different kind are left on the stack.
    pub fn pop(&mut self, gp_type: GpType) -> Value {
        match self.stack.last() {
            Some(top) if top.gp_type() == gp_type => self.stack.pop().unwrap_or(Value::Void),
            _ => Value::default_for(gp_type),
        }
    }

    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    pub fn read_cell(&self, cell: usize) -> Result<Value> {
        if self.cells.is_empty() {
            return Err(GpError::Memory("no memory cells configured".to_string()));
        }
        Ok(self.cells[cell % self.cells.len()].clone())
    }

    pub fn write_cell(&mut self, cell: usize, value: Value) -> Result<()> {
        if self.cells.is_empty() {
            return Err(GpError::Memory("no memory cells configured".to_string()));
        }
        let len = self.cells.len();
        self.cells[cell % len] = value;
        Ok(())
    }

    fn matrix_offset(&self, row: i32, col: i32) -> Result<usize> {
        if self.rows == 0 || self.cols == 0 {
            return Err(GpError::Memory("matrix memory has no cells".to_string()));
        }
        // Coordinates wrap around both axes
        let r = (row as i64).rem_euclid(self.rows as i64) as usize;
        let c = (col as i64).rem_euclid(self.cols as i64) as usize;
        Ok(r * self.cols + c)
    }

    pub fn matrix_get(&self, row: i32, col: i32) -> Result<f64> {
        let offset = self.matrix_offset(row, col)?;
        Ok(self.matrix[offset])
    }

    pub fn matrix_set(&mut self, row: i32, col: i32, value: f64) -> Result<()> {
        let offset = self.matrix_offset(row, col)?;
        self.matrix[offset] = value;
        Ok(())
    }

    /// Restores the freshly constructed state between fitness cases
    pub fn reset(&mut self) {
        self.stack.clear();
        for cell in &mut self.cells {
            *cell = Value::Double(0.0);
        }
        for value in &mut self.matrix {
            *value = 0.0;
        }
    }
}

impl Default for RuntimeMemory {
    fn default() -> Self {
        Self::new(&ExecutionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> RuntimeMemory {
        RuntimeMemory::new(&ExecutionConfig {
            max_call_depth: 64,
            stack_capacity: 2,
            memory_cells: 3,
            matrix_rows: 2,
            matrix_cols: 2,
        })
    }

    #[test]
    fn test_stack_is_bounded_and_protected() {
        let mut memory = small();
        assert!(memory.push(Value::Double(1.0)));
        assert!(memory.push(Value::Double(2.0)));
        assert!(!memory.push(Value::Double(3.0)));
        assert_eq!(memory.pop(GpType::Double), Value::Double(2.0));
        assert_eq!(memory.pop(GpType::Double), Value::Double(1.0));
        assert_eq!(memory.pop(GpType::Double), Value::Double(0.0));
    }

    #[test]
    fn test_cells_wrap() {
        let mut memory = small();
        memory.write_cell(4, Value::Int(9)).unwrap();
        assert_eq!(memory.read_cell(1).unwrap(), Value::Int(9));
    }

    #[test]
    fn test_matrix_wraps_negative_coordinates() {
        let mut memory = small();
        memory.matrix_set(-1, -1, 5.0).unwrap();
        assert_eq!(memory.matrix_get(1, 1).unwrap(), 5.0);
        memory.reset();
        assert_eq!(memory.matrix_get(1, 1).unwrap(), 0.0);
    }
}

use super::memory::RuntimeMemory;
use crate::engines::generation::program::Program;
use crate::error::{GpError, Result};
use crate::types::Value;

/// State threaded through every node execution.
///
/// Carries the program being run (so ADF nodes can reach sibling trees),
/// the argument frames of the active subroutine calls, the runtime memory
/// of this evaluation and the interpreter call depth.
pub struct ExecutionContext<'a> {
    program: &'a Program,
    memory: &'a mut RuntimeMemory,
    frames: Vec<Vec<Value>>,
    call_depth: usize,
    max_call_depth: usize,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(
        program: &'a Program,
        memory: &'a mut RuntimeMemory,
        args: Vec<Value>,
        max_call_depth: usize,
    ) -> Self {
        Self {
            program,
            memory,
            frames: vec![args],
            call_depth: 0,
            max_call_depth,
        }
    }

    pub fn program(&self) -> &'a Program {
        self.program
    }

    pub fn memory(&mut self) -> &mut RuntimeMemory {
        &mut *self.memory
    }

    /// Argument `index` of the innermost active call
    pub fn argument(&self, index: usize) -> Result<Value> {
        self.frames
            .last()
            .and_then(|frame| frame.get(index))
            .cloned()
            .ok_or(GpError::MissingArgument(index))
    }

    pub fn call_depth(&self) -> usize {
        self.call_depth
    }

    pub(crate) fn enter(&mut self) -> Result<()> {
        if self.call_depth >= self.max_call_depth {
            return Err(GpError::RecursionLimit(self.max_call_depth));
        }
        self.call_depth += 1;
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.call_depth = self.call_depth.saturating_sub(1);
    }

    /// Runs chromosome `tree` of the current program with a fresh argument frame
    pub fn call(&mut self, tree: usize, args: Vec<Value>) -> Result<Value> {
        let program = self.program;
        let chromosome = program.chromosome(tree).ok_or_else(|| {
            GpError::InvalidStructure(format!("call to missing chromosome {}", tree))
        })?;
        self.frames.push(args);
        let result = chromosome.execute(self);
        self.frames.pop();
        result
    }
}

//! Serializable views of nodes and programs, the boundary to persistence.

use crate::engines::generation::{program::Program, shape::ProgramShape, visitor::to_formula};
use crate::error::Result;
use crate::functions::traits::Node;
use crate::types::{GpType, Literal};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Static shape of a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    pub name: String,
    pub arity: usize,
    pub return_type: GpType,
    pub sub_return_type: Option<String>,
    pub child_types: Vec<GpType>,
    pub sub_child_types: Vec<Option<String>>,
    pub affects_global_state: bool,
    pub is_unique: bool,
    pub literal: Option<Literal>,
}

impl NodeDescriptor {
    pub fn describe(node: &dyn Node, shape: &ProgramShape) -> Self {
        let arity = node.arity(shape);
        Self {
            name: node.name().to_string(),
            arity,
            return_type: node.return_type(),
            sub_return_type: node.sub_return_type().map(str::to_string),
            child_types: (0..arity).map(|i| node.child_type(shape, i)).collect(),
            sub_child_types: (0..arity)
                .map(|i| node.sub_child_type(shape, i).map(str::to_string))
                .collect(),
            affects_global_state: node.affects_global_state(),
            is_unique: node.is_unique(),
            literal: node.literal(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChromosomeSnapshot {
    pub return_type: GpType,
    pub arg_types: Vec<GpType>,
    pub nodes: Vec<NodeDescriptor>,
    pub depth: Vec<usize>,
    pub formula: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramSnapshot {
    pub fitness: Option<f64>,
    pub chromosomes: Vec<ChromosomeSnapshot>,
    pub exported_at: DateTime<Utc>,
}

impl ProgramSnapshot {
    pub fn from_program(program: &Program) -> Self {
        let shape = program.shape();
        let chromosomes = program
            .chromosomes()
            .iter()
            .map(|c| ChromosomeSnapshot {
                return_type: c.return_type(),
                arg_types: c.arg_types().to_vec(),
                nodes: c
                    .nodes()
                    .iter()
                    .map(|n| NodeDescriptor::describe(n.as_ref(), shape))
                    .collect(),
                depth: c.depths().to_vec(),
                formula: to_formula(c),
            })
            .collect();

        Self {
            fitness: program.fitness(),
            chromosomes,
            exported_at: Utc::now(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

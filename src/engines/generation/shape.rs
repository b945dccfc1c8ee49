use crate::error::{GpError, Result};
use crate::functions::argument::Argument;
use crate::functions::traits::NodeRef;
use crate::types::GpType;
use std::sync::Arc;

/// Static description of one tree of a program
#[derive(Debug, Clone)]
pub struct ChromosomeShape {
    pub return_type: GpType,
    pub arg_types: Vec<GpType>,
    pub palette: Vec<NodeRef>,
    pub min_depth: usize,
    pub max_depth: usize,
}

impl ChromosomeShape {
    /// Builds a tree shape; an `Argument` terminal for every declared
    /// parameter type is appended to the palette.
    pub fn new(
        return_type: GpType,
        arg_types: Vec<GpType>,
        mut palette: Vec<NodeRef>,
        min_depth: usize,
        max_depth: usize,
    ) -> Self {
        for (index, gp_type) in arg_types.iter().enumerate() {
            palette.push(Arc::new(Argument::new(index, *gp_type)));
        }
        Self {
            return_type,
            arg_types,
            palette,
            min_depth,
            max_depth,
        }
    }
}

/// Static description of an individual: one shape per chromosome plus the
/// per-tree node limit. Index 0 is the main tree.
#[derive(Debug, Clone)]
pub struct ProgramShape {
    chromosomes: Vec<ChromosomeShape>,
    max_nodes: usize,
}

impl ProgramShape {
    pub fn new(max_nodes: usize) -> Self {
        Self {
            chromosomes: Vec::new(),
            max_nodes,
        }
    }

    pub fn with_chromosome(mut self, chromosome: ChromosomeShape) -> Self {
        self.chromosomes.push(chromosome);
        self
    }

    pub fn chromosome(&self, index: usize) -> Option<&ChromosomeShape> {
        self.chromosomes.get(index)
    }

    pub fn chromosomes(&self) -> &[ChromosomeShape] {
        &self.chromosomes
    }

    pub fn len(&self) -> usize {
        self.chromosomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chromosomes.is_empty()
    }

    pub fn max_nodes(&self) -> usize {
        self.max_nodes
    }

    /// Checks depth ranges and ADF wiring. An ADF may only call a tree with
    /// a higher index, which rules out recursive subroutine chains.
    pub fn validate(&self) -> Result<()> {
        if self.chromosomes.is_empty() {
            return Err(GpError::IllegalConfiguration(
                "program shape has no chromosomes".to_string(),
            ));
        }
        if self.max_nodes == 0 {
            return Err(GpError::IllegalConfiguration(
                "max_nodes must be at least 1".to_string(),
            ));
        }

        for (index, chromosome) in self.chromosomes.iter().enumerate() {
            if chromosome.min_depth == 0 || chromosome.min_depth > chromosome.max_depth {
                return Err(GpError::IllegalConfiguration(format!(
                    "chromosome {} has invalid depth range {}..={}",
                    index, chromosome.min_depth, chromosome.max_depth
                )));
            }
            if chromosome.palette.is_empty() {
                return Err(GpError::IllegalConfiguration(format!(
                    "chromosome {} has an empty palette",
                    index
                )));
            }

            for node in &chromosome.palette {
                let Some(target) = node.invokes() else {
                    continue;
                };
                let callee = self.chromosomes.get(target).ok_or_else(|| {
                    GpError::IllegalConfiguration(format!(
                        "{} in chromosome {} calls missing chromosome {}",
                        node.name(),
                        index,
                        target
                    ))
                })?;
                if target <= index {
                    return Err(GpError::IllegalConfiguration(format!(
                        "{} in chromosome {} may only call later chromosomes",
                        node.name(),
                        index
                    )));
                }
                if callee.return_type != node.return_type() {
                    return Err(GpError::IllegalConfiguration(format!(
                        "{} returns {} but chromosome {} returns {}",
                        node.name(),
                        node.return_type(),
                        target,
                        callee.return_type
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::adf::Adf;
    use crate::functions::primitives::Constant;

    #[test]
    fn test_arguments_are_appended_to_palette() {
        let shape = ChromosomeShape::new(
            GpType::Double,
            vec![GpType::Double, GpType::Int],
            vec![Arc::new(Constant::double(1.0))],
            1,
            3,
        );
        assert_eq!(shape.palette.len(), 3);
        assert_eq!(shape.palette[1].name(), "arg0");
        assert_eq!(shape.palette[2].return_type(), GpType::Int);
    }

    #[test]
    fn test_adf_must_call_later_chromosome() {
        let shape = ProgramShape::new(50).with_chromosome(ChromosomeShape::new(
            GpType::Double,
            vec![],
            vec![Arc::new(Adf::new(0, GpType::Double))],
            1,
            3,
        ));
        assert!(matches!(
            shape.validate(),
            Err(GpError::IllegalConfiguration(_))
        ));
    }
}

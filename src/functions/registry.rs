use super::{
    memory::{MatrixRead, MatrixWrite, Pop, Push, ReadCell, StoreCell},
    primitives::{
        And, ArithOp, Arithmetic, CmpOp, Comparison, Constant, If, Not, Or, RandomConstant,
        Sequence,
    },
    traits::NodeRef,
};
use crate::error::{GpError, Result};
use crate::types::GpType;
use std::{collections::BTreeMap, sync::Arc};

/// Name → node lookup used to build palettes from configuration
pub struct NodeRegistry {
    nodes: BTreeMap<String, NodeRef>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            nodes: BTreeMap::new(),
        };
        registry.register_arithmetic();
        registry.register_logic();
        registry.register_constants();
        registry.register_memory();
        registry
    }

    /// Registers `node` under `name`, replacing any earlier entry
    pub fn register(&mut self, name: &str, node: NodeRef) {
        self.nodes.insert(name.to_string(), node);
    }

    pub fn get_node(&self, name: &str) -> Option<NodeRef> {
        self.nodes.get(name).cloned()
    }

    pub fn get_by_return_type(&self, gp_type: GpType) -> Vec<NodeRef> {
        self.nodes
            .values()
            .filter(|n| n.return_type() == gp_type)
            .cloned()
            .collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Resolves a list of registry names into a palette
    pub fn palette(&self, names: &[String]) -> Result<Vec<NodeRef>> {
        names
            .iter()
            .map(|name| {
                self.get_node(name).ok_or_else(|| {
                    GpError::Configuration(format!("Unknown node '{}' in palette", name))
                })
            })
            .collect()
    }

    fn register_arithmetic(&mut self) {
        let ops = [
            ("add", ArithOp::Add),
            ("sub", ArithOp::Sub),
            ("mul", ArithOp::Mul),
            ("div", ArithOp::Div),
        ];
        for (prefix, op) in ops {
            self.register(&format!("{}_int", prefix), Arc::new(Arithmetic::int(op)));
            self.register(&format!("{}_long", prefix), Arc::new(Arithmetic::long(op)));
            self.register(&format!("{}_float", prefix), Arc::new(Arithmetic::float(op)));
            self.register(&format!("{}_double", prefix), Arc::new(Arithmetic::double(op)));
        }
    }

    fn register_logic(&mut self) {
        self.register("and", Arc::new(And));
        self.register("or", Arc::new(Or));
        self.register("not", Arc::new(Not));
        for (kind, gp_type) in [("int", GpType::Int), ("double", GpType::Double)] {
            self.register(&format!("gt_{}", kind), Arc::new(Comparison::new(CmpOp::Gt, gp_type)));
            self.register(&format!("lt_{}", kind), Arc::new(Comparison::new(CmpOp::Lt, gp_type)));
            self.register(&format!("eq_{}", kind), Arc::new(Comparison::new(CmpOp::Eq, gp_type)));
            self.register(&format!("if_{}", kind), Arc::new(If::new(gp_type)));
            self.register(&format!("seq_{}", kind), Arc::new(Sequence::new(gp_type)));
        }
    }

    fn register_constants(&mut self) {
        self.register("true", Arc::new(Constant::boolean(true)));
        self.register("false", Arc::new(Constant::boolean(false)));
        self.register("zero_int", Arc::new(Constant::int(0)));
        self.register("one_int", Arc::new(Constant::int(1)));
        self.register("one_double", Arc::new(Constant::double(1.0)));
        self.register("erc_int", Arc::new(RandomConstant::int(-10, 10)));
        self.register("erc_double", Arc::new(RandomConstant::double(-1.0, 1.0)));
    }

    fn register_memory(&mut self) {
        self.register("push_double", Arc::new(Push::new(GpType::Double)));
        self.register("pop_double", Arc::new(Pop::new(GpType::Double)));
        self.register("store0_double", Arc::new(StoreCell::new(0, GpType::Double)));
        self.register("read0_double", Arc::new(ReadCell::new(0, GpType::Double)));
        self.register("matrix_read", Arc::new(MatrixRead));
        self.register("matrix_write", Arc::new(MatrixWrite));
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_node_retrieval() {
        let registry = NodeRegistry::new();
        let add = registry.get_node("add_int");
        assert!(add.is_some());
        assert_eq!(add.unwrap().name(), "Add");
    }

    #[test]
    fn test_node_not_found() {
        let registry = NodeRegistry::new();
        assert!(registry.get_node("NonExistent").is_none());
        let names = vec!["add_double".to_string(), "NonExistent".to_string()];
        assert!(matches!(registry.palette(&names), Err(GpError::Configuration(_))));
    }

    #[test]
    fn test_get_by_return_type() {
        let registry = NodeRegistry::new();
        let booleans = registry.get_by_return_type(GpType::Boolean);
        assert!(booleans.iter().any(|n| n.name() == "And"));
        assert!(booleans.iter().all(|n| n.return_type() == GpType::Boolean));
    }
}

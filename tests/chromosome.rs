use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::sync::Arc;
use typedgp::engines::evaluation::ExecutionContext;
use typedgp::engines::generation::{Chromosome, ChromosomeShape, InitMethod, Program, ProgramShape};
use typedgp::functions::primitives::{
    ArithOp, Arithmetic, CmpOp, Comparison, Constant, If, Not, RandomConstant,
};
use typedgp::functions::{Node, NodeRef};
use typedgp::{GpError, GpType, Value};

/// Int terminal allowed once per program
#[derive(Debug)]
struct Marker;

impl Node for Marker {
    fn name(&self) -> &str {
        "Marker"
    }
    fn arity(&self, _shape: &ProgramShape) -> usize {
        0
    }
    fn return_type(&self) -> GpType {
        GpType::Int
    }
    fn child_type(&self, _shape: &ProgramShape, _child: usize) -> GpType {
        GpType::Void
    }
    fn is_unique(&self) -> bool {
        true
    }
    fn execute(
        &self,
        _ctx: &mut ExecutionContext<'_>,
        _chromosome: &Chromosome,
        _index: usize,
    ) -> typedgp::Result<Value> {
        Ok(Value::Int(42))
    }
}

fn typed_shape(max_nodes: usize) -> ProgramShape {
    ProgramShape::new(max_nodes).with_chromosome(ChromosomeShape::new(
        GpType::Int,
        vec![GpType::Int],
        vec![
            Arc::new(Arithmetic::int(ArithOp::Add)),
            Arc::new(Arithmetic::int(ArithOp::Mul)),
            Arc::new(If::new(GpType::Int)),
            Arc::new(Comparison::new(CmpOp::Gt, GpType::Int)),
            Arc::new(Not),
            Arc::new(Constant::boolean(true)),
            Arc::new(RandomConstant::int(0, 10)),
        ],
        1,
        6,
    ))
}

/// Checks the parent/child depth relation and subtree sizes of every node
fn assert_tree_invariants(chromosome: &Chromosome, shape: &ProgramShape) {
    assert_eq!(chromosome.depth_at(0), 0);
    for i in 0..chromosome.len() {
        let arity = chromosome.nodes()[i].arity(shape);
        let children: Vec<usize> = (0..arity)
            .map(|k| chromosome.get_child(i, k).expect("missing child"))
            .collect();
        assert!(children.windows(2).all(|w| w[0] < w[1]));
        assert!(children
            .iter()
            .all(|&c| chromosome.depth_at(c) == chromosome.depth_at(i) + 1));
        assert_eq!(chromosome.get_child(i, arity), None);

        let total: usize = children.iter().map(|&c| chromosome.size(c)).sum();
        assert_eq!(chromosome.size(i), 1 + total);
    }
    chromosome.validate_structure(shape).unwrap();
}

#[test]
fn test_full_puts_every_leaf_on_last_level() {
    let shape = typed_shape(10_000);
    let mut rng = StdRng::seed_from_u64(1);

    for depth in 1..=5 {
        let chromosome =
            Chromosome::full(&shape, 0, depth, &mut HashSet::new(), &mut rng).unwrap();
        assert_tree_invariants(&chromosome, &shape);
        for i in 0..chromosome.len() {
            if chromosome.is_function(&shape, i) {
                assert!(chromosome.depth_at(i) < depth - 1);
            } else {
                assert_eq!(chromosome.depth_at(i), depth - 1);
            }
        }
        assert_eq!(chromosome.height(), depth);
    }
}

#[test]
fn test_grow_stays_within_depth() {
    let shape = typed_shape(10_000);
    let mut rng = StdRng::seed_from_u64(2);

    for _ in 0..200 {
        let chromosome = Chromosome::grow(&shape, 0, 4, &mut HashSet::new(), &mut rng).unwrap();
        assert_tree_invariants(&chromosome, &shape);
        assert!(chromosome.depths().iter().all(|&d| d <= 3));
        assert_eq!(chromosome.nodes()[0].return_type(), GpType::Int);
    }
}

#[test]
fn test_random_constants_are_instantiated() {
    let shape = typed_shape(10_000);
    let mut rng = StdRng::seed_from_u64(3);
    let chromosome = Chromosome::full(&shape, 0, 4, &mut HashSet::new(), &mut rng).unwrap();
    assert!(chromosome.nodes().iter().all(|n| n.name() != "erc_int"));
}

#[test]
fn test_missing_terminal_is_illegal_configuration() {
    // No Int terminal: the last level can never be filled
    let shape = ProgramShape::new(100).with_chromosome(ChromosomeShape::new(
        GpType::Int,
        vec![],
        vec![Arc::new(Arithmetic::int(ArithOp::Add))],
        1,
        3,
    ));
    let mut rng = StdRng::seed_from_u64(4);
    let result = Chromosome::grow(&shape, 0, 3, &mut HashSet::new(), &mut rng);
    assert!(matches!(result, Err(GpError::IllegalConfiguration(_))));
}

#[test]
fn test_max_nodes_is_enforced() {
    let shape = typed_shape(20);
    let mut rng = StdRng::seed_from_u64(5);
    let result = Chromosome::full(&shape, 0, 8, &mut HashSet::new(), &mut rng);
    assert!(matches!(result, Err(GpError::IllegalConfiguration(_))));
}

#[test]
fn test_unique_node_placed_once() {
    let shape = Arc::new(ProgramShape::new(1000).with_chromosome(ChromosomeShape::new(
        GpType::Int,
        vec![],
        vec![
            Arc::new(Arithmetic::int(ArithOp::Add)),
            Arc::new(Marker),
            Arc::new(Constant::int(1)),
        ],
        3,
        5,
    )));
    let mut rng = StdRng::seed_from_u64(6);

    for _ in 0..50 {
        let program = Program::random(&shape, InitMethod::Full, 5, &mut rng).unwrap();
        let markers = program.chromosomes()[0]
            .nodes()
            .iter()
            .filter(|n| n.name() == "Marker")
            .count();
        assert!(markers <= 1);
        assert!(program.unique_violation().is_none());
    }
}

#[test]
fn test_splice_rebuilds_depths() {
    let shape = typed_shape(1000);
    let add: NodeRef = Arc::new(Arithmetic::int(ArithOp::Add));
    let one: NodeRef = Arc::new(Constant::int(1));
    let two: NodeRef = Arc::new(Constant::int(2));

    // Add(1, 1) with its second leaf replaced by Add(2, 2)
    let receiver = Chromosome::from_nodes(&shape, 0, vec![add.clone(), one.clone(), one]).unwrap();
    let donor = Chromosome::from_nodes(&shape, 0, vec![add, two.clone(), two]).unwrap();
    let child = receiver.splice(&shape, 2, &donor, 0).unwrap();

    assert_eq!(child.len(), 5);
    assert_eq!(child.depths(), &[0, 1, 1, 2, 2]);
    assert_eq!(child.subtree(2), 2..5);
    assert_tree_invariants(&child, &shape);
}

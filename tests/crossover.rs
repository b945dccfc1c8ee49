use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use typedgp::config::ProblemConfig;
use typedgp::engines::evaluation::ExecutionContext;
use typedgp::engines::generation::{
    crossover, to_formula, Chromosome, ChromosomeShape, CrossoverConfig, InitMethod, Program,
    ProgramShape,
};
use typedgp::functions::primitives::{ArithOp, Arithmetic, CmpOp, Comparison, Constant, If};
use typedgp::functions::{Node, NodeRef, NodeRegistry};
use typedgp::{GpType, Value};

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

/// Program whose only chromosome is `nodes`
fn program_from(shape: &Arc<ProgramShape>, nodes: Vec<NodeRef>) -> Program {
    let tree = Chromosome::from_nodes(shape, 0, nodes).unwrap();
    Program::new(Arc::clone(shape), vec![tree]).unwrap()
}

fn int_shape(palette: Vec<NodeRef>) -> Arc<ProgramShape> {
    Arc::new(ProgramShape::new(100).with_chromosome(ChromosomeShape::new(
        GpType::Int,
        vec![],
        palette,
        1,
        3,
    )))
}

fn mixed_shape() -> Arc<ProgramShape> {
    Arc::new(ProgramShape::new(1000).with_chromosome(ChromosomeShape::new(
        GpType::Int,
        vec![GpType::Int],
        vec![
            Arc::new(Arithmetic::int(ArithOp::Add)),
            Arc::new(Arithmetic::int(ArithOp::Sub)),
            Arc::new(If::new(GpType::Int)),
            Arc::new(Comparison::new(CmpOp::Lt, GpType::Int)),
            Arc::new(Constant::boolean(false)),
            Arc::new(Constant::int(1)),
        ],
        2,
        5,
    )))
}

#[test]
fn test_offspring_respect_types_and_depth() {
    let shape = mixed_shape();
    let mut rng = StdRng::seed_from_u64(21);
    let config = CrossoverConfig {
        function_bias: 0.9,
        max_depth: 5,
    };

    for round in 0..100 {
        let method = if round % 2 == 0 { InitMethod::Full } else { InitMethod::Grow };
        let a = Program::random(&shape, method, 5, &mut rng).unwrap();
        let b = Program::random(&shape, InitMethod::Grow, 5, &mut rng).unwrap();

        let (first, second) = crossover(&a, &b, &config, &mut rng).unwrap();
        for child in [&first, &second] {
            let tree = &child.chromosomes()[0];
            tree.validate_structure(&shape).unwrap();
            assert_eq!(tree.nodes()[0].return_type(), GpType::Int);
            assert!(tree.height() <= config.max_depth);
        }
    }
}

#[test]
fn test_tight_depth_bound_falls_back_to_parents() {
    let shape = mixed_shape();
    let mut rng = StdRng::seed_from_u64(22);
    // Parents already use every allowed level
    let config = CrossoverConfig {
        function_bias: 1.0,
        max_depth: 3,
    };

    for _ in 0..50 {
        let a = Program::random(&shape, InitMethod::Full, 3, &mut rng).unwrap();
        let b = Program::random(&shape, InitMethod::Full, 3, &mut rng).unwrap();
        let (first, second) = crossover(&a, &b, &config, &mut rng).unwrap();
        assert!(first.chromosomes()[0].height() <= 3);
        assert!(second.chromosomes()[0].height() <= 3);
    }
}

#[test]
fn test_missing_donor_copies_receiver() {
    let shape = mixed_shape();
    let palette = &shape.chromosome(0).unwrap().palette;
    let (iff, falsy, one): (NodeRef, NodeRef, NodeRef) =
        (palette[2].clone(), palette[4].clone(), palette[5].clone());

    // a = If(false, 1, 1) holds a boolean, b = 1 cannot donate one
    let a_nodes = vec![iff, falsy, one.clone(), one.clone()];
    let a_tree = Chromosome::from_nodes(&shape, 0, a_nodes).unwrap();
    let b_tree = Chromosome::from_nodes(&shape, 0, vec![one]).unwrap();
    let a = Program::new(Arc::clone(&shape), vec![a_tree]).unwrap();
    let b = Program::new(Arc::clone(&shape), vec![b_tree]).unwrap();

    let mut rng = StdRng::seed_from_u64(23);
    let config = CrossoverConfig::default();
    for _ in 0..50 {
        let (first, _) = crossover(&a, &b, &config, &mut rng).unwrap();
        // Either the boolean cut found no donor (copy of a) or an int
        // subtree was replaced by the constant
        let formula = first.formula();
        assert!(
            formula == "(If false 1 1)" || formula == "1",
            "unexpected offspring {}",
            formula
        );
    }
}

#[test]
fn test_spliced_offspring_is_unevaluated() {
    let shape = mixed_shape();
    let mut rng = StdRng::seed_from_u64(24);
    let mut a = Program::random(&shape, InitMethod::Full, 4, &mut rng).unwrap();
    let mut b = Program::random(&shape, InitMethod::Full, 4, &mut rng).unwrap();
    a.set_fitness(1.0);
    b.set_fitness(2.0);

    let config = CrossoverConfig {
        function_bias: 0.9,
        max_depth: 17,
    };
    let mut spliced = 0;
    for _ in 0..20 {
        let (first, _) = crossover(&a, &b, &config, &mut rng).unwrap();
        let copied = first.formula() == a.formula() || first.formula() == b.formula();
        if !copied {
            assert!(!first.is_evaluated());
            spliced += 1;
        }
    }
    assert!(spliced > 0);
}

#[test]
fn test_over_deep_offspring_copies_other_parent() {
    let add: NodeRef = Arc::new(Arithmetic::int(ArithOp::Add));
    let one: NodeRef = Arc::new(Constant::int(1));
    let shape = int_shape(vec![add.clone(), one.clone()]);
    let a = program_from(&shape, vec![add.clone(), one.clone(), one.clone()]);
    let b = program_from(
        &shape,
        vec![add.clone(), add, one.clone(), one.clone(), one],
    );
    let config = CrossoverConfig {
        function_bias: 1.0,
        max_depth: 2,
    };

    // Splicing b's root under a's root needs three levels; the copy of b
    // is the only way to get its formula back
    let mut rng = StdRng::seed_from_u64(25);
    let mut copies_of_b = 0;
    for _ in 0..50 {
        let (first, _) = crossover(&a, &b, &config, &mut rng).unwrap();
        let formula = first.formula();
        assert!(
            formula == a.formula() || formula == b.formula(),
            "unexpected offspring {}",
            formula
        );
        if formula == b.formula() {
            copies_of_b += 1;
        }
    }
    assert!(copies_of_b > 0);
}

#[test]
fn test_repeated_unique_node_copies_other_parent() {
    let add: NodeRef = Arc::new(Arithmetic::int(ArithOp::Add));
    let one: NodeRef = Arc::new(Constant::int(1));
    let marker: NodeRef = Arc::new(Marker);
    let shape = int_shape(vec![add.clone(), one.clone(), marker.clone()]);
    let a = program_from(&shape, vec![add.clone(), marker.clone(), one.clone()]);
    let b = program_from(&shape, vec![add, one, marker]);
    // Terminal cuts only: replacing a's constant with b's marker would
    // place the marker twice
    let config = CrossoverConfig {
        function_bias: 0.0,
        max_depth: 17,
    };

    let mut rng = StdRng::seed_from_u64(26);
    let mut copies_of_b = 0;
    for _ in 0..60 {
        let (first, second) = crossover(&a, &b, &config, &mut rng).unwrap();
        for child in [&first, &second] {
            assert!(child.unique_violation().is_none(), "{}", child.formula());
        }
        if first.formula() == b.formula() {
            copies_of_b += 1;
        }
    }
    assert!(copies_of_b > 0);
}

#[test]
fn test_adf_programs_cross_one_chromosome() {
    let problem = ProblemConfig {
        use_adf: true,
        ..Default::default()
    };
    let shape = Arc::new(problem.build_shape(&NodeRegistry::new()).unwrap());
    let config = CrossoverConfig::default();
    let mut rng = StdRng::seed_from_u64(27);

    let mut touched = [0usize; 2];
    for _ in 0..100 {
        let a = Program::random(&shape, InitMethod::Grow, 4, &mut rng).unwrap();
        let b = Program::random(&shape, InitMethod::Full, 4, &mut rng).unwrap();
        let (first, _) = crossover(&a, &b, &config, &mut rng).unwrap();
        for chromosome in first.chromosomes() {
            chromosome.validate_structure(&shape).unwrap();
            assert!(chromosome.height() <= config.max_depth);
            assert_eq!(chromosome.return_type(), GpType::Double);
        }
        if first.formula() == b.formula() {
            continue;
        }

        let changed: Vec<usize> = (0..2)
            .filter(|&t| to_formula(&first.chromosomes()[t]) != to_formula(&a.chromosomes()[t]))
            .collect();
        // Spliced offspring differ from their receiver in at most one tree
        assert!(changed.len() <= 1);
        for tree in changed {
            touched[tree] += 1;
        }
    }
    assert!(touched[0] > 0 && touched[1] > 0, "touched {:?}", touched);
}

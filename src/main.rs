use anyhow::Context;
use std::path::PathBuf;
use typedgp::config::ConfigManager;
use typedgp::engines::evaluation::RegressionFitness;
use typedgp::engines::generation::{EvolutionEngine, LoggingProgressCallback};
use typedgp::functions::NodeRegistry;
use typedgp::utils::ProgramSnapshot;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // Optional config file path; TYPEDGP_* variables override it
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let manager = ConfigManager::new();
    manager
        .load_layered(config_path.as_deref())
        .context("Failed to load configuration")?;
    let config = manager.get()?;

    let registry = NodeRegistry::new();
    let shape = config.problem.build_shape(&registry)?;
    let fitness = RegressionFitness::sampled(
        config.problem.target,
        config.problem.sample_low,
        config.problem.sample_high,
        config.problem.sample_count,
        config.execution.max_call_depth,
    );

    log::info!(
        "Evolving {:?} with population {} for {} generations",
        config.problem.target,
        config.evolution.population_size,
        config.evolution.num_generations
    );

    let mut engine = EvolutionEngine::new(config.evolution, config.execution, shape, fitness)?;
    let outcome = engine.run(&mut LoggingProgressCallback)?;

    match outcome.best {
        Some(best) => {
            println!(
                "{} after {} generations, best fitness {:.6}",
                if outcome.solved { "Solved" } else { "Stopped" },
                outcome.generations,
                best.fitness
            );
            println!("{}", best.formula);
            for (rank, entry) in engine.get_hall_of_fame().get_top_n(5).iter().enumerate() {
                println!("#{} {:.6} {}", rank + 1, entry.fitness, entry.formula);
            }
            println!("{}", ProgramSnapshot::from_program(&best.program).to_json()?);
        }
        None => println!("No generation was evaluated"),
    }

    Ok(())
}

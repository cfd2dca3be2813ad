//! Evo Arena - command line driver
//!
//! Runs one or more evolution lanes, exports per-generation summaries and
//! prints the best winner found.

use std::io;
use std::path::PathBuf;

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use evo_arena::core::types::LaneId;
use evo_arena::core::{ArenaError, Result, SimulationConfig};
use evo_arena::decision::ConsoleDecisions;
use evo_arena::generation::{run_lanes, GenerationEnd, Lane};
use evo_arena::report::{render_table, CsvExporter, RunMetadata};
use evo_arena::stats::StatsAggregator;

/// Evolutionary tournament simulation
#[derive(Parser, Debug)]
#[command(name = "evo-arena")]
#[command(about = "Evolve fighter attributes through daily elimination tournaments")]
struct Args {
    /// TOML config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of independent lanes run in parallel
    #[arg(long)]
    lanes: Option<u32>,

    /// Generations per lane
    #[arg(long)]
    generations: Option<u32>,

    /// Combatants per generation
    #[arg(long)]
    population: Option<usize>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Directory for CSV and metadata output
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Skip CSV and metadata output
    #[arg(long)]
    no_export: bool,

    /// Print the summary tables when the run ends
    #[arg(long)]
    table: bool,

    /// Keep raw fight records after each generation is summarised
    #[arg(long)]
    retain_fights: bool,

    /// Control the first combatant of each generation from stdin (one lane only)
    #[arg(long)]
    manual: bool,
}

impl Args {
    fn into_config(self) -> Result<(SimulationConfig, bool, bool)> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::load(path)?,
            None => SimulationConfig::new(),
        };

        if let Some(lanes) = self.lanes {
            config.lanes = lanes;
        }
        if let Some(generations) = self.generations {
            config.generations = generations;
        }
        if let Some(population) = self.population {
            config.population = population;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(dir) = self.export_dir {
            config.export.dir = dir;
        }
        if self.no_export {
            config.export.enabled = false;
        }
        if self.retain_fights {
            config.retain_fights = true;
        }

        config.validate()?;
        if self.manual && config.lanes != 1 {
            return Err(ArenaError::InvalidConfig(
                "--manual requires exactly one lane".into(),
            ));
        }
        Ok((config, self.table, self.manual))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("evo_arena=info")),
        )
        .init();

    let (config, table, manual) = Args::parse().into_config()?;
    let seed = config.seed.unwrap_or_else(rand::random);

    tracing::info!(
        lanes = config.lanes,
        generations = config.generations,
        population = config.population,
        seed,
        "starting run"
    );

    let stats = StatsAggregator::new(config.lanes);
    let exporter = config
        .export
        .enabled
        .then(|| CsvExporter::new(config.export.dir.clone(), &stats));

    let mut metadata = RunMetadata::started(&config, seed);
    if let Some(exporter) = &exporter {
        exporter.reset()?;
        metadata.write(&config.export.dir)?;
    }

    let observer = |end: &GenerationEnd| {
        if let Some(exporter) = &exporter {
            if let Err(err) = exporter.append(end.lane, end.generation) {
                tracing::error!(lane = end.lane.0, generation = end.generation.0, %err, "export failed");
            }
        }
    };

    let lanes = if manual {
        let mut rng = ChaCha8Rng::seed_from_u64(config.lane_seed(seed, 0));
        let mut decisions = ConsoleDecisions::new(io::stdin().lock(), io::stdout());
        let summary = Lane::new(LaneId(0), &config, &stats)
            .with_manual_first(true)
            .run(&mut decisions, &mut rng, &observer)?;
        vec![summary]
    } else {
        run_lanes(&config, &stats, seed, &observer)?
    };

    let best = stats.best_overall();
    if let Some(exporter) = &exporter {
        exporter.write_all()?;
        metadata.finish(best.clone());
        metadata.write(&config.export.dir)?;
    }

    if table {
        println!("Average winners");
        println!("{}", render_table(&stats.averages()));
        println!("Best winners");
        println!("{}", render_table(&stats.bests()));
    }

    let fights: usize = lanes.iter().map(|l| l.fights).sum();
    println!("Seed {} | {} lane(s) | {} fights", seed, lanes.len(), fights);
    match best {
        Some(best) => println!(
            "Best overall: lane {} generation {} {} speed {:.2} damage {:.2} protection {:.2} remaining health {:.2}",
            best.lane.0 + 1,
            best.generation.0,
            best.specie,
            best.speed,
            best.damage,
            best.protection,
            best.winner_remaining_health
        ),
        None => println!("No fights took place"),
    }

    Ok(())
}

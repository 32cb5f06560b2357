use anyhow::{Context, Result};
use clap::Parser;
use ruleweaver_core::init_logging;
use ruleweaver_core::rules::RulePreset;
use ruleweaver_data::EntityKind;
use ruleweaver_io::{to_json_pretty, FileStore};
use ruleweaver_lib::{RunState, SimConfig, Simulation};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, default_value = "ruleweaver.toml")]
    config: PathBuf,

    /// Number of ticks to run
    #[arg(short, long, default_value_t = 1000)]
    ticks: u64,

    /// RNG seed, overrides the config file
    #[arg(long)]
    seed: Option<u64>,

    /// Directory holding save slots
    #[arg(long, default_value = "saves")]
    save_dir: PathBuf,

    /// Save slot written at the end of the run
    #[arg(long)]
    slot: Option<String>,

    /// Load the slot before running
    #[arg(long, requires = "slot")]
    load: bool,

    /// Write gzip-compressed saves
    #[arg(long)]
    compress: bool,

    /// Rule preset applied before the first tick
    #[arg(long, value_enum)]
    preset: Option<Preset>,

    /// Reseed the world instead of stopping on extinction
    #[arg(long)]
    auto_reseed: bool,

    /// Sleep `world.tick_millis` between ticks
    #[arg(long)]
    realtime: bool,

    /// Print the final summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum Preset {
    Balanced,
    Harsh,
    Abundant,
    Chaos,
}

impl From<Preset> for RulePreset {
    fn from(p: Preset) -> Self {
        match p {
            Preset::Balanced => RulePreset::Balanced,
            Preset::Harsh => RulePreset::Harsh,
            Preset::Abundant => RulePreset::Abundant,
            Preset::Chaos => RulePreset::Chaos,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RunSummary {
    tick: u64,
    state: RunState,
    population: Vec<(EntityKind, usize)>,
    score: u64,
    completed_objectives: Vec<String>,
    reseeds: u64,
    wall_millis: u64,
    avg_tick_micros: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let mut config = SimConfig::load(&args.config)?;
    if let Some(seed) = args.seed {
        config.world.seed = Some(seed);
    }
    let tick_millis = config.world.tick_millis;
    let mut sim = Simulation::new(config)?;

    let mut store = match &args.slot {
        Some(_) => Some(
            FileStore::new(&args.save_dir)
                .with_context(|| format!("Failed to open save directory {:?}", args.save_dir))?
                .with_compression(args.compress),
        ),
        None => None,
    };

    if args.load {
        if let (Some(store), Some(slot)) = (&store, &args.slot) {
            sim.load(store, slot)?;
        }
    }
    if let Some(preset) = args.preset {
        sim.apply_preset(preset.into())?;
    }

    let mut remaining = args.ticks;
    while remaining > 0 {
        match sim.state() {
            RunState::Running => {}
            RunState::Extinct if args.auto_reseed => {
                sim.reseed();
            }
            RunState::Extinct | RunState::Paused => break,
        }
        sim.step();
        remaining -= 1;
        if args.realtime && tick_millis > 0 {
            std::thread::sleep(Duration::from_millis(tick_millis));
        }
    }

    if let (Some(store), Some(slot)) = (store.as_mut(), &args.slot) {
        sim.save(store, slot)?;
    }

    let stats = sim.statistics();
    let summary = RunSummary {
        tick: sim.tick(),
        state: sim.state(),
        population: EntityKind::ALL
            .iter()
            .map(|k| (*k, stats.counts.get(*k)))
            .collect(),
        score: sim.score(),
        completed_objectives: sim
            .objectives()
            .completed()
            .map(|o| o.title.clone())
            .collect(),
        reseeds: sim.metrics().counter("reseeds"),
        wall_millis: sim.metrics().elapsed().as_millis() as u64,
        avg_tick_micros: sim.metrics().average_tick().as_micros() as u64,
    };

    if args.json {
        println!("{}", to_json_pretty(&summary)?);
        return Ok(());
    }

    println!("Stopped at tick {} ({:?})", summary.tick, summary.state);
    for (kind, count) in &summary.population {
        println!("  {:<10} {count}", kind.to_string());
    }
    println!("Score: {}", summary.score);
    if summary.completed_objectives.is_empty() {
        println!("No objectives completed");
    } else {
        println!("Completed objectives:");
        for title in &summary.completed_objectives {
            println!("  - {title}");
        }
    }
    if summary.reseeds > 0 {
        println!("World was reseeded {} time(s)", summary.reseeds);
    }
    println!(
        "Ran for {} ms, {} us per tick",
        summary.wall_millis, summary.avg_tick_micros
    );
    println!("Recent events:");
    for event in sim.events().recent(10) {
        println!("  [{}] {:?}: {}", event.tick, event.severity, event.message);
    }
    Ok(())
}

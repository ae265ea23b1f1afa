//! Drives the lookup scheduler against a lossy mock resolver and reports
//! how many cycles, lookups and retries the workload took.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use lookup_app::{
    ActorId, Item, Scheduler, SchedulerConfig, SchedulerStats, TextDescription,
    DEFAULT_RESULT_BUDGET,
};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

const DICTIONARIES: [&str; 3] = ["items", "entities", "recipes"];

#[derive(Parser, Debug)]
#[command(author, version, about = "Simulate deduplicated lookups against a mock resolver")]
struct Args {
    /// Number of actors requesting lookups
    #[arg(long, default_value_t = 8)]
    actors: u32,

    /// Items requested per actor
    #[arg(long, default_value_t = 200)]
    items: u64,

    /// Distinct texts the items are drawn from
    #[arg(long, default_value_t = 40)]
    distinct: u64,

    /// Lose every Nth resolver result
    #[arg(long)]
    loss_every: Option<NonZeroUsize>,

    /// Give up after this many cycles
    #[arg(long, default_value_t = 10_000)]
    max_cycles: u64,

    /// Results routed per cycle
    #[arg(long, default_value_t = DEFAULT_RESULT_BUDGET)]
    result_budget: usize,

    /// JSON file with scheduler settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the shared per-cycle budget
    #[arg(long)]
    total_budget: Option<usize>,

    /// Override the wait window in cycles
    #[arg(long)]
    wait_cycles: Option<u64>,
}

/// Totals printed once the run ends.
#[derive(Debug, Default, PartialEq, Eq)]
struct Summary {
    cycles: u64,
    deliveries: usize,
    finished: usize,
    unfinished: usize,
    stats: SchedulerStats,
}

fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    let config = SchedulerConfig {
        total_budget: args.total_budget.unwrap_or(config.total_budget),
        wait_cycles: args.wait_cycles.unwrap_or(config.wait_cycles),
    };

    let rig = mock::make_rig_with(mock::DEFAULT_QUEUE_CAPACITY, args.loss_every);
    let mut scheduler =
        Scheduler::init(config, rig.hub.clone()).context("invalid scheduler configuration")?;

    info!(
        "simulating {} actors x {} items over {} distinct texts (budget {}, wait {})",
        args.actors, args.items, args.distinct, config.total_budget, config.wait_cycles
    );
    for actor in 0..args.actors {
        scheduler.add_requests(ActorId(actor), workload(actor, args.items, args.distinct));
    }

    let summary = run(&mut scheduler, args.max_cycles, args.result_budget);
    if summary.unfinished > 0 {
        warn!(
            "{} actors still pending after {} cycles",
            summary.unfinished, summary.cycles
        );
    }
    print!("{}", render(&summary));

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Ignore error if already set (e.g., during tests).
    let _ = fmt().with_env_filter(env_filter).try_init();
}

fn load_config(path: Option<&Path>) -> Result<SchedulerConfig> {
    let Some(path) = path else {
        return Ok(SchedulerConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

/// Deterministic request mix: every actor cycles through the same texts from
/// a different offset, spread over the dictionaries.
fn workload(actor: u32, items: u64, distinct: u64) -> Vec<Item> {
    let distinct = distinct.max(1);
    (0..items)
        .map(|idx| {
            let text = (idx * 7 + u64::from(actor)) % distinct;
            let description = if text % 4 == 0 {
                TextDescription::composed([
                    TextDescription::text("item-count"),
                    TextDescription::text(format!("item-name.t{text}")),
                    TextDescription::text((text % 10).to_string()),
                ])
            } else {
                TextDescription::text(format!("item-name.t{text}"))
            };
            let dictionary = DICTIONARIES[(idx % DICTIONARIES.len() as u64) as usize];
            Item::new(description, dictionary, idx)
        })
        .collect()
}

fn run(scheduler: &mut Scheduler, max_cycles: u64, result_budget: usize) -> Summary {
    let mut summary = Summary::default();

    while scheduler.active_count() > 0 && summary.cycles < max_cycles {
        let cycle = summary.cycles;
        let pumped = scheduler.run_cycle(cycle, result_budget);
        summary.deliveries += pumped.deliveries.len();
        summary.finished += pumped.finished.len();
        for actor in &pumped.finished {
            debug!("{actor} finished at cycle {cycle}");
        }
        summary.cycles += 1;
    }

    summary.unfinished = scheduler.active_count();
    summary.stats = *scheduler.stats();
    summary
}

fn render(summary: &Summary) -> String {
    format!(
        "cycles:      {}\n\
         finished:    {} ({} unfinished)\n\
         deliveries:  {}\n\
         lookups:     {} ({} refused)\n\
         retries:     {}\n\
         stale:       {}\n",
        summary.cycles,
        summary.finished,
        summary.unfinished,
        summary.deliveries,
        summary.stats.lookups_issued,
        summary.stats.submit_rejections,
        summary.stats.reissue_windows,
        summary.stats.stale_results,
    )
}

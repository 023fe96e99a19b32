use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use anyhow::{Context, Result};

use sweeper::{
    bootstrap::build_world, cli::config_path_from_args, config::Config, logging::init_tracing,
    world::RunSummary,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = config_path_from_args()?;
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    let logging_guard = init_tracing(&config.logging)?;

    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = Arc::clone(&stop);
    // Advisory policies own blocking runtimes, so the world lives and dies on a blocking thread.
    let simulation = tokio::task::spawn_blocking(move || simulate(&config, &stop_flag));

    tokio::select! {
        joined = simulation => {
            let summary = joined.context("simulation thread join failed")??;
            report(&summary, logging_guard.run_id());
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("unable to listen for Ctrl+C")?;
            stop.store(true, Ordering::SeqCst);
            tracing::warn!(target: "world", run_id = %logging_guard.run_id(), "interrupted");
            eprintln!("sweeper interrupted");
        }
    }

    Ok(())
}

fn simulate(config: &Config, stop: &AtomicBool) -> Result<RunSummary> {
    let mut world = build_world(config)?;
    let interval = config.world.tick_interval();

    while !world.all_done()
        && world.tick_count() < config.world.max_ticks
        && !stop.load(Ordering::SeqCst)
    {
        let report = world.tick();
        tracing::debug!(
            target: "world",
            tick = report.tick,
            refused = report.actions.iter().filter(|applied| !applied.applied).count(),
            "tick_completed"
        );
        if !interval.is_zero() {
            std::thread::sleep(interval);
        }
    }

    Ok(RunSummary {
        ticks: world.tick_count(),
        all_done: world.all_done(),
        dirt_remaining: world.dirt().len(),
    })
}

fn report(summary: &RunSummary, run_id: &str) {
    tracing::info!(
        target: "world",
        run_id = %run_id,
        ticks = summary.ticks,
        all_done = summary.all_done,
        dirt_remaining = summary.dirt_remaining,
        "run_finished"
    );
    eprintln!(
        "sweeper finished after {} ticks: all_done={} dirt_remaining={}",
        summary.ticks, summary.all_done, summary.dirt_remaining
    );
}

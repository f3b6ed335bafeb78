use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use log::info;
use std::time::{Duration, Instant};

use crossroad_sim::server::{SimulationServer, DEFAULT_PORT};
use crossroad_sim::simulation::{
    SimConfig, SimWorld, DEFAULT_GRID_SIZE, DEFAULT_MAX_GREEN_TICKS, DEFAULT_SPAWN_RATE,
};

#[derive(Parser)]
#[command(name = "crossroad_sim")]
#[command(about = "Four-way signalized intersection simulation")]
struct Cli {
    /// Grid width in cells
    #[arg(long, default_value_t = DEFAULT_GRID_SIZE)]
    width: i32,

    /// Grid height in cells
    #[arg(long, default_value_t = DEFAULT_GRID_SIZE)]
    height: i32,

    /// Probability per tick that each approach spawns a car
    #[arg(long, default_value_t = DEFAULT_SPAWN_RATE)]
    spawn_rate: f64,

    /// Ticks a light may spend in green plus yellow
    #[arg(long, default_value_t = DEFAULT_MAX_GREEN_TICKS)]
    light_ticks: u32,

    /// End green early when no cars are waiting
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    smart: bool,

    /// Wall-clock budget of the run in seconds
    #[arg(long, default_value = "3600")]
    max_duration: u64,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Serve the simulation to a remote renderer instead of running headless
    #[arg(long)]
    serve: bool,

    /// Port to serve on
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Number of ticks to run in headless mode
    #[arg(long, default_value = "100")]
    ticks: u64,

    /// Print the board every this many ticks in headless mode
    #[arg(long)]
    map_every: Option<u64>,
}

impl Cli {
    fn config(&self) -> SimConfig {
        SimConfig {
            width: self.width,
            height: self.height,
            spawn_rate: self.spawn_rate,
            max_green_ticks: self.light_ticks,
            smart: self.smart,
            max_duration: Duration::from_secs(self.max_duration),
            seed: self.seed,
            ..SimConfig::default()
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let world = SimWorld::new(cli.config()).context("invalid simulation parameters")?;

    if cli.serve {
        let report = SimulationServer::new(world).serve(cli.port)?;
        report.log();
    } else {
        run_headless(world, cli.ticks, cli.map_every)?;
    }
    Ok(())
}

/// Run the simulation in headless mode (no renderer)
fn run_headless(mut world: SimWorld, ticks: u64, map_every: Option<u64>) -> Result<()> {
    info!("Running crossroad simulation in headless mode...");
    info!(
        "Grid: {}x{}, ticks: {}",
        world.topology().width(),
        world.topology().height(),
        ticks
    );

    let started = Instant::now();
    let max_duration = world.config().max_duration;

    for tick in 1..=ticks {
        if started.elapsed() >= max_duration {
            info!("Maximum duration reached after {} ticks", tick - 1);
            break;
        }
        world.step().context("simulation step failed")?;

        if map_every.is_some_and(|every| every > 0 && tick % every == 0) {
            println!("--- After tick {} ---", tick);
            world.print_summary();
            world.draw_map();
        }
    }

    let stats = world.stats();
    info!("=== SIMULATION COMPLETE ===");
    info!("Elapsed time: {:.3}s", started.elapsed().as_secs_f64());
    info!("Ticks run: {}", stats.ticks);
    info!("Total cars spawned: {}", stats.cars_spawned);
    info!("Total cars removed: {}", stats.cars_removed);
    info!("Active cars: {}", world.car_count());
    info!("Crash cells seen: {}", stats.crash_cells_seen);
    Ok(())
}

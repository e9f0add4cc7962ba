use anyhow::{Context, ensure};
use clap::Parser;
use env_logger::{Builder, Env};
use locomotion::{CharacterSettings, DEFAULT_FIXED_DT, Vec3};
use log::LevelFilter;

mod driver;
mod policy;
mod scenario;

use driver::Sim;
use policy::{PolicyTuning, ReferencePolicy};
use scenario::{Script, demo_world};

/// Headless run of the reference movement policy through the demo world
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of fixed ticks to simulate
    #[arg(short, long, default_value_t = 400)]
    ticks: u32,

    /// Fixed timestep in seconds
    #[arg(long, default_value_t = DEFAULT_FIXED_DT)]
    dt: f32,

    /// Ticks the medium stays locked after a jump
    #[arg(long, default_value_t = CharacterSettings::default().jump_lock_frames)]
    jump_lock_frames: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Initializes the global logger; `RUST_LOG` overrides the level.
fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let env = Env::default().default_filter_or(level.to_string());
    let _ = Builder::from_env(env).try_init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    ensure!(
        args.dt.is_finite() && args.dt > 0.0,
        "timestep must be positive, got {}",
        args.dt
    );

    let settings = CharacterSettings {
        jump_lock_frames: args.jump_lock_frames,
        ..CharacterSettings::default()
    };
    let mut sim = Sim::new(
        demo_world(),
        ReferencePolicy::new(PolicyTuning::default()),
        Vec3::new(0.0, 1.5, 0.0),
        settings,
        args.dt,
    )
    .context("failed to spawn character")?;

    log::info!("simulating {} ticks at dt {:.4}s", args.ticks, args.dt);
    let summary = sim
        .run(&Script::demo(), args.ticks)
        .context("simulation failed")?;

    let p = summary.final_position;
    log::info!(
        "ticks: {} ground / {} air / {} wall",
        summary.ground_ticks,
        summary.air_ticks,
        summary.wall_ticks
    );
    log::info!(
        "jumps: {} ({} refused), wall jumps: {}, landings: {}, wall attaches: {}",
        summary.policy.jumps,
        summary.policy.refused_jumps,
        summary.policy.wall_jumps,
        summary.policy.landings,
        summary.policy.wall_attaches
    );
    log::info!(
        "final position ({:.2}, {:.2}, {:.2}), peak height {:.2}, ended in {:?} after {} ticks",
        p.x,
        p.y,
        p.z,
        summary.max_height,
        sim.character.medium(),
        summary.ticks
    );

    Ok(())
}

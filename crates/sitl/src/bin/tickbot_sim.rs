//! Run an autonomous routine against the simulated robot.
//!
//! Usage:
//!   cargo run -p tickbot_sitl --bin tickbot-sim -- [OPTIONS]
//!
//! Options:
//!   -c, --config <PATH>     Robot file (default: built-in defaults)
//!   -r, --routine <NAME>    Routine to run (default: the file's auto_routine)
//!   --speed <FACTOR>        Wall-clock pacing, 0 = as fast as possible (default: 1)
//!   --max-secs <SECS>       Abort the run after this much simulated time (default: 15)
//!   --bearing <DEG>         Vision target bearing from the start heading (default: 12)
//!   --seed <N>              Sensor noise seed (default: 0)

use std::env;
use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context};
use tickbot::tickbot_core::traits::TimeSource;
use tickbot::{logging, RobotFile, RobotMode};
use tickbot_sitl::{SimConfig, SitlHarness, TimeMode};

struct Args {
    config: Option<PathBuf>,
    routine: Option<String>,
    speed: f64,
    max_secs: f64,
    bearing_deg: f64,
    seed: u64,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        config: None,
        routine: None,
        speed: 1.0,
        max_secs: 15.0,
        bearing_deg: 12.0,
        seed: 0,
    };

    let mut raw = env::args().skip(1);
    while let Some(flag) = raw.next() {
        let mut value = || {
            raw.next()
                .with_context(|| format!("missing value for {flag}"))
        };
        match flag.as_str() {
            "-c" | "--config" => args.config = Some(PathBuf::from(value()?)),
            "-r" | "--routine" => args.routine = Some(value()?),
            "--speed" => args.speed = value()?.parse().context("--speed")?,
            "--max-secs" => args.max_secs = value()?.parse().context("--max-secs")?,
            "--bearing" => args.bearing_deg = value()?.parse().context("--bearing")?,
            "--seed" => args.seed = value()?.parse().context("--seed")?,
            "-h" | "--help" => {
                print_usage();
                process::exit(0);
            }
            other => {
                print_usage();
                bail!("unknown option: {other}");
            }
        }
    }
    Ok(args)
}

fn print_usage() {
    eprintln!("Usage: tickbot-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --config <PATH>     Robot file (default: built-in defaults)");
    eprintln!("  -r, --routine <NAME>    Routine to run (default: the file's auto_routine)");
    eprintln!("  --speed <FACTOR>        Wall-clock pacing, 0 = as fast as possible (default: 1)");
    eprintln!("  --max-secs <SECS>       Abort after this much simulated time (default: 15)");
    eprintln!("  --bearing <DEG>         Vision target bearing (default: 12)");
    eprintln!("  --seed <N>              Sensor noise seed (default: 0)");
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = parse_args()?;

    let file = match &args.config {
        Some(path) => RobotFile::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => RobotFile::default(),
    };
    logging::init(&file.log_filter);

    let sim_config = SimConfig {
        target_bearing_deg: args.bearing_deg,
        encoder_noise_m: 0.002,
        gyro_noise_deg: 0.1,
        seed: Some(args.seed),
        ..Default::default()
    };
    let mut harness = SitlHarness::from_file(&file, sim_config)?;
    let routine = args.routine.unwrap_or_else(|| file.auto_routine.clone());
    harness.robot_mut().select_routine(&routine)?;

    let mode = TimeMode::from_speed(args.speed);
    let step_us = harness.step_us();
    let max_steps = (args.max_secs * 1_000_000.0 / step_us as f64).ceil() as u64;
    tracing::info!(%routine, ?mode, step_us, max_steps, "starting simulation");

    let mut interval = mode.wall_period(step_us).map(tokio::time::interval);
    harness.robot_mut().enter_autonomous()?;

    let mut steps = 0;
    while harness.robot().mode() != &RobotMode::Disabled {
        if steps >= max_steps {
            harness.robot_mut().set_mode(RobotMode::Disabled)?;
            bail!("routine {routine} did not finish within {} s", args.max_secs);
        }
        if let Some(interval) = interval.as_mut() {
            interval.tick().await;
        }
        let report = harness.step();
        for event in &report.events {
            tracing::debug!(
                tick = event.tick,
                task = %event.name,
                kind = ?event.kind,
                "task event"
            );
        }
        steps += 1;
    }

    let world = harness.sim().world();
    let stats = harness.robot().driver().tick_stats();
    println!("routine          {routine}");
    println!("simulated time   {:.2} s", harness.time().now_secs());
    println!("ticks            {steps}");
    println!(
        "left / right     {:.3} m / {:.3} m",
        world.drivetrain.left_distance(),
        world.drivetrain.right_distance()
    );
    println!("heading          {:.2} deg", world.drivetrain.heading_deg());
    println!("shots fired      {}", world.intake.shots_fired());
    println!(
        "avg tick         {} us (max {} us)",
        stats.avg_execution_us, stats.max_execution_us
    );
    Ok(())
}

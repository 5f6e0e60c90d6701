//! tire-nav - turn-by-turn indoor navigation aid
//!
//! Runs the positioning and guidance core against a device (simulated walk
//! or a replayed recording) and speaks the resulting audio cues.
//!
//! ## Threads
//!
//! - **Control** (~50Hz): inertial samples, PDR, EKF, keypad, guidance
//! - **Scan**: blocking radio scans on request from the control thread
//! - **Main**: status reporting, shutdown on Ctrl-C or device power off
//!
//! # Usage
//!
//! ```bash
//! # Simulated walk down the demo hallway
//! tire-nav run
//!
//! # With a config file and a recorded session
//! tire-nav run --config tire.toml --replay data/session.jsonl
//!
//! # Write the demo hallway maps
//! tire-nav demo-map --out data/maps
//! ```

mod config;
mod control;
mod error;
mod keypad;
mod shared;
mod threads;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};

use config::NavConfig;
use control::ControlLoop;
use error::{NavError, Result};
use shared::SharedPose;
use tire_core::io::{demo_hallway, load_graph, load_radio_map, save_graph, save_radio_map};
use tire_core::{NavigationGraph, RadioMap};
use tire_hal::{DeviceConfig, create_device};

/// Default config file picked up from the working directory
const DEFAULT_CONFIG: &str = "tire.toml";

#[derive(Parser)]
#[command(name = "tire-nav")]
#[command(about = "Turn-by-turn indoor navigation aid", version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the navigation loop
    Run {
        /// Configuration file (default: tire.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Device kind override (simulated, replay)
        #[arg(short, long)]
        device: Option<String>,

        /// Replay a recorded session (implies --device replay)
        #[arg(short, long)]
        replay: Option<PathBuf>,

        /// Replay as fast as possible instead of in real time
        #[arg(long)]
        fast: bool,
    },

    /// Write the demo hallway navigation and radio maps
    DemoMap {
        /// Output directory
        #[arg(short, long, default_value = "data/maps")]
        out: PathBuf,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} - {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    let args = Args::parse();
    let outcome = match args.command {
        Commands::Run {
            config,
            device,
            replay,
            fast,
        } => load_config(config.as_deref()).and_then(|mut config| {
            apply_overrides(&mut config, device, replay, fast);
            run(config)
        }),
        Commands::DemoMap { out } => write_demo_map(&out),
    };

    if let Err(e) = outcome {
        log::error!("tire-nav failed: {}", e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<NavConfig> {
    match path {
        Some(path) => {
            log::info!("Loading configuration from {:?}", path);
            NavConfig::load(path)
        }
        None if Path::new(DEFAULT_CONFIG).exists() => {
            log::info!("Loading configuration from {}", DEFAULT_CONFIG);
            NavConfig::load(Path::new(DEFAULT_CONFIG))
        }
        None => {
            log::info!("Using default configuration");
            Ok(NavConfig::default())
        }
    }
}

fn apply_overrides(
    config: &mut NavConfig,
    device: Option<String>,
    replay: Option<PathBuf>,
    fast: bool,
) {
    if let Some(path) = replay {
        config.device = DeviceConfig {
            simulation: config.device.simulation.clone(),
            ..DeviceConfig::replay(path.to_string_lossy(), !fast)
        };
    } else if let Some(kind) = device {
        config.device.kind = kind;
    }
    if fast {
        config.device.realtime = false;
    }
}

fn load_maps(config: &NavConfig) -> Result<(NavigationGraph, RadioMap)> {
    let (demo_graph, demo_radio) = demo_hallway()?;
    let graph = match &config.map.graph_path {
        Some(path) => load_graph(Path::new(path))?,
        None => {
            log::info!("No graph_path configured, using the demo hallway");
            demo_graph
        }
    };
    let radio_map = match &config.map.radio_map_path {
        Some(path) => load_radio_map(Path::new(path))?,
        None => {
            log::info!("No radio_map_path configured, using the demo hallway");
            demo_radio
        }
    };
    Ok((graph, radio_map))
}

fn run(config: NavConfig) -> Result<()> {
    log::info!("tire-nav v{}", env!("CARGO_PKG_VERSION"));
    log::info!("  Device: {}", config.device.kind);
    log::info!(
        "  Scans: every {:.1}s, window {:.1}s (+{:.1}s grace)",
        config.scan.interval_s,
        config.scan.window_s,
        config.scan.grace_s
    );

    let (graph, radio_map) = load_maps(&config)?;
    log::info!(
        "  Map: {} nodes, {} edges, {} reference points",
        graph.len(),
        graph.edge_count(),
        radio_map.len()
    );

    let device = create_device(&config.device)?;
    let shared = Arc::new(SharedPose::new(config.control.initial_pose()));
    let status_interval = Duration::try_from_secs_f32(config.control.status_interval_s)
        .unwrap_or(Duration::ZERO);
    let mut control = ControlLoop::new(
        config,
        device,
        Arc::new(graph),
        radio_map,
        Arc::clone(&shared),
    )?;

    // Setup signal handler
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| NavError::Thread(format!("Failed to set Ctrl-C handler: {}", e)))?;

    let control_running = Arc::clone(&running);
    let control_handle = thread::Builder::new()
        .name("control".into())
        .spawn(move || control.run(&control_running))
        .map_err(|e| NavError::Thread(format!("Failed to spawn control thread: {}", e)))?;

    // Main thread: status until the control loop ends
    let mut last_status = Instant::now();
    while !shared.is_finished() && !control_handle.is_finished() {
        thread::sleep(Duration::from_millis(100));
        if !status_interval.is_zero() && last_status.elapsed() >= status_interval {
            last_status = Instant::now();
            let snapshot = shared.snapshot();
            log::info!(
                "Pose ({:.2}, {:.2}, {:.0}°) ±{:.2}m, {} steps, {} fixes, {} -> {}",
                snapshot.pose.x,
                snapshot.pose.y,
                snapshot.pose.theta.to_degrees(),
                snapshot.position_sigma(),
                snapshot.total_steps,
                snapshot.fixes_applied,
                snapshot.guidance.as_str(),
                snapshot.next_target.as_deref().unwrap_or("-")
            );
        }
    }

    running.store(false, Ordering::Relaxed);
    match control_handle.join() {
        Ok(result) => result?,
        Err(_) => return Err(NavError::Thread("Control thread panicked".to_string())),
    }

    let pose = shared.pose();
    log::info!("tire-nav finished at ({:.2}, {:.2})", pose.x, pose.y);
    Ok(())
}

fn write_demo_map(out: &Path) -> Result<()> {
    std::fs::create_dir_all(out)?;
    let (graph, radio_map) = demo_hallway()?;

    let graph_path = out.join("hallway_graph.json");
    save_graph(&graph, &graph_path)?;
    log::info!("Navigation map saved to {:?}", graph_path);

    let radio_path = out.join("hallway_radio.json");
    save_radio_map(&radio_map, &radio_path)?;
    log::info!("Radio map saved to {:?}", radio_path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_replay_override() {
        let mut config = NavConfig::default();
        config.device.simulation.random_seed = 9;
        apply_overrides(&mut config, None, Some(PathBuf::from("s.jsonl")), true);
        assert_eq!(config.device.kind, "replay");
        assert_eq!(config.device.replay_path.as_deref(), Some("s.jsonl"));
        assert!(!config.device.realtime);
        assert_eq!(config.device.simulation.random_seed, 9);
    }

    #[test]
    fn test_device_override() {
        let mut config = NavConfig::default();
        apply_overrides(&mut config, Some("replay".to_string()), None, false);
        assert_eq!(config.device.kind, "replay");
        assert!(config.device.realtime);
    }

    #[test]
    fn test_demo_map_round_trip() {
        let dir = tempdir().unwrap();
        write_demo_map(dir.path()).unwrap();

        let mut config = NavConfig::default();
        config.map.graph_path = Some(
            dir.path()
                .join("hallway_graph.json")
                .to_string_lossy()
                .into_owned(),
        );
        config.map.radio_map_path = Some(
            dir.path()
                .join("hallway_radio.json")
                .to_string_lossy()
                .into_owned(),
        );
        let (graph, radio_map) = load_maps(&config).unwrap();
        let (demo_graph, demo_radio) = demo_hallway().unwrap();
        assert_eq!(graph, demo_graph);
        assert_eq!(radio_map, demo_radio);
    }

    #[test]
    fn test_missing_map_file() {
        let mut config = NavConfig::default();
        config.map.graph_path = Some("/nonexistent/graph.json".to_string());
        assert!(matches!(load_maps(&config), Err(NavError::Map(_))));
    }
}

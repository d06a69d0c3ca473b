//! `parttour` – runs a part-inspection tour against a simulated world.
//!
//! This binary:
//!
//! 1. Initialises tracing (`RUST_LOG`, `PARTTOUR_LOG_FORMAT`,
//!    `OTEL_EXPORTER_OTLP_ENDPOINT`).
//! 2. Loads `~/.parttour/config.toml` (or `$PARTTOUR_CONFIG`); when the file
//!    is absent a demo configuration is written there and used.
//! 3. Builds the frame tree from the simulated camera mounts, wires the
//!    simulated navigator and initial-pose publisher into a
//!    [`TourNode`], and replays the scripted sensor traffic.
//! 4. Intercepts **Ctrl-C** to stop the node and print a tour summary.

mod config;

use std::process::ExitCode;
use std::time::Duration;

use colored::Colorize;
use parttour_middleware::{DEFAULT_CAPACITY, SimNavigator, SimPosePublisher, event_queue};
use parttour_perception::TfEngine;
use parttour_runtime::{TourNode, TourStatus, init_tracing};
use parttour_types::TourError;
use tracing::{info, warn};

fn main() -> ExitCode {
    let _guard = init_tracing("parttour");

    print_banner();

    let path = config::config_path();
    let cfg = match config::load_from(&path) {
        Ok(Some(cfg)) => {
            println!("  Config loaded from {}", path.display().to_string().bold());
            cfg
        }
        Ok(None) => {
            let mut cfg = config::Config::demo();
            config::apply_env_overrides(&mut cfg);
            if let Err(e) = cfg.validate() {
                println!("{}: {}", "Config error".red(), e);
                return ExitCode::FAILURE;
            }
            match config::save_to(&cfg, &path) {
                Ok(()) => println!(
                    "  No configuration found. Demo config written to {}",
                    path.display().to_string().bold()
                ),
                Err(e) => println!("  {}: {}", "Could not write demo config".yellow(), e),
            }
            cfg
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            println!("{}: {}", "Failed to start async runtime".red(), e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cfg)) {
        Ok(status) => {
            print_summary(&status);
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("{}: {}", "Tour failed to start".red(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cfg: config::Config) -> Result<TourStatus, TourError> {
    let settings = cfg.node_settings();
    let sim = cfg.simulation.clone().unwrap_or_default();
    let world = sim.world();

    let mut tf = TfEngine::with_cache_secs(cfg.tf_cache_secs);
    let mounted = world.install_frames(&mut tf, &settings.map_frame)?;
    info!(cameras = mounted, "Simulated cameras mounted");

    let (tx, rx) = event_queue(DEFAULT_CAPACITY);

    let navigator = SimNavigator::new(tx.clone()).with_script(sim.results.clone());
    navigator.set_online(sim.navigator_online);
    let publisher = SimPosePublisher::new();

    // ── Ctrl-C handler ────────────────────────────────────────────────────
    let ctrlc_tx = tx.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – stopping tour …".yellow().bold());
        if let Err(e) = ctrlc_tx.shutdown() {
            warn!(error = %e, "Could not deliver shutdown request");
        }
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; graceful shutdown on Ctrl-C will not be available");
    }

    // ── Sensor replay ─────────────────────────────────────────────────────
    let replay_tx = tx.clone();
    tokio::spawn(async move {
        if let Err(e) = world.replay(&replay_tx).await {
            warn!(error = %e, "Simulated sensor replay aborted");
        }
    });

    if let Some(secs) = sim.run_secs {
        let stop_tx = tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            info!(secs, "Simulation time limit reached");
            let _ = stop_tx.shutdown();
        });
    }
    drop(tx);

    let mut node = TourNode::new(settings, cfg.parameter_store(), tf, navigator, publisher);
    Ok(node.run(rx).await)
}

// ─────────────────────────────────────────────────────────────────────────────
// Output
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"   ___           __  ______              "#.bold().cyan());
    println!("{}", r#"  / _ \___ _____/ /_/_  __/__  __ ______"#.bold().cyan());
    println!("{}", r#" / ___/ _ `/ __/ __// / / _ \/ // / __/"#.bold().cyan());
    println!("{}", r#"/_/   \_,_/_/  \__//_/  \___/\_,_/_/   "#.bold().cyan());
    println!();
    println!("  {} {}",
        "PartTour".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Multi-camera part detection and waypoint tour");
    println!();
}

fn print_summary(status: &TourStatus) {
    let marker = status
        .marker_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "none".to_string());
    println!();
    println!("{}", "  Tour summary".bold());
    println!("    Parts detected     {}/{}", status.parts_detected, status.target_part_count);
    println!("    Marker             {marker}");
    println!("    Waypoints resolved {}/{}", status.waypoints_resolved, status.waypoints);
    println!("    Waypoints reached  {}", status.cursor);
    println!("    Sequencer          {}", status.state.name().bold());
    println!(
        "    Initial pose       {}",
        if status.initial_pose_set { "published".green() } else { "not set".yellow() }
    );
    println!();
}

// src/main.rs
//
// Replays a recorded stream of perception results (JSON lines of FrameInput)
// through the warning pipeline and logs every warning that would be spoken.
// The clock is pinned to each frame's timestamp, so a replay is deterministic.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use walk_assist::{Config, FrameInput, FrameOrchestrator, ManualClock};

fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.yaml".to_string());
    let config = Config::load(&config_path)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("walk_assist={}", config.logging.level)));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("🦯 Warning engine replay starting");
    info!("✓ Configuration loaded from {}", config_path);
    info!(
        "Hysteresis: approach={:.1}s leave={:.1}s expiry={:.1}s | cooldowns: object={:.1}s global={:.1}s zone={:.1}s",
        config.engine.approach_confirm_secs,
        config.engine.leave_confirm_secs,
        config.engine.object_expiry_secs,
        config.engine.object_cooldown_secs,
        config.engine.global_cooldown_secs,
        config.engine.zone_cooldown_secs,
    );

    let clock = Arc::new(ManualClock::new());
    let mut orchestrator = FrameOrchestrator::with_clock(&config, clock.clone());

    let path = &config.replay.frames_path;
    let file = File::open(path).with_context(|| format!("opening frames file {path}"))?;

    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("reading {path}"))?;
        if line.trim().is_empty() {
            continue;
        }
        let frame: FrameInput = match serde_json::from_str(&line) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Skipping frame at line {}: {}", line_no + 1, e);
                continue;
            }
        };

        if let Some(ts) = frame.timestamp_s {
            clock.set_elapsed_secs(ts);
        }

        let outcome = orchestrator.process_frame(&frame);
        for message in outcome.messages() {
            info!(
                "[{:>7.2}s] {}",
                clock.elapsed().as_secs_f64(),
                message
            );
        }
    }

    let active = orchestrator.active_warnings();
    if !active.is_empty() {
        info!("Still approaching at end of replay: {}", active.join(", "));
    }
    let (nearby, _) = orchestrator.nearby_objects();
    info!("{}", nearby);

    let summary = orchestrator.metrics().summary();
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}

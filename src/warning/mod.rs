// src/warning/mod.rs
//
// Stateful half of the warning pipeline.
//
//   is_approaching ─→ tracker (hysteresis per track) ─→ DangerEntered
//                                                          │
//   zones ─────────────────────────────→ cooldown (object / global / zone) ─→ allowed?
//
// WarningEngine owns both and is the only thing the orchestrator talks to.

pub mod cooldown;
pub mod engine;
pub mod tracker;

pub use cooldown::CooldownManager;
pub use engine::WarningEngine;
pub use tracker::{DangerEntered, ObjectState, ObjectTracker, TrackedObjectState};

use std::time::Duration;

/// Seconds from config to a Duration; invalid values clamp to zero.
pub(crate) fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}

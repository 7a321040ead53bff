// src/warning/engine.rs
//
// Explicit owner of all warning state: the track table and the cooldown
// timers. Reads time from the injected clock on every call.

use super::cooldown::CooldownManager;
use super::tracker::{DangerEntered, ObjectTracker, TrackedObjectState};
use crate::clock::{Clock, MonotonicClock};
use crate::environment::Zone;
use crate::types::{EngineConfig, TrackId};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

pub struct WarningEngine {
    clock: Arc<dyn Clock>,
    tracker: ObjectTracker,
    cooldown: CooldownManager,
}

impl WarningEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_clock(config, Arc::new(MonotonicClock))
    }

    pub fn with_clock(config: &EngineConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            tracker: ObjectTracker::new(config),
            cooldown: CooldownManager::new(config),
        }
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    pub fn update(
        &mut self,
        id: TrackId,
        class_label: &str,
        is_approaching: bool,
    ) -> Option<DangerEntered> {
        let now = self.clock.now();
        self.tracker.update(now, id, class_label, is_approaching)
    }

    pub fn cleanup(&mut self) -> usize {
        let now = self.clock.now();
        self.tracker.cleanup(now)
    }

    pub fn active_warnings(&self) -> Vec<String> {
        self.tracker.active_warnings()
    }

    /// Unknown tracks are never warned.
    pub fn should_warn_object(&mut self, id: TrackId) -> bool {
        let now = self.clock.now();
        match self.tracker.get_mut(id) {
            Some(obj) => self.cooldown.should_warn_object(obj, now),
            None => false,
        }
    }

    pub fn can_warn_globally(&mut self) -> bool {
        let now = self.clock.now();
        self.cooldown.can_warn_globally(now)
    }

    pub fn should_warn_zone(&mut self, zone: Zone) -> bool {
        let now = self.clock.now();
        self.cooldown.should_warn_zone(zone, now)
    }

    pub fn mute_zone(&mut self, zone: Zone) {
        self.cooldown.mute_zone(zone);
    }

    pub fn unmute_zone(&mut self, zone: Zone) {
        self.cooldown.unmute_zone(zone);
    }

    pub fn is_muted(&self, zone: Zone) -> bool {
        self.cooldown.is_muted(zone)
    }

    pub fn enable_env_alerts(&mut self) {
        self.cooldown.enable_env_alerts();
    }

    pub fn disable_env_alerts(&mut self) {
        self.cooldown.disable_env_alerts();
    }

    /// Flip environment alerts and return the new setting.
    pub fn toggle_env_alerts(&mut self) -> bool {
        if self.cooldown.env_alerts_enabled() {
            self.cooldown.disable_env_alerts();
        } else {
            self.cooldown.enable_env_alerts();
        }
        self.cooldown.env_alerts_enabled()
    }

    pub fn env_alerts_enabled(&self) -> bool {
        self.cooldown.env_alerts_enabled()
    }

    pub fn object(&self, id: TrackId) -> Option<&TrackedObjectState> {
        self.tracker.get(id)
    }

    pub fn tracked_objects(&self) -> impl Iterator<Item = &TrackedObjectState> {
        self.tracker.iter()
    }

    pub fn tracked_count(&self) -> usize {
        self.tracker.len()
    }

    pub fn reset(&mut self) {
        self.tracker.clear();
        self.cooldown.reset();
        info!("♻️  Warning engine reset");
    }
}

// src/warning/cooldown.rs
//
// Debounce layer between "a warning is justified" and "a warning is spoken".
// Three independent gates:
//   - per object: one warning per track per object_cooldown
//   - global:     one object warning of any kind per global_cooldown
//   - per zone:   one warning per environment zone per zone_cooldown
// Every gate stamps its timestamp only when it grants permission.

use super::secs;
use super::tracker::TrackedObjectState;
use crate::environment::Zone;
use crate::types::EngineConfig;
use std::collections::{BTreeSet, HashMap};
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub struct CooldownManager {
    object_cooldown: Duration,
    global_cooldown: Duration,
    zone_cooldown: Duration,

    global_last_warned: Option<Instant>,
    zone_last_warned: HashMap<Zone, Instant>,
    muted: BTreeSet<Zone>,
    env_alerts_enabled: bool,
}

fn cooled_down(last: Option<Instant>, now: Instant, cooldown: Duration) -> bool {
    match last {
        None => true,
        Some(at) => now.saturating_duration_since(at) >= cooldown,
    }
}

impl CooldownManager {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            object_cooldown: secs(config.object_cooldown_secs),
            global_cooldown: secs(config.global_cooldown_secs),
            zone_cooldown: secs(config.zone_cooldown_secs),
            global_last_warned: None,
            zone_last_warned: HashMap::new(),
            muted: BTreeSet::new(),
            env_alerts_enabled: true,
        }
    }

    pub fn should_warn_object(&self, obj: &mut TrackedObjectState, now: Instant) -> bool {
        if !obj.is_approaching() {
            return false;
        }
        if cooled_down(obj.last_warned, now, self.object_cooldown) {
            obj.last_warned = Some(now);
            true
        } else {
            debug!("Track {} still in object cooldown", obj.id);
            false
        }
    }

    pub fn can_warn_globally(&mut self, now: Instant) -> bool {
        if !cooled_down(self.global_last_warned, now, self.global_cooldown) {
            return false;
        }
        // Only ever moves forward, even if a caller hands us an older instant.
        self.global_last_warned = Some(match self.global_last_warned {
            Some(prev) => prev.max(now),
            None => now,
        });
        true
    }

    pub fn should_warn_zone(&mut self, zone: Zone, now: Instant) -> bool {
        if !self.env_alerts_enabled || self.muted.contains(&zone) {
            return false;
        }
        let last = self.zone_last_warned.get(&zone).copied();
        if cooled_down(last, now, self.zone_cooldown) {
            self.zone_last_warned.insert(zone, now);
            true
        } else {
            false
        }
    }

    pub fn global_last_warned(&self) -> Option<Instant> {
        self.global_last_warned
    }

    pub fn mute_zone(&mut self, zone: Zone) {
        if self.muted.insert(zone) {
            info!("🔇 Zone '{}' muted", zone);
        }
    }

    pub fn unmute_zone(&mut self, zone: Zone) {
        if self.muted.remove(&zone) {
            info!("🔈 Zone '{}' unmuted", zone);
        }
    }

    pub fn is_muted(&self, zone: Zone) -> bool {
        self.muted.contains(&zone)
    }

    pub fn muted_zones(&self) -> impl Iterator<Item = Zone> + '_ {
        self.muted.iter().copied()
    }

    pub fn enable_env_alerts(&mut self) {
        self.env_alerts_enabled = true;
    }

    pub fn disable_env_alerts(&mut self) {
        self.env_alerts_enabled = false;
    }

    pub fn env_alerts_enabled(&self) -> bool {
        self.env_alerts_enabled
    }

    pub fn reset(&mut self) {
        self.global_last_warned = None;
        self.zone_last_warned.clear();
        self.muted.clear();
        self.env_alerts_enabled = true;
    }
}

// src/warning/tracker.rs
//
// Per-track hysteresis state machine.
//
//   Nearby ──(approaching continuously ≥ approach_confirm)──→ Approaching   [emits DangerEntered]
//   Approaching ──(not approaching continuously ≥ leave_confirm)──→ Nearby  [silent]
//
// A single contrary frame resets the pending timer. The timer starts on the
// first qualifying frame and the transition is only evaluated on later frames.

use super::secs;
use crate::announcer;
use crate::types::{EngineConfig, TrackId};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectState {
    Nearby,
    Approaching,
}

impl ObjectState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nearby => "NEARBY",
            Self::Approaching => "APPROACHING",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrackedObjectState {
    pub id: TrackId,
    pub class_label: String,
    pub state: ObjectState,
    pub first_seen: Instant,
    pub last_seen: Instant,
    approach_since: Option<Instant>,
    leave_since: Option<Instant>,
    pub(crate) last_warned: Option<Instant>,
}

impl TrackedObjectState {
    fn new(id: TrackId, class_label: &str, now: Instant) -> Self {
        Self {
            id,
            class_label: class_label.to_string(),
            state: ObjectState::Nearby,
            first_seen: now,
            last_seen: now,
            approach_since: None,
            leave_since: None,
            last_warned: None,
        }
    }

    pub fn is_approaching(&self) -> bool {
        self.state == ObjectState::Approaching
    }

    pub fn last_warned(&self) -> Option<Instant> {
        self.last_warned
    }

    pub fn display_label(&self) -> &str {
        announcer::display_label(&self.class_label)
    }
}

/// Emitted once, on the frame a track is confirmed as approaching.
#[derive(Debug, Clone, PartialEq)]
pub struct DangerEntered {
    pub id: TrackId,
    pub class_label: String,
    pub at: Instant,
}

pub struct ObjectTracker {
    approach_confirm: Duration,
    leave_confirm: Duration,
    expiry: Duration,
    objects: BTreeMap<TrackId, TrackedObjectState>,
}

impl ObjectTracker {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            approach_confirm: secs(config.approach_confirm_secs),
            leave_confirm: secs(config.leave_confirm_secs),
            expiry: secs(config.object_expiry_secs),
            objects: BTreeMap::new(),
        }
    }

    pub fn update(
        &mut self,
        now: Instant,
        id: TrackId,
        class_label: &str,
        is_approaching: bool,
    ) -> Option<DangerEntered> {
        let obj = self
            .objects
            .entry(id)
            .or_insert_with(|| TrackedObjectState::new(id, class_label, now));
        obj.last_seen = now;

        match obj.state {
            ObjectState::Nearby => {
                if !is_approaching {
                    obj.approach_since = None;
                    return None;
                }
                match obj.approach_since {
                    None => {
                        obj.approach_since = Some(now);
                        None
                    }
                    Some(since)
                        if now.saturating_duration_since(since) >= self.approach_confirm =>
                    {
                        obj.state = ObjectState::Approaching;
                        obj.approach_since = None;
                        obj.leave_since = None;
                        debug!(
                            "🟠 Track {} ({}) NEARBY→APPROACHING",
                            obj.id, obj.class_label
                        );
                        Some(DangerEntered {
                            id: obj.id,
                            class_label: obj.class_label.clone(),
                            at: now,
                        })
                    }
                    Some(_) => None,
                }
            }

            ObjectState::Approaching => {
                if is_approaching {
                    obj.leave_since = None;
                    return None;
                }
                match obj.leave_since {
                    None => obj.leave_since = Some(now),
                    Some(since) if now.saturating_duration_since(since) >= self.leave_confirm => {
                        obj.state = ObjectState::Nearby;
                        obj.leave_since = None;
                        debug!(
                            "🟢 Track {} ({}) APPROACHING→NEARBY",
                            obj.id, obj.class_label
                        );
                    }
                    Some(_) => {}
                }
                None
            }
        }
    }

    /// Forget tracks unseen for at least the expiry duration.
    pub fn cleanup(&mut self, now: Instant) -> usize {
        let expiry = self.expiry;
        let before = self.objects.len();
        self.objects
            .retain(|_, obj| now.saturating_duration_since(obj.last_seen) < expiry);
        let removed = before - self.objects.len();
        if removed > 0 {
            debug!("🧹 Expired {} stale track(s)", removed);
        }
        removed
    }

    /// Display labels of every approaching track, regardless of cooldowns.
    pub fn active_warnings(&self) -> Vec<String> {
        self.objects
            .values()
            .filter(|obj| obj.is_approaching())
            .map(|obj| obj.display_label().to_string())
            .collect()
    }

    pub fn get(&self, id: TrackId) -> Option<&TrackedObjectState> {
        self.objects.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TrackId) -> Option<&mut TrackedObjectState> {
        self.objects.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedObjectState> {
        self.objects.values()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }
}

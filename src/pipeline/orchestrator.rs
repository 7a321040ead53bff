// src/pipeline/orchestrator.rs
//
// Per-frame driver. One call per inference result:
//
//   environment ──→ classifier ───────────────────────────────→ zone warnings (all that pass)
//   objects ──→ scorer ──→ engine.update ──→ should_warn_object ──→ candidates
//                                                                    │
//                                             can_warn_globally ─────┴─→ one object warning
//   engine.cleanup()
//
// At most one object warning per frame (highest priority, first wins ties);
// zone warnings are not capped.

use super::metrics::PipelineMetrics;
use crate::announcer;
use crate::clock::{Clock, MonotonicClock};
use crate::environment::{EnvironmentClassification, EnvironmentClassifier, Zone};
use crate::risk::{class_weight, RiskScorer};
use crate::types::{Config, FrameInput, TrackId, ZoneRatios};
use crate::warning::WarningEngine;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{debug, info};

/// Priority weight for classes outside the risk table.
const UNKNOWN_CLASS_PRIORITY_WEIGHT: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    Object {
        id: TrackId,
        class_label: String,
        priority: f64,
        message: String,
    },
    Zone {
        zone: Zone,
        message: String,
    },
}

impl Warning {
    pub fn message(&self) -> &str {
        match self {
            Self::Object { message, .. } | Self::Zone { message, .. } => message,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FrameOutcome {
    pub environment: EnvironmentClassification,
    pub warnings: Vec<Warning>,
    pub logic_us: u64,
}

impl FrameOutcome {
    pub fn messages(&self) -> Vec<&str> {
        self.warnings.iter().map(Warning::message).collect()
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    id: TrackId,
    class_label: String,
    center_x: f64,
    priority: f64,
}

/// `class_weight × 2 + curr_height / frame_height`
pub fn warning_priority(class_label: &str, curr_height: f64, frame_height: f64) -> f64 {
    let weight = class_weight(class_label).unwrap_or(UNKNOWN_CLASS_PRIORITY_WEIGHT);
    let distance = if frame_height > 0.0 {
        curr_height / frame_height
    } else {
        0.0
    };
    weight * 2.0 + distance
}

pub struct FrameOrchestrator {
    scorer: RiskScorer,
    classifier: EnvironmentClassifier,
    engine: WarningEngine,
    metrics: PipelineMetrics,
    last_environment: Option<ZoneRatios>,
}

impl FrameOrchestrator {
    pub fn new(config: &Config) -> Self {
        Self::with_clock(config, Arc::new(MonotonicClock))
    }

    pub fn with_clock(config: &Config, clock: Arc<dyn Clock>) -> Self {
        Self {
            scorer: RiskScorer::new(config.risk.clone()),
            classifier: EnvironmentClassifier::new(config.environment.clone()),
            engine: WarningEngine::with_clock(&config.engine, clock),
            metrics: PipelineMetrics::new(),
            last_environment: None,
        }
    }

    pub fn process_frame(&mut self, frame: &FrameInput) -> FrameOutcome {
        let started = Instant::now();
        self.metrics.inc(&self.metrics.total_frames);

        if let Some(env) = &frame.environment {
            self.last_environment = Some(env.clone());
        }
        let environment = self.classifier.classify(frame.environment.as_ref());

        let mut candidates: Vec<Candidate> = Vec::new();
        for record in &frame.objects {
            let Some(obj) = record.to_snapshot(frame.frame_width) else {
                debug!("Skipping detection without full history: id={:?}", record.id);
                self.metrics.inc(&self.metrics.objects_skipped);
                continue;
            };
            self.metrics.inc(&self.metrics.objects_scored);

            let risk = self.scorer.score(&obj);
            let event = self
                .engine
                .update(obj.id, &obj.class_label, risk.is_approaching());

            if let Some(event) = event {
                self.metrics.inc(&self.metrics.danger_events);
                debug!(
                    "Track {} entered danger (risk={:.2}, ttc={:.2})",
                    event.id, risk.score, risk.ttc
                );
                if self.engine.should_warn_object(obj.id) {
                    candidates.push(Candidate {
                        id: obj.id,
                        class_label: obj.class_label.clone(),
                        center_x: obj.curr_center.x,
                        priority: warning_priority(
                            &obj.class_label,
                            obj.curr_height,
                            frame.frame_height,
                        ),
                    });
                }
            }
        }

        let mut warnings = Vec::new();

        if !candidates.is_empty() {
            if self.engine.can_warn_globally() {
                let top = select_top(&candidates);
                let message =
                    announcer::object_warning(&top.class_label, top.center_x, frame.frame_width);
                info!("🔊 Track {} ({}): {}", top.id, top.class_label, message);
                self.metrics.inc(&self.metrics.object_warnings);
                warnings.push(Warning::Object {
                    id: top.id,
                    class_label: top.class_label.clone(),
                    priority: top.priority,
                    message,
                });
            } else {
                debug!(
                    "{} object warning(s) held back by global cooldown",
                    candidates.len()
                );
                self.metrics
                    .add(&self.metrics.suppressed_by_global, candidates.len() as u64);
            }
        }

        if environment.is_danger {
            for &zone in &environment.danger_zones {
                if self.engine.should_warn_zone(zone) {
                    let message = announcer::zone_warning(zone);
                    info!("🔊 Zone {}: {}", zone, message);
                    self.metrics.inc(&self.metrics.zone_warnings);
                    warnings.push(Warning::Zone { zone, message });
                }
            }
        }

        self.engine.cleanup();

        let logic_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        self.metrics.set_timing(&self.metrics.logic_time_us, logic_us);

        FrameOutcome {
            environment,
            warnings,
            logic_us,
        }
    }

    /// "What's nearby" query: the three most recently seen tracks.
    pub fn nearby_objects(&self) -> (String, Vec<String>) {
        announcer::nearby_summary(self.engine.tracked_objects())
    }

    pub fn active_warnings(&self) -> Vec<String> {
        self.engine.active_warnings()
    }

    pub fn last_environment(&self) -> Option<EnvironmentClassification> {
        self.last_environment
            .as_ref()
            .map(|env| self.classifier.classify(Some(env)))
    }

    pub fn env_danger_message(&self) -> String {
        announcer::env_danger_message(self.last_environment().as_ref())
    }

    pub fn env_safe_message(&self) -> String {
        announcer::env_safe_message(self.last_environment().as_ref())
    }

    pub fn engine(&self) -> &WarningEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut WarningEngine {
        &mut self.engine
    }

    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }

    pub fn reset(&mut self) {
        self.engine.reset();
        self.last_environment = None;
    }
}

/// Highest priority; the earliest candidate wins ties.
fn select_top(candidates: &[Candidate]) -> &Candidate {
    let mut top = &candidates[0];
    for candidate in &candidates[1..] {
        if candidate.priority > top.priority {
            top = candidate;
        }
    }
    top
}

/// Shared, lock-guarded orchestrator for callers that serve frames and user
/// queries from several threads. All mutation goes through one mutex.
#[derive(Clone)]
pub struct EngineHandle {
    inner: Arc<Mutex<FrameOrchestrator>>,
}

impl EngineHandle {
    pub fn new(orchestrator: FrameOrchestrator) -> Self {
        Self {
            inner: Arc::new(Mutex::new(orchestrator)),
        }
    }

    // The engine never leaves state half-updated between calls, so a
    // poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, FrameOrchestrator> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn process_frame(&self, frame: &FrameInput) -> FrameOutcome {
        self.lock().process_frame(frame)
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut FrameOrchestrator) -> R) -> R {
        f(&mut self.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::types::{DetectionRecord, Point};
    use crate::warning::ObjectState;
    use std::time::Duration;

    const W: f64 = 640.0;
    const H: f64 = 480.0;

    fn setup() -> (FrameOrchestrator, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let orch = FrameOrchestrator::with_clock(&Config::default(), clock.clone());
        (orch, clock)
    }

    fn record(id: TrackId, class: &str, prev_h: f64, curr_h: f64, prev_x: f64, curr_x: f64) -> DetectionRecord {
        DetectionRecord {
            id: Some(id),
            class_label: Some(class.to_string()),
            prev_h: Some(prev_h),
            curr_h: Some(curr_h),
            prev_center: Some(Point::new(prev_x, 300.0)),
            curr_center: Some(Point::new(curr_x, 300.0)),
            ..Default::default()
        }
    }

    /// Growing and moving toward the center from the left.
    fn approaching(id: TrackId, class: &str, curr_h: f64) -> DetectionRecord {
        record(id, class, curr_h / 1.2, curr_h, 100.0, 110.0)
    }

    /// Not growing.
    fn idle(id: TrackId, class: &str) -> DetectionRecord {
        record(id, class, 100.0, 100.0, 100.0, 100.0)
    }

    fn frame(objects: Vec<DetectionRecord>) -> FrameInput {
        FrameInput {
            timestamp_s: None,
            frame_width: W,
            frame_height: H,
            objects,
            environment: None,
        }
    }

    fn env_frame(pairs: &[(&str, f64)]) -> FrameInput {
        FrameInput {
            environment: Some(pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()),
            ..frame(vec![])
        }
    }

    fn step(clock: &ManualClock, ms: u64) {
        clock.advance(Duration::from_millis(ms));
    }

    #[test]
    fn test_first_sighting_then_confirmed_approach() {
        let (mut orch, clock) = setup();

        // frame A: no previous height yet, so nothing to score
        let first = DetectionRecord {
            id: Some(1),
            class_label: Some("car".to_string()),
            curr_h: Some(100.0),
            curr_center: Some(Point::new(100.0, 300.0)),
            ..Default::default()
        };
        assert!(orch.process_frame(&frame(vec![first])).warnings.is_empty());
        assert_eq!(orch.metrics().summary().objects_skipped, 1);

        // frame B, 0.9s later: grown ≥5% and moving toward center.
        // The confirmation timer starts here, not at frame A.
        step(&clock, 900);
        let b = record(1, "car", 100.0, 110.0, 100.0, 120.0);
        assert!(orch.process_frame(&frame(vec![b])).warnings.is_empty());
        assert_eq!(orch.engine().object(1).unwrap().state, ObjectState::Nearby);

        step(&clock, 400);
        let c = record(1, "car", 110.0, 121.0, 120.0, 140.0);
        assert!(orch.process_frame(&frame(vec![c])).warnings.is_empty());

        step(&clock, 399);
        let d = record(1, "car", 121.0, 133.1, 140.0, 160.0);
        assert!(orch.process_frame(&frame(vec![d])).warnings.is_empty());

        step(&clock, 1);
        let e = record(1, "car", 133.1, 146.4, 160.0, 180.0);
        let outcome = orch.process_frame(&frame(vec![e]));
        assert_eq!(outcome.messages(), vec!["왼쪽에서 차량이 다가오고 있습니다."]);
        assert_eq!(orch.engine().object(1).unwrap().state, ObjectState::Approaching);
    }

    #[test]
    fn test_highest_priority_candidate_wins() {
        let (mut orch, clock) = setup();
        let objects = vec![
            approaching(1, "bicycle", 120.0),
            approaching(2, "truck", 60.0),
            approaching(3, "person", 400.0),
        ];
        orch.process_frame(&frame(objects.clone()));
        step(&clock, 800);
        let outcome = orch.process_frame(&frame(objects));

        // bicycle 1.4 + 0.25, truck 2.0 + 0.125, person 1.0 + 0.83
        assert_eq!(outcome.warnings.len(), 1);
        match &outcome.warnings[0] {
            Warning::Object { id, .. } => assert_eq!(*id, 2),
            other => panic!("unexpected warning {other:?}"),
        }
        assert_eq!(orch.metrics().summary().danger_events, 3);
    }

    #[test]
    fn test_priority_ties_go_to_first_candidate() {
        let (mut orch, clock) = setup();
        let objects = vec![approaching(7, "car", 120.0), approaching(3, "bus", 120.0)];
        orch.process_frame(&frame(objects.clone()));
        step(&clock, 800);
        let outcome = orch.process_frame(&frame(objects));
        match &outcome.warnings[0] {
            Warning::Object { id, priority, .. } => {
                assert_eq!(*id, 7);
                assert!((priority - 2.25).abs() < 1e-9);
            }
            other => panic!("unexpected warning {other:?}"),
        }
    }

    #[test]
    fn test_global_cooldown_spaces_out_different_objects() {
        let (mut orch, clock) = setup();

        orch.process_frame(&frame(vec![approaching(1, "car", 120.0)]));
        step(&clock, 800);
        assert_eq!(
            orch.process_frame(&frame(vec![approaching(1, "car", 120.0)]))
                .warnings
                .len(),
            1
        );

        // a second object confirms 2s later: passes its own cooldown, not the global one
        step(&clock, 1200);
        orch.process_frame(&frame(vec![approaching(2, "bus", 120.0)]));
        step(&clock, 800);
        let outcome = orch.process_frame(&frame(vec![approaching(2, "bus", 120.0)]));
        assert!(outcome.warnings.is_empty());
        assert_eq!(orch.metrics().summary().suppressed_by_global, 1);
    }

    #[test]
    fn test_zone_warnings_are_not_capped_and_respect_mute() {
        let (mut orch, clock) = setup();
        let danger = [("roadway_ratio", 0.5), ("caution_zone_ratio", 0.3)];

        let outcome = orch.process_frame(&env_frame(&danger));
        assert_eq!(outcome.warnings.len(), 2);
        assert!(outcome.environment.is_danger);

        step(&clock, 5_000);
        assert!(orch.process_frame(&env_frame(&danger)).warnings.is_empty());

        orch.engine_mut().mute_zone(Zone::Roadway);
        step(&clock, 5_000);
        let outcome = orch.process_frame(&env_frame(&danger));
        assert_eq!(
            outcome.warnings,
            vec![Warning::Zone {
                zone: Zone::CautionZone,
                message: "caution_zone environment detected. Please be cautious.".to_string(),
            }]
        );
    }

    #[test]
    fn test_zone_and_object_warnings_in_same_frame() {
        let (mut orch, clock) = setup();
        let mut f = env_frame(&[("roadway_ratio", 0.6)]);
        f.objects = vec![approaching(1, "car", 120.0)];
        let first = orch.process_frame(&f);
        assert_eq!(first.warnings.len(), 1);

        step(&clock, 800);
        let second = orch.process_frame(&f);
        assert_eq!(second.warnings.len(), 1);
        assert!(matches!(second.warnings[0], Warning::Object { .. }));
    }

    #[test]
    fn test_stale_tracks_expire_but_current_ones_stay() {
        let (mut orch, clock) = setup();
        orch.process_frame(&frame(vec![idle(1, "car"), idle(2, "dog")]));
        step(&clock, 2_000);
        orch.process_frame(&frame(vec![idle(2, "dog")]));
        assert!(orch.engine().object(1).is_none());
        assert!(orch.engine().object(2).is_some());
    }

    #[test]
    fn test_user_queries() {
        let (mut orch, clock) = setup();
        assert_eq!(
            orch.env_danger_message(),
            "Environment information is unavailable."
        );

        let mut f = env_frame(&[("sidewalk_ratio", 0.4)]);
        f.objects = vec![approaching(1, "car", 120.0), idle(2, "person")];
        orch.process_frame(&f);
        step(&clock, 800);
        orch.process_frame(&frame(vec![approaching(1, "car", 120.0), idle(2, "person")]));

        assert_eq!(orch.active_warnings(), vec!["차량"]);
        assert_eq!(orch.env_safe_message(), "sidewalk detected ahead.");
        assert_eq!(
            orch.env_danger_message(),
            "No dangerous environment detected nearby."
        );
        let (message, _) = orch.nearby_objects();
        assert_eq!(message, "Nearby objects detected: 차량 1 units, 사람 1 persons");

        orch.reset();
        assert!(orch.active_warnings().is_empty());
        assert!(orch.last_environment().is_none());
    }

    #[test]
    fn test_priority_formula() {
        assert!((warning_priority("car", 240.0, 480.0) - 2.5).abs() < 1e-9);
        assert!((warning_priority("person", 240.0, 480.0) - 1.5).abs() < 1e-9);
        assert_eq!(warning_priority("bicycle", 240.0, 0.0), 1.4);
    }

    #[test]
    fn test_handle_shares_state_across_threads() {
        let clock = Arc::new(ManualClock::new());
        let handle = EngineHandle::new(FrameOrchestrator::with_clock(
            &Config::default(),
            clock.clone(),
        ));

        let worker = handle.clone();
        std::thread::spawn(move || {
            worker.process_frame(&frame(vec![approaching(1, "car", 120.0)]));
        })
        .join()
        .unwrap();

        clock.advance(Duration::from_millis(800));
        let outcome = handle.process_frame(&frame(vec![approaching(1, "car", 120.0)]));
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(handle.with(|o| o.engine().tracked_count()), 1);
    }
}

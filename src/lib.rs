// src/lib.rs
//
// Proximity and environment warning engine for a pedestrian assistance
// device. Per frame, tracked objects and segmentation zone ratios go in;
// at most one object warning plus any due zone warnings come out.
//
//   risk        pure approach-risk score from two frames of bbox geometry
//   environment pure danger/safe zone classification
//   warning     hysteresis state machine + cooldown gates (stateful)
//   pipeline    per-frame orchestration, metrics, shared handle
//   announcer   spoken message text

pub mod announcer;
pub mod clock;
pub mod config;
pub mod environment;
pub mod pipeline;
pub mod risk;
pub mod types;
pub mod warning;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use environment::{EnvironmentClassification, EnvironmentClassifier, Zone};
pub use pipeline::{EngineHandle, FrameOrchestrator, FrameOutcome, Warning};
pub use risk::{RiskResult, RiskScorer};
pub use types::{Config, DetectionRecord, FrameInput, Point, TrackId, TrackedObjectSnapshot};
pub use warning::{DangerEntered, ObjectState, WarningEngine};

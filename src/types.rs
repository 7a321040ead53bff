// src/types.rs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identifier assigned by the external tracker. Stable across frames.
pub type TrackId = u64;

/// Zone coverage ratios keyed as `<zone>_ratio` (e.g. `roadway_ratio`).
pub type ZoneRatios = HashMap<String, f64>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub risk: RiskConfig,
    #[serde(default)]
    pub environment: EnvironmentConfig,
    #[serde(default)]
    pub replay: ReplayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Hysteresis and cooldown timings, all in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub approach_confirm_secs: f64,
    pub leave_confirm_secs: f64,
    pub object_expiry_secs: f64,
    pub object_cooldown_secs: f64,
    pub global_cooldown_secs: f64,
    pub zone_cooldown_secs: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            approach_confirm_secs: 0.8,
            leave_confirm_secs: 1.2,
            object_expiry_secs: 2.0,
            object_cooldown_secs: 5.0,
            global_cooldown_secs: 4.0,
            zone_cooldown_secs: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Minimum relative bbox height growth counted as approaching
    pub growth_threshold: f64,
    /// Horizontal displacement (px) under which an object counts as stationary
    pub stationary_px: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            growth_threshold: 0.05,
            stationary_px: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub danger_ratio_threshold: f64,
    pub safe_ratio_threshold: f64,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            danger_ratio_threshold: 0.25,
            safe_ratio_threshold: 0.15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    pub frames_path: String,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            frames_path: "demos/approaching_car.jsonl".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One tracked object as handed over by the detector/tracker enrichment step.
/// Every field may be absent; see [`DetectionRecord::to_snapshot`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub id: Option<TrackId>,
    #[serde(rename = "class")]
    pub class_label: Option<String>,
    pub score: Option<f32>,
    /// [x1, y1, x2, y2] pixels
    pub bbox: Option<[f64; 4]>,
    pub prev_h: Option<f64>,
    pub curr_h: Option<f64>,
    pub prev_center: Option<Point>,
    pub curr_center: Option<Point>,
}

impl DetectionRecord {
    /// Returns `None` unless the record carries enough history to be scored:
    /// identifier, class, both heights and both centers.
    pub fn to_snapshot(&self, frame_width: f64) -> Option<TrackedObjectSnapshot> {
        Some(TrackedObjectSnapshot {
            id: self.id?,
            class_label: self.class_label.clone()?,
            prev_height: Some(self.prev_h?),
            curr_height: self.curr_h?,
            prev_center: Some(self.prev_center?),
            curr_center: self.curr_center?,
            frame_width,
        })
    }
}

/// Validated per-frame view of one object, consumed by the risk scorer.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedObjectSnapshot {
    pub id: TrackId,
    pub class_label: String,
    /// `None` on first sighting
    pub prev_height: Option<f64>,
    pub curr_height: f64,
    pub prev_center: Option<Point>,
    pub curr_center: Point,
    pub frame_width: f64,
}

/// Everything the perception stack produced for one frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameInput {
    /// Seconds since stream start. Only the replay driver reads it.
    #[serde(default)]
    pub timestamp_s: Option<f64>,
    pub frame_width: f64,
    pub frame_height: f64,
    #[serde(default)]
    pub objects: Vec<DetectionRecord>,
    #[serde(default)]
    pub environment: Option<ZoneRatios>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_record() -> DetectionRecord {
        DetectionRecord {
            id: Some(7),
            class_label: Some("car".to_string()),
            score: Some(0.9),
            bbox: Some([100.0, 100.0, 200.0, 220.0]),
            prev_h: Some(100.0),
            curr_h: Some(120.0),
            prev_center: Some(Point::new(150.0, 160.0)),
            curr_center: Some(Point::new(160.0, 160.0)),
        }
    }

    #[test]
    fn test_complete_record_becomes_snapshot() {
        let snapshot = complete_record().to_snapshot(640.0).unwrap();
        assert_eq!(snapshot.id, 7);
        assert_eq!(snapshot.class_label, "car");
        assert_eq!(snapshot.prev_height, Some(100.0));
        assert_eq!(snapshot.frame_width, 640.0);
    }

    #[test]
    fn test_missing_history_is_rejected() {
        let mut record = complete_record();
        record.prev_h = None;
        assert!(record.to_snapshot(640.0).is_none());

        let mut record = complete_record();
        record.prev_center = None;
        assert!(record.to_snapshot(640.0).is_none());

        let mut record = complete_record();
        record.id = None;
        assert!(record.to_snapshot(640.0).is_none());
    }

    #[test]
    fn test_frame_input_parses_tracker_json() {
        let json = r#"{
            "timestamp_s": 1.5,
            "frame_width": 640,
            "frame_height": 480,
            "objects": [
                {"id": 1, "class": "car", "prev_h": 80, "curr_h": 90,
                 "prev_center": {"x": 100, "y": 200}, "curr_center": {"x": 120, "y": 200}},
                {"id": 2, "class": "person"}
            ],
            "environment": {"roadway_ratio": 0.4}
        }"#;
        let frame: FrameInput = serde_json::from_str(json).unwrap();
        assert_eq!(frame.objects.len(), 2);
        assert!(frame.objects[0].to_snapshot(frame.frame_width).is_some());
        assert!(frame.objects[1].to_snapshot(frame.frame_width).is_none());
        assert_eq!(frame.environment.unwrap()["roadway_ratio"], 0.4);
    }
}

// src/risk.rs
//
// Approach-risk scoring from two frames of bbox geometry.
//
//   R = Wc × Da × Ad × Tr
//
//   Wc  class weight (how harmful the object class is)
//   Da  size growth indicator (bbox height grew enough)
//   Ad  lateral indicator (moving toward the frame center)
//   Tr  urgency from a discrete-derivative TTC proxy
//
// The TTC here is a heuristic on relative height growth between frames,
// not a physical time-to-collision.

use crate::types::{Point, RiskConfig, TrackedObjectSnapshot};
use serde::Serialize;

const CLASS_WEIGHTS: &[(&str, f64)] = &[
    ("car", 1.0),
    ("bus", 1.0),
    ("truck", 1.0),
    ("motorcycle", 0.9),
    ("scooter", 0.9),
    ("bicycle", 0.7),
];

const TTC_CRITICAL: f64 = 2.0;
const TTC_WARNING: f64 = 5.0;

const LATERAL_TOWARD_CENTER: f64 = 1.0;
const LATERAL_STATIONARY: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskResult {
    pub score: f64,
    /// Wc
    pub class_weight: f64,
    /// Da
    pub growth: f64,
    /// Ad
    pub lateral: f64,
    /// Tr
    pub urgency: f64,
    pub ttc: f64,
}

impl RiskResult {
    /// Approach signal fed to the state machine: the box grew and the
    /// object is not moving away from the center line.
    pub fn is_approaching(&self) -> bool {
        self.growth == 1.0 && self.lateral > 0.0
    }
}

/// Weight for a class label, `None` for classes outside the table.
pub fn class_weight(class_label: &str) -> Option<f64> {
    CLASS_WEIGHTS
        .iter()
        .find(|(name, _)| *name == class_label)
        .map(|(_, w)| *w)
}

pub fn growth_indicator(prev_height: Option<f64>, curr_height: f64, threshold: f64) -> f64 {
    match prev_height {
        Some(prev) if prev > 0.0 => {
            if (curr_height - prev) / prev >= threshold {
                1.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

/// The strict "closer to center" test runs before the stationary test, so a
/// small step toward the center scores 1.0 and a small step away scores 0.3.
pub fn lateral_indicator(
    prev_center: Option<Point>,
    curr_center: Option<Point>,
    frame_width: f64,
    stationary_px: f64,
) -> f64 {
    let (prev, curr) = match (prev_center, curr_center) {
        (Some(p), Some(c)) if frame_width > 0.0 => (p, c),
        _ => return 0.0,
    };

    let mid = frame_width / 2.0;
    if (curr.x - mid).abs() < (prev.x - mid).abs() {
        LATERAL_TOWARD_CENTER
    } else if (curr.x - prev.x).abs() < stationary_px {
        LATERAL_STATIONARY
    } else {
        0.0
    }
}

pub fn ttc_proxy(prev_height: Option<f64>, curr_height: f64) -> f64 {
    let prev = match prev_height {
        Some(p) if p > 0.0 && curr_height > 0.0 => p,
        _ => return f64::INFINITY,
    };
    let dh = curr_height - prev;
    if dh <= 0.0 {
        return f64::INFINITY;
    }
    curr_height / dh
}

pub fn urgency_factor(ttc: f64) -> f64 {
    if ttc < TTC_CRITICAL {
        1.0
    } else if ttc < TTC_WARNING {
        0.5
    } else {
        0.0
    }
}

/// Stateless scorer. Shareable across threads.
#[derive(Debug, Clone, Default)]
pub struct RiskScorer {
    config: RiskConfig,
}

impl RiskScorer {
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    pub fn score(&self, obj: &TrackedObjectSnapshot) -> RiskResult {
        let class_weight = class_weight(&obj.class_label).unwrap_or(0.0);
        let growth = growth_indicator(
            obj.prev_height,
            obj.curr_height,
            self.config.growth_threshold,
        );
        let lateral = lateral_indicator(
            obj.prev_center,
            Some(obj.curr_center),
            obj.frame_width,
            self.config.stationary_px,
        );
        let ttc = ttc_proxy(obj.prev_height, obj.curr_height);
        let urgency = urgency_factor(ttc);

        RiskResult {
            score: class_weight * growth * lateral * urgency,
            class_weight,
            growth,
            lateral,
            urgency,
            ttc,
        }
    }
}

// src/environment.rs
//
// Classifies segmentation zone coverage into danger / safe sets.

use crate::types::{EnvironmentConfig, ZoneRatios};
use anyhow::anyhow;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Roadway,
    CautionZone,
    Sidewalk,
    BrailleGuideBlocks,
}

/// Checked in this order; earlier entries win ratio ties.
pub const DANGER_ZONES: [Zone; 2] = [Zone::Roadway, Zone::CautionZone];
pub const SAFE_ZONES: [Zone; 2] = [Zone::Sidewalk, Zone::BrailleGuideBlocks];

impl Zone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Roadway => "roadway",
            Self::CautionZone => "caution_zone",
            Self::Sidewalk => "sidewalk",
            Self::BrailleGuideBlocks => "braille_guide_blocks",
        }
    }

    /// Key used by the segmentation output, e.g. `roadway_ratio`.
    pub fn ratio_key(&self) -> String {
        format!("{}_ratio", self.as_str())
    }

    pub fn is_danger(&self) -> bool {
        matches!(self, Self::Roadway | Self::CautionZone)
    }

    pub fn ratio_in(&self, ratios: &ZoneRatios) -> f64 {
        ratios.get(&self.ratio_key()).copied().unwrap_or(0.0)
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Zone {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DANGER_ZONES
            .iter()
            .chain(SAFE_ZONES.iter())
            .find(|z| z.as_str() == s)
            .copied()
            .ok_or_else(|| anyhow!("unknown zone '{s}'"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnvironmentClassification {
    pub danger_zones: Vec<Zone>,
    pub safe_zones: Vec<Zone>,
    pub dominant: Option<Zone>,
    pub is_danger: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EnvironmentClassifier {
    config: EnvironmentConfig,
}

impl EnvironmentClassifier {
    pub fn new(config: EnvironmentConfig) -> Self {
        Self { config }
    }

    /// Total: `None` behaves like an empty map.
    pub fn classify(&self, ratios: Option<&ZoneRatios>) -> EnvironmentClassification {
        let empty = ZoneRatios::new();
        let ratios = ratios.unwrap_or(&empty);

        let danger_zones: Vec<Zone> = DANGER_ZONES
            .iter()
            .copied()
            .filter(|z| z.ratio_in(ratios) > self.config.danger_ratio_threshold)
            .collect();
        let safe_zones: Vec<Zone> = SAFE_ZONES
            .iter()
            .copied()
            .filter(|z| z.ratio_in(ratios) > self.config.safe_ratio_threshold)
            .collect();

        let dominant = if !danger_zones.is_empty() {
            highest_ratio(&danger_zones, ratios)
        } else {
            highest_ratio(&safe_zones, ratios)
        };

        EnvironmentClassification {
            is_danger: !danger_zones.is_empty(),
            danger_zones,
            safe_zones,
            dominant,
        }
    }
}

fn highest_ratio(zones: &[Zone], ratios: &ZoneRatios) -> Option<Zone> {
    let mut best: Option<(Zone, f64)> = None;
    for &zone in zones {
        let ratio = zone.ratio_in(ratios);
        match best {
            Some((_, r)) if ratio <= r => {}
            _ => best = Some((zone, ratio)),
        }
    }
    best.map(|(zone, _)| zone)
}

// src/announcer.rs
//
// Turns engine decisions into spoken-text messages. Korean display labels
// for object classes; the subject particle (이/가) depends on whether the
// last Hangul syllable has a final consonant.

use crate::environment::{EnvironmentClassification, Zone};
use crate::warning::TrackedObjectState;

const CLASS_LABELS: &[(&str, &str)] = &[
    ("barricade", "장애물"),
    ("bench", "벤치"),
    ("bicycle", "자전거"),
    ("bollard", "기둥"),
    ("bus", "버스"),
    ("car", "차량"),
    ("carrier", "캐리어"),
    ("cat", "고양이"),
    ("chair", "의자"),
    ("dog", "개"),
    ("fire_hydrant", "소화전"),
    ("kiosk", "키오스크"),
    ("motorcycle", "오토바이"),
    ("movable_signage", "이동식 표지판"),
    ("parking_meter", "주차 요금기"),
    ("person", "사람"),
    ("pole", "기둥"),
    ("potted_plant", "화분"),
    ("power_controller", "전기 제어함"),
    ("scooter", "스쿠터"),
    ("stop", "정지 표지판"),
    ("stroller", "유모차"),
    ("table", "탁자"),
    ("traffic_light", "신호등"),
    ("traffic_light_controller", "신호 제어기"),
    ("traffic_sign", "교통 표지판"),
    ("tree_trunk", "나무 기둥"),
    ("truck", "트럭"),
    ("wheelchair", "휠체어"),
];

/// Spoken in place of classes with no known label.
const GENERIC_OBJECT: &str = "물체";
const PERSON_LABEL: &str = "사람";
const NEARBY_SUMMARY_LIMIT: usize = 3;

const HANGUL_FIRST: u32 = 0xAC00;
const HANGUL_LAST: u32 = 0xD7A3;
const FINAL_CONSONANTS: u32 = 28;

pub fn class_label(class: &str) -> Option<&'static str> {
    CLASS_LABELS
        .iter()
        .find(|(name, _)| *name == class)
        .map(|(_, label)| *label)
}

/// Korean label if known, otherwise the raw class name.
pub fn display_label(class: &str) -> &str {
    class_label(class).unwrap_or(class)
}

pub fn add_particle(word: &str) -> String {
    let Some(last) = word.chars().last() else {
        return String::new();
    };
    let code = last as u32;
    if !(HANGUL_FIRST..=HANGUL_LAST).contains(&code) {
        return format!("{word}이");
    }
    let has_final = (code - HANGUL_FIRST) % FINAL_CONSONANTS != 0;
    format!("{word}{}", if has_final { "이" } else { "가" })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bearing {
    Left,
    Front,
    Right,
}

impl Bearing {
    pub fn from_center(center_x: f64, frame_width: f64) -> Self {
        if frame_width <= 0.0 {
            return Self::Front;
        }
        let ratio = center_x / frame_width;
        if ratio < 1.0 / 3.0 {
            Self::Left
        } else if ratio > 2.0 / 3.0 {
            Self::Right
        } else {
            Self::Front
        }
    }

    pub fn as_korean(&self) -> &'static str {
        match self {
            Self::Left => "왼쪽",
            Self::Front => "정면",
            Self::Right => "오른쪽",
        }
    }
}

/// e.g. "왼쪽에서 차량이 다가오고 있습니다."
pub fn object_warning(class: &str, center_x: f64, frame_width: f64) -> String {
    let label = add_particle(class_label(class).unwrap_or(GENERIC_OBJECT));
    let bearing = Bearing::from_center(center_x, frame_width);
    format!("{}에서 {} 다가오고 있습니다.", bearing.as_korean(), label)
}

pub fn zone_warning(zone: Zone) -> String {
    format!("{zone} environment detected. Please be cautious.")
}

/// Summary of the most recently seen tracks for a "what's nearby" query.
pub fn nearby_summary<'a, I>(objects: I) -> (String, Vec<String>)
where
    I: IntoIterator<Item = &'a TrackedObjectState>,
{
    let mut recent: Vec<&TrackedObjectState> = objects.into_iter().collect();
    if recent.is_empty() {
        return ("No nearby objects detected.".to_string(), Vec::new());
    }
    // stable sort keeps track order among equal timestamps
    recent.sort_by(|a, b| b.last_seen.cmp(&a.last_seen));
    recent.truncate(NEARBY_SUMMARY_LIMIT);

    let mut counts: Vec<(&str, usize)> = Vec::new();
    for obj in recent {
        let label = obj.display_label();
        match counts.iter_mut().find(|(l, _)| *l == label) {
            Some((_, n)) => *n += 1,
            None => counts.push((label, 1)),
        }
    }

    let parts: Vec<String> = counts
        .into_iter()
        .map(|(label, n)| {
            let unit = if label == PERSON_LABEL { "persons" } else { "units" };
            format!("{label} {n} {unit}")
        })
        .collect();

    (
        format!("Nearby objects detected: {}", parts.join(", ")),
        parts,
    )
}

pub fn env_danger_message(env: Option<&EnvironmentClassification>) -> String {
    match env {
        None => "Environment information is unavailable.".to_string(),
        Some(env) => match env.danger_zones.first() {
            Some(zone) => format!("{zone} detected ahead."),
            None => "No dangerous environment detected nearby.".to_string(),
        },
    }
}

pub fn env_safe_message(env: Option<&EnvironmentClassification>) -> String {
    match env {
        None => "Environment information is unavailable.".to_string(),
        Some(env) => match env.safe_zones.first() {
            Some(zone) => format!("{zone} detected ahead."),
            None => "No safe environment detected nearby.".to_string(),
        },
    }
}

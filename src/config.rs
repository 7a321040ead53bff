// src/config.rs

use crate::types::Config;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let e = &self.engine;
        for (name, value) in [
            ("approach_confirm_secs", e.approach_confirm_secs),
            ("leave_confirm_secs", e.leave_confirm_secs),
            ("object_expiry_secs", e.object_expiry_secs),
            ("object_cooldown_secs", e.object_cooldown_secs),
            ("global_cooldown_secs", e.global_cooldown_secs),
            ("zone_cooldown_secs", e.zone_cooldown_secs),
        ] {
            if !value.is_finite() || value < 0.0 {
                bail!("engine.{name} must be a finite, non-negative duration (got {value})");
            }
        }
        // Zero expiry would drop objects updated on the current frame.
        if e.object_expiry_secs <= 0.0 {
            bail!("engine.object_expiry_secs must be positive");
        }

        if !self.risk.growth_threshold.is_finite() || !self.risk.stationary_px.is_finite() {
            bail!("risk thresholds must be finite");
        }

        let env = &self.environment;
        for (name, value) in [
            ("danger_ratio_threshold", env.danger_ratio_threshold),
            ("safe_ratio_threshold", env.safe_ratio_threshold),
        ] {
            if !value.is_finite() {
                bail!("environment.{name} must be finite (got {value})");
            }
        }
        Ok(())
    }
}

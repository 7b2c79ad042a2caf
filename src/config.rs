// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Engine configuration: tolerances and robustness knobs shared by every
//! geometric predicate.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tolerance used for plane/line degeneracy, signed distances and bound overlap.
pub const GEOMETRIC_TOLERANCE: f64 = 1e-10;

/// Tolerance used for vertex equality (deduplication and merging).
pub const VERTEX_TOLERANCE: f64 = 1e-5;

/// Default config file looked up by [`CsgConfig::load`].
pub const CONFIG_FILE_NAME: &str = "csgvr.toml";

/// Tolerances shared by all predicates of the engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    /// Degeneracy threshold for cross products, denominators and plane distances
    pub geometric: f64,
    /// Per-coordinate threshold under which two vertices are the same vertex
    pub vertex: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            geometric: GEOMETRIC_TOLERANCE,
            vertex: VERTEX_TOLERANCE,
        }
    }
}

/// How a ray direction is treated after a random perturbation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerturbMode {
    /// Renormalize the direction right after perturbing it
    #[default]
    Renormalize,
    /// Keep the perturbed direction as is (bit-for-bit parity with older models)
    Legacy,
}

/// Boolean engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsgConfig {
    /// Magnitude of the random offset added to a ray direction component
    pub perturbation_scale: f64,
    pub perturbation: PerturbMode,
    /// Maximum number of perturbed re-casts for a single face classification
    pub max_ray_retries: u32,
    /// Splitting stops once a solid holds more than this many times its initial faces
    pub split_growth_limit: usize,
    /// Seed for the perturbation RNG; entropy-seeded when absent
    pub seed: Option<u64>,
    pub tolerances: Tolerances,
}

impl Default for CsgConfig {
    fn default() -> Self {
        Self {
            perturbation_scale: 1e-5,
            perturbation: PerturbMode::Renormalize,
            max_ray_retries: 64,
            split_growth_limit: 100,
            seed: None,
            tolerances: Tolerances::default(),
        }
    }
}

impl CsgConfig {
    /// Default configuration with a fixed RNG seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: CsgConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from(CONFIG_FILE_NAME).exists() {
            Self::from_file(CONFIG_FILE_NAME)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply `CSGVR_*` environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply `CSGVR_*` overrides from `lookup`. Values that do not parse
    /// leave the current setting alone.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(seed) = lookup("CSGVR_SEED").and_then(|v| v.parse().ok()) {
            self.seed = Some(seed);
        }

        if let Some(tol) = lookup("CSGVR_VERTEX_TOLERANCE").and_then(|v| v.parse().ok()) {
            self.tolerances.vertex = tol;
        }

        if let Some(tol) = lookup("CSGVR_GEOMETRIC_TOLERANCE").and_then(|v| v.parse().ok()) {
            self.tolerances.geometric = tol;
        }

        if lookup("CSGVR_LEGACY_PERTURBATION").and_then(|v| v.parse::<bool>().ok()) == Some(true) {
            self.perturbation = PerturbMode::Legacy;
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_tolerances() {
        let config = CsgConfig::default();
        assert_eq!(config.tolerances.geometric, 1e-10);
        assert_eq!(config.tolerances.vertex, 1e-5);
        assert_eq!(config.perturbation, PerturbMode::Renormalize);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_save_and_reload() -> Result<()> {
        let file = NamedTempFile::new()?;
        let mut config = CsgConfig::seeded(7);
        config.perturbation = PerturbMode::Legacy;
        config.max_ray_retries = 5;
        config.save(file.path())?;

        let loaded = CsgConfig::from_file(file.path())?;
        assert_eq!(loaded, config);
        Ok(())
    }

    #[test]
    fn test_partial_file_uses_defaults() -> Result<()> {
        let file = NamedTempFile::new()?;
        std::fs::write(file.path(), "seed = 42\n[tolerances]\nvertex = 0.001\n")?;

        let loaded = CsgConfig::from_file(file.path())?;
        assert_eq!(loaded.seed, Some(42));
        assert_eq!(loaded.tolerances.vertex, 0.001);
        assert_eq!(loaded.tolerances.geometric, GEOMETRIC_TOLERANCE);
        assert_eq!(loaded.split_growth_limit, 100);
        Ok(())
    }

    #[test]
    fn test_overrides_skip_unparsable_values() {
        let mut config = CsgConfig::seeded(42);
        config.apply_overrides(|key| match key {
            "CSGVR_SEED" => Some("not-a-seed".to_string()),
            "CSGVR_VERTEX_TOLERANCE" => Some("1e-4".to_string()),
            "CSGVR_GEOMETRIC_TOLERANCE" => Some("tiny".to_string()),
            "CSGVR_LEGACY_PERTURBATION" => Some("true".to_string()),
            _ => None,
        });

        assert_eq!(config.seed, Some(42));
        assert_eq!(config.tolerances.vertex, 1e-4);
        assert_eq!(config.tolerances.geometric, GEOMETRIC_TOLERANCE);
        assert_eq!(config.perturbation, PerturbMode::Legacy);

        config.apply_overrides(|key| (key == "CSGVR_SEED").then(|| "9".to_string()));
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(CsgConfig::from_file("/nonexistent/csgvr.toml").is_err());
    }
}

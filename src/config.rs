// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowpane-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowpane and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Engine tunables: canvas size, marker radii, annotation geometry and the zoom extent.
//!
//! Every field has a default, so a config file only needs to name what it overrides.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub flow_bucket_radius: f64,
    pub annotation_joint_radius: f64,
    pub annotation_text_width: f64,
    pub zoom_min: f64,
    pub zoom_max: f64,
    /// Flow buckets sit at `source + (target - source) / bucket_ratio`.
    pub bucket_ratio: f64,
    pub node_height: f64,
    pub min_node_width: f64,
    pub label_padding: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1100.0,
            canvas_height: 600.0,
            flow_bucket_radius: 10.0,
            annotation_joint_radius: 10.0,
            annotation_text_width: 120.0,
            zoom_min: 0.25,
            zoom_max: 2.0,
            bucket_ratio: 1.8,
            node_height: 40.0,
            min_node_width: 60.0,
            label_padding: 32.0,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!(path = path.display().to_string(); "Loading engine config");
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("canvas_width", self.canvas_width),
            ("canvas_height", self.canvas_height),
            ("flow_bucket_radius", self.flow_bucket_radius),
            ("annotation_joint_radius", self.annotation_joint_radius),
            ("annotation_text_width", self.annotation_text_width),
            ("zoom_min", self.zoom_min),
            ("zoom_max", self.zoom_max),
            ("bucket_ratio", self.bucket_ratio),
            ("node_height", self.node_height),
            ("min_node_width", self.min_node_width),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a positive number (got {value})"
                )));
            }
        }
        if self.label_padding < 0.0 {
            return Err(ConfigError::Invalid("label_padding must not be negative".to_owned()));
        }
        if self.zoom_min > self.zoom_max {
            return Err(ConfigError::Invalid(format!(
                "zoom_min ({}) exceeds zoom_max ({})",
                self.zoom_min, self.zoom_max
            )));
        }
        Ok(())
    }

    /// Clamps a zoom scale into `[zoom_min, zoom_max]`.
    pub fn clamp_scale(&self, k: f64) -> f64 {
        k.clamp(self.zoom_min, self.zoom_max)
    }
}

//! # Kernel Configuration
//!
//! Settings that change how the kernel behaves at runtime: logging, the
//! cross-kind bounding-volume policy, debug wireframe style and the initial
//! size of the per-frame renderable buffer.

use serde::{Serialize, Deserialize};

use super::{Config, ConfigError};
use crate::bounding::{CrossKindPolicy, WireframeStyle};
use crate::bounding::wireframe::{MAX_SPHERE_RESOLUTION, MIN_SPHERE_RESOLUTION};

/// Top-level kernel configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Default log filter passed to `env_logger`
    pub log_level: String,
    /// How operations between an oriented box and another kind are resolved
    pub cross_kind_policy: CrossKindPolicy,
    /// Initial capacity of the ordered-renderable buffer
    pub ordered_renderable_capacity: usize,
    /// Debug wireframe appearance
    pub wireframe: WireframeStyle,
}

impl KernelConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            cross_kind_policy: CrossKindPolicy::default(),
            ordered_renderable_capacity: 256,
            wireframe: WireframeStyle::default(),
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set the cross-kind policy
    pub fn with_cross_kind_policy(mut self, policy: CrossKindPolicy) -> Self {
        self.cross_kind_policy = policy;
        self
    }

    /// Set the wireframe style
    pub fn with_wireframe(mut self, wireframe: WireframeStyle) -> Self {
        self.wireframe = wireframe;
        self
    }

    /// Set the initial ordered-renderable capacity
    pub fn with_ordered_renderable_capacity(mut self, capacity: usize) -> Self {
        self.ordered_renderable_capacity = capacity;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_level.trim().is_empty() {
            return Err(ConfigError::Invalid("Log level cannot be empty".to_string()));
        }

        let resolution = self.wireframe.sphere_resolution;
        if !(MIN_SPHERE_RESOLUTION..=MAX_SPHERE_RESOLUTION).contains(&resolution) {
            return Err(ConfigError::Invalid(format!(
                "Sphere wireframe resolution must be within {}..={}, got {}",
                MIN_SPHERE_RESOLUTION, MAX_SPHERE_RESOLUTION, resolution
            )));
        }

        if !(self.wireframe.line_width.is_finite() && self.wireframe.line_width > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "Wireframe line width must be positive, got {}",
                self.wireframe.line_width
            )));
        }

        Ok(())
    }

    /// Load and validate a configuration file
    pub fn load_validated(path: &str) -> Result<Self, ConfigError> {
        let config = Self::load_from_file(path)?;
        config.validate()?;
        log::debug!("Loaded kernel configuration from {}", path);
        Ok(config)
    }
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for KernelConfig {}

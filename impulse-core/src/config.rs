//! World and material configuration.
//!
//! Both are plain YAML so scenes can be tuned without recompiling.
//!
//! ## Directory Structure
//!
//! ```text
//! config/
//! └── world.yaml          WorldConfig
//! materials/
//! ├── standard.yaml       Material presets, one per file
//! ├── debris.yaml
//! └── ...
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::body::Material;
use crate::error::ConfigError;
use crate::integrator::default_gravity;
use crate::types::{constants, Vec2};

// =============================================================================
// WorldConfig
// =============================================================================

/// Everything a [`World`](crate::world::World) needs besides its bodies.
///
/// Missing keys in a YAML document fall back to [`WorldConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Fixed timestep in seconds
    pub dt: f64,
    /// Solver passes per step
    pub iterations: usize,
    /// Acceleration applied to every dynamic body (y grows downward)
    pub gravity: Vec2,
    /// Density used for mass when a body is added
    pub density: f64,
    /// Seed for the initial-orientation generator
    pub seed: u64,
    /// Penetration allowed before positional correction kicks in
    pub slop: f64,
    /// Fraction of the remaining penetration corrected per step
    pub correction_percent: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            dt: constants::DEFAULT_DT,
            iterations: constants::DEFAULT_ITERATIONS,
            gravity: default_gravity(),
            density: constants::DEFAULT_DENSITY,
            seed: 0,
            slop: constants::PENETRATION_SLOP,
            correction_percent: constants::CORRECTION_PERCENT,
        }
    }
}

impl WorldConfig {
    /// Defaults with a different timestep and iteration count.
    pub fn with_timestep(dt: f64, iterations: usize) -> Self {
        Self {
            dt,
            iterations,
            ..Self::default()
        }
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: WorldConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "dt must be positive, got {}",
                self.dt
            )));
        }
        if self.iterations == 0 {
            return Err(ConfigError::Invalid(
                "solver needs at least one iteration".to_string(),
            ));
        }
        if !(self.gravity.x.is_finite() && self.gravity.y.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "gravity must be finite, got {:?}",
                self.gravity
            )));
        }
        if !(self.density.is_finite() && self.density > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "density must be positive, got {}",
                self.density
            )));
        }
        if self.slop < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "slop must be non-negative, got {}",
                self.slop
            )));
        }
        if !(0.0..=1.0).contains(&self.correction_percent) {
            return Err(ConfigError::Invalid(format!(
                "correction_percent must be in [0, 1], got {}",
                self.correction_percent
            )));
        }
        Ok(())
    }
}

// =============================================================================
// MaterialLoader
// =============================================================================

/// Loads [`Material`] presets from `<base>/<name>.yaml`.
pub struct MaterialLoader {
    base_path: PathBuf,
}

impl MaterialLoader {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Load and validate a preset by name (without `.yaml`).
    ///
    /// # Example
    /// ```ignore
    /// let loader = MaterialLoader::new("materials");
    /// let ice = loader.load_material("ice")?;
    /// ```
    pub fn load_material(&self, name: &str) -> Result<Material, ConfigError> {
        let path = self.base_path.join(format!("{name}.yaml"));
        if !path.exists() {
            return Err(ConfigError::NotFound(name.to_string()));
        }
        let contents = fs::read_to_string(&path)?;
        let material: Material = serde_yaml::from_str(&contents)?;
        material.validate()?;
        Ok(material)
    }

    /// Names of every preset in the directory, sorted.
    pub fn list_materials(&self) -> Result<Vec<String>, ConfigError> {
        if !self.base_path.exists() {
            return Ok(vec![]);
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.base_path)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy();
            if let Some(stem) = name.strip_suffix(".yaml") {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

// =============================================================================
// Tests
// =============================================================================

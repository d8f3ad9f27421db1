use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::submission::RenderPath;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathConfig {
    pub initial_capacity: u32,
    /// Capacity is grown in whole multiples of this, never proportionally.
    pub growth_increment: u32,
}

impl PathConfig {
    pub const fn new(initial_capacity: u32, growth_increment: u32) -> Self {
        Self {
            initial_capacity,
            growth_increment,
        }
    }

    pub fn growth_increment(&self) -> u32 {
        self.growth_increment.max(1)
    }
}

/// Fields of one path table. Missing fields keep that path's own defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PathTable {
    initial_capacity: Option<u32>,
    growth_increment: Option<u32>,
}

impl PathTable {
    fn over(self, defaults: PathConfig) -> PathConfig {
        PathConfig {
            initial_capacity: self.initial_capacity.unwrap_or(defaults.initial_capacity),
            growth_increment: self.growth_increment.unwrap_or(defaults.growth_increment),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    shadow: PathTable,
    main: PathTable,
    ui: PathTable,
    batch_shadows: Option<bool>,
    parallel_culling_threshold: Option<usize>,
}

impl From<ConfigFile> for SubmissionConfig {
    fn from(file: ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            shadow: file.shadow.over(defaults.shadow),
            main: file.main.over(defaults.main),
            ui: file.ui.over(defaults.ui),
            batch_shadows: file.batch_shadows.unwrap_or(defaults.batch_shadows),
            parallel_culling_threshold: file
                .parallel_culling_threshold
                .unwrap_or(defaults.parallel_culling_threshold),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "ConfigFile")]
pub struct SubmissionConfig {
    pub shadow: PathConfig,
    pub main: PathConfig,
    pub ui: PathConfig,
    /// Cluster shadow casters into instanced draws like the main path does.
    pub batch_shadows: bool,
    /// Main path record count from which frustum tests run on the rayon pool.
    pub parallel_culling_threshold: usize,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            shadow: PathConfig::new(1024, 1024),
            main: PathConfig::new(1024, 1024),
            ui: PathConfig::new(64, 64),
            batch_shadows: false,
            parallel_culling_threshold: 4096,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid submission config")]
    Parse(#[from] toml::de::Error),
}

impl SubmissionConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&source)
    }

    pub fn path(&self, path: RenderPath) -> &PathConfig {
        match path {
            RenderPath::Shadow => &self.shadow,
            RenderPath::Main => &self.main,
            RenderPath::Ui => &self.ui,
        }
    }
}

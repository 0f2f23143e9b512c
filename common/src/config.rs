use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub toolpath: ToolpathConfig,
    pub optimizer: OptimizerConfig,
}

/// How a planar slicer's G-code is read. The defaults match the comment and
/// command conventions Cura emits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolpathConfig {
    /// Used when no `;Layer height:` header comment is present.
    pub default_layer_height: f64,
    /// Upper bound on the number of wall/skin moves inspected when locating
    /// the reference corner.
    pub max_reference_moves: usize,
    pub first_layer_marker: String,
    pub region_marker: String,
    /// Line prefixes whose X/Y parameters feed the reference corner.
    pub reference_prefixes: Vec<String>,
    pub motion_prefix: String,
    pub control_prefixes: Vec<String>,
    pub homing_command: String,
    /// Written as a comment below the offset and layer height directives.
    pub provenance: String,
}

/// Settings forwarded to the external CurviSlicer optimizer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub bin_dir: Option<PathBuf>,
    pub volumic: bool,
    pub nozzle_diameter: f32,
    pub layer_height: f32,
    pub filament_diameter: f32,
    pub ironing: bool,
    pub timeout_secs: u64,
    pub result_file: String,
}

impl Config {
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                warn!("Failed to load config, using defaults: {err:#}");
                Config::default()
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        Ok(if path.exists() {
            let string = fs::read_to_string(path)
                .with_context(|| format!("Failed to read `{}`", path.display()))?;
            let config = toml::from_str(&string)
                .with_context(|| format!("Invalid config file `{}`", path.display()))?;
            info!("Successfully loaded config file");
            config
        } else {
            info!("No config file found, using defaults");
            Self::default()
        })
    }
}

impl OptimizerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ToolpathConfig {
    fn default() -> Self {
        Self {
            default_layer_height: 0.2,
            max_reference_moves: 100,
            first_layer_marker: ";LAYER:0".into(),
            region_marker: ";TYPE:".into(),
            reference_prefixes: vec!["G0 ".into(), "G1 ".into()],
            motion_prefix: "G".into(),
            control_prefixes: vec!["M".into()],
            homing_command: "G28".into(),
            provenance: "Converted from Cura (skirt/brim removed)".into(),
        }
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            bin_dir: None,
            volumic: false,
            nozzle_diameter: 0.4,
            layer_height: 0.3,
            filament_diameter: 1.75,
            ironing: false,
            timeout_secs: 300,
            result_file: "after.stl".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[toolpath]\nmax_reference_moves = 10\n\n[optimizer]\ntimeout_secs = 5\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.toolpath.max_reference_moves, 10);
        assert_eq!(config.toolpath.default_layer_height, 0.2);
        assert_eq!(config.optimizer.timeout(), Duration::from_secs(5));
        assert_eq!(config.optimizer.result_file, "after.stl");
    }

    #[test]
    fn invalid_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "toolpath = 5").unwrap();

        assert!(Config::load(&path).is_err());
        assert_eq!(Config::load_or_default(&path), Config::default());
    }
}

//! # Engine Configuration
//!
//! Tunables for the world pipeline and streaming, loadable from JSON. Every
//! field has a default, so a config file only needs the fields it changes.
//!
//! ```
//! use voxel_world::EngineConfig;
//!
//! let config = EngineConfig::from_json_str(r#"{ "streaming_radius": 4 }"#).unwrap();
//! assert_eq!(config.streaming_radius, 4);
//! assert_eq!(config.max_uploads_per_frame, 4);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine_state::rendering::meshing::MesherKind;
use crate::engine_state::voxels::generation::GeneratorConfig;
use crate::error::{Result, VoxelError};

/// Environment variable the driver reads the config file path from.
pub const CONFIG_PATH_ENV: &str = "VOXEL_WORLD_CONFIG";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Chunks kept loaded on each side of the reference chunk, along x and z.
    pub streaming_radius: i32,
    /// Upper bound on mesh uploads per `World::update`.
    pub max_uploads_per_frame: usize,
    /// Worker threads for generation and meshing; 0 runs them inline.
    pub worker_threads: usize,
    /// The chunk y layer that gets streamed.
    pub vertical_layer: i32,
    pub generator: GeneratorConfig,
    pub mesher: MesherKind,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            streaming_radius: 10,
            max_uploads_per_frame: 4,
            worker_threads: 0,
            vertical_layer: 0,
            generator: GeneratorConfig::default(),
            mesher: MesherKind::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Loads the file named by [`CONFIG_PATH_ENV`], or the defaults when it is unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => {
                log::info!("Loading configuration from {}", Path::new(&path).display());
                Self::load(path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.streaming_radius < 0 {
            return Err(VoxelError::InvalidConfig(format!(
                "streaming_radius must not be negative, got {}",
                self.streaming_radius
            )));
        }
        if self.max_uploads_per_frame == 0 {
            return Err(VoxelError::InvalidConfig(
                "max_uploads_per_frame must be at least 1".to_string(),
            ));
        }
        self.generator.validate()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.streaming_radius, 10);
        assert_eq!(config.worker_threads, 0);
        assert_eq!(config.mesher, MesherKind::Culled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json_str(
            r#"{ "worker_threads": 3, "mesher": "stupid", "generator": { "kind": "flat" } }"#,
        )
        .unwrap();
        assert_eq!(config.worker_threads, 3);
        assert_eq!(config.mesher, MesherKind::Stupid);
        assert_eq!(config.generator, GeneratorConfig::Flat);
        assert_eq!(config.streaming_radius, 10);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            EngineConfig::from_json_str(r#"{ "max_uploads_per_frame": 0 }"#),
            Err(VoxelError::InvalidConfig(_))
        ));
        assert!(matches!(
            EngineConfig::from_json_str(r#"{ "streaming_radius": -1 }"#),
            Err(VoxelError::InvalidConfig(_))
        ));
        assert!(matches!(
            EngineConfig::from_json_str("{ not json"),
            Err(VoxelError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("voxel-world-config-{}.json", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, r#"{{ "vertical_layer": -2 }}"#).unwrap();
        drop(file);

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.vertical_layer, -2);
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(EngineConfig::load(&path), Err(VoxelError::ConfigIo(_))));
    }
}

// Data-driven generation settings.
//
// `ContinuationConfig` holds the generation parameters plus an optional RNG
// seed, loaded from JSON. Every field has a default, so a config file only
// needs the values it changes. The CLI reads a config file first and then
// applies its flags on top.
//
// With a fixed seed, the same config and input always produce the same
// output.

use crate::error::Result;
use crate::generate::GenerateParams;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContinuationConfig {
    #[serde(flatten)]
    pub params: GenerateParams,
    /// Seed for the generator's RNG. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl ContinuationConfig {
    /// Settings the piano-roll front end uses for its Markov option:
    /// 1/96 s grid, 20% variation, strict chords, no online learning.
    pub fn piano_roll() -> Self {
        ContinuationConfig {
            params: GenerateParams::default().with_variation(0.2),
            seed: None,
        }
    }

    /// Loosened chords with online learning: long, self-reinforcing runs.
    pub fn exploratory() -> Self {
        ContinuationConfig {
            params: GenerateParams::default()
                .with_variation(0.2)
                .with_loosen(true)
                .with_include_new(true),
            seed: None,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ContinuationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn validate(&self) -> Result<()> {
        self.params.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::TempDir;

    #[test]
    fn default_config_serializes() {
        let config = ContinuationConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let restored: ContinuationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, restored);
        assert!(json.contains("\"tick\""));
        assert!(json.contains("\"seed\":null"));
    }

    #[test]
    fn config_loads_from_json_string() {
        let config = ContinuationConfig::from_json_str(
            r#"{"extend_duration": 8.0, "variation": 0.5, "loosen": true, "seed": 42}"#,
        )
        .unwrap();
        assert_eq!(config.params.extend_duration, 8.0);
        assert_eq!(config.params.variation, 0.5);
        assert!(config.params.loosen);
        assert!(!config.params.include_new);
        assert_eq!(config.params.tick, 1.0 / 96.0);
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn empty_object_is_the_default() {
        let config = ContinuationConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ContinuationConfig::default());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = ContinuationConfig::from_json_str(r#"{"variation": 1.5}"#).unwrap_err();
        assert!(err.is_invalid_argument());
        let err = ContinuationConfig::from_json_str(r#"{"tick": 0}"#).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(ContinuationConfig::from_json_str("not json").is_err());
    }

    #[test]
    fn presets_are_valid() {
        assert!(ContinuationConfig::piano_roll().validate().is_ok());
        assert_eq!(ContinuationConfig::piano_roll().params.variation, 0.2);
        let exploratory = ContinuationConfig::exploratory();
        assert!(exploratory.validate().is_ok());
        assert!(exploratory.params.loosen && exploratory.params.include_new);
    }

    #[test]
    fn load_reads_a_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"tick": 0.25, "extend_duration": 4.0}"#).unwrap();
        let config = ContinuationConfig::load(&path).unwrap();
        assert_eq!(config.params.tick, 0.25);
        assert_eq!(config.params.extend_duration, 4.0);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = ContinuationConfig::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}

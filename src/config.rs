// src/config.rs

use crate::types::Config;
use anyhow::Result;
use std::fs;
use std::path::Path;

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_config() {
        let yaml = "fusion:\n  iou_threshold: 0.5\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.fusion.iou_threshold, 0.5);
        // Unspecified sections fall back to defaults
        assert_eq!(config.detectors.capsule.seed, 42);
        assert_eq!(config.ensemble.fused_weight, 0.5);
    }

    #[test]
    fn test_default_config_round_trips() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.fusion.iou_threshold, config.fusion.iou_threshold);
        assert_eq!(
            parsed.detectors.yolo.latency_ms,
            config.detectors.yolo.latency_ms
        );
    }
}

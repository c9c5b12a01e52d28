// src/types.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub detectors: DetectorsConfig,
    #[serde(default)]
    pub fusion: FusionConfig,
    #[serde(default)]
    pub ensemble: EnsembleWeights,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorsConfig {
    #[serde(default = "DetectorConfig::capsule_default")]
    pub capsule: DetectorConfig,
    #[serde(default = "DetectorConfig::yolo_default")]
    pub yolo: DetectorConfig,
}

impl Default for DetectorsConfig {
    fn default() -> Self {
        Self {
            capsule: DetectorConfig::capsule_default(),
            yolo: DetectorConfig::yolo_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Simulated model-load time in milliseconds
    pub load_ms: u64,
    /// Simulated per-inference latency in milliseconds
    pub latency_ms: u64,
    /// RNG seed for reproducible simulated detections
    pub seed: u64,
    /// Probability that an inference call yields any detections
    pub detection_rate: f64,
    /// Set false to simulate a missing model asset
    #[serde(default = "default_true")]
    pub available: bool,
}

fn default_true() -> bool {
    true
}

impl DetectorConfig {
    pub fn capsule_default() -> Self {
        Self {
            load_ms: 200,
            latency_ms: 150,
            seed: 42,
            detection_rate: 0.3,
            available: true,
        }
    }

    pub fn yolo_default() -> Self {
        Self {
            load_ms: 180,
            latency_ms: 30,
            seed: 7,
            detection_rate: 0.7,
            available: true,
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::capsule_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionConfig {
    /// Minimum IoU for two detections to be treated as the same object
    pub iou_threshold: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self { iou_threshold: 0.3 }
    }
}

/// Relative trust in each confidence source when computing the
/// ensemble-level confidence score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsembleWeights {
    pub detector_weights: BTreeMap<String, f64>,
    pub fused_weight: f64,
}

impl Default for EnsembleWeights {
    fn default() -> Self {
        let mut detector_weights = BTreeMap::new();
        detector_weights.insert("capsule-net".to_string(), 0.6);
        detector_weights.insert("yolo".to_string(), 0.4);
        Self {
            detector_weights,
            fused_weight: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: "output".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Decoded RGBA raster handed to the engine by the acquisition layer
#[derive(Debug, Clone)]
pub struct ImageFrame {
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

impl ImageFrame {
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> Self {
        Self {
            data,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    pub length: f64,
    pub width: f64,
    pub area: f64,
    pub volume: f64,
    pub perimeter: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Composition {
    #[serde(rename = "type")]
    pub kind: String,
    pub probability: f64,
    pub density: f64,
    pub hardness: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Morphology {
    pub shape: String,
    pub surface: String,
    pub texture: String,
    pub irregularity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub anatomical: String,
    pub coordinates: Point,
    pub depth: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    pub fn rank(&self) -> u8 {
        match self {
            Severity::Low => 1,
            Severity::Medium => 2,
            Severity::High => 3,
            Severity::Critical => 4,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub severity: Severity,
    /// Urgency on a 1-10 scale
    pub urgency: u8,
    pub complications: Vec<String>,
}

/// A single detector's output for one candidate stone.
///
/// Records are immutable once produced: fusion allocates new records and
/// never mutates its inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoneDetection {
    pub detected: bool,
    /// Detector certainty in [0, 100]
    pub confidence: f64,
    pub bounding_box: BoundingBox,
    pub measurements: Measurements,
    pub composition: Composition,
    pub morphology: Morphology,
    pub location: Location,
    pub risk_assessment: RiskAssessment,
}

/// Outcome of one full ensemble analysis pass
#[derive(Debug, Clone, Serialize)]
pub struct EnsembleReport {
    pub detected: bool,
    pub fused: Vec<StoneDetection>,
    pub per_detector: BTreeMap<String, Vec<StoneDetection>>,
    pub overall_confidence: f64,
    pub elapsed_ms: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_rank_ordering() {
        assert!(Severity::Critical.rank() > Severity::High.rank());
        assert!(Severity::High.rank() > Severity::Medium.rank());
        assert!(Severity::Medium.rank() > Severity::Low.rank());
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        let json = serde_json::to_string(&Severity::Critical).unwrap();
        assert_eq!(json, "\"critical\"");
    }

    #[test]
    fn test_composition_type_field_rename() {
        let composition = Composition {
            kind: "Uric Acid".to_string(),
            probability: 90.0,
            density: 1400.0,
            hardness: 4.0,
        };
        let json = serde_json::to_string(&composition).unwrap();
        assert!(json.contains("\"type\":\"Uric Acid\""));
    }

    #[test]
    fn test_default_ensemble_weights() {
        let weights = EnsembleWeights::default();
        assert_eq!(weights.detector_weights.get("capsule-net"), Some(&0.6));
        assert_eq!(weights.detector_weights.get("yolo"), Some(&0.4));
        assert_eq!(weights.fused_weight, 0.5);
    }

    #[test]
    fn test_empty_frame() {
        let frame = ImageFrame::new(Vec::new(), 0, 0);
        assert!(frame.is_empty());
    }
}

// src/detectors/yolo.rs

use crate::detector::Detector;
use crate::error::{EngineError, Result};
use crate::preprocessing;
use crate::types::{
    BoundingBox, Composition, DetectorConfig, ImageFrame, Location, Measurements, Morphology,
    Point, RiskAssessment, Severity, StoneDetection,
};
use async_trait::async_trait;
use rand::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

const YOLO_INPUT_SIZE: usize = 416;

const COMPOSITION_TYPES: [&str; 3] = ["Calcium Oxalate", "Uric Acid", "Calcium Phosphate"];
const SHAPES: [&str; 3] = ["Irregular", "Oval", "Angular"];
const SURFACES: [&str; 3] = ["Rough", "Smooth", "Crystalline"];
const TEXTURES: [&str; 2] = ["Heterogeneous", "Homogeneous"];
const ANATOMICAL_SITES: [&str; 3] = ["Kidney", "Ureter", "Bladder"];
const COMPLICATIONS: [&str; 2] = ["Obstruction", "Pain"];
const SEVERITIES: [Severity; 3] = [Severity::Low, Severity::Medium, Severity::High];

/// Low-latency, lower-precision detector.
///
/// Stands in for a single-shot YOLO model: one coarse candidate per
/// frame at most, confidence 88-98, fast turnaround.
pub struct YoloDetector {
    config: DetectorConfig,
    ready: AtomicBool,
}

impl YoloDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            ready: AtomicBool::new(false),
        }
    }

    fn run_inference(&self, input: &ImageFrame) -> Vec<StoneDetection> {
        let mut rng = StdRng::seed_from_u64(self.config.seed);

        if rng.gen::<f64>() >= self.config.detection_rate {
            return Vec::new();
        }

        let detection = self.synthesize(&mut rng, input);
        debug!("YOLO produced 1 detection");
        vec![detection]
    }

    fn synthesize(&self, rng: &mut StdRng, input: &ImageFrame) -> StoneDetection {
        StoneDetection {
            detected: true,
            confidence: 88.0 + rng.gen::<f64>() * 10.0,
            bounding_box: BoundingBox {
                x: rng.gen_range(100.0..300.0),
                y: rng.gen_range(100.0..300.0),
                width: rng.gen_range(50.0..150.0),
                height: rng.gen_range(50.0..150.0),
            },
            measurements: {
                let radius: f64 = rng.gen_range(1.5..5.5);
                Measurements {
                    length: rng.gen_range(3.0..13.0),
                    width: rng.gen_range(2.0..9.0),
                    area: std::f64::consts::PI * rng.gen::<f64>() * 30.0 + 10.0,
                    volume: 4.0 / 3.0 * std::f64::consts::PI * radius.powi(3),
                    perimeter: 2.0 * std::f64::consts::PI * rng.gen_range(2.5..7.5),
                }
            },
            composition: Composition {
                kind: COMPOSITION_TYPES[rng.gen_range(0..COMPOSITION_TYPES.len())].to_string(),
                probability: 82.0 + rng.gen::<f64>() * 16.0,
                density: rng.gen_range(1100.0..2000.0),
                hardness: rng.gen_range(2.5..7.0),
            },
            morphology: Morphology {
                shape: SHAPES[rng.gen_range(0..SHAPES.len())].to_string(),
                surface: SURFACES[rng.gen_range(0..SURFACES.len())].to_string(),
                texture: TEXTURES[rng.gen_range(0..TEXTURES.len())].to_string(),
                irregularity: rng.gen_range(0.1..1.0),
            },
            location: Location {
                anatomical: ANATOMICAL_SITES[rng.gen_range(0..ANATOMICAL_SITES.len())].to_string(),
                coordinates: Point {
                    x: rng.gen::<f64>() * input.width as f64,
                    y: rng.gen::<f64>() * input.height as f64,
                },
                depth: rng.gen_range(15.0..55.0),
            },
            risk_assessment: RiskAssessment {
                severity: SEVERITIES[rng.gen_range(0..SEVERITIES.len())],
                urgency: rng.gen_range(1..=8),
                complications: COMPLICATIONS
                    .iter()
                    .filter(|_| rng.gen::<f64>() > 0.6)
                    .map(|c| c.to_string())
                    .collect(),
            },
        }
    }
}

#[async_trait]
impl Detector for YoloDetector {
    fn name(&self) -> &'static str {
        "yolo"
    }

    async fn initialize(&self) -> Result<()> {
        if !self.config.available {
            return Err(EngineError::ModelUnavailable(
                "yolo model assets missing".to_string(),
            ));
        }

        sleep(Duration::from_millis(self.config.load_ms)).await;
        self.ready.store(true, Ordering::Release);
        info!("✓ YOLO detector ready");
        Ok(())
    }

    async fn detect(&self, image: &ImageFrame) -> Result<Vec<StoneDetection>> {
        if !self.ready.load(Ordering::Acquire) {
            return Err(EngineError::NotInitialized);
        }

        let input = preprocessing::enhance(image, YOLO_INPUT_SIZE, YOLO_INPUT_SIZE);
        sleep(Duration::from_millis(self.config.latency_ms)).await;

        Ok(self.run_inference(&input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> DetectorConfig {
        DetectorConfig {
            load_ms: 0,
            latency_ms: 0,
            seed: 7,
            detection_rate: 1.0,
            available: true,
        }
    }

    fn test_frame() -> ImageFrame {
        ImageFrame::new(vec![128u8; 64 * 64 * 4], 64, 64)
    }

    #[tokio::test]
    async fn test_detect_before_initialize_fails() {
        let detector = YoloDetector::new(test_config());
        let err = detector.detect(&test_frame()).await.unwrap_err();
        assert!(matches!(err, EngineError::NotInitialized));
    }

    #[tokio::test]
    async fn test_at_most_one_detection_per_frame() {
        let detector = YoloDetector::new(test_config());
        detector.initialize().await.unwrap();

        let detections = detector.detect(&test_frame()).await.unwrap();
        assert_eq!(detections.len(), 1);
    }

    #[tokio::test]
    async fn test_detections_satisfy_record_invariants() {
        let detector = YoloDetector::new(test_config());
        detector.initialize().await.unwrap();

        let detections = detector.detect(&test_frame()).await.unwrap();
        for d in &detections {
            assert!(d.confidence >= 88.0 && d.confidence <= 98.0);
            assert!(d.bounding_box.width > 0.0 && d.bounding_box.height > 0.0);
            assert!(d.composition.probability <= 100.0);
            assert!(d.morphology.irregularity >= 0.0 && d.morphology.irregularity <= 1.0);
        }
    }

    #[tokio::test]
    async fn test_detections_are_deterministic_under_seed() {
        let detector = YoloDetector::new(test_config());
        detector.initialize().await.unwrap();

        let first = detector.detect(&test_frame()).await.unwrap();
        let second = detector.detect(&test_frame()).await.unwrap();
        assert_eq!(first.len(), second.len());
        if let (Some(a), Some(b)) = (first.first(), second.first()) {
            assert_eq!(a.confidence, b.confidence);
            assert_eq!(a.bounding_box, b.bounding_box);
        }
    }
}

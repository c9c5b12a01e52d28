// src/detectors/capsule.rs

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

const CAPSULE_INPUT_SIZE: usize = 512;

const COMPOSITION_TYPES: [&str; 6] = [
    "Calcium Oxalate Monohydrate",
    "Calcium Oxalate Dihydrate",
    "Uric Acid",
    "Calcium Phosphate",
    "Struvite",
    "Cystine",
];
const SHAPES: [&str; 5] = ["Oval", "Irregular", "Spiculated", "Round", "Elongated"];
const SURFACES: [&str; 4] = ["Smooth", "Rough", "Crystalline", "Jagged"];
const TEXTURES: [&str; 3] = ["Homogeneous", "Heterogeneous", "Layered"];
const ANATOMICAL_SITES: [&str; 5] = [
    "Renal Pelvis",
    "Upper Calyx",
    "Middle Calyx",
    "Lower Calyx",
    "Ureteropelvic Junction",
];
const COMPLICATIONS: [&str; 3] = ["Hydronephrosis", "Infection", "Renal Colic"];
const SEVERITIES: [Severity; 4] = [
    Severity::Low,
    Severity::Medium,
    Severity::High,
    Severity::Critical,
];

/// High-precision, high-latency detector.
///
/// Stands in for a capsule-network model: real inference is out of scope,
/// so detections are synthesized from a seeded RNG with the value ranges
/// the full model would produce (confidence 92-99, up to three stones per
/// image).
pub struct CapsuleNetDetector {
    config: DetectorConfig,
    ready: AtomicBool,
}

impl CapsuleNetDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            ready: AtomicBool::new(false),
        }
    }

    fn run_inference(&self, input: &ImageFrame) -> Vec<StoneDetection> {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut detections = Vec::new();

        if rng.gen::<f64>() >= self.config.detection_rate {
            return detections;
        }

        let count = rng.gen_range(1..=3);
        for _ in 0..count {
            detections.push(self.synthesize(&mut rng, input));
        }

        debug!("Capsule network produced {} detection(s)", detections.len());
        detections
    }

    fn synthesize(&self, rng: &mut StdRng, input: &ImageFrame) -> StoneDetection {
        StoneDetection {
            detected: true,
            confidence: 92.0 + rng.gen::<f64>() * 7.0,
            bounding_box: BoundingBox {
                x: rng.gen_range(100.0..400.0),
                y: rng.gen_range(100.0..400.0),
                width: rng.gen_range(40.0..120.0),
                height: rng.gen_range(40.0..120.0),
            },
            measurements: {
                let radius: f64 = rng.gen_range(1.0..4.0);
                Measurements {
                    length: rng.gen_range(2.0..14.0),
                    width: rng.gen_range(1.5..9.5),
                    area: std::f64::consts::PI * rng.gen::<f64>() * 25.0 + 5.0,
                    volume: 4.0 / 3.0 * std::f64::consts::PI * radius.powi(3),
                    perimeter: 2.0 * std::f64::consts::PI * rng.gen_range(2.0..6.0),
                }
            },
            composition: Composition {
                kind: COMPOSITION_TYPES[rng.gen_range(0..COMPOSITION_TYPES.len())].to_string(),
                probability: 85.0 + rng.gen::<f64>() * 14.0,
                density: rng.gen_range(1200.0..2000.0),
                hardness: rng.gen_range(3.0..7.0),
            },
            morphology: Morphology {
                shape: SHAPES[rng.gen_range(0..SHAPES.len())].to_string(),
                surface: SURFACES[rng.gen_range(0..SURFACES.len())].to_string(),
                texture: TEXTURES[rng.gen_range(0..TEXTURES.len())].to_string(),
                irregularity: rng.gen_range(0.2..1.0),
            },
            location: Location {
                anatomical: ANATOMICAL_SITES[rng.gen_range(0..ANATOMICAL_SITES.len())].to_string(),
                coordinates: Point {
                    x: rng.gen::<f64>() * input.width as f64,
                    y: rng.gen::<f64>() * input.height as f64,
                },
                depth: rng.gen_range(10.0..60.0),
            },
            risk_assessment: RiskAssessment {
                severity: SEVERITIES[rng.gen_range(0..SEVERITIES.len())],
                urgency: rng.gen_range(1..=10),
                complications: COMPLICATIONS
                    .iter()
                    .filter(|_| rng.gen::<f64>() > 0.7)
                    .map(|c| c.to_string())
                    .collect(),
            },
        }
    }
}

#[async_trait]
impl Detector for CapsuleNetDetector {
    fn name(&self) -> &'static str {
        "capsule-net"
    }

    async fn initialize(&self) -> Result<()> {
        if !self.config.available {
            return Err(EngineError::ModelUnavailable(
                "capsule-net model assets missing".to_string(),
            ));
        }

        sleep(Duration::from_millis(self.config.load_ms)).await;
        self.ready.store(true, Ordering::Release);
        info!("✓ Capsule network detector ready");
        Ok(())
    }

    async fn detect(&self, image: &ImageFrame) -> Result<Vec<StoneDetection>> {
        if !self.ready.load(Ordering::Acquire) {
            return Err(EngineError::NotInitialized);
        }

        let input = preprocessing::enhance(image, CAPSULE_INPUT_SIZE, CAPSULE_INPUT_SIZE);
        sleep(Duration::from_millis(self.config.latency_ms)).await;

        Ok(self.run_inference(&input))
    }
}

// src/ensemble.rs
//
// Fan-out/fan-in orchestration: every registered detector runs
// concurrently over the same frame, the join is fail-fast, and grouping,
// fusion and confidence aggregation run synchronously afterwards.

use crate::confidence::overall_confidence;
use crate::detector::Detector;
use crate::error::{EngineError, Result};
use crate::fusion::{fuse_cluster, group_overlapping};
use crate::types::{Config, EnsembleReport, ImageFrame, StoneDetection};
use futures::future::try_join_all;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Owns the detector instances and runs the full ensemble pass.
///
/// Constructed once; `initialize` must succeed before `analyze` is
/// callable. Detectors share only the read-only input frame, so the join
/// needs no locking.
pub struct EnsembleEngine {
    detectors: Vec<Arc<dyn Detector>>,
    config: Config,
    initialized: AtomicBool,
}

impl EnsembleEngine {
    /// Engine with the stock detector pair (capsule network + YOLO)
    pub fn new(config: Config) -> Self {
        let detectors: Vec<Arc<dyn Detector>> = vec![
            Arc::new(crate::detectors::CapsuleNetDetector::new(
                config.detectors.capsule.clone(),
            )),
            Arc::new(crate::detectors::YoloDetector::new(
                config.detectors.yolo.clone(),
            )),
        ];
        Self::with_detectors(config, detectors)
    }

    /// Engine over an arbitrary detector set; the fusion logic is
    /// agnostic to how many there are
    pub fn with_detectors(config: Config, detectors: Vec<Arc<dyn Detector>>) -> Self {
        Self {
            detectors,
            config,
            initialized: AtomicBool::new(false),
        }
    }

    pub fn detector_count(&self) -> usize {
        self.detectors.len()
    }

    /// Initialize every detector concurrently. Any failure aborts the
    /// whole call and the engine stays unusable.
    pub async fn initialize(&self) -> Result<()> {
        info!("Initializing {} detector(s)", self.detectors.len());

        try_join_all(self.detectors.iter().map(|d| d.initialize())).await?;

        self.initialized.store(true, Ordering::Release);
        info!("✓ All detectors ready");
        Ok(())
    }

    /// Run the full ensemble analysis over one frame.
    ///
    /// All detectors run concurrently; if any of them fails, the whole
    /// call fails and partial results are discarded. Grouping and fusion
    /// run after the join, synchronously.
    pub async fn analyze(&self, image: &ImageFrame) -> Result<EnsembleReport> {
        if !self.initialized.load(Ordering::Acquire) {
            return Err(EngineError::NotInitialized);
        }

        let start = Instant::now();

        let raw_results = try_join_all(self.detectors.iter().map(|d| d.detect(image))).await?;

        let mut per_detector = BTreeMap::new();
        let mut combined: Vec<StoneDetection> = Vec::new();
        for (detector, detections) in self.detectors.iter().zip(raw_results) {
            debug!(
                "{} returned {} detection(s)",
                detector.name(),
                detections.len()
            );
            combined.extend(detections.iter().cloned());
            per_detector.insert(detector.name().to_string(), detections);
        }

        let clusters = group_overlapping(&combined, self.config.fusion.iou_threshold);
        let fused: Vec<StoneDetection> = clusters
            .iter()
            .filter_map(|cluster| fuse_cluster(cluster))
            .collect();

        let overall = overall_confidence(&per_detector, &fused, &self.config.ensemble);
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        info!(
            "Ensemble analysis: {} raw detection(s) → {} fused, overall confidence {:.1} ({:.1} ms)",
            combined.len(),
            fused.len(),
            overall,
            elapsed_ms
        );

        Ok(EnsembleReport {
            detected: !fused.is_empty(),
            fused,
            per_detector,
            overall_confidence: overall,
            elapsed_ms,
        })
    }
}

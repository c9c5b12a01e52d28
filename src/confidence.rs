// src/confidence.rs
//
// Ensemble-level confidence: one scalar summarizing how much the analysis
// as a whole is trusted, on the same [0, 100] scale as the detectors.

use crate::types::{EnsembleWeights, StoneDetection};
use std::collections::BTreeMap;

/// Mean confidence over a detection list; 0 for an empty list
pub fn mean_confidence(detections: &[StoneDetection]) -> f64 {
    if detections.is_empty() {
        return 0.0;
    }
    let sum: f64 = detections.iter().map(|d| d.confidence).sum();
    sum / detections.len() as f64
}

/// Weighted combination of per-detector average confidences and the
/// post-fusion average confidence.
///
/// Each registered detector contributes its average under the weight
/// configured for its name; a name absent from the weight map contributes
/// weight 0. An empty fused list means nothing was detected and scores 0.
pub fn overall_confidence(
    per_detector: &BTreeMap<String, Vec<StoneDetection>>,
    fused: &[StoneDetection],
    weights: &EnsembleWeights,
) -> f64 {
    if fused.is_empty() {
        return 0.0;
    }

    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;

    for (name, detections) in per_detector {
        let weight = weights.detector_weights.get(name).copied().unwrap_or(0.0);
        weighted_sum += mean_confidence(detections) * weight;
        total_weight += weight;
    }

    weighted_sum += mean_confidence(fused) * weights.fused_weight;
    total_weight += weights.fused_weight;

    if total_weight <= 0.0 {
        return 0.0;
    }

    weighted_sum / total_weight
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        BoundingBox, Composition, Location, Measurements, Morphology, Point, RiskAssessment,
        Severity,
    };
    use approx::assert_relative_eq;

    fn detection(confidence: f64) -> StoneDetection {
        StoneDetection {
            detected: true,
            confidence,
            bounding_box: BoundingBox {
                x: 100.0,
                y: 100.0,
                width: 50.0,
                height: 50.0,
            },
            measurements: Measurements {
                length: 6.0,
                width: 4.0,
                area: 20.0,
                volume: 50.0,
                perimeter: 16.0,
            },
            composition: Composition {
                kind: "Uric Acid".to_string(),
                probability: 88.0,
                density: 1400.0,
                hardness: 4.0,
            },
            morphology: Morphology {
                shape: "Round".to_string(),
                surface: "Smooth".to_string(),
                texture: "Homogeneous".to_string(),
                irregularity: 0.2,
            },
            location: Location {
                anatomical: "Ureter".to_string(),
                coordinates: Point { x: 120.0, y: 130.0 },
                depth: 20.0,
            },
            risk_assessment: RiskAssessment {
                severity: Severity::Low,
                urgency: 3,
                complications: Vec::new(),
            },
        }
    }

    #[test]
    fn test_mean_confidence_empty_is_zero() {
        assert_eq!(mean_confidence(&[]), 0.0);
    }

    #[test]
    fn test_mean_confidence() {
        let list = vec![detection(80.0), detection(90.0)];
        assert_relative_eq!(mean_confidence(&list), 85.0);
    }

    #[test]
    fn test_overall_confidence_example_weights() {
        // avg(A)=90, avg(B)=80, avg(fused)=88 with weights 0.6/0.4/0.5
        // -> (90*0.6 + 80*0.4 + 88*0.5) / 1.5 = 86.0
        let mut per_detector = BTreeMap::new();
        per_detector.insert("capsule-net".to_string(), vec![detection(90.0)]);
        per_detector.insert("yolo".to_string(), vec![detection(80.0)]);
        let fused = vec![detection(88.0)];

        let overall = overall_confidence(&per_detector, &fused, &EnsembleWeights::default());
        assert_relative_eq!(overall, 86.0, epsilon = 1e-9);
    }

    #[test]
    fn test_overall_confidence_empty_fused_is_zero() {
        let mut per_detector = BTreeMap::new();
        per_detector.insert("capsule-net".to_string(), vec![detection(95.0)]);
        per_detector.insert("yolo".to_string(), Vec::new());

        let overall = overall_confidence(&per_detector, &[], &EnsembleWeights::default());
        assert_eq!(overall, 0.0);
    }

    #[test]
    fn test_unweighted_detector_contributes_nothing() {
        let mut per_detector = BTreeMap::new();
        per_detector.insert("capsule-net".to_string(), vec![detection(90.0)]);
        per_detector.insert("experimental".to_string(), vec![detection(10.0)]);
        let fused = vec![detection(90.0)];

        let overall = overall_confidence(&per_detector, &fused, &EnsembleWeights::default());
        // (90*0.6 + 90*0.5) / 1.1 = 90
        assert_relative_eq!(overall, 90.0, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_detector_list_drags_average_down() {
        // A detector that found nothing still carries its weight
        let mut per_detector = BTreeMap::new();
        per_detector.insert("capsule-net".to_string(), Vec::new());
        per_detector.insert("yolo".to_string(), vec![detection(90.0)]);
        let fused = vec![detection(90.0)];

        let overall = overall_confidence(&per_detector, &fused, &EnsembleWeights::default());
        // (0*0.6 + 90*0.4 + 90*0.5) / 1.5 = 54
        assert_relative_eq!(overall, 54.0, epsilon = 1e-9);
    }
}

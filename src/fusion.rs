// src/fusion.rs
//
// Ensemble fusion core: overlap grouping + confidence-weighted fusion.
// Both passes are pure; they read detection records and allocate new ones.

use crate::types::{BoundingBox, StoneDetection};
use tracing::debug;

/// Intersection-over-Union of two axis-aligned boxes.
///
/// Non-overlapping boxes (intersection width or height <= 0) score 0.0.
pub fn iou(a: &BoundingBox, b: &BoundingBox) -> f64 {
    let x1 = a.x.max(b.x);
    let y1 = a.y.max(b.y);
    let x2 = (a.x + a.width).min(b.x + b.width);
    let y2 = (a.y + a.height).min(b.y + b.height);

    if x2 <= x1 || y2 <= y1 {
        return 0.0;
    }

    let intersection = (x2 - x1) * (y2 - y1);
    let union = a.area() + b.area() - intersection;

    intersection / union
}

/// Partition detections into clusters of mutually overlapping records.
///
/// Single-pass greedy clustering over the input order: each unmarked
/// record seeds a new cluster and absorbs every later unmarked record
/// whose IoU with the seed exceeds `iou_threshold`. A record joins the
/// first seed it overlaps sufficiently with, not necessarily its best
/// match. Every input record lands in exactly one cluster; no cluster is
/// empty; empty input yields no clusters.
pub fn group_overlapping(
    detections: &[StoneDetection],
    iou_threshold: f64,
) -> Vec<Vec<StoneDetection>> {
    let mut groups = Vec::new();
    let mut used = vec![false; detections.len()];

    for i in 0..detections.len() {
        if used[i] {
            continue;
        }

        let mut group = vec![detections[i].clone()];
        used[i] = true;

        for j in (i + 1)..detections.len() {
            if used[j] {
                continue;
            }

            let overlap = iou(&detections[i].bounding_box, &detections[j].bounding_box);
            if overlap > iou_threshold {
                group.push(detections[j].clone());
                used[j] = true;
            }
        }

        groups.push(group);
    }

    if groups.len() < detections.len() {
        debug!(
            "Grouped {} detections into {} clusters",
            detections.len(),
            groups.len()
        );
    }

    groups
}

/// Collapse one cluster into a single consensus detection.
///
/// Numeric fields (confidence, bounding box, measurements) are averaged
/// with each record's own confidence as its weight. Categorical
/// sub-structures come wholesale from the highest-confidence member,
/// first on ties in cluster order. A cluster with zero total confidence
/// weight falls back to an unweighted mean rather than dividing by zero.
///
/// Returns `None` only for an empty cluster, which overlap grouping
/// never produces.
pub fn fuse_cluster(cluster: &[StoneDetection]) -> Option<StoneDetection> {
    let (first, rest) = cluster.split_first()?;

    let total_weight: f64 = cluster.iter().map(|d| d.confidence).sum();
    let degenerate = total_weight <= 0.0;
    if degenerate {
        debug!(
            "Cluster of {} has zero total confidence; using unweighted mean",
            cluster.len()
        );
    }

    let denom = if degenerate {
        cluster.len() as f64
    } else {
        total_weight
    };
    let wmean = |field: fn(&StoneDetection) -> f64| -> f64 {
        cluster
            .iter()
            .map(|d| field(d) * if degenerate { 1.0 } else { d.confidence })
            .sum::<f64>()
            / denom
    };

    // Highest individual confidence wins the categorical fields; strict
    // comparison keeps the first record on ties.
    let mut best = first;
    for d in rest {
        if d.confidence > best.confidence {
            best = d;
        }
    }

    Some(StoneDetection {
        detected: true,
        confidence: wmean(|d| d.confidence),
        bounding_box: BoundingBox {
            x: wmean(|d| d.bounding_box.x),
            y: wmean(|d| d.bounding_box.y),
            width: wmean(|d| d.bounding_box.width),
            height: wmean(|d| d.bounding_box.height),
        },
        measurements: crate::types::Measurements {
            length: wmean(|d| d.measurements.length),
            width: wmean(|d| d.measurements.width),
            area: wmean(|d| d.measurements.area),
            volume: wmean(|d| d.measurements.volume),
            perimeter: wmean(|d| d.measurements.perimeter),
        },
        composition: best.composition.clone(),
        morphology: best.morphology.clone(),
        location: best.location.clone(),
        risk_assessment: best.risk_assessment.clone(),
    })
}

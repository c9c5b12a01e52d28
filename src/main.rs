// src/main.rs

use anyhow::Result;
use std::path::Path;
use stone_detection::types::{Config, EnsembleReport, ImageFrame};
use stone_detection::EnsembleEngine;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let (config, config_source) = match Config::load("config.yaml") {
        Ok(config) => (config, "config.yaml"),
        Err(_) => (Config::default(), "built-in defaults"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("stone_detection={}", config.logging.level))
        .init();

    info!("🩺 Kidney Stone Ensemble Analyzer Starting");
    info!("✓ Configuration loaded ({})", config_source);
    info!(
        "Fusion config: iou_threshold={:.2}, fused_weight={:.2}",
        config.fusion.iou_threshold, config.ensemble.fused_weight
    );

    let engine = EnsembleEngine::new(config.clone());
    info!("Loading {} detector model(s)...", engine.detector_count());
    engine.initialize().await?;

    let frame = synthetic_frame(512, 512);
    info!(
        "Analyzing synthetic frame ({}x{} RGBA)",
        frame.width, frame.height
    );

    let report = engine.analyze(&frame).await?;

    if report.detected {
        info!("🔍 {} stone(s) detected", report.fused.len());
        for (idx, stone) in report.fused.iter().enumerate() {
            info!(
                "  #{}: {:.1}% at ({:.0},{:.0}) {:.0}x{:.0}px | {} | severity: {}",
                idx + 1,
                stone.confidence,
                stone.bounding_box.x,
                stone.bounding_box.y,
                stone.bounding_box.width,
                stone.bounding_box.height,
                stone.composition.kind,
                stone.risk_assessment.severity
            );
        }
    } else {
        info!("✓ No stones detected");
    }

    for (name, detections) in &report.per_detector {
        info!("  {} raw detections: {}", name, detections.len());
    }
    info!(
        "Overall confidence: {:.1} | Processing time: {:.1} ms",
        report.overall_confidence, report.elapsed_ms
    );

    save_report(&report, &config.output.dir)?;

    Ok(())
}

/// Radial-gradient stand-in for a decoded ultrasound capture
fn synthetic_frame(width: usize, height: usize) -> ImageFrame {
    let mut data = vec![0u8; width * height * 4];
    let cx = width as f64 / 2.0;
    let cy = height as f64 / 2.0;
    let max_dist = (cx * cx + cy * cy).sqrt();

    for y in 0..height {
        for x in 0..width {
            let dx = x as f64 - cx;
            let dy = y as f64 - cy;
            let value = (255.0 * (1.0 - (dx * dx + dy * dy).sqrt() / max_dist)).round() as u8;
            let idx = (y * width + x) * 4;
            data[idx] = value;
            data[idx + 1] = value;
            data[idx + 2] = value;
            data[idx + 3] = 255;
        }
    }

    ImageFrame::new(data, width, height)
}

fn save_report(report: &EnsembleReport, output_dir: &str) -> Result<()> {
    use std::io::Write;

    std::fs::create_dir_all(output_dir)?;
    let path = Path::new(output_dir).join("analyses.jsonl");
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)?;

    let json_line = serde_json::to_string(report)?;
    writeln!(file, "{}", json_line)?;
    file.flush()?;
    info!("💾 Analysis saved to {}", path.display());
    Ok(())
}

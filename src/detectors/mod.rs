// src/detectors/mod.rs

pub mod capsule;
pub mod yolo;

pub use capsule::CapsuleNetDetector;
pub use yolo::YoloDetector;

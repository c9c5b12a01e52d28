// src/detector.rs

use crate::error::Result;
use crate::types::{ImageFrame, StoneDetection};
use async_trait::async_trait;

/// A pluggable detection source.
///
/// The engine is agnostic to how many detectors are registered or how
/// they produce their records; any real model can stand in for the
/// simulated ones without touching the fusion logic.
#[async_trait]
pub trait Detector: Send + Sync {
    /// Stable identifier, used as the key for per-detector results and
    /// ensemble weights
    fn name(&self) -> &'static str;

    /// Load model assets. Must complete successfully before `detect` is
    /// callable; fails with `EngineError::ModelUnavailable` otherwise.
    async fn initialize(&self) -> Result<()>;

    /// Run inference over one image. The input is never mutated; an
    /// empty list is a valid result. Fails with
    /// `EngineError::NotInitialized` before a successful `initialize`.
    async fn detect(&self, image: &ImageFrame) -> Result<Vec<StoneDetection>>;
}

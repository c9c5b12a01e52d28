// src/error.rs
//
// Engine error taxonomy. A failed analysis is always distinguishable from
// a successful analysis that found nothing.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// A detector failed to load its model assets; analysis cannot proceed
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// `analyze`/`detect` called before a successful `initialize`
    #[error("engine not initialized")]
    NotInitialized,

    /// A detector's inference call failed mid-analysis
    #[error("detector {name} failed: {message}")]
    Detector { name: &'static str, message: String },
}

pub type Result<T> = std::result::Result<T, EngineError>;

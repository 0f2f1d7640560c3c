//! Extraction of parsed archives onto the filesystem.

pub mod atomic;
pub mod engine;
pub mod stream;

pub use engine::ExtractionEngine;

//! Process-level engine setup.
//!
//! This module builds the converter registry once at start-up, optionally
//! with a headless GPU device, and hands it to every data object it creates.
//! There is no global registry; tests and tools build their own engine.

mod config;
mod engine;

pub use config::EngineConfig;
pub use engine::Engine;

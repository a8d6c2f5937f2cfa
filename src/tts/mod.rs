//! Text-to-speech proxy
//!
//! Forwards synthesis to the voice provider and attaches per-word timings,
//! either from the optional alignment provider or a fixed per-word estimate.

pub mod client;
pub mod timing;

pub use client::{Speech, TtsProxy};
pub use timing::{TimingSource, WordTiming, WordTimings};

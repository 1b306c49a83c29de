//! Audio module - tone generation and queued playback
//!
//! This module provides:
//! - Pure sine tone generator
//! - Double-buffered streaming player
//! - cpal-backed output device and playback source

mod device;
mod error;
mod player;
mod source;
mod tone;

// Re-export public types
pub use device::{DeviceSource, OutputDevice};
pub use error::AudioError;
pub use player::StreamingPlayer;
pub use tone::ToneGenerator;

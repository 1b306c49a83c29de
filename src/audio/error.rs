//! Audio error types

use thiserror::Error;

/// Errors surfaced while acquiring the output device or running a stream.
#[derive(Debug, Error)]
pub enum AudioError {
    /// No output device is available on the default host.
    #[error("no audio output device available")]
    DeviceUnavailable,

    #[error("failed to query output config: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start playback: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    /// The device reports a sample format the callback doesn't handle.
    #[error("unsupported sample format: {0:?}")]
    UnsupportedFormat(cpal::SampleFormat),
}

//! Sine tone generation
//!
//! The generator is a pure function of the absolute sample index, so a
//! buffer refill that starts where the previous one ended continues the
//! waveform without a phase discontinuity.

use std::f32::consts::TAU;

/// Full-scale amplitude for 16-bit output.
const FULL_SCALE: f32 = 32767.0;

/// Fixed-frequency sine wave generator producing signed 16-bit samples.
#[derive(Clone, Copy, Debug)]
pub struct ToneGenerator {
    /// Tone frequency in Hz
    pub frequency: f32,
    /// Linear gain applied before quantization (0.0 to 1.0)
    pub volume: f32,
}

impl Default for ToneGenerator {
    fn default() -> Self {
        Self::new(440.0)
    }
}

impl ToneGenerator {
    /// Create a generator at the given frequency with unity gain.
    pub fn new(frequency: f32) -> Self {
        Self {
            frequency,
            volume: 1.0,
        }
    }

    /// Set the linear gain, clamped to 0.0..=1.0.
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume.clamp(0.0, 1.0);
        self
    }

    /// Compute the sample at an absolute sample index.
    fn sample(&self, sample_number: i64, sample_rate: u32) -> i16 {
        let phase = TAU * self.frequency * sample_number as f32 / sample_rate as f32;
        (phase.sin() * self.volume * FULL_SCALE)
            .round()
            .clamp(-FULL_SCALE, FULL_SCALE) as i16
    }

    /// Fill `out` with consecutive samples starting at `start_sample`.
    ///
    /// `sample_rate` must be positive; the output for a zero or negative
    /// rate is unspecified.
    pub fn fill(&self, out: &mut [i16], start_sample: i64, sample_rate: u32) {
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.sample(start_sample + i as i64, sample_rate);
        }
    }

    /// Generate `count` consecutive samples starting at `start_sample`.
    pub fn generate(&self, start_sample: i64, count: usize, sample_rate: u32) -> Vec<i16> {
        let mut out = vec![0i16; count];
        self.fill(&mut out, start_sample, sample_rate);
        out
    }
}

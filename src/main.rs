//! tonestream - Streaming sine tone demo
//!
//! Generates a fixed-frequency sine wave and streams it to the default
//! audio output device through a double-buffered queue: two 16000-sample
//! blocks are kept in flight, and a 60 Hz driver loop refills whatever the
//! device has finished playing.

use std::thread;
use std::time::{Duration, Instant};

mod audio;
mod settings;

use audio::{AudioError, DeviceSource, OutputDevice, StreamingPlayer, ToneGenerator};
use settings::Settings;

/// Driver loop cadence in ticks per second
const TICK_RATE: u32 = 60;

/// Host-facing playback controls.
///
/// Owns the output device and a nullable player slot; the driver loop
/// ticks whichever player currently occupies the slot.
struct App {
    device: OutputDevice,
    settings: Settings,
    player: Option<StreamingPlayer<DeviceSource>>,
}

impl App {
    fn new(device: OutputDevice, settings: Settings) -> Self {
        Self {
            device,
            settings,
            player: None,
        }
    }

    /// Tear down any existing player and start a fresh one.
    fn start_play(&mut self) {
        self.stop_play();

        let tone =
            ToneGenerator::new(self.settings.frequency).with_volume(self.settings.volume);
        let mut player = StreamingPlayer::new(tone);
        let device = &self.device;
        match player.play(self.settings.sample_rate, |rate| {
            DeviceSource::new(device, rate)
        }) {
            Ok(()) => self.player = Some(player),
            Err(e) => log::error!("Failed to start playback: {}", e),
        }
    }

    /// Tear down the current player, stopping playback via destruction.
    fn stop_play(&mut self) {
        self.player = None;
    }

    /// One driver tick: refill drained buffers on the active player.
    fn tick(&mut self) {
        if let Some(player) = self.player.as_mut() {
            player.process();
        }
    }
}

fn main() -> Result<(), AudioError> {
    env_logger::init();
    log::info!("Starting tonestream");

    let settings = Settings::load();
    let device = OutputDevice::open()?;
    let mut app = App::new(device, settings);

    app.start_play();

    // Fixed-cadence driver loop; process() never blocks, so sleeping out
    // the remainder of each tick keeps the cadence steady.
    let tick = Duration::from_secs(1) / TICK_RATE;
    let ticks = app.settings.duration_secs * TICK_RATE;
    let mut next = Instant::now() + tick;
    for _ in 0..ticks {
        app.tick();

        let now = Instant::now();
        if next > now {
            thread::sleep(next - now);
        }
        next += tick;
    }

    app.stop_play();
    app.settings.save();
    log::info!("Done");
    Ok(())
}

//! cpal-backed output device and playback source
//!
//! `OutputDevice` wraps device acquisition; `DeviceSource` is one playback
//! voice built on a cpal output stream. The audio callback pulls mono
//! samples from the queued blocks and duplicates them across the device's
//! channels. Exhausted blocks are handed back to the control thread through
//! a lock-free ring buffer so the callback never waits on the player.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use ringbuf::{
    traits::{Consumer, Producer, Split},
    HeapRb,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::error::AudioError;
use super::player::BUFFER_COUNT;
use super::source::{PlaybackSource, QueuedBlock};

type DrainedProducer = ringbuf::HeapProd<QueuedBlock>;
type DrainedConsumer = ringbuf::HeapCons<QueuedBlock>;

/// The default output device and its preferred configuration.
pub struct OutputDevice {
    device: cpal::Device,
    config: cpal::SupportedStreamConfig,
}

impl OutputDevice {
    /// Acquire the default output device of the default host.
    pub fn open() -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::DeviceUnavailable)?;

        let name = device.name().unwrap_or_else(|_| "Unknown".to_string());
        let config = device.default_output_config()?;
        log::info!("Using output device: {} ({:?})", name, config);

        Ok(Self { device, config })
    }
}

/// Queued blocks shared with the audio callback.
///
/// `pos` is the read position within the front block.
#[derive(Default)]
struct QueueState {
    blocks: VecDeque<QueuedBlock>,
    pos: usize,
}

/// One playback voice backed by a cpal output stream.
///
/// Created fresh for each playback run and dropped on stop; the stream is
/// requested at the playback sample rate, so no resampling happens here.
pub struct DeviceSource {
    stream: cpal::Stream,
    playing: Arc<AtomicBool>,
    queue: Arc<Mutex<QueueState>>,
    drained: DrainedConsumer,
}

impl DeviceSource {
    /// Build a paused source on `output` at the given sample rate.
    pub fn new(output: &OutputDevice, sample_rate: u32) -> Result<Self, AudioError> {
        let channels = output.config.channels() as usize;
        let stream_config = cpal::StreamConfig {
            channels: output.config.channels(),
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let queue = Arc::new(Mutex::new(QueueState::default()));
        let playing = Arc::new(AtomicBool::new(false));

        // Capacity exceeds the number of blocks in flight, so the callback's
        // push can never fail.
        let rb = HeapRb::<QueuedBlock>::new(BUFFER_COUNT * 2);
        let (producer, consumer) = rb.split();

        let stream = match output.config.sample_format() {
            cpal::SampleFormat::F32 => build_stream::<f32>(
                &output.device,
                &stream_config,
                channels,
                Arc::clone(&queue),
                producer,
                Arc::clone(&playing),
            )?,
            cpal::SampleFormat::I16 => build_stream::<i16>(
                &output.device,
                &stream_config,
                channels,
                Arc::clone(&queue),
                producer,
                Arc::clone(&playing),
            )?,
            cpal::SampleFormat::U16 => build_stream::<u16>(
                &output.device,
                &stream_config,
                channels,
                Arc::clone(&queue),
                producer,
                Arc::clone(&playing),
            )?,
            format => return Err(AudioError::UnsupportedFormat(format)),
        };

        Ok(Self {
            stream,
            playing,
            queue,
            drained: consumer,
        })
    }
}

impl PlaybackSource for DeviceSource {
    fn queue(&mut self, block: QueuedBlock) {
        self.queue.lock().unwrap().blocks.push_back(block);
    }

    fn unqueue(&mut self) -> Option<QueuedBlock> {
        self.drained.try_pop()
    }

    fn play(&mut self) -> Result<(), AudioError> {
        self.playing.store(true, Ordering::Relaxed);
        self.stream.play()?;
        Ok(())
    }

    fn stop(&mut self) {
        self.playing.store(false, Ordering::Relaxed);
        if let Err(e) = self.stream.pause() {
            log::warn!("Failed to pause stream: {}", e);
        }
        let mut state = self.queue.lock().unwrap();
        state.blocks.clear();
        state.pos = 0;
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    queue: Arc<Mutex<QueueState>>,
    mut drained: DrainedProducer,
    playing: Arc<AtomicBool>,
) -> Result<cpal::Stream, AudioError>
where
    T: SizedSample + FromSample<i16>,
{
    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            write_output(data, channels, &playing, &queue, &mut drained);
        },
        |err| log::error!("Audio stream error: {}", err),
        None,
    )?;
    Ok(stream)
}

/// Fill one callback buffer from the queued blocks.
fn write_output<T: SizedSample + FromSample<i16>>(
    data: &mut [T],
    channels: usize,
    playing: &AtomicBool,
    queue: &Mutex<QueueState>,
    drained: &mut DrainedProducer,
) {
    if !playing.load(Ordering::Relaxed) {
        silence(data);
        return;
    }

    // try_lock so the callback never blocks on the control thread
    let mut guard = match queue.try_lock() {
        Ok(guard) => guard,
        Err(_) => {
            silence(data);
            return;
        }
    };
    let state = &mut *guard;

    for frame in data.chunks_mut(channels) {
        // An empty queue plays silence; underruns are not reported.
        let value = T::from_sample(next_sample(state, drained));
        for channel in frame.iter_mut() {
            *channel = value;
        }
    }
}

/// Pop the next mono sample, retiring exhausted blocks as drained.
fn next_sample(state: &mut QueueState, drained: &mut DrainedProducer) -> i16 {
    loop {
        match state.blocks.front() {
            None => return 0,
            Some(block) if state.pos < block.samples.len() => {
                let sample = block.samples[state.pos];
                state.pos += 1;
                return sample;
            }
            Some(_) => {
                if let Some(block) = state.blocks.pop_front() {
                    state.pos = 0;
                    let _ = drained.try_push(block);
                }
            }
        }
    }
}

fn silence<T: Sample>(data: &mut [T]) {
    for sample in data.iter_mut() {
        *sample = T::EQUILIBRIUM;
    }
}

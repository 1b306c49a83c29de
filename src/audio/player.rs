//! Streaming player - double-buffered queue playback
//!
//! The player keeps exactly two sample blocks in flight. On `play` both
//! are filled and queued; on every driver tick `process` refills whatever
//! the device has drained and queues it back at the tail. The absolute
//! sample cursor ties consecutive fills together so the tone is continuous
//! across block boundaries.

use super::error::AudioError;
use super::source::{PlaybackSource, QueuedBlock};
use super::tone::ToneGenerator;

/// Number of blocks kept in flight.
pub const BUFFER_COUNT: usize = 2;

/// Mono samples per block (~363 ms at 44100 Hz).
pub const BUFFER_LEN: usize = 16000;

/// Double-buffered streaming tone player.
///
/// `Idle` when `source` is `None`, `Playing` otherwise. The source is
/// created fresh on each `play` and released on `stop`; there is no
/// partial reuse of a previous voice.
pub struct StreamingPlayer<S: PlaybackSource> {
    tone: ToneGenerator,
    source: Option<S>,
    sample_rate: u32,
    cursor: i64,
}

impl<S: PlaybackSource> StreamingPlayer<S> {
    pub fn new(tone: ToneGenerator) -> Self {
        Self {
            tone,
            source: None,
            sample_rate: 0,
            cursor: 0,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.source.is_some()
    }

    /// Absolute index of the next sample to be generated.
    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    /// Start playback at `sample_rate`.
    ///
    /// A fresh source is obtained from `make_source`, the cursor resets to
    /// zero, both blocks are filled and queued in slot order, and the
    /// source starts playing. No-op if already playing.
    pub fn play(
        &mut self,
        sample_rate: u32,
        make_source: impl FnOnce(u32) -> Result<S, AudioError>,
    ) -> Result<(), AudioError> {
        if self.source.is_some() {
            return Ok(());
        }

        let mut source = make_source(sample_rate)?;
        self.sample_rate = sample_rate;
        self.cursor = 0;

        for id in 0..BUFFER_COUNT {
            let mut samples = vec![0i16; BUFFER_LEN];
            self.tone.fill(&mut samples, self.cursor, self.sample_rate);
            self.cursor += BUFFER_LEN as i64;
            source.queue(QueuedBlock { id, samples });
        }

        source.play()?;
        self.source = Some(source);
        log::info!("Playback started at {} Hz", sample_rate);
        Ok(())
    }

    /// Halt playback and release the source. No-op when idle.
    pub fn stop(&mut self) {
        if let Some(mut source) = self.source.take() {
            source.stop();
            log::info!("Playback stopped");
        }
    }

    /// Refill-on-drain step, invoked once per driver tick.
    ///
    /// Each drained block is refilled from the current cursor and queued
    /// back at the tail, in the order the device reported them. No-op when
    /// idle or when nothing has drained.
    pub fn process(&mut self) {
        let Some(source) = self.source.as_mut() else {
            return;
        };

        while let Some(mut block) = source.unqueue() {
            self.tone
                .fill(&mut block.samples, self.cursor, self.sample_rate);
            self.cursor += block.samples.len() as i64;
            source.queue(block);
        }
    }
}

impl<S: PlaybackSource> Drop for StreamingPlayer<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::source::BufferId;
    use std::collections::VecDeque;

    /// In-memory playback voice for driving the player without a device.
    #[derive(Default)]
    struct MockSource {
        queued: VecDeque<QueuedBlock>,
        drained: VecDeque<QueuedBlock>,
        playing: bool,
        stop_calls: usize,
    }

    impl MockSource {
        /// Mark the front queued block as finished playing.
        fn drain_front(&mut self) {
            let block = self.queued.pop_front().expect("no block queued");
            self.drained.push_back(block);
        }

        fn queued_ids(&self) -> Vec<BufferId> {
            self.queued.iter().map(|b| b.id).collect()
        }
    }

    impl PlaybackSource for MockSource {
        fn queue(&mut self, block: QueuedBlock) {
            self.queued.push_back(block);
        }

        fn unqueue(&mut self) -> Option<QueuedBlock> {
            self.drained.pop_front()
        }

        fn play(&mut self) -> Result<(), AudioError> {
            self.playing = true;
            Ok(())
        }

        fn stop(&mut self) {
            self.playing = false;
            self.stop_calls += 1;
        }
    }

    fn playing_player() -> StreamingPlayer<MockSource> {
        let mut player = StreamingPlayer::new(ToneGenerator::new(440.0));
        player
            .play(44100, |_| Ok(MockSource::default()))
            .expect("play failed");
        player
    }

    #[test]
    fn test_play_fills_both_buffers() {
        let mut player = playing_player();
        assert!(player.is_playing());
        assert_eq!(player.cursor(), 2 * BUFFER_LEN as i64);

        let tone = ToneGenerator::new(440.0);
        let source = player.source.as_ref().unwrap();
        assert_eq!(source.queued_ids(), vec![0, 1]);
        assert!(source.playing);
        assert_eq!(
            source.queued[0].samples,
            tone.generate(0, BUFFER_LEN, 44100)
        );
        assert_eq!(
            source.queued[1].samples,
            tone.generate(BUFFER_LEN as i64, BUFFER_LEN, 44100)
        );
    }

    #[test]
    fn test_play_while_playing_is_noop() {
        let mut player = playing_player();
        let cursor = player.cursor();

        player
            .play(22050, |_| panic!("source factory must not run"))
            .expect("redundant play failed");

        assert_eq!(player.cursor(), cursor);
        assert_eq!(player.sample_rate, 44100);
    }

    #[test]
    fn test_process_refills_drained_block() {
        let mut player = playing_player();
        player.source.as_mut().unwrap().drain_front();

        player.process();

        let tone = ToneGenerator::new(440.0);
        let source = player.source.as_ref().unwrap();
        // Slot 0 went back to the tail with the next chunk of the tone.
        assert_eq!(source.queued_ids(), vec![1, 0]);
        assert_eq!(
            source.queued[1].samples,
            tone.generate(2 * BUFFER_LEN as i64, BUFFER_LEN, 44100)
        );
        assert_eq!(player.cursor(), 3 * BUFFER_LEN as i64);
    }

    #[test]
    fn test_process_without_drain_changes_nothing() {
        let mut player = playing_player();
        let cursor = player.cursor();

        player.process();

        assert_eq!(player.cursor(), cursor);
        assert_eq!(player.source.as_ref().unwrap().queued_ids(), vec![0, 1]);
    }

    #[test]
    fn test_process_while_idle_is_noop() {
        let mut player: StreamingPlayer<MockSource> =
            StreamingPlayer::new(ToneGenerator::new(440.0));
        player.process();
        assert!(!player.is_playing());
        assert_eq!(player.cursor(), 0);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut player = playing_player();
        player.stop();
        assert!(!player.is_playing());

        // Second stop has nothing to release.
        player.stop();
        assert!(!player.is_playing());
    }

    #[test]
    fn test_stop_then_play_reinitializes() {
        let mut player = playing_player();
        player.source.as_mut().unwrap().drain_front();
        player.process();
        player.stop();

        player
            .play(22050, |_| Ok(MockSource::default()))
            .expect("play failed");

        let tone = ToneGenerator::new(440.0);
        let source = player.source.as_ref().unwrap();
        assert_eq!(player.cursor(), 2 * BUFFER_LEN as i64);
        assert_eq!(player.sample_rate, 22050);
        assert_eq!(
            source.queued[0].samples,
            tone.generate(0, BUFFER_LEN, 22050)
        );
    }

    #[test]
    fn test_multiple_drains_handled_in_order() {
        let mut player = playing_player();
        {
            let source = player.source.as_mut().unwrap();
            source.drain_front();
            source.drain_front();
        }

        player.process();

        let tone = ToneGenerator::new(440.0);
        let source = player.source.as_ref().unwrap();
        assert_eq!(source.queued_ids(), vec![0, 1]);
        assert_eq!(
            source.queued[0].samples,
            tone.generate(2 * BUFFER_LEN as i64, BUFFER_LEN, 44100)
        );
        assert_eq!(
            source.queued[1].samples,
            tone.generate(3 * BUFFER_LEN as i64, BUFFER_LEN, 44100)
        );
        assert_eq!(player.cursor(), 4 * BUFFER_LEN as i64);
    }

    #[test]
    fn test_drop_stops_source() {
        let mut player = playing_player();
        player.stop();
        // Dropping an idle player must not call stop again.
        drop(player);
    }
}

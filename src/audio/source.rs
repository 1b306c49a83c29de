//! Playback source abstraction
//!
//! A source is one playback voice with a FIFO queue of sample blocks.
//! Blocks handed to `queue` are owned by the source until the device has
//! finished playing them; `unqueue` returns drained blocks, in the order
//! they finished, for the caller to refill and re-queue.

use crate::audio::error::AudioError;

/// Identifies one of the player's buffer slots.
pub type BufferId = usize;

/// One queued chunk of mono 16-bit samples.
#[derive(Debug)]
pub struct QueuedBlock {
    pub id: BufferId,
    pub samples: Vec<i16>,
}

/// A playback voice with an ordered queue of sample blocks.
pub trait PlaybackSource {
    /// Append a block to the tail of the playback queue.
    fn queue(&mut self, block: QueuedBlock);

    /// Take the next drained block, if any. Blocks come back in the order
    /// the device finished them; no reordering.
    fn unqueue(&mut self) -> Option<QueuedBlock>;

    /// Begin playing queued blocks.
    fn play(&mut self) -> Result<(), AudioError>;

    /// Halt playback. Queued blocks are discarded.
    fn stop(&mut self);
}

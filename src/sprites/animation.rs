//! Frame sequences and the per-instance animation clock.

use serde::Deserialize;

/// One named animation clip: an ordered list of tile indices played at a
/// fixed rate. Immutable once loaded from a descriptor.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FrameSequence {
    /// Tile indices into the owning sheet's grid, in play order.
    pub frames: Vec<u32>,
    /// How long each frame is displayed, in seconds.
    pub seconds_per_frame: f32,
}

impl FrameSequence {
    pub fn new(frames: Vec<u32>, seconds_per_frame: f32) -> Self {
        Self {
            frames,
            seconds_per_frame,
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Checked by the descriptor loader; sequences that fail this never
    /// reach the clock.
    pub fn is_valid(&self) -> bool {
        !self.frames.is_empty() && self.seconds_per_frame > 0.0
    }
}

/// Per-sprite animation clock, persistent across frames.
///
/// Sequences loop indefinitely by wraparound; the caller mutates this once
/// per frame and the renderer never touches it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AnimationState {
    timer: f32,
    cursor: usize,
}

impl AnimationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate `dt` seconds and advance the cursor by however many whole
    /// frame periods have elapsed. Returns true if the cursor moved.
    ///
    /// Catch-up after a stall is a single jump of `floor(timer / spf)`
    /// steps, so the cursor always agrees with wall-clock elapsed time to
    /// within one frame period no matter how `dt` was split across calls.
    pub fn advance(&mut self, dt: f32, sequence: &FrameSequence) -> bool {
        debug_assert!(sequence.is_valid());
        if sequence.frames.is_empty() {
            return false;
        }

        self.timer += dt;

        let spf = sequence.seconds_per_frame;
        if self.timer < spf {
            return false;
        }

        let steps = (self.timer / spf) as usize;
        self.cursor = (self.cursor + steps) % sequence.frames.len();
        self.timer -= steps as f32 * spf;
        true
    }

    /// Tile index the sprite should display right now.
    pub fn current_tile(&self, sequence: &FrameSequence) -> u32 {
        sequence.frames[self.cursor.min(sequence.frames.len() - 1)]
    }

    /// Position within the sequence.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Rewind to the first frame. Call when switching a sprite to a
    /// different sequence.
    pub fn reset(&mut self) {
        self.timer = 0.0;
        self.cursor = 0;
    }
}

// src/processing/mod.rs

/// Where one source channel's block lands in the device quantum.
#[derive(Clone, Copy, Debug)]
pub struct MixBlock<'a> {
    /// Resampled input. When the block ends the quantum, `data[len]` must
    /// also be readable: it is the first sample of the next block and feeds
    /// the click prediction.
    pub data: &'a [f32],
    /// Source channel being mixed.
    pub channel: usize,
    /// Bus frame the first sample is written to.
    pub out_pos: usize,
    /// Samples to mix from `data`.
    pub len: usize,
    /// Length of the device quantum.
    pub samples_to_do: usize,
}

impl<'a> MixBlock<'a> {
    pub fn new(
        data: &'a [f32],
        channel: usize,
        out_pos: usize,
        len: usize,
        samples_to_do: usize,
    ) -> Self {
        debug_assert!(out_pos + len <= samples_to_do);
        debug_assert!(len <= data.len());
        Self {
            data,
            channel,
            out_pos,
            len,
            samples_to_do,
        }
    }

    /// A block covering the whole quantum, starting at frame 0.
    pub fn full(data: &'a [f32], channel: usize, samples_to_do: usize) -> Self {
        Self::new(data, channel, 0, samples_to_do, samples_to_do)
    }

    #[inline(always)]
    pub fn starts_quantum(&self) -> bool {
        self.out_pos == 0
    }

    #[inline(always)]
    pub fn ends_quantum(&self) -> bool {
        self.out_pos + self.len == self.samples_to_do
    }
}

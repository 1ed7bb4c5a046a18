//! HRTF convolution state.
//!
//! Each source channel owns an [`HrirRing`]: a fixed power-of-two ring of
//! stereo accumulators. Every input sample adds its whole impulse response
//! into the ring starting at the current offset, so by the time the offset
//! has moved past a slot, that slot holds the fully convolved output for it.
//! The caller drains the slot and clears the one that is about to receive
//! the last tap of the next sample.

pub mod convolve;

#[cfg(test)]
mod tests;

pub use convolve::{apply_coeffs, apply_coeffs_step};

use crate::config::{HRIR_LENGTH, MAX_INPUT_CHANNELS, SRC_HISTORY_LENGTH};

/// A (left, right) pair.
pub type StereoFrame = [f32; 2];

/// Circular accumulation buffer addressed with `offset & (N - 1)`.
#[derive(Clone, Debug)]
pub struct HrirRing<const N: usize = HRIR_LENGTH> {
    frames: [StereoFrame; N],
}

impl<const N: usize> HrirRing<N> {
    const MASK: usize = {
        assert!(N.is_power_of_two(), "ring length must be a power of two");
        N - 1
    };

    pub fn new() -> Self {
        let _ = Self::MASK;
        Self {
            frames: [[0.0; 2]; N],
        }
    }

    pub fn len(&self) -> usize {
        N
    }

    pub fn is_empty(&self) -> bool {
        N == 0
    }

    pub fn clear(&mut self) {
        self.frames.fill([0.0; 2]);
    }

    #[inline(always)]
    pub fn get(&self, offset: u32) -> StereoFrame {
        self.frames[offset as usize & Self::MASK]
    }

    #[inline(always)]
    pub fn clear_frame(&mut self, offset: u32) {
        self.frames[offset as usize & Self::MASK] = [0.0; 2];
    }

    pub fn frames(&self) -> &[StereoFrame] {
        &self.frames
    }

    pub fn frames_mut(&mut self) -> &mut [StereoFrame] {
        &mut self.frames
    }
}

impl<const N: usize> Default for HrirRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Filter targets for one source channel, written by the spatializer.
///
/// `coeffs` and `delay` hold the response the channel is gliding *toward*.
/// The response actually rendered `counter` samples before the glide ends is
/// `coeffs - coeff_step * counter`, and likewise for the delays.
#[derive(Clone, Debug)]
pub struct HrtfChannelParams {
    pub coeffs: [StereoFrame; HRIR_LENGTH],
    pub coeff_step: [StereoFrame; HRIR_LENGTH],
    /// Per-ear delay in 12.20 fixed point samples.
    pub delay: [u32; 2],
    pub delay_step: [i32; 2],
}

impl Default for HrtfChannelParams {
    fn default() -> Self {
        Self {
            coeffs: [[0.0; 2]; HRIR_LENGTH],
            coeff_step: [[0.0; 2]; HRIR_LENGTH],
            delay: [0; 2],
            delay_step: [0; 2],
        }
    }
}

impl HrtfChannelParams {
    /// Jumps straight to a response with no glide.
    pub fn set(&mut self, coeffs: &[StereoFrame], delay: [u32; 2]) {
        self.coeffs[..coeffs.len()].copy_from_slice(coeffs);
        self.coeffs[coeffs.len()..].fill([0.0; 2]);
        self.coeff_step.fill([0.0; 2]);
        self.delay = delay;
        self.delay_step = [0; 2];
    }

    /// Writes the response in effect `counter` samples before the current
    /// glide completes into `out[..ir_size]`.
    #[inline]
    pub fn coeffs_at(&self, ir_size: usize, counter: u32, out: &mut [StereoFrame]) {
        let counter = counter as f32;
        for ((dst, target), step) in out[..ir_size]
            .iter_mut()
            .zip(&self.coeffs[..ir_size])
            .zip(&self.coeff_step[..ir_size])
        {
            dst[0] = target[0] - step[0] * counter;
            dst[1] = target[1] - step[1] * counter;
        }
    }

    #[inline]
    pub fn delay_at(&self, counter: u32) -> [u32; 2] {
        [0, 1].map(|ear| {
            self.delay[ear].wrapping_sub(self.delay_step[ear].wrapping_mul(counter as i32) as u32)
        })
    }

    /// Starts a glide from wherever the channel currently is toward a new
    /// response, reaching it after exactly `steps` rendered samples.
    ///
    /// `counter` is the glide counter still pending in the source's
    /// [`HrtfState`]. Returns the counter to store back there. With
    /// `steps == 0` the new response takes effect immediately.
    pub fn retarget(
        &mut self,
        ir_size: usize,
        counter: u32,
        target: &[StereoFrame],
        target_delay: [u32; 2],
        steps: u32,
    ) -> u32 {
        if steps == 0 {
            self.set(&target[..ir_size], target_delay);
            return 0;
        }

        let mut current = [[0.0f32; 2]; HRIR_LENGTH];
        self.coeffs_at(ir_size, counter, &mut current);
        let current_delay = self.delay_at(counter);

        let scale = 1.0 / steps as f32;
        for i in 0..ir_size {
            for ear in 0..2 {
                self.coeff_step[i][ear] = (target[i][ear] - current[i][ear]) * scale;
                self.coeffs[i][ear] = target[i][ear];
            }
        }
        self.coeffs[ir_size..].fill([0.0; 2]);
        self.coeff_step[ir_size..].fill([0.0; 2]);

        for ear in 0..2 {
            let span = target_delay[ear] as i64 - current_delay[ear] as i64;
            self.delay_step[ear] = (span / steps as i64) as i32;
            self.delay[ear] = target_delay[ear];
        }
        steps
    }
}

/// Filter targets for every channel of a source.
#[derive(Clone, Debug)]
pub struct HrtfParams {
    /// Taps in use out of each `HRIR_LENGTH` array.
    pub ir_size: usize,
    pub channels: [HrtfChannelParams; MAX_INPUT_CHANNELS],
}

impl HrtfParams {
    pub fn new(ir_size: usize) -> Self {
        debug_assert!(ir_size <= HRIR_LENGTH);
        Self {
            ir_size,
            channels: std::array::from_fn(|_| HrtfChannelParams::default()),
        }
    }
}

/// Per-channel render state: the filtered input history that the ear delays
/// read from, and the convolution ring.
#[derive(Clone, Debug)]
pub struct HrtfChannelState {
    pub(crate) history: [f32; SRC_HISTORY_LENGTH],
    pub(crate) values: HrirRing,
}

impl Default for HrtfChannelState {
    fn default() -> Self {
        Self {
            history: [0.0; SRC_HISTORY_LENGTH],
            values: HrirRing::new(),
        }
    }
}

impl HrtfChannelState {
    pub fn ring(&self) -> &HrirRing {
        &self.values
    }

    pub fn history(&self) -> &[f32; SRC_HISTORY_LENGTH] {
        &self.history
    }
}

/// HRTF state owned by one playing source.
#[derive(Clone, Debug)]
pub struct HrtfState {
    pub channels: [HrtfChannelState; MAX_INPUT_CHANNELS],
    /// Samples left in the current coefficient glide, counted from the start
    /// of the quantum.
    pub counter: u32,
    /// Write cursor shared by every channel's ring and history.
    pub offset: u32,
    /// False until the source has rendered a quantum. A source that is not
    /// moving yet should have its response set directly, not glided to.
    pub moving: bool,
}

impl Default for HrtfState {
    fn default() -> Self {
        Self::new()
    }
}

impl HrtfState {
    pub fn new() -> Self {
        Self {
            channels: std::array::from_fn(|_| HrtfChannelState::default()),
            counter: 0,
            offset: 0,
            moving: false,
        }
    }

    pub fn reset(&mut self) {
        for channel in &mut self.channels {
            channel.history.fill(0.0);
            channel.values.clear();
        }
        self.counter = 0;
        self.offset = 0;
        self.moving = false;
        log::debug!("hrtf state reset");
    }

    /// Commits a rendered block once every channel of the source has been
    /// mixed with the same `out_pos`.
    pub fn advance(&mut self, out_pos: usize) {
        let out_pos = out_pos as u32;
        self.offset = self.offset.wrapping_add(out_pos);
        self.counter = self.counter.max(out_pos) - out_pos;
        self.moving = true;
    }
}

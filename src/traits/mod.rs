use crate::bus::OutputBus;
use crate::hrtf::{HrtfState, StereoFrame};
use crate::mixer::{direct, hrtf, DirectParams};
use crate::processing::MixBlock;

/// A mixing backend.
///
/// Backends supply the two convolution primitives. The direct and HRTF
/// drivers are written once against them, and a backend that can batch
/// samples may override the direct driver as well.
pub trait MixKernel {
    /// Adds `coeffs[i] * (left, right)` into `values[(offset + i) & mask]`
    /// for `i < ir_size`. `values.len()` must be a power of two no smaller
    /// than `ir_size`.
    fn apply_coeffs(
        &self,
        offset: u32,
        values: &mut [StereoFrame],
        ir_size: usize,
        coeffs: &[StereoFrame],
        left: f32,
        right: f32,
    );

    /// [`MixKernel::apply_coeffs`] followed by `coeffs[i] += coeff_step[i]`.
    #[allow(clippy::too_many_arguments)]
    fn apply_coeffs_step(
        &self,
        offset: u32,
        values: &mut [StereoFrame],
        ir_size: usize,
        coeffs: &mut [StereoFrame],
        coeff_step: &[StereoFrame],
        left: f32,
        right: f32,
    );

    /// Pans a block onto every bus channel with the channel's fixed gains.
    fn mix_direct(&self, params: &mut DirectParams, bus: &mut OutputBus, block: &MixBlock) {
        direct::mix_direct(params, bus, block);
    }

    /// Convolves a block with the channel's HRIR pair onto the front
    /// left/right bus channels.
    fn mix_hrtf(
        &self,
        params: &mut DirectParams,
        state: &mut HrtfState,
        bus: &mut OutputBus,
        block: &MixBlock,
    ) {
        hrtf::mix_hrtf(self, params, state, bus, block);
    }
}

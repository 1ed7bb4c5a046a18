pub mod direct;
pub mod hrtf;
#[cfg(feature = "simd")]
pub mod simd;

#[cfg(feature = "simd")]
pub use simd::Simd;

use crate::bus::OutputBus;
use crate::config::{KernelKind, MAX_CHANNELS, MAX_INPUT_CHANNELS};
use crate::filter::LowPass2P;
use crate::hrtf::{convolve, HrtfParams, HrtfState, StereoFrame};
use crate::processing::MixBlock;
use crate::traits::MixKernel;

/// Per-source parameters for the dry path, recomputed by the spatializer
/// between quanta.
#[derive(Clone, Debug)]
pub struct DirectParams {
    /// Bus gains for each source channel, fixed for a whole quantum.
    pub gains: [[f32; MAX_CHANNELS]; MAX_INPUT_CHANNELS],
    pub filters: [LowPass2P; MAX_INPUT_CHANNELS],
    pub hrtf: HrtfParams,
}

impl DirectParams {
    pub fn new(ir_size: usize) -> Self {
        Self {
            gains: [[0.0; MAX_CHANNELS]; MAX_INPUT_CHANNELS],
            filters: [LowPass2P::default(); MAX_INPUT_CHANNELS],
            hrtf: HrtfParams::new(ir_size),
        }
    }

    /// Sets the same low-pass coefficient on every source channel, keeping
    /// their histories.
    pub fn set_filter_coeff(&mut self, coeff: f32) {
        for filter in &mut self.filters {
            filter.set_coeff(coeff);
        }
    }
}

/// Reference backend: one tap, one sample at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Scalar;

impl MixKernel for Scalar {
    #[inline]
    fn apply_coeffs(
        &self,
        offset: u32,
        values: &mut [StereoFrame],
        ir_size: usize,
        coeffs: &[StereoFrame],
        left: f32,
        right: f32,
    ) {
        convolve::apply_coeffs(offset, values, ir_size, coeffs, left, right);
    }

    #[inline]
    fn apply_coeffs_step(
        &self,
        offset: u32,
        values: &mut [StereoFrame],
        ir_size: usize,
        coeffs: &mut [StereoFrame],
        coeff_step: &[StereoFrame],
        left: f32,
        right: f32,
    ) {
        convolve::apply_coeffs_step(offset, values, ir_size, coeffs, coeff_step, left, right);
    }
}

/// Backend chosen at runtime from the mixer config.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kernel {
    Scalar(Scalar),
    #[cfg(feature = "simd")]
    Simd(Simd),
}

impl Default for Kernel {
    fn default() -> Self {
        Kernel::Scalar(Scalar)
    }
}

impl Kernel {
    pub fn from_kind(kind: KernelKind) -> Self {
        let kernel = match kind {
            KernelKind::Scalar => Kernel::Scalar(Scalar),
            #[cfg(feature = "simd")]
            KernelKind::Simd => Kernel::Simd(Simd),
            #[cfg(not(feature = "simd"))]
            KernelKind::Simd => {
                log::warn!("simd kernel requested but not compiled in; using scalar");
                Kernel::Scalar(Scalar)
            }
        };
        log::debug!("mixing with {:?} kernel", kernel.kind());
        kernel
    }

    pub fn kind(&self) -> KernelKind {
        match self {
            Kernel::Scalar(_) => KernelKind::Scalar,
            #[cfg(feature = "simd")]
            Kernel::Simd(_) => KernelKind::Simd,
        }
    }
}

impl MixKernel for Kernel {
    fn apply_coeffs(
        &self,
        offset: u32,
        values: &mut [StereoFrame],
        ir_size: usize,
        coeffs: &[StereoFrame],
        left: f32,
        right: f32,
    ) {
        match self {
            Kernel::Scalar(k) => k.apply_coeffs(offset, values, ir_size, coeffs, left, right),
            #[cfg(feature = "simd")]
            Kernel::Simd(k) => k.apply_coeffs(offset, values, ir_size, coeffs, left, right),
        }
    }

    fn apply_coeffs_step(
        &self,
        offset: u32,
        values: &mut [StereoFrame],
        ir_size: usize,
        coeffs: &mut [StereoFrame],
        coeff_step: &[StereoFrame],
        left: f32,
        right: f32,
    ) {
        match self {
            Kernel::Scalar(k) => {
                k.apply_coeffs_step(offset, values, ir_size, coeffs, coeff_step, left, right)
            }
            #[cfg(feature = "simd")]
            Kernel::Simd(k) => {
                k.apply_coeffs_step(offset, values, ir_size, coeffs, coeff_step, left, right)
            }
        }
    }

    fn mix_direct(&self, params: &mut DirectParams, bus: &mut OutputBus, block: &MixBlock) {
        match self {
            Kernel::Scalar(k) => k.mix_direct(params, bus, block),
            #[cfg(feature = "simd")]
            Kernel::Simd(k) => k.mix_direct(params, bus, block),
        }
    }

    // Dispatch once per block so the per-sample calls inside the driver are
    // static.
    fn mix_hrtf(
        &self,
        params: &mut DirectParams,
        state: &mut HrtfState,
        bus: &mut OutputBus,
        block: &MixBlock,
    ) {
        match self {
            Kernel::Scalar(k) => k.mix_hrtf(params, state, bus, block),
            #[cfg(feature = "simd")]
            Kernel::Simd(k) => k.mix_hrtf(params, state, bus, block),
        }
    }
}

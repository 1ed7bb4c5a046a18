use std::simd::f32x4;

use crate::bus::OutputBus;
use crate::config::MAX_CHANNELS;
use crate::hrtf::{convolve, StereoFrame};
use crate::mixer::direct::{declick_head, declick_tail};
use crate::mixer::DirectParams;
use crate::processing::MixBlock;
use crate::traits::MixKernel;

/// Portable-SIMD backend. Convolution handles two taps per vector, the
/// direct path pans one sample across a whole bus frame per step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Simd;

#[inline(always)]
fn tap(slot: &mut StereoFrame, coeff: &StereoFrame, left: f32, right: f32) {
    slot[0] += coeff[0] * left;
    slot[1] += coeff[1] * right;
}

impl MixKernel for Simd {
    fn apply_coeffs(
        &self,
        offset: u32,
        values: &mut [StereoFrame],
        ir_size: usize,
        coeffs: &[StereoFrame],
        left: f32,
        right: f32,
    ) {
        if values.len() < 2 || ir_size == 0 {
            convolve::apply_coeffs(offset, values, ir_size, coeffs, left, right);
            return;
        }
        debug_assert!(values.len().is_power_of_two() && ir_size <= values.len());
        let mask = values.len() - 1;
        let gains = f32x4::from_array([left, right, left, right]);

        // Pairs must start on an even slot so they never straddle the end.
        let mut slot = offset as usize & mask;
        let mut i = 0;
        if slot & 1 == 1 {
            tap(&mut values[slot], &coeffs[0], left, right);
            slot = (slot + 1) & mask;
            i = 1;
        }
        while i + 2 <= ir_size {
            let pair = values[slot..slot + 2].as_flattened_mut();
            let acc = f32x4::from_slice(pair);
            let coeff = f32x4::from_slice(coeffs[i..i + 2].as_flattened());
            (acc + coeff * gains).copy_to_slice(pair);
            slot = (slot + 2) & mask;
            i += 2;
        }
        if i < ir_size {
            tap(&mut values[slot], &coeffs[i], left, right);
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
        if values.len() < 2 || ir_size == 0 {
            convolve::apply_coeffs_step(offset, values, ir_size, coeffs, coeff_step, left, right);
            return;
        }
        debug_assert!(values.len().is_power_of_two() && ir_size <= values.len());
        let mask = values.len() - 1;
        let gains = f32x4::from_array([left, right, left, right]);

        let mut slot = offset as usize & mask;
        let mut i = 0;
        if slot & 1 == 1 {
            tap(&mut values[slot], &coeffs[0], left, right);
            coeffs[0][0] += coeff_step[0][0];
            coeffs[0][1] += coeff_step[0][1];
            slot = (slot + 1) & mask;
            i = 1;
        }
        while i + 2 <= ir_size {
            let pair = values[slot..slot + 2].as_flattened_mut();
            let acc = f32x4::from_slice(pair);
            let taps = coeffs[i..i + 2].as_flattened_mut();
            let coeff = f32x4::from_slice(taps);
            let step = f32x4::from_slice(coeff_step[i..i + 2].as_flattened());
            (acc + coeff * gains).copy_to_slice(pair);
            (coeff + step).copy_to_slice(taps);
            slot = (slot + 2) & mask;
            i += 2;
        }
        if i < ir_size {
            tap(&mut values[slot], &coeffs[i], left, right);
            coeffs[i][0] += coeff_step[i][0];
            coeffs[i][1] += coeff_step[i][1];
        }
    }

    fn mix_direct(&self, params: &mut DirectParams, bus: &mut OutputBus, block: &MixBlock) {
        let gains = &params.gains[block.channel];
        let filter = &mut params.filters[block.channel];
        let data = block.data;

        if block.starts_quantum() {
            declick_head(filter, gains, bus, data[0]);
        }

        let low = f32x4::from_slice(&gains[..4]);
        let high = f32x4::from_slice(&gains[4..8]);
        let last = gains[MAX_CHANNELS - 1];

        let frames = &mut bus.dry[block.out_pos..block.out_pos + block.len];
        for (frame, &sample) in frames.iter_mut().zip(&data[..block.len]) {
            let value = filter.process(sample);
            let splat = f32x4::splat(value);
            let (head, tail) = frame.split_at_mut(4);
            (f32x4::from_slice(head) + splat * low).copy_to_slice(head);
            (f32x4::from_slice(&tail[..4]) + splat * high).copy_to_slice(&mut tail[..4]);
            tail[4] += value * last;
        }

        if block.ends_quantum() {
            declick_tail(filter, gains, bus, data[block.len]);
        }
    }
}

use super::StereoFrame;

#[inline(always)]
fn ring_mask(values: &[StereoFrame], ir_size: usize) -> usize {
    debug_assert!(
        values.len().is_power_of_two(),
        "ring length {} is not a power of two",
        values.len()
    );
    debug_assert!(ir_size <= values.len());
    values.len() - 1
}

/// Adds one input sample, already split into a left and right ear gain, into
/// the ring: `values[(offset + i) & mask] += coeffs[i] * (left, right)` for
/// every tap `i < ir_size`.
#[inline]
pub fn apply_coeffs(
    offset: u32,
    values: &mut [StereoFrame],
    ir_size: usize,
    coeffs: &[StereoFrame],
    left: f32,
    right: f32,
) {
    let mask = ring_mask(values, ir_size);
    for (i, coeff) in coeffs[..ir_size].iter().enumerate() {
        let slot = &mut values[(offset as usize).wrapping_add(i) & mask];
        slot[0] += coeff[0] * left;
        slot[1] += coeff[1] * right;
    }
}

/// [`apply_coeffs`], then moves every tap one step along its glide:
/// `coeffs[i] += coeff_step[i]`.
#[inline]
pub fn apply_coeffs_step(
    offset: u32,
    values: &mut [StereoFrame],
    ir_size: usize,
    coeffs: &mut [StereoFrame],
    coeff_step: &[StereoFrame],
    left: f32,
    right: f32,
) {
    let mask = ring_mask(values, ir_size);
    for (i, (coeff, step)) in coeffs[..ir_size]
        .iter_mut()
        .zip(&coeff_step[..ir_size])
        .enumerate()
    {
        let slot = &mut values[(offset as usize).wrapping_add(i) & mask];
        slot[0] += coeff[0] * left;
        slot[1] += coeff[1] * right;
        coeff[0] += step[0];
        coeff[1] += step[1];
    }
}

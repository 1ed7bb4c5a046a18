use crate::bus::OutputBus;
use crate::channel::Channel;
use crate::config::{
    HRIR_LENGTH, HRTF_DELAY_BITS, HRTF_DELAY_FRAC_ONE, HRTF_DELAY_MASK, SRC_HISTORY_LENGTH,
    SRC_HISTORY_MASK,
};
use crate::hrtf::HrtfState;
use crate::mixer::DirectParams;
use crate::processing::MixBlock;
use crate::traits::MixKernel;

/// Reads the history `delay` (12.20 fixed point) samples behind `offset`,
/// interpolating linearly between the two neighbouring samples.
#[inline(always)]
fn delayed_lerp(history: &[f32; SRC_HISTORY_LENGTH], offset: u32, delay: u32) -> f32 {
    let at = offset.wrapping_sub(delay >> HRTF_DELAY_BITS);
    let mu = (delay & HRTF_DELAY_MASK) as f32 * (1.0 / HRTF_DELAY_FRAC_ONE as f32);
    let a = history[at as usize & SRC_HISTORY_MASK];
    let b = history[at.wrapping_sub(1) as usize & SRC_HISTORY_MASK];
    a + (b - a) * mu
}

#[inline(always)]
fn delayed(history: &[f32; SRC_HISTORY_LENGTH], offset: u32, delay: u32) -> f32 {
    history[offset.wrapping_sub(delay) as usize & SRC_HISTORY_MASK]
}

/// Mixes one source channel through its HRIR pair onto the front left and
/// right bus channels.
///
/// While the source's glide counter is running, taps and ear delays step
/// toward their targets every sample; once it runs out the remaining samples
/// use the settled response and whole-sample delays. The ring slot that
/// becomes final on each sample is drained straight into the bus.
///
/// Call [`HrtfState::advance`] once every channel of the source has been
/// mixed.
pub fn mix_hrtf<K: MixKernel + ?Sized>(
    kernel: &K,
    params: &mut DirectParams,
    state: &mut HrtfState,
    bus: &mut OutputBus,
    block: &MixBlock,
) {
    let ir_size = params.hrtf.ir_size;
    let target = &params.hrtf.channels[block.channel];
    let filter = &mut params.filters[block.channel];
    let channel = &mut state.channels[block.channel];
    let data = block.data;
    let left_out = Channel::FrontLeft.index();
    let right_out = Channel::FrontRight.index();

    let mut out_pos = block.out_pos;
    let mut counter = state.counter.max(out_pos as u32) - out_pos as u32;
    let mut offset = state.offset.wrapping_add(out_pos as u32);

    let mut coeffs = [[0.0f32; 2]; HRIR_LENGTH];
    target.coeffs_at(ir_size, counter, &mut coeffs);
    let mut delay = target.delay_at(counter);

    if block.starts_quantum() {
        channel.history[offset as usize & SRC_HISTORY_MASK] = filter.peek(data[0]);
        let left = delayed_lerp(&channel.history, offset, delay[0]);
        let right = delayed_lerp(&channel.history, offset, delay[1]);
        let next = channel.values.get(offset.wrapping_add(1));
        bus.click_removal[left_out] -= next[0] + coeffs[0][0] * left;
        bus.click_removal[right_out] -= next[1] + coeffs[0][1] * right;
    }

    let mut pos = 0;
    while pos < block.len && counter > 0 {
        channel.history[offset as usize & SRC_HISTORY_MASK] = filter.process(data[pos]);
        let left = delayed_lerp(&channel.history, offset, delay[0]);
        let right = delayed_lerp(&channel.history, offset, delay[1]);

        delay[0] = delay[0].wrapping_add(target.delay_step[0] as u32);
        delay[1] = delay[1].wrapping_add(target.delay_step[1] as u32);

        channel.values.clear_frame(offset.wrapping_add(ir_size as u32));
        offset = offset.wrapping_add(1);

        kernel.apply_coeffs_step(
            offset,
            channel.values.frames_mut(),
            ir_size,
            &mut coeffs,
            &target.coeff_step,
            left,
            right,
        );
        let out = channel.values.get(offset);
        bus.dry[out_pos][left_out] += out[0];
        bus.dry[out_pos][right_out] += out[1];

        out_pos += 1;
        counter -= 1;
        pos += 1;
    }

    let delay = [delay[0] >> HRTF_DELAY_BITS, delay[1] >> HRTF_DELAY_BITS];
    for &sample in &data[pos..block.len] {
        channel.history[offset as usize & SRC_HISTORY_MASK] = filter.process(sample);
        let left = delayed(&channel.history, offset, delay[0]);
        let right = delayed(&channel.history, offset, delay[1]);

        channel.values.clear_frame(offset.wrapping_add(ir_size as u32));
        offset = offset.wrapping_add(1);

        kernel.apply_coeffs(
            offset,
            channel.values.frames_mut(),
            ir_size,
            &coeffs,
            left,
            right,
        );
        let out = channel.values.get(offset);
        bus.dry[out_pos][left_out] += out[0];
        bus.dry[out_pos][right_out] += out[1];

        out_pos += 1;
    }

    if out_pos == block.samples_to_do {
        channel.history[offset as usize & SRC_HISTORY_MASK] = filter.peek(data[block.len]);
        let left = delayed(&channel.history, offset, delay[0]);
        let right = delayed(&channel.history, offset, delay[1]);
        let next = channel.values.get(offset.wrapping_add(1));
        bus.pending_clicks[left_out] += next[0] + coeffs[0][0] * left;
        bus.pending_clicks[right_out] += next[1] + coeffs[0][1] * right;
    }
}

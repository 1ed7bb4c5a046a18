use crate::bus::OutputBus;
use crate::config::MAX_CHANNELS;
use crate::filter::LowPass2P;
use crate::mixer::DirectParams;
use crate::processing::MixBlock;

/// Removes the jump this source makes when it first appears at the head of a
/// quantum. Must run before the block's first sample is filtered.
#[inline]
pub(crate) fn declick_head(
    filter: &LowPass2P,
    gains: &[f32; MAX_CHANNELS],
    bus: &mut OutputBus,
    sample: f32,
) {
    let value = filter.peek(sample);
    for (acc, gain) in bus.click_removal.iter_mut().zip(gains) {
        *acc -= value * gain;
    }
}

/// Predicts the value this source would have started the next quantum with,
/// so it can be faded out there if the source does not continue.
#[inline]
pub(crate) fn declick_tail(
    filter: &LowPass2P,
    gains: &[f32; MAX_CHANNELS],
    bus: &mut OutputBus,
    sample: f32,
) {
    let value = filter.peek(sample);
    for (acc, gain) in bus.pending_clicks.iter_mut().zip(gains) {
        *acc += value * gain;
    }
}

/// Filters a block through the channel's low-pass and adds it to every bus
/// channel with that channel's gain.
pub fn mix_direct(params: &mut DirectParams, bus: &mut OutputBus, block: &MixBlock) {
    let gains = &params.gains[block.channel];
    let filter = &mut params.filters[block.channel];
    let data = block.data;

    if block.starts_quantum() {
        declick_head(filter, gains, bus, data[0]);
    }

    let frames = &mut bus.dry[block.out_pos..block.out_pos + block.len];
    for (frame, &sample) in frames.iter_mut().zip(&data[..block.len]) {
        let value = filter.process(sample);
        for (out, gain) in frame.iter_mut().zip(gains) {
            *out += value * gain;
        }
    }

    if block.ends_quantum() {
        declick_tail(filter, gains, bus, data[block.len]);
    }
}

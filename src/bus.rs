use crate::config::{MixerConfig, CLICK_DECAY, CLICK_FLOOR, MAX_CHANNELS};
use crate::error::Result;

/// One frame of the dry bus.
pub type BusFrame = [f32; MAX_CHANNELS];

/// The device's dry accumulation bus for one quantum, plus the two declick
/// accumulators every source writes into.
///
/// Mixers only ever add into the bus. `click_removal` collects corrections
/// for the head of the quantum being rendered; `pending_clicks` collects the
/// ones predicted for the head of the next quantum.
#[derive(Clone, Debug)]
pub struct OutputBus {
    pub(crate) dry: Vec<BusFrame>,
    pub(crate) click_removal: [f32; MAX_CHANNELS],
    pub(crate) pending_clicks: [f32; MAX_CHANNELS],
}

impl OutputBus {
    pub fn new(len: usize) -> Self {
        Self {
            dry: vec![[0.0; MAX_CHANNELS]; len],
            click_removal: [0.0; MAX_CHANNELS],
            pending_clicks: [0.0; MAX_CHANNELS],
        }
    }

    pub fn from_config(config: &MixerConfig) -> Result<Self> {
        config.validate()?;
        log::debug!(
            "allocating dry bus: {} frames x {} channels",
            config.quantum_length,
            MAX_CHANNELS
        );
        Ok(Self::new(config.quantum_length))
    }

    pub fn len(&self) -> usize {
        self.dry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dry.is_empty()
    }

    /// Zeroes the dry frames ahead of a new quantum. The declick
    /// accumulators carry over.
    pub fn clear(&mut self) {
        self.dry.fill([0.0; MAX_CHANNELS]);
    }

    /// Zeroes everything, including outstanding click corrections.
    pub fn reset(&mut self) {
        self.clear();
        self.click_removal = [0.0; MAX_CHANNELS];
        self.pending_clicks = [0.0; MAX_CHANNELS];
    }

    pub fn dry(&self) -> &[BusFrame] {
        &self.dry
    }

    pub fn dry_mut(&mut self) -> &mut [BusFrame] {
        &mut self.dry
    }

    pub fn click_removal(&self) -> &[f32; MAX_CHANNELS] {
        &self.click_removal
    }

    pub fn pending_clicks(&self) -> &[f32; MAX_CHANNELS] {
        &self.pending_clicks
    }

    /// Post pass run once every source has been mixed into the quantum.
    ///
    /// Adds each channel's click correction to the head of the quantum,
    /// decaying it per frame, then carries whatever is left plus the pending
    /// corrections into the next quantum.
    pub fn apply_click_removal(&mut self, samples_to_do: usize) {
        for c in 0..MAX_CHANNELS {
            let mut offset = self.click_removal[c];
            if offset.abs() < CLICK_FLOOR {
                offset = 0.0;
            } else {
                for frame in &mut self.dry[..samples_to_do] {
                    frame[c] += offset;
                    offset -= offset * CLICK_DECAY;
                }
            }
            self.click_removal[c] = offset + self.pending_clicks[c];
            self.pending_clicks[c] = 0.0;
        }
    }

    /// Sums a partial bus into this one.
    pub fn merge(&mut self, other: &OutputBus) {
        debug_assert!(other.len() <= self.len());
        for (dst, src) in self.dry.iter_mut().zip(&other.dry) {
            for (d, s) in dst.iter_mut().zip(src) {
                *d += s;
            }
        }
        for c in 0..MAX_CHANNELS {
            self.click_removal[c] += other.click_removal[c];
            self.pending_clicks[c] += other.pending_clicks[c];
        }
    }
}

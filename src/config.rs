use serde::{Deserialize, Serialize};

use crate::error::{MixerError, Result};

/// Output channels on the dry bus.
pub const MAX_CHANNELS: usize = 9;
/// Channels a single source may carry (up to 7.1).
pub const MAX_INPUT_CHANNELS: usize = 8;

pub const HRIR_BITS: u32 = 7;
/// Length of both the HRIR tap arrays and the per-channel accumulation ring.
pub const HRIR_LENGTH: usize = 1 << HRIR_BITS;
pub const HRIR_MASK: usize = HRIR_LENGTH - 1;

pub const SRC_HISTORY_BITS: u32 = 6;
pub const SRC_HISTORY_LENGTH: usize = 1 << SRC_HISTORY_BITS;
pub const SRC_HISTORY_MASK: usize = SRC_HISTORY_LENGTH - 1;

/// HRTF ear delays are 12.20 fixed point sample counts.
pub const HRTF_DELAY_BITS: u32 = 20;
pub const HRTF_DELAY_FRAC_ONE: u32 = 1 << HRTF_DELAY_BITS;
pub const HRTF_DELAY_MASK: u32 = HRTF_DELAY_FRAC_ONE - 1;

/// Largest quantum the dry bus is ever asked to hold.
pub const BUFFER_SIZE: usize = 4096;

/// Reference frequency (Hz) for the high-frequency gain of the dry low-pass.
pub const LOWPASS_FREQ_REF: f32 = 5000.0;

/// Per-frame decay of a pending click correction.
pub const CLICK_DECAY: f32 = 1.0 / 256.0;
/// Corrections smaller than one 16-bit LSB are dropped.
pub const CLICK_FLOOR: f32 = 1.0 / 32768.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KernelKind {
    #[default]
    Scalar,
    Simd,
}

/// Device-level mixer settings, typically loaded once from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixerConfig {
    pub sample_rate: u32,
    /// Samples rendered per device quantum.
    pub quantum_length: usize,
    /// Taps actually used out of each `HRIR_LENGTH` coefficient array.
    pub hrir_size: usize,
    pub kernel: KernelKind,
    /// Partial buses used when sources are mixed in parallel.
    pub partitions: usize,
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            quantum_length: 1024,
            hrir_size: 32,
            kernel: KernelKind::Scalar,
            partitions: 1,
        }
    }
}

impl MixerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: MixerConfig = serde_json::from_str(json)?;
        config.validate()?;
        log::debug!("loaded mixer config: {:?}", config);
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(MixerError::InvalidSampleRate);
        }
        if self.quantum_length == 0 || self.quantum_length > BUFFER_SIZE {
            return Err(MixerError::InvalidQuantum {
                got: self.quantum_length,
                max: BUFFER_SIZE,
            });
        }
        if self.hrir_size == 0 || self.hrir_size > HRIR_LENGTH {
            return Err(MixerError::InvalidIrSize {
                got: self.hrir_size,
                max: HRIR_LENGTH,
            });
        }
        if self.partitions == 0 {
            return Err(MixerError::NoPartitions);
        }
        Ok(())
    }

    /// `cos(w)` at the low-pass reference frequency, the input to
    /// [`crate::filter::lp_coeff`].
    pub fn lowpass_cw(&self) -> f32 {
        (std::f32::consts::TAU * LOWPASS_FREQ_REF / self.sample_rate as f32).cos()
    }
}

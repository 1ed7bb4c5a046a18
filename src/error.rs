use thiserror::Error;

/// Setup-time failures. The mixing hot path never returns these; it relies on
/// the invariants checked here before any quantum is rendered.
#[derive(Debug, Error)]
pub enum MixerError {
    #[error("quantum length must be between 1 and {max} samples, got {got}")]
    InvalidQuantum { got: usize, max: usize },

    #[error("impulse response size must be between 1 and {max} taps, got {got}")]
    InvalidIrSize { got: usize, max: usize },

    #[error("sample rate must be non-zero")]
    InvalidSampleRate,

    #[error("at least one mixing partition is required")]
    NoPartitions,

    #[error("failed to parse mixer config: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MixerError>;

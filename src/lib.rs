#![cfg_attr(feature = "simd", feature(portable_simd))]

pub mod bus;
pub mod channel;
pub mod config;
pub mod error;
pub mod filter;
pub mod hrtf;
pub mod mixer;
pub mod processing;
pub mod render;
pub mod traits;

pub use bus::{BusFrame, OutputBus};
pub use channel::Channel;
pub use config::{KernelKind, MixerConfig};
pub use error::{MixerError, Result};
pub use filter::{lp_coeff, LowPass2P};
pub use hrtf::{HrirRing, HrtfChannelParams, HrtfParams, HrtfState, StereoFrame};
pub use mixer::{DirectParams, Kernel, Scalar};
pub use processing::MixBlock;
pub use render::PartitionedMix;
pub use traits::MixKernel;

#[cfg(feature = "simd")]
pub use mixer::Simd;

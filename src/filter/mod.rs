pub mod lowpass;

pub use lowpass::{lp_coeff, LowPass2P};

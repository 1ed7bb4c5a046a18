/// Two cascaded one-pole low-pass sections sharing a single coefficient,
/// giving a 12 dB/octave roll-off. One instance per source channel.
///
/// Each section computes `y = x + (h - x) * a`, so `a = 0` passes the input
/// through untouched and `a` close to 1 holds the previous output.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LowPass2P {
    coeff: f32,
    history: [f32; 2],
}

/// The recurrence shared by [`LowPass2P::process`] and [`LowPass2P::peek`].
/// Returns the output and the history that processing `input` would leave.
#[inline(always)]
fn two_pole(coeff: f32, history: [f32; 2], input: f32) -> (f32, [f32; 2]) {
    let first = input + (history[0] - input) * coeff;
    let second = first + (history[1] - first) * coeff;
    (second, [first, second])
}

impl LowPass2P {
    pub fn new(coeff: f32) -> Self {
        Self {
            coeff,
            history: [0.0; 2],
        }
    }

    /// Builds a filter whose gain at [`crate::config::LOWPASS_FREQ_REF`] is
    /// `gain_hf`. `cw` is the cosine of that reference frequency in radians
    /// per sample.
    pub fn from_gain(gain_hf: f32, cw: f32) -> Self {
        Self::new(lp_coeff(gain_hf, cw))
    }

    pub fn coeff(&self) -> f32 {
        self.coeff
    }

    /// Replaces the coefficient, keeping the history so the output stays
    /// continuous.
    pub fn set_coeff(&mut self, coeff: f32) {
        self.coeff = coeff;
    }

    pub fn history(&self) -> [f32; 2] {
        self.history
    }

    /// Filters one sample and commits the new history.
    #[inline(always)]
    pub fn process(&mut self, input: f32) -> f32 {
        let (output, history) = two_pole(self.coeff, self.history, input);
        self.history = history;
        output
    }

    /// The output `process(input)` would produce, without touching state.
    #[inline(always)]
    pub fn peek(&self, input: f32) -> f32 {
        two_pole(self.coeff, self.history, input).0
    }

    pub fn reset(&mut self) {
        self.history = [0.0; 2];
    }
}

/// Coefficient for one section so that the cascade attenuates the reference
/// frequency by `gain` (linear). Gains at or above unity yield a pass-through.
pub fn lp_coeff(gain: f32, cw: f32) -> f32 {
    if gain >= 0.9999 {
        return 0.0;
    }
    // Very small gains push the coefficient toward 1, which stops the filter
    // from passing anything at all.
    let g = gain.max(0.001);
    (1.0 - g * cw - (2.0 * g * (1.0 - cw) - g * g * (1.0 - cw * cw)).sqrt()) / (1.0 - g)
}

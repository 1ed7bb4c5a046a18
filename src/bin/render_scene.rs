//! Renders a short binaural scene to a WAV file: two noise sources circling
//! the listener through the HRTF path, plus a quiet tone panned to the front.
//!
//! Usage: `render_scene [config.json] [out.wav]`

use anyhow::{Context, Result};
use dasp_sample::Sample;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

use spatial_mixer::config::{HRTF_DELAY_FRAC_ONE, SRC_HISTORY_LENGTH};
use spatial_mixer::{
    lp_coeff, Channel, DirectParams, HrtfState, Kernel, MixBlock, MixKernel, MixerConfig,
    OutputBus, PartitionedMix, StereoFrame,
};

const SECONDS: f32 = 6.0;
/// Seconds for one full orbit.
const ORBIT_PERIOD: f32 = 3.0;
/// Largest interaural time difference, in seconds.
const MAX_ITD: f32 = 0.00066;

enum Placement {
    Orbiting { phase: f32 },
    Panned,
}

struct SceneSource {
    params: DirectParams,
    state: HrtfState,
    placement: Placement,
    rng: StdRng,
    /// One quantum of input, plus the first sample of the next.
    block: Vec<f32>,
    tone_phase: f32,
}

impl SceneSource {
    fn new(config: &MixerConfig, placement: Placement, seed: u64) -> Self {
        let mut block = vec![0.0; config.quantum_length + 1];
        let mut rng = StdRng::seed_from_u64(seed);
        block[0] = rng.random_range(-0.5..0.5);
        Self {
            params: DirectParams::new(config.hrir_size),
            state: HrtfState::new(),
            placement,
            rng,
            block,
            tone_phase: 0.0,
        }
    }

    /// Shifts the lookahead sample to the front and fills the rest.
    fn refill(&mut self, sample_rate: f32) {
        let len = self.block.len() - 1;
        self.block[0] = self.block[len];
        for sample in &mut self.block[1..] {
            *sample = match self.placement {
                Placement::Orbiting { .. } => self.rng.random_range(-0.5..0.5),
                Placement::Panned => {
                    self.tone_phase = (self.tone_phase + 220.0 / sample_rate).fract();
                    0.2 * (self.tone_phase * TAU).sin()
                }
            };
        }
    }
}

/// A toy head model: level and arrival time differences with a short
/// exponential tail. Positive azimuth is to the listener's right.
fn synthetic_hrir(azimuth: f32, ir_size: usize, sample_rate: f32) -> (Vec<StereoFrame>, [u32; 2]) {
    let side = azimuth.sin();
    let gains = [0.5 * (1.0 - side) + 0.1, 0.5 * (1.0 + side) + 0.1];
    let coeffs = (0..ir_size)
        .map(|i| {
            let decay = (-(i as f32) / 4.0).exp();
            [gains[0] * decay, gains[1] * decay]
        })
        .collect();

    let itd = (MAX_ITD * sample_rate).min((SRC_HISTORY_LENGTH - 2) as f32);
    let to_fixed = |samples: f32| (samples * HRTF_DELAY_FRAC_ONE as f32) as u32;
    let delays = [to_fixed(side.max(0.0) * itd), to_fixed((-side).max(0.0) * itd)];
    (coeffs, delays)
}

fn load_config() -> Result<MixerConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {}", path))?;
            Ok(MixerConfig::from_json(&json)?)
        }
        None => {
            let config = MixerConfig::default();
            config.validate()?;
            Ok(config)
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config()?;
    let out_path = std::env::args()
        .nth(2)
        .unwrap_or_else(|| "render_scene.wav".to_string());
    let sample_rate = config.sample_rate as f32;
    let quantum = config.quantum_length;
    let kernel = Kernel::from_kind(config.kernel);

    let mut bus = OutputBus::from_config(&config)?;
    let mut partitions = PartitionedMix::from_config(&config)?;

    let filter_coeff = lp_coeff(0.7, config.lowpass_cw());
    let mut sources = vec![
        SceneSource::new(&config, Placement::Orbiting { phase: 0.0 }, 1),
        SceneSource::new(&config, Placement::Orbiting { phase: 0.5 }, 2),
        SceneSource::new(&config, Placement::Panned, 3),
    ];
    for source in &mut sources {
        source.params.set_filter_coeff(filter_coeff);
        if let Placement::Panned = source.placement {
            let gains = &mut source.params.gains[0];
            gains[Channel::FrontLeft.index()] = 0.6;
            gains[Channel::FrontRight.index()] = 0.4;
        }
    }

    let wav_spec = hound::WavSpec {
        channels: 2,
        sample_rate: config.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&out_path, wav_spec)
        .with_context(|| format!("creating {}", out_path))?;

    let quanta = (SECONDS * sample_rate / quantum as f32).ceil() as usize;
    log::info!(
        "rendering {} quanta of {} frames with {:?} kernel",
        quanta,
        quantum,
        kernel.kind()
    );

    for q in 0..quanta {
        let time = (q * quantum) as f32 / sample_rate;
        for source in &mut sources {
            source.refill(sample_rate);
            let Placement::Orbiting { phase } = source.placement else {
                continue;
            };
            let azimuth = (time / ORBIT_PERIOD + phase) * TAU;
            let (coeffs, delays) = synthetic_hrir(azimuth, config.hrir_size, sample_rate);
            let ir_size = source.params.hrtf.ir_size;
            let channel = &mut source.params.hrtf.channels[0];
            if source.state.moving {
                source.state.counter =
                    channel.retarget(ir_size, source.state.counter, &coeffs, delays, quantum as u32);
            } else {
                channel.set(&coeffs, delays);
            }
        }

        bus.clear();
        partitions.mix(&mut bus, &mut sources, |source, partial| {
            let block = MixBlock::full(&source.block, 0, quantum);
            match source.placement {
                Placement::Orbiting { .. } => {
                    kernel.mix_hrtf(&mut source.params, &mut source.state, partial, &block);
                    source.state.advance(quantum);
                }
                Placement::Panned => kernel.mix_direct(&mut source.params, partial, &block),
            }
        });
        bus.apply_click_removal(quantum);

        for frame in bus.dry() {
            for channel in [Channel::FrontLeft, Channel::FrontRight] {
                let sample = frame[channel.index()].clamp(-1.0, 1.0);
                writer.write_sample(sample.to_sample::<i16>())?;
            }
        }
    }

    writer.finalize()?;
    log::info!("wrote {}", out_path);
    Ok(())
}

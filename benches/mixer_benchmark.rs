// benches/mixer_benchmark.rs
#![feature(test)]
extern crate test;

use spatial_mixer::{
    DirectParams, HrirRing, HrtfState, MixBlock, MixKernel, OutputBus, Scalar, Simd, StereoFrame,
};
use test::Bencher;

const QUANTUM: usize = 1024;
const IR_SIZE: usize = 64;

fn test_ir() -> Vec<StereoFrame> {
    (0..IR_SIZE)
        .map(|i| {
            let t = i as f32 / IR_SIZE as f32;
            [(1.0 - t) * (t * 40.0).sin(), (1.0 - t) * (t * 37.0).cos()]
        })
        .collect()
}

fn test_signal() -> Vec<f32> {
    (0..=QUANTUM).map(|i| (i as f32 * 0.05).sin()).collect()
}

fn bench_apply_coeffs<K: MixKernel>(b: &mut Bencher, kernel: K) {
    let coeffs = test_ir();
    let mut ring = HrirRing::<128>::new();
    let mut offset = 0u32;

    b.iter(|| {
        for _ in 0..QUANTUM {
            offset = offset.wrapping_add(1);
            kernel.apply_coeffs(offset, ring.frames_mut(), IR_SIZE, &coeffs, 0.5, 0.5);
        }
        test::black_box(ring.get(offset));
    });
}

fn bench_hrtf_quantum<K: MixKernel>(b: &mut Bencher, kernel: K) {
    let mut params = DirectParams::new(IR_SIZE);
    params.set_filter_coeff(0.3);
    params.hrtf.channels[0].set(&test_ir(), [3 << 20, 5 << 20]);
    let mut state = HrtfState::new();
    let mut bus = OutputBus::new(QUANTUM);
    let data = test_signal();

    b.iter(|| {
        bus.clear();
        let block = MixBlock::full(&data, 0, QUANTUM);
        kernel.mix_hrtf(&mut params, &mut state, &mut bus, &block);
        state.advance(QUANTUM);
        test::black_box(bus.dry()[QUANTUM - 1]);
    });
}

fn bench_direct_quantum<K: MixKernel>(b: &mut Bencher, kernel: K) {
    let mut params = DirectParams::new(IR_SIZE);
    params.set_filter_coeff(0.3);
    params.gains[0] = [0.7, 0.7, 0.5, 0.2, 0.3, 0.3, 0.1, 0.1, 0.0];
    let mut bus = OutputBus::new(QUANTUM);
    let data = test_signal();

    b.iter(|| {
        bus.clear();
        let block = MixBlock::full(&data, 0, QUANTUM);
        kernel.mix_direct(&mut params, &mut bus, &block);
        test::black_box(bus.dry()[QUANTUM - 1]);
    });
}

#[bench]
fn bench_apply_coeffs_scalar(b: &mut Bencher) {
    bench_apply_coeffs(b, Scalar);
}

#[bench]
fn bench_apply_coeffs_simd(b: &mut Bencher) {
    bench_apply_coeffs(b, Simd);
}

#[bench]
fn bench_hrtf_quantum_scalar(b: &mut Bencher) {
    bench_hrtf_quantum(b, Scalar);
}

#[bench]
fn bench_hrtf_quantum_simd(b: &mut Bencher) {
    bench_hrtf_quantum(b, Simd);
}

#[bench]
fn bench_direct_quantum_scalar(b: &mut Bencher) {
    bench_direct_quantum(b, Scalar);
}

#[bench]
fn bench_direct_quantum_simd(b: &mut Bencher) {
    bench_direct_quantum(b, Simd);
}

use super::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustfft::{num_complex::Complex, FftPlanner};

const EPSILON: f32 = 1e-5;

fn random_taps(rng: &mut StdRng, len: usize) -> Vec<StereoFrame> {
    (0..len)
        .map(|_| [rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0)])
        .collect()
}

fn assert_frames_close(a: &[StereoFrame], b: &[StereoFrame], tolerance: f32) {
    assert_eq!(a.len(), b.len());
    for (i, (x, y)) in a.iter().zip(b).enumerate() {
        for ear in 0..2 {
            let scale = x[ear].abs().max(y[ear].abs()).max(1.0);
            assert!(
                (x[ear] - y[ear]).abs() <= tolerance * scale,
                "frame {} ear {}: {} vs {}",
                i,
                ear,
                x[ear],
                y[ear]
            );
        }
    }
}

/// Streams `input` through a ring the way the HRTF driver does: clear the
/// slot about to take the last tap, advance, accumulate, drain.
fn stream_through_ring<const N: usize>(input: &[f32], taps: &[StereoFrame]) -> Vec<StereoFrame> {
    let mut ring = HrirRing::<N>::new();
    let mut offset = 0u32;
    input
        .iter()
        .map(|&x| {
            ring.clear_frame(offset.wrapping_add(taps.len() as u32));
            offset = offset.wrapping_add(1);
            apply_coeffs(offset, ring.frames_mut(), taps.len(), taps, x, x);
            ring.get(offset)
        })
        .collect()
}

fn fft_convolve(x: &[f32], h: &[f32]) -> Vec<f32> {
    let out_len = x.len() + h.len() - 1;
    let fft_size = out_len.next_power_of_two();
    let mut planner = FftPlanner::<f32>::new();
    let forward = planner.plan_fft_forward(fft_size);
    let inverse = planner.plan_fft_inverse(fft_size);

    let padded = |s: &[f32]| -> Vec<Complex<f32>> {
        (0..fft_size)
            .map(|i| Complex::new(s.get(i).copied().unwrap_or(0.0), 0.0))
            .collect()
    };
    let mut a = padded(x);
    let mut b = padded(h);
    forward.process(&mut a);
    forward.process(&mut b);
    for (p, q) in a.iter_mut().zip(&b) {
        *p = *p * *q;
    }
    inverse.process(&mut a);
    a[..out_len]
        .iter()
        .map(|c| c.re / fft_size as f32)
        .collect()
}

#[test]
fn unit_impulse_writes_left_column() {
    let mut rng = StdRng::seed_from_u64(1);
    let taps = random_taps(&mut rng, 16);
    let mut ring = HrirRing::<32>::new();

    apply_coeffs(0, ring.frames_mut(), taps.len(), &taps, 1.0, 0.0);

    for (i, frame) in ring.frames().iter().enumerate() {
        if i < taps.len() {
            assert_eq!(frame[0], taps[i][0]);
        } else {
            assert_eq!(frame[0], 0.0);
        }
        assert_eq!(frame[1], 0.0);
    }
}

#[test]
fn impulses_superpose() {
    let mut rng = StdRng::seed_from_u64(2);
    let taps = random_taps(&mut rng, 24);

    // Overlapping placements, then ones far enough apart not to touch.
    for (first, second) in [(3u32, 11u32), (0, 40), (60, 2)] {
        let mut both = HrirRing::<64>::new();
        apply_coeffs(first, both.frames_mut(), taps.len(), &taps, 0.5, -0.25);
        apply_coeffs(second, both.frames_mut(), taps.len(), &taps, -1.5, 0.75);

        let mut a = HrirRing::<64>::new();
        apply_coeffs(first, a.frames_mut(), taps.len(), &taps, 0.5, -0.25);
        let mut b = HrirRing::<64>::new();
        apply_coeffs(second, b.frames_mut(), taps.len(), &taps, -1.5, 0.75);

        let summed: Vec<StereoFrame> = a
            .frames()
            .iter()
            .zip(b.frames())
            .map(|(x, y)| [x[0] + y[0], x[1] + y[1]])
            .collect();
        assert_frames_close(both.frames(), &summed, EPSILON);
    }
}

#[test]
fn stepped_taps_reach_target_after_n_calls() {
    let mut rng = StdRng::seed_from_u64(3);
    for n in [1usize, 2, 7, 64, 1024] {
        let ir_size = rng.random_range(1..=HRIR_LENGTH);
        let start = random_taps(&mut rng, ir_size);
        let target = random_taps(&mut rng, ir_size);
        let step: Vec<StereoFrame> = start
            .iter()
            .zip(&target)
            .map(|(s, t)| [(t[0] - s[0]) / n as f32, (t[1] - s[1]) / n as f32])
            .collect();

        let mut coeffs = start.clone();
        let mut ring = HrirRing::<HRIR_LENGTH>::new();
        for call in 0..n {
            apply_coeffs_step(
                call as u32,
                ring.frames_mut(),
                ir_size,
                &mut coeffs,
                &step,
                0.1,
                0.1,
            );
        }
        assert_frames_close(&coeffs, &target, 5e-4);
    }
}

#[test]
fn every_offset_stays_inside_the_ring() {
    const LEN: usize = 16;
    for ir_size in 1..=LEN {
        let taps = vec![[1.0, 2.0]; ir_size];
        let offsets = (0..2 * LEN as u32).chain(u32::MAX - LEN as u32..=u32::MAX);
        for offset in offsets {
            // Guard frames either side of the ring must never be touched.
            let mut backing = [[7.0f32; 2]; LEN + 2];
            backing[1..=LEN].fill([0.0; 2]);
            apply_coeffs(offset, &mut backing[1..=LEN], ir_size, &taps, 1.0, 1.0);

            assert_eq!(backing[0], [7.0, 7.0]);
            assert_eq!(backing[LEN + 1], [7.0, 7.0]);
            let ring = &backing[1..=LEN];
            for i in 0..LEN {
                let hit = (0..ir_size).any(|k| (offset.wrapping_add(k as u32) as usize) % LEN == i);
                let expected = if hit { [1.0, 2.0] } else { [0.0, 0.0] };
                assert_eq!(ring[i], expected, "offset {} ir {}", offset, ir_size);
            }
        }
    }
}

#[test]
fn stepped_variant_accumulates_like_plain_one() {
    let mut rng = StdRng::seed_from_u64(4);
    let taps = random_taps(&mut rng, 33);
    let zero_step = vec![[0.0; 2]; taps.len()];
    for offset in [0u32, 1, 31, 127, 128, 4095] {
        let mut plain = HrirRing::<HRIR_LENGTH>::new();
        let mut stepped = HrirRing::<HRIR_LENGTH>::new();
        let mut coeffs = taps.clone();
        apply_coeffs(offset, plain.frames_mut(), taps.len(), &taps, 0.3, -0.7);
        apply_coeffs_step(
            offset,
            stepped.frames_mut(),
            taps.len(),
            &mut coeffs,
            &zero_step,
            0.3,
            -0.7,
        );
        assert_eq!(plain.frames(), stepped.frames());
        assert_eq!(coeffs, taps);
    }
}

#[test]
fn streamed_ring_matches_fft_convolution() {
    let mut rng = StdRng::seed_from_u64(5);
    let taps = random_taps(&mut rng, 24);
    let input: Vec<f32> = (0..300).map(|_| rng.random_range(-1.0..1.0)).collect();

    let streamed = stream_through_ring::<64>(&input, &taps);

    let left: Vec<f32> = taps.iter().map(|t| t[0]).collect();
    let right: Vec<f32> = taps.iter().map(|t| t[1]).collect();
    let expected_left = fft_convolve(&input, &left);
    let expected_right = fft_convolve(&input, &right);

    for (n, frame) in streamed.iter().enumerate() {
        assert!((frame[0] - expected_left[n]).abs() < 1e-3, "left {}", n);
        assert!((frame[1] - expected_right[n]).abs() < 1e-3, "right {}", n);
    }
}

#[test]
fn ring_cursor_wraps_at_length() {
    let mut ring = HrirRing::<8>::new();
    ring.frames_mut()[3] = [1.0, -1.0];
    assert_eq!(ring.get(3), [1.0, -1.0]);
    assert_eq!(ring.get(11), [1.0, -1.0]);
    assert_eq!(ring.get(u32::MAX - 4), [1.0, -1.0]);
    ring.clear_frame(19);
    assert_eq!(ring.get(3), [0.0, 0.0]);
    assert_eq!(ring.len(), 8);
}

#[test]
fn retarget_with_zero_steps_is_immediate() {
    let mut params = HrtfChannelParams::default();
    let target = [[0.5, 0.25]; 4];
    let counter = params.retarget(4, 0, &target, [7, 9], 0);
    assert_eq!(counter, 0);
    assert_eq!(&params.coeffs[..4], &target);
    assert!(params.coeff_step.iter().all(|s| *s == [0.0, 0.0]));
    assert_eq!(params.delay_at(0), [7, 9]);
}

#[test]
fn retarget_mid_glide_starts_from_current_position() {
    let mut params = HrtfChannelParams::default();
    params.set(&[[0.0, 0.0]], [0, 0]);
    let counter = params.retarget(1, 0, &[[1.0, 1.0]], [0, 0], 10);
    assert_eq!(counter, 10);

    // Four samples in, the glide sits at 0.4; head somewhere new from there.
    let counter = params.retarget(1, 6, &[[-1.0, 0.0]], [0, 0], 7);
    let mut now = [[0.0f32; 2]; 1];
    params.coeffs_at(1, counter, &mut now);
    assert!((now[0][0] - 0.4).abs() < EPSILON);
    assert!((now[0][1] - 0.4).abs() < EPSILON);
    params.coeffs_at(1, 0, &mut now);
    assert_eq!(now[0], [-1.0, 0.0]);
}

#[test]
fn state_advance_tracks_offset_and_counter() {
    let mut state = HrtfState::new();
    state.counter = 100;
    state.advance(64);
    assert_eq!((state.offset, state.counter), (64, 36));
    state.advance(64);
    assert_eq!((state.offset, state.counter), (128, 0));
    assert!(state.moving);

    state.channels[2].values.frames_mut()[5] = [1.0, 1.0];
    state.reset();
    assert_eq!(state.offset, 0);
    assert!(!state.moving);
    assert!(state.channels[2].ring().frames().iter().all(|f| *f == [0.0, 0.0]));
}

use std::f64::consts::TAU;

use crate::foundation::error::{LoopforgeError, LoopforgeResult};
use crate::foundation::math::{Rng64, noise01};
use crate::interpret::prompt::{Interpretation, Trigger};
use crate::session::paths::GenerationPaths;

/// Synthesis sample rate, matched to the encoder's AAC output.
pub const SAMPLE_RATE: u32 = 48_000;
pub const CHANNELS: u16 = 2;

/// Synthesize the loop-matched waveform and write it as a stereo f32 WAV at
/// `paths.audio_path`.
///
/// The signal is built on a circular time domain of exactly
/// `duration_seconds * SAMPLE_RATE` sample frames: tonal components use an
/// integer number of cycles per loop, noise beds are filtered circularly and
/// event tails wrap additively to the start. Sample 0 therefore *is* the
/// notional sample N, so repeat playback has no click.
///
/// Reads only the immutable interpretation; shares no state with the
/// renderer.
#[tracing::instrument(skip(interpretation, paths))]
pub fn synthesize_loop_audio(
    interpretation: &Interpretation,
    paths: &GenerationPaths,
) -> LoopforgeResult<()> {
    let samples = synthesize_samples(interpretation)?;

    let spec = hound::WavSpec {
        channels: CHANNELS,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(&paths.audio_path, spec).map_err(|e| {
        LoopforgeError::audio(format!(
            "failed to create audio file '{}': {e}",
            paths.audio_path.display()
        ))
    })?;
    for &s in &samples {
        writer
            .write_sample(s)
            .map_err(|e| LoopforgeError::audio(format!("failed to write audio sample: {e}")))?;
    }
    writer
        .finalize()
        .map_err(|e| LoopforgeError::audio(format!("failed to finalize audio file: {e}")))?;
    Ok(())
}

/// Interleaved stereo samples for the full loop. Deterministic per
/// interpretation.
pub(crate) fn synthesize_samples(interpretation: &Interpretation) -> LoopforgeResult<Vec<f32>> {
    let n = interpretation.duration_seconds as usize * SAMPLE_RATE as usize;
    if n == 0 {
        return Err(LoopforgeError::audio(
            "interpretation yields zero audio samples (duration must be positive)",
        ));
    }

    let mut mono = vec![0.0f64; n];
    let seed = interpretation.seed;
    match interpretation.trigger {
        Trigger::KineticSand => fill_kinetic_sand(&mut mono, seed),
        Trigger::SlimeStretch => fill_slime_stretch(&mut mono, seed),
        Trigger::BubblePour => fill_bubble_pour(&mut mono, seed),
        Trigger::GlassTapping => fill_glass_tapping(&mut mono, seed),
    }

    normalize(&mut mono, 0.85);
    Ok(widen_stereo(&mono))
}

/// Loop phase in `[0, 1)` for sample `i` of `n`.
fn loop_pos(i: usize, n: usize) -> f64 {
    i as f64 / n as f64
}

/// Frequency snapped to an integer number of cycles per loop, so the tone
/// lands back on its starting phase at the wrap.
fn loop_hz(target_hz: f64, n: usize) -> f64 {
    let loop_secs = n as f64 / f64::from(SAMPLE_RATE);
    (target_hz * loop_secs).round().max(1.0) / loop_secs
}

/// One-pole lowpass run circularly: a warmup lap carries the filter state
/// across the wrap, then the kept lap overwrites the buffer. The seam pair is
/// processed like any interior pair.
fn circular_lowpass(buf: &mut [f64], alpha: f64) {
    let n = buf.len();
    let mut state = 0.0f64;
    for lap in 0..2 {
        for i in 0..n {
            state += alpha * (buf[i] - state);
            if lap == 1 {
                buf[i] = state;
            }
        }
    }
}

/// Add `event` into `buf` starting at `start`, wrapping past the end. Tails
/// that spill over the loop boundary land at the loop start, which is exactly
/// where they'd be audible on repeat playback.
fn add_wrapped(buf: &mut [f64], start: usize, event: &[f64]) {
    let n = buf.len();
    for (j, &s) in event.iter().enumerate() {
        buf[(start + j) % n] += s;
    }
}

fn normalize(buf: &mut [f64], peak: f64) {
    let max = buf.iter().fold(0.0f64, |m, &s| m.max(s.abs()));
    if max > 1e-12 {
        let k = peak / max;
        for s in buf.iter_mut() {
            *s *= k;
        }
    }
}

/// Mono to interleaved stereo with a slow periodic pan (two cycles per loop,
/// so the image position matches at the wrap).
fn widen_stereo(mono: &[f64]) -> Vec<f32> {
    let n = mono.len();
    let mut out = Vec::with_capacity(n * 2);
    for (i, &s) in mono.iter().enumerate() {
        let pan = 0.12 * (TAU * 2.0 * loop_pos(i, n)).sin();
        out.push((s * (1.0 - pan)).clamp(-1.0, 1.0) as f32);
        out.push((s * (1.0 + pan)).clamp(-1.0, 1.0) as f32);
    }
    out
}

/// Granular crunch: a dense train of short filtered-noise bursts over a soft
/// circular noise bed.
fn fill_kinetic_sand(buf: &mut [f64], seed: u64) {
    let n = buf.len();
    let mut rng = Rng64::new(seed ^ 0xad10);

    for (i, s) in buf.iter_mut().enumerate() {
        *s = (noise01(seed, i as u64) * 2.0 - 1.0) * 0.05;
    }
    circular_lowpass(buf, 0.08);

    let bursts = (n / SAMPLE_RATE as usize).max(1) * 9;
    for b in 0..bursts {
        let start = rng.next_usize(n);
        let len = (SAMPLE_RATE as usize * rng.next_usize(50).max(30)) / 1000;
        let amp = rng.next_f64_range(0.25, 0.7);
        let grit = rng.next_f64_range(0.15, 0.4);

        let mut event = vec![0.0f64; len];
        for (j, e) in event.iter_mut().enumerate() {
            let t = j as f64 / len as f64;
            let env = (1.0 - t).powi(3) * (t * 40.0).min(1.0);
            let noise = noise01(seed ^ b as u64, j as u64) * 2.0 - 1.0;
            *e = noise * env * amp;
        }
        circular_lowpass(&mut event, grit);
        add_wrapped(buf, start, &event);
    }
}

/// Fluid whoosh: breathy noise swelling with the same `(1 - cos) / 2`
/// envelope the visual stretch uses, over a low drone.
fn fill_slime_stretch(buf: &mut [f64], seed: u64) {
    let n = buf.len();
    let drone_hz = loop_hz(62.0, n);
    let sub_hz = loop_hz(41.0, n);

    let mut noise: Vec<f64> = (0..n)
        .map(|i| noise01(seed, i as u64) * 2.0 - 1.0)
        .collect();
    circular_lowpass(&mut noise, 0.02);
    circular_lowpass(&mut noise, 0.02);

    for i in 0..n {
        let p = loop_pos(i, n);
        let swell = 0.5 - 0.5 * (TAU * p).cos();
        let t = i as f64 / f64::from(SAMPLE_RATE);
        let drone = 0.22 * (TAU * drone_hz * t).sin() + 0.12 * (TAU * sub_hz * t).sin();
        buf[i] = drone * (0.5 + 0.5 * swell) + noise[i] * 2.2 * swell;
    }
}

/// Liquid pour: a circular water-noise bed plus rising-chirp bubble pops.
fn fill_bubble_pour(buf: &mut [f64], seed: u64) {
    let n = buf.len();
    let mut rng = Rng64::new(seed ^ 0xb0b);

    for (i, s) in buf.iter_mut().enumerate() {
        *s = (noise01(seed, i as u64) * 2.0 - 1.0) * 0.35;
    }
    circular_lowpass(buf, 0.25);
    // Amplitude ripple, three cycles per loop.
    for i in 0..n {
        let p = loop_pos(i, n);
        buf[i] *= 0.7 + 0.3 * (TAU * 3.0 * p).sin();
    }

    let pops = (n / SAMPLE_RATE as usize).max(1) * 5;
    for _ in 0..pops {
        let start = rng.next_usize(n);
        let len = (SAMPLE_RATE as usize * (40 + rng.next_usize(60))) / 1000;
        let f0 = rng.next_f64_range(380.0, 900.0);
        let amp = rng.next_f64_range(0.2, 0.5);

        let mut event = vec![0.0f64; len];
        let mut ph = 0.0f64;
        for (j, e) in event.iter_mut().enumerate() {
            let t = j as f64 / len as f64;
            // Pitch rises as the bubble shrinks.
            let f = f0 * (1.0 + 1.8 * t);
            ph += TAU * f / f64::from(SAMPLE_RATE);
            *e = ph.sin() * (1.0 - t).powi(2) * amp;
        }
        add_wrapped(buf, start, &event);
    }
}

/// Sparse bright taps with ringing partials over near-silence.
fn fill_glass_tapping(buf: &mut [f64], seed: u64) {
    let n = buf.len();
    let mut rng = Rng64::new(seed ^ 0x9a55);

    for (i, s) in buf.iter_mut().enumerate() {
        *s = (noise01(seed, i as u64) * 2.0 - 1.0) * 0.012;
    }
    circular_lowpass(buf, 0.05);

    let taps = (n / SAMPLE_RATE as usize).max(1) * 2;
    for _ in 0..taps {
        let start = rng.next_usize(n);
        let len = (SAMPLE_RATE as usize * (120 + rng.next_usize(120))) / 1000;
        let f0 = rng.next_f64_range(1400.0, 3200.0);
        let amp = rng.next_f64_range(0.3, 0.6);

        let mut event = vec![0.0f64; len];
        for (j, e) in event.iter_mut().enumerate() {
            let t = j as f64 / len as f64;
            let ts = j as f64 / f64::from(SAMPLE_RATE);
            let ring = (TAU * f0 * ts).sin() + 0.4 * (TAU * f0 * 2.76 * ts).sin();
            *e = ring * (-9.0 * t).exp() * amp;
        }
        add_wrapped(buf, start, &event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpret::prompt::interpret;
    use crate::session::paths::{GenerationPaths, GenerationToken};

    fn interp_for(trigger_prompt: &str) -> Interpretation {
        Interpretation {
            duration_seconds: 2,
            ..interpret(trigger_prompt)
        }
    }

    #[test]
    fn sample_count_matches_duration_exactly() {
        for prompt in ["kinetic sand", "slime", "bubble pour", "glass taps"] {
            let interp = interp_for(prompt);
            let samples = synthesize_samples(&interp).unwrap();
            assert_eq!(
                samples.len(),
                interp.duration_seconds as usize * SAMPLE_RATE as usize * CHANNELS as usize
            );
        }
    }

    #[test]
    fn synthesis_is_deterministic() {
        let interp = interp_for("bubble pour");
        assert_eq!(
            synthesize_samples(&interp).unwrap(),
            synthesize_samples(&interp).unwrap()
        );
    }

    #[test]
    fn loop_seam_jump_is_no_worse_than_interior_jumps() {
        // The circular construction makes the wrap pair (last, first) an
        // ordinary adjacent pair; its jump must sit inside the signal's own
        // adjacent-jump range.
        for prompt in ["kinetic sand", "slime", "bubble pour", "glass taps"] {
            let interp = interp_for(prompt);
            let samples = synthesize_samples(&interp).unwrap();
            let left: Vec<f32> = samples.iter().step_by(2).copied().collect();

            let interior_max = left
                .windows(2)
                .map(|w| (w[1] - w[0]).abs())
                .fold(0.0f32, f32::max);
            let seam = (left[0] - *left.last().unwrap()).abs();
            assert!(
                seam <= interior_max,
                "seam jump {seam} exceeds interior max {interior_max} for '{prompt}'"
            );
        }
    }

    #[test]
    fn output_stays_within_unit_range() {
        let interp = interp_for("crunchy sand");
        let samples = synthesize_samples(&interp).unwrap();
        assert!(samples.iter().all(|s| s.abs() <= 1.0));
        assert!(samples.iter().any(|s| s.abs() > 0.05));
    }

    #[test]
    fn zero_duration_is_an_error() {
        let interp = Interpretation {
            duration_seconds: 0,
            ..interpret("slime")
        };
        assert!(synthesize_samples(&interp).is_err());
    }

    #[test]
    fn wav_file_has_expected_spec_and_length() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = GenerationPaths::new(tmp.path(), &GenerationToken::new());
        paths.prepare().unwrap();
        let interp = interp_for("glass tapping");

        synthesize_loop_audio(&interp, &paths).unwrap();

        let reader = hound::WavReader::open(&paths.audio_path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, CHANNELS);
        assert_eq!(spec.sample_rate, SAMPLE_RATE);
        assert_eq!(spec.sample_format, hound::SampleFormat::Float);
        assert_eq!(
            reader.len(),
            interp.duration_seconds * SAMPLE_RATE * u32::from(CHANNELS)
        );
    }

    #[test]
    fn loop_hz_snaps_to_integer_cycles() {
        let n = 2 * SAMPLE_RATE as usize;
        let hz = loop_hz(62.0, n);
        let cycles = hz * (n as f64 / f64::from(SAMPLE_RATE));
        assert!((cycles - cycles.round()).abs() < 1e-9);
    }
}

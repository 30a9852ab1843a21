//! Procedural generation of the three sound cues. Everything is synthesized
//! into plain f32 PCM at startup; no audio files ship with the game.

use crate::utils::Xorshift32;

use std::f32::consts::TAU;

/// PCM rate used by the native backend (the web backend asks the audio
/// context for its own rate).
pub const SAMPLE_RATE: u32 = 44_100;
/// Output gain applied to every cue at playback.
pub const OUTPUT_GAIN: f32 = 0.3;

/// Laser "pew": a bright tone over a low body, dying off fast.
pub fn laser_samples(sample_rate: u32) -> Vec<f32> {
    let len = (0.2 * sample_rate as f32) as usize;
    (0..len)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            let high = (TAU * 1800.0 * t).sin();
            let low = (TAU * 180.0 * t).sin();
            let decay = (-8.0 * t).exp();
            (high * 0.7 + low * 0.3) * decay
        })
        .collect()
}

/// Engine hum: noise over a 100 Hz base, meant to be looped while thrust
/// is held.
pub fn engine_samples(sample_rate: u32) -> Vec<f32> {
    let mut rng = Xorshift32::new(0x5EED);
    let len = sample_rate as usize;
    (0..len)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            let noise = rng.next_f32() * 2.0 - 1.0;
            let base = (TAU * 100.0 * t).sin();
            (noise * 0.3 + base * 0.7) * 0.5
        })
        .collect()
}

/// Boost whoosh: a rising sweep with a slow decay.
pub fn boost_samples(sample_rate: u32) -> Vec<f32> {
    let len = (0.5 * sample_rate as f32) as usize;
    (0..len)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            let freq = 200.0 + 1000.0 * t;
            let whoosh = (TAU * freq * t).sin();
            let decay = (-2.0 * t).exp();
            whoosh * decay * 0.5
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peak(samples: &[f32]) -> f32 {
        samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
    }

    #[test]
    fn buffers_have_the_expected_lengths() {
        assert_eq!(laser_samples(SAMPLE_RATE).len(), 8820);
        assert_eq!(engine_samples(SAMPLE_RATE).len(), 44_100);
        assert_eq!(boost_samples(SAMPLE_RATE).len(), 22_050);
    }

    #[test]
    fn samples_stay_within_unit_amplitude() {
        for samples in [
            laser_samples(SAMPLE_RATE),
            engine_samples(SAMPLE_RATE),
            boost_samples(SAMPLE_RATE),
        ] {
            assert!(samples.iter().all(|s| s.abs() <= 1.0));
            assert!(peak(&samples) > 0.0);
        }
    }

    #[test]
    fn laser_and_boost_decay_over_time() {
        for samples in [laser_samples(SAMPLE_RATE), boost_samples(SAMPLE_RATE)] {
            let head = peak(&samples[..samples.len() / 10]);
            let tail = peak(&samples[samples.len() * 9 / 10..]);
            assert!(head > tail * 2.0);
        }
    }

    #[test]
    fn engine_is_reproducible_for_seamless_looping() {
        assert_eq!(engine_samples(SAMPLE_RATE), engine_samples(SAMPLE_RATE));
    }
}

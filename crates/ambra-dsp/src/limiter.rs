//! Look-ahead-free peak limiter.
//!
//! One gain envelope shared by all channels: instant attack whenever the
//! per-frame peak would exceed the ceiling, exponential release back toward
//! unity. The envelope persists across blocks.

use ambra_core::Sample;

use crate::buffer::AudioBuffer;

pub struct PeakLimiter {
    ceiling: f64,
    release_time_constant: f64,
    env: f64,
}

impl PeakLimiter {
    /// Creates a limiter for `sampling_rate` Hz with the given release time
    /// in milliseconds and ceiling in dBFS.
    pub fn new(sampling_rate: u32, release_ms: f64, ceiling_db: f64) -> Self {
        assert!(sampling_rate > 0);
        assert!(release_ms > 0.0);
        Self {
            ceiling: 10f64.powf(ceiling_db / 20.0),
            release_time_constant: (-3.0 / (sampling_rate as f64 * release_ms / 1000.0)).exp(),
            env: 1.0,
        }
    }

    /// Current gain envelope, in (0, 1].
    #[inline]
    pub fn envelope(&self) -> f64 {
        self.env
    }

    /// Restores the envelope to unity.
    pub fn reset(&mut self) {
        self.env = 1.0;
    }

    /// Limits the buffer in place. Per frame, the envelope follows the
    /// maximum absolute sample across all channels; every channel of the
    /// frame is scaled by the same envelope value.
    pub fn process_in_place(&mut self, buffer: &mut AudioBuffer) {
        let num_channels = buffer.num_channels();
        let num_frames = buffer.num_frames();
        for frame in 0..num_frames {
            let mut peak = 0.0f64;
            for channel in 0..num_channels {
                peak = peak.max(buffer[channel][frame].abs() as f64);
            }
            let required_gain = if peak > self.ceiling {
                self.ceiling / peak
            } else {
                1.0
            };
            if required_gain < self.env {
                self.env = required_gain;
            } else {
                self.env = self.release_time_constant * (self.env - required_gain) + required_gain;
            }
            let gain = self.env as Sample;
            for channel in 0..num_channels {
                buffer[channel][frame] *= gain;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: u32 = 48000;

    #[test]
    fn clamps_within_one_sample() {
        let ceiling_db = -0.5;
        let ceiling = 10f64.powf(ceiling_db / 20.0);
        let mut limiter = PeakLimiter::new(SAMPLE_RATE, 50.0, ceiling_db);

        let mut buffer = AudioBuffer::new(2, 128);
        for channel in buffer.channels_mut() {
            channel.fill(1.0);
        }
        limiter.process_in_place(&mut buffer);
        for channel in buffer.channels() {
            for &sample in channel {
                assert!(sample.abs() as f64 <= ceiling + 1e-6);
            }
        }
    }

    #[test]
    fn quiet_signal_is_untouched() {
        let mut limiter = PeakLimiter::new(SAMPLE_RATE, 50.0, -0.5);
        let mut buffer = AudioBuffer::new(2, 64);
        for channel in buffer.channels_mut() {
            channel.fill(0.25);
        }
        limiter.process_in_place(&mut buffer);
        for channel in buffer.channels() {
            assert!(channel.iter().all(|&s| (s - 0.25).abs() < 1e-7));
        }
    }

    #[test]
    fn envelope_releases_with_expected_time_constant() {
        let release_ms = 50.0;
        let mut limiter = PeakLimiter::new(SAMPLE_RATE, release_ms, -0.5);

        // Drive the envelope down with a loud block.
        let mut loud = AudioBuffer::new(1, 16);
        loud.channel_mut(0).fill(2.0);
        limiter.process_in_place(&mut loud);
        let depressed = limiter.envelope();
        assert!(depressed < 1.0);

        // One release time of silence recovers all but e^-3 of the dip.
        let release_samples = (SAMPLE_RATE as f64 * release_ms / 1000.0) as usize;
        let mut silence = AudioBuffer::new(1, release_samples);
        limiter.process_in_place(&mut silence);
        let recovered = limiter.envelope();
        let expected = 1.0 - (1.0 - depressed) * (-3.0f64).exp();
        assert!((recovered - expected).abs() < 1e-9);
        assert!(recovered < 1.0);
    }

    #[test]
    fn stereo_channels_share_the_envelope() {
        let ceiling_db = -0.5;
        let ceiling = 10f64.powf(ceiling_db / 20.0);
        let mut limiter = PeakLimiter::new(SAMPLE_RATE, 50.0, ceiling_db);

        // Loud left, quiet right: the right channel is ducked by the same
        // gain that limits the left, keeping the inter-channel ratio.
        let mut buffer = AudioBuffer::new(2, 4);
        buffer.channel_mut(0).fill(2.0);
        buffer.channel_mut(1).fill(0.5);
        limiter.process_in_place(&mut buffer);
        let gain = ceiling / 2.0;
        for frame in 0..4 {
            assert!((buffer[0][frame] as f64 - 2.0 * gain).abs() < 1e-6);
            assert!((buffer[1][frame] as f64 - 0.5 * gain).abs() < 1e-6);
        }
    }
}

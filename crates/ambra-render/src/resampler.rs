//! Rational polyphase resampler.
//!
//! Converts between sampling rates source/destination reduced by their GCD
//! to an up/down rate pair. The interpolation filter is a Hann-windowed sinc
//! designed at the upsampled rate and stored phase by phase; streaming state
//! carries the filter history across calls. In this renderer it runs once
//! per asset load, never on the realtime path.

use ambra_core::{find_gcd, AmbraError, AmbraResult, Sample, TWO_PI};
use ambra_dsp::AudioBuffer;

/// Sinc zero crossings kept on each side of the filter center, at the lower
/// of the two Nyquist rates.
const SINC_ZERO_CROSSINGS: usize = 16;

/// Largest reduced up/down rate supported; beyond this the filter gets
/// impractically long.
const MAX_REDUCED_RATE: i64 = 1000;

pub struct Resampler {
    up_rate: usize,
    down_rate: usize,
    num_channels: usize,
    coeffs_per_phase: usize,
    /// Filter coefficients per phase: phase p holds h[p], h[p + up], ...
    phase_coeffs: Vec<Vec<Sample>>,
    /// Last coeffs_per_phase - 1 input frames per channel.
    state: AudioBuffer,
    /// Global input frames consumed so far.
    consumed_frames: usize,
    /// Global output frames produced so far.
    produced_frames: usize,
}

impl Resampler {
    pub fn new() -> Self {
        Self {
            up_rate: 1,
            down_rate: 1,
            num_channels: 0,
            coeffs_per_phase: 1,
            phase_coeffs: vec![vec![1.0]],
            state: AudioBuffer::new(0, 0),
            consumed_frames: 0,
            produced_frames: 0,
        }
    }

    /// Whether the rate pair is supported.
    pub fn are_sample_rates_supported(source: i64, destination: i64) -> bool {
        if source <= 0 || destination <= 0 {
            return false;
        }
        let gcd = find_gcd(source, destination);
        source / gcd <= MAX_REDUCED_RATE && destination / gcd <= MAX_REDUCED_RATE
    }

    /// Configures rates and channel count, regenerating the polyphase filter.
    /// Resets the streaming state.
    pub fn set_rate_and_num_channels(
        &mut self,
        source_frequency: i64,
        destination_frequency: i64,
        num_channels: usize,
    ) -> AmbraResult<()> {
        if !Self::are_sample_rates_supported(source_frequency, destination_frequency) {
            return Err(AmbraError::InvalidArgument(format!(
                "unsupported resampling rates {source_frequency} -> {destination_frequency}"
            )));
        }
        let gcd = find_gcd(source_frequency, destination_frequency);
        self.up_rate = (destination_frequency / gcd) as usize;
        self.down_rate = (source_frequency / gcd) as usize;
        self.num_channels = num_channels;
        self.generate_polyphase_filter();
        self.state = AudioBuffer::new(num_channels, self.coeffs_per_phase.saturating_sub(1));
        self.reset_state();
        Ok(())
    }

    /// Upper bound on the output length for `input_length` frames.
    pub fn max_output_length(&self, input_length: usize) -> usize {
        (input_length * self.up_rate).div_ceil(self.down_rate)
    }

    /// Exact output length the next `process` call will produce for
    /// `input_length` frames, given the current stream position.
    pub fn next_output_length(&self, input_length: usize) -> usize {
        let available = (self.consumed_frames + input_length) * self.up_rate;
        if available == 0 {
            return 0;
        }
        let total_out = (available - 1) / self.down_rate + 1;
        total_out - self.produced_frames
    }

    /// Resamples `input` into `output`. The output must hold exactly
    /// `next_output_length(input.num_frames())` frames.
    pub fn process(&mut self, input: &AudioBuffer, output: &mut AudioBuffer) {
        assert_eq!(input.num_channels(), self.num_channels);
        assert_eq!(output.num_channels(), self.num_channels);
        assert_eq!(output.num_frames(), self.next_output_length(input.num_frames()));

        let history = self.coeffs_per_phase - 1;
        for channel in 0..self.num_channels {
            let in_channel = input.channel(channel);
            let state_channel = self.state.channel(channel);
            // Virtual sample lookup: history frames precede this block.
            let sample_at = |global: i64| -> Sample {
                let local = global - self.consumed_frames as i64;
                if local >= 0 {
                    in_channel[local as usize]
                } else {
                    let state_index = local + history as i64;
                    if state_index >= 0 {
                        state_channel[state_index as usize]
                    } else {
                        0.0
                    }
                }
            };

            let out_channel = output.channel_mut(channel);
            for (j, out) in out_channel.iter_mut().enumerate() {
                let output_index = self.produced_frames + j;
                let time = output_index * self.down_rate;
                let base = (time / self.up_rate) as i64;
                let phase = time % self.up_rate;
                let coeffs = &self.phase_coeffs[phase];
                let mut accumulator = 0.0f32;
                for (k, &coeff) in coeffs.iter().enumerate() {
                    accumulator += coeff * sample_at(base - k as i64);
                }
                *out = accumulator;
            }
        }

        // Carry the trailing frames into the state buffer.
        let input_len = input.num_frames();
        for channel in 0..self.num_channels {
            let mut carried = vec![0.0f32; history];
            for (i, value) in carried.iter_mut().enumerate() {
                let global = (self.consumed_frames + input_len) as i64 - history as i64 + i as i64;
                let local = global - self.consumed_frames as i64;
                *value = if local >= 0 {
                    input.channel(channel)[local as usize]
                } else if global >= 0 {
                    let state_index = local + history as i64;
                    if state_index >= 0 {
                        self.state.channel(channel)[state_index as usize]
                    } else {
                        0.0
                    }
                } else {
                    0.0
                };
            }
            self.state.channel_mut(channel).copy_from_slice(&carried);
        }

        self.consumed_frames += input_len;
        self.produced_frames += output.num_frames();
    }

    /// Clears the streaming state for reuse on a fresh stream.
    pub fn reset_state(&mut self) {
        self.state.clear();
        self.consumed_frames = 0;
        self.produced_frames = 0;
    }

    /// Hann-windowed sinc at the upsampled rate, arranged per phase. The
    /// cutoff sits at the lower of the two Nyquist frequencies; the gain
    /// compensates the zero stuffing.
    fn generate_polyphase_filter(&mut self) {
        if self.up_rate == self.down_rate {
            self.coeffs_per_phase = 1;
            self.phase_coeffs = vec![vec![1.0]];
            return;
        }
        let cutoff = 0.5 / self.up_rate.max(self.down_rate) as f64;
        let half_width = SINC_ZERO_CROSSINGS * self.up_rate.max(self.down_rate);
        let num_taps = 2 * half_width + 1;

        let mut filter = vec![0.0f64; num_taps];
        for (n, tap) in filter.iter_mut().enumerate() {
            let argument = n as f64 - half_width as f64;
            let sinc = if argument == 0.0 {
                2.0 * cutoff
            } else {
                (TWO_PI as f64 * cutoff * argument).sin() / (std::f64::consts::PI * argument)
            };
            let window =
                0.5 * (1.0 - (TWO_PI as f64 * n as f64 / (num_taps - 1) as f64).cos());
            *tap = sinc * window * self.up_rate as f64;
        }

        self.coeffs_per_phase = num_taps.div_ceil(self.up_rate);
        self.phase_coeffs = (0..self.up_rate)
            .map(|phase| {
                (0..self.coeffs_per_phase)
                    .map(|k| {
                        filter
                            .get(phase + k * self.up_rate)
                            .copied()
                            .unwrap_or(0.0) as Sample
                    })
                    .collect()
            })
            .collect();
    }
}

impl Default for Resampler {
    fn default() -> Self {
        Self::new()
    }
}

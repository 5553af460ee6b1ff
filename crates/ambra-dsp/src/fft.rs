//! Real-FFT facility shared by the convolution components.
//!
//! Wraps a pair of realfft plans of one fixed size
//! N = max(2 * next_pow_two(frames_per_buffer), 32) and owns every scratch
//! buffer the transforms need, so nothing allocates after construction.
//! Spectra are half-complex buffers of N/2 + 1 bins in realfft's native
//! packing. Not thread safe; use one manager per render context.
//!
//! Working set: one N-sample time scratch, one spectrum scratch and the two
//! plan scratch buffers (each at most N complex values), independent of the
//! Ambisonic order and kernel length.

use std::sync::Arc;

use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};
use rustfft::num_complex::Complex;

use ambra_core::{next_pow_two, Sample};

use crate::simd;

/// Minimum FFT size.
pub const MIN_FFT_SIZE: usize = 32;

pub struct FftManager {
    fft_size: usize,
    frames_per_buffer: usize,
    inverse_fft_scale: Sample,
    forward: Arc<dyn RealToComplex<Sample>>,
    inverse: Arc<dyn ComplexToReal<Sample>>,
    time_scratch: Vec<Sample>,
    freq_scratch: Vec<Complex<Sample>>,
    forward_scratch: Vec<Complex<Sample>>,
    inverse_scratch: Vec<Complex<Sample>>,
}

impl FftManager {
    /// Creates a manager for buffers of `frames_per_buffer` frames.
    pub fn new(frames_per_buffer: usize) -> Self {
        assert!(frames_per_buffer > 0);
        let fft_size = (next_pow_two(frames_per_buffer) * 2).max(MIN_FFT_SIZE);
        debug_assert!(fft_size.is_power_of_two());

        let mut planner = RealFftPlanner::<Sample>::new();
        let forward = planner.plan_fft_forward(fft_size);
        let inverse = planner.plan_fft_inverse(fft_size);
        let forward_scratch = forward.make_scratch_vec();
        let inverse_scratch = inverse.make_scratch_vec();

        Self {
            fft_size,
            frames_per_buffer,
            inverse_fft_scale: 1.0 / fft_size as Sample,
            time_scratch: vec![0.0; fft_size],
            freq_scratch: vec![Complex::new(0.0, 0.0); fft_size / 2 + 1],
            forward,
            inverse,
            forward_scratch,
            inverse_scratch,
        }
    }

    /// Number of points in the FFT.
    #[inline]
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    #[inline]
    pub fn frames_per_buffer(&self) -> usize {
        self.frames_per_buffer
    }

    /// Number of bins in a half-complex spectrum.
    #[inline]
    pub fn spectrum_len(&self) -> usize {
        self.fft_size / 2 + 1
    }

    /// Allocates a zeroed spectrum buffer of the right size. Construction-time
    /// helper; never call on the render path.
    pub fn make_freq_buffer(&self) -> Vec<Complex<Sample>> {
        vec![Complex::new(0.0, 0.0); self.spectrum_len()]
    }

    /// Transforms one channel of time-domain data into its spectrum. Inputs
    /// shorter than the FFT size are zero padded; the only accepted lengths
    /// are `frames_per_buffer` and `fft_size`.
    pub fn freq_from_time_domain(&mut self, time: &[Sample], freq: &mut [Complex<Sample>]) {
        assert_eq!(freq.len(), self.spectrum_len());
        assert!(time.len() == self.frames_per_buffer || time.len() == self.fft_size);
        self.time_scratch[..time.len()].copy_from_slice(time);
        self.time_scratch[time.len()..].fill(0.0);
        self.forward
            .process_with_scratch(&mut self.time_scratch, freq, &mut self.forward_scratch)
            .expect("forward FFT");
    }

    /// Transforms a spectrum back into the time domain. The output may be
    /// either `fft_size` long, or `frames_per_buffer` long to receive just
    /// the leading frames. No scaling is applied; see
    /// [`FftManager::apply_reverse_fft_scaling`].
    pub fn time_from_freq_domain(&mut self, freq: &[Complex<Sample>], time: &mut [Sample]) {
        assert_eq!(freq.len(), self.spectrum_len());
        // The inverse transform consumes its input, so work on a copy.
        self.freq_scratch.copy_from_slice(freq);
        if time.len() == self.fft_size {
            self.inverse
                .process_with_scratch(&mut self.freq_scratch, time, &mut self.inverse_scratch)
                .expect("inverse FFT");
        } else {
            assert_eq!(time.len(), self.frames_per_buffer);
            self.inverse
                .process_with_scratch(
                    &mut self.freq_scratch,
                    &mut self.time_scratch,
                    &mut self.inverse_scratch,
                )
                .expect("inverse FFT");
            time.copy_from_slice(&self.time_scratch[..self.frames_per_buffer]);
        }
    }

    /// Applies the 1/N scaling to a time-domain buffer. Unnecessary after
    /// [`FftManager::freq_domain_convolution`], which folds the factor in.
    pub fn apply_reverse_fft_scaling(&self, time: &mut [Sample]) {
        debug_assert!(time.len() == self.frames_per_buffer || time.len() == self.fft_size);
        simd::scalar_multiply(time, self.inverse_fft_scale);
    }

    /// Pointwise complex product of two spectra, scaled by exactly 1/N and
    /// accumulated into `accumulator`. Equivalent to a time-domain circular
    /// convolution once inverse transformed.
    pub fn freq_domain_convolution(
        &self,
        input_a: &[Complex<Sample>],
        input_b: &[Complex<Sample>],
        accumulator: &mut [Complex<Sample>],
    ) {
        assert_eq!(input_a.len(), self.spectrum_len());
        assert_eq!(input_b.len(), self.spectrum_len());
        assert_eq!(accumulator.len(), self.spectrum_len());
        let scale = self.inverse_fft_scale;
        for ((a, b), acc) in input_a.iter().zip(input_b).zip(accumulator.iter_mut()) {
            *acc += a * b * scale;
        }
    }

    /// Single-sided magnitude spectrum using the approximate complex
    /// magnitude kernel. DC is the first entry, Nyquist the last.
    pub fn magnitude_from_freq_buffer(&self, freq: &[Complex<Sample>], magnitude: &mut [Sample]) {
        assert_eq!(freq.len(), self.spectrum_len());
        assert_eq!(magnitude.len(), self.spectrum_len());
        let last = freq.len() - 1;
        magnitude[0] = freq[0].re.abs();
        simd::approx_complex_magnitude(
            complex_as_interleaved(&freq[1..last]),
            &mut magnitude[1..last],
        );
        magnitude[last] = freq[last].re.abs();
    }
}

/// Reinterprets a complex slice as interleaved (re, im) floats.
#[inline]
fn complex_as_interleaved(complex: &[Complex<Sample>]) -> &[Sample] {
    // Safety: Complex<T> is repr(C) with exactly the fields (re, im).
    unsafe { std::slice::from_raw_parts(complex.as_ptr() as *const Sample, complex.len() * 2) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_signal(len: usize) -> Vec<Sample> {
        (0..len)
            .map(|i| (i as Sample * 0.73).sin() * 0.5 + (i as Sample * 0.11).cos() * 0.25)
            .collect()
    }

    #[test]
    fn sizes() {
        assert_eq!(FftManager::new(1).fft_size(), MIN_FFT_SIZE);
        assert_eq!(FftManager::new(16).fft_size(), 32);
        assert_eq!(FftManager::new(18).fft_size(), 64);
        assert_eq!(FftManager::new(32).fft_size(), 64);
        assert_eq!(FftManager::new(512).fft_size(), 1024);
    }

    #[test]
    fn forward_inverse_round_trip() {
        for frames in [32usize, 47, 64, 128] {
            let mut fft = FftManager::new(frames);
            let input = test_signal(frames);
            let mut freq = fft.make_freq_buffer();
            fft.freq_from_time_domain(&input, &mut freq);
            let mut output = vec![0.0; frames];
            fft.time_from_freq_domain(&freq, &mut output);
            fft.apply_reverse_fft_scaling(&mut output);
            for (x, y) in input.iter().zip(&output) {
                assert!((x - y).abs() < 1e-5, "frames={frames}: {x} vs {y}");
            }
        }
    }

    #[test]
    fn full_length_round_trip() {
        let mut fft = FftManager::new(32);
        let n = fft.fft_size();
        let input = test_signal(n);
        let mut freq = fft.make_freq_buffer();
        fft.freq_from_time_domain(&input, &mut freq);
        let mut output = vec![0.0; n];
        fft.time_from_freq_domain(&freq, &mut output);
        fft.apply_reverse_fft_scaling(&mut output);
        for (x, y) in input.iter().zip(&output) {
            assert!((x - y).abs() < 1e-5);
        }
    }

    #[test]
    fn convolution_with_delta_is_identity() {
        let frames = 32;
        let mut fft = FftManager::new(frames);
        let mut delta = vec![0.0; frames];
        delta[0] = 1.0;
        let signal = test_signal(frames);

        let mut delta_freq = fft.make_freq_buffer();
        let mut signal_freq = fft.make_freq_buffer();
        fft.freq_from_time_domain(&delta, &mut delta_freq);
        fft.freq_from_time_domain(&signal, &mut signal_freq);

        let mut product = fft.make_freq_buffer();
        fft.freq_domain_convolution(&delta_freq, &signal_freq, &mut product);

        let mut output = vec![0.0; fft.fft_size()];
        fft.time_from_freq_domain(&product, &mut output);
        for i in 0..frames {
            assert!((output[i] - signal[i]).abs() < 1e-5);
        }
        for &tail in &output[frames..] {
            assert!(tail.abs() < 1e-5);
        }
    }

    #[test]
    fn magnitude_matches_exact_within_tolerance() {
        let frames = 64;
        let mut fft = FftManager::new(frames);
        let input = test_signal(frames);
        let mut freq = fft.make_freq_buffer();
        fft.freq_from_time_domain(&input, &mut freq);
        let mut magnitude = vec![0.0; fft.spectrum_len()];
        fft.magnitude_from_freq_buffer(&freq, &mut magnitude);
        for (bin, m) in freq.iter().zip(&magnitude) {
            let exact = (bin.re as f64).hypot(bin.im as f64) as Sample;
            if exact > 1e-6 {
                assert!((m - exact).abs() / exact < 2e-3);
            }
        }
    }
}

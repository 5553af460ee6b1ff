//! Block-partitioned frequency-domain FIR filtering.
//!
//! A kernel of length M is split into P = ceil(M/B) segments of B samples
//! (B = frames per buffer), each zero padded to the FFT size N and
//! transformed once at construction. Per call, the spectrum of the current
//! zero-padded input block enters a P-slot ring; the output spectrum is the
//! ring/kernel multiply-accumulate with the exact 1/N factor folded in, and
//! the inverse transform is folded into the running overlap-add carry. Each
//! call consumes exactly B input samples and produces exactly B output
//! samples.

use rustfft::num_complex::Complex;

use ambra_core::Sample;

use crate::fft::FftManager;
use crate::simd;

pub struct PartitionedFftFilter {
    frames_per_buffer: usize,
    fft_size: usize,
    num_partitions: usize,
    /// Kernel partition spectra, H_0 .. H_{P-1}.
    kernel_spectra: Vec<Vec<Complex<Sample>>>,
    /// Ring of the last P input-block spectra.
    input_spectra: Vec<Vec<Complex<Sample>>>,
    /// Ring slot that receives the next input block.
    ring_position: usize,
    /// Frequency-domain accumulator for the current call.
    accumulator: Vec<Complex<Sample>>,
    /// Inverse-transform scratch, N samples.
    inverse_time: Vec<Sample>,
    /// Overlap-add carry of the last N - B output samples.
    overlap: Vec<Sample>,
}

impl PartitionedFftFilter {
    /// Builds a filter for `kernel` at the block size of `fft`. The kernel
    /// must be non-empty; its length is rounded up to a whole number of
    /// partitions.
    pub fn new(kernel: &[Sample], fft: &mut FftManager) -> Self {
        assert!(!kernel.is_empty());
        let frames_per_buffer = fft.frames_per_buffer();
        let fft_size = fft.fft_size();
        assert!(fft_size >= 2 * frames_per_buffer);

        let num_partitions = kernel.len().div_ceil(frames_per_buffer);
        let mut kernel_spectra = Vec::with_capacity(num_partitions);
        let mut segment = vec![0.0; fft_size];
        for partition in 0..num_partitions {
            let start = partition * frames_per_buffer;
            let end = (start + frames_per_buffer).min(kernel.len());
            segment[..end - start].copy_from_slice(&kernel[start..end]);
            segment[end - start..].fill(0.0);
            let mut spectrum = fft.make_freq_buffer();
            fft.freq_from_time_domain(&segment, &mut spectrum);
            kernel_spectra.push(spectrum);
        }

        Self {
            frames_per_buffer,
            fft_size,
            num_partitions,
            kernel_spectra,
            input_spectra: vec![fft.make_freq_buffer(); num_partitions],
            ring_position: 0,
            accumulator: fft.make_freq_buffer(),
            inverse_time: vec![0.0; fft_size],
            overlap: vec![0.0; fft_size - frames_per_buffer],
        }
    }

    #[inline]
    pub fn num_partitions(&self) -> usize {
        self.num_partitions
    }

    /// Feeds the spectrum of one zero-padded input block and runs the
    /// frequency-domain multiply-accumulate over all partitions. Follow with
    /// [`PartitionedFftFilter::get_filtered_signal`] to retrieve the block.
    pub fn filter(&mut self, freq_input: &[Complex<Sample>], fft: &FftManager) {
        assert_eq!(freq_input.len(), fft.spectrum_len());
        self.input_spectra[self.ring_position].copy_from_slice(freq_input);
        self.accumulator.fill(Complex::new(0.0, 0.0));
        for partition in 0..self.num_partitions {
            let slot = (self.ring_position + self.num_partitions - partition) % self.num_partitions;
            fft.freq_domain_convolution(
                &self.input_spectra[slot],
                &self.kernel_spectra[partition],
                &mut self.accumulator,
            );
        }
        self.ring_position = (self.ring_position + 1) % self.num_partitions;
    }

    /// Inverse transforms the accumulated spectrum and emits one output block
    /// of `frames_per_buffer` samples via overlap-add.
    pub fn get_filtered_signal(&mut self, output: &mut [Sample], fft: &mut FftManager) {
        assert_eq!(output.len(), self.frames_per_buffer);
        fft.time_from_freq_domain(&self.accumulator, &mut self.inverse_time);

        let block = self.frames_per_buffer;
        let carry = self.fft_size - block;
        // Current block is the leading B samples plus the carried overlap.
        output.copy_from_slice(&self.inverse_time[..block]);
        simd::add_pointwise(&self.overlap[..block], output);
        // Shift the carry down one block and fold in the new tail.
        self.overlap.copy_within(block.., 0);
        self.overlap[carry - block..].fill(0.0);
        simd::add_pointwise(&self.inverse_time[block..], &mut self.overlap);
    }

    /// Drops all input history and pending overlap.
    pub fn reset(&mut self) {
        for spectrum in &mut self.input_spectra {
            spectrum.fill(Complex::new(0.0, 0.0));
        }
        self.accumulator.fill(Complex::new(0.0, 0.0));
        self.overlap.fill(0.0);
        self.ring_position = 0;
    }
}

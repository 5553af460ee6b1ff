//! Ambisonic binaural decoder.
//!
//! Holds one partitioned filter per ear and SH channel, kernelled with the
//! matching SH-HRIR channel. Per block, each mix-bus channel is forward
//! transformed once and that spectrum drives both the left and right filter
//! of the channel; the per-ear results accumulate into the stereo output.

use rustfft::num_complex::Complex;

use ambra_core::{Sample, NUM_BINAURAL_CHANNELS};

use crate::buffer::AudioBuffer;
use crate::fft::FftManager;
use crate::partitioned_filter::PartitionedFftFilter;
use crate::simd;

pub struct AmbisonicBinauralDecoder {
    filters_left: Vec<PartitionedFftFilter>,
    filters_right: Vec<PartitionedFftFilter>,
    /// Forward transform of the current mix channel, shared by both ears.
    freq_input: Vec<Complex<Sample>>,
    /// Per-ear filtered block scratch.
    filtered: Vec<Sample>,
}

impl AmbisonicBinauralDecoder {
    /// Creates a decoder from left and right SH-HRIR banks of identical
    /// shape: one channel per SH channel, kernel length = HRIR length.
    pub fn new(
        sh_hrirs_left: &AudioBuffer,
        sh_hrirs_right: &AudioBuffer,
        fft: &mut FftManager,
    ) -> Self {
        let num_channels = sh_hrirs_left.num_channels();
        assert!(num_channels > 0);
        assert!(sh_hrirs_left.num_frames() > 0);
        assert_eq!(sh_hrirs_right.num_channels(), num_channels);
        assert_eq!(sh_hrirs_right.num_frames(), sh_hrirs_left.num_frames());

        let mut filters_left = Vec::with_capacity(num_channels);
        let mut filters_right = Vec::with_capacity(num_channels);
        for channel in 0..num_channels {
            filters_left.push(PartitionedFftFilter::new(sh_hrirs_left.channel(channel), fft));
            filters_right.push(PartitionedFftFilter::new(
                sh_hrirs_right.channel(channel),
                fft,
            ));
        }

        Self {
            filters_left,
            filters_right,
            freq_input: fft.make_freq_buffer(),
            filtered: vec![0.0; fft.frames_per_buffer()],
        }
    }

    /// Number of SH channels the decoder expects.
    #[inline]
    pub fn num_channels(&self) -> usize {
        self.filters_left.len()
    }

    /// Renders an Ambisonic mix into 2-channel binaural output.
    pub fn process(&mut self, input: &AudioBuffer, output: &mut AudioBuffer, fft: &mut FftManager) {
        assert_eq!(input.num_channels(), self.filters_left.len());
        assert_eq!(output.num_channels(), NUM_BINAURAL_CHANNELS);
        assert_eq!(input.num_frames(), output.num_frames());
        assert_eq!(input.num_frames(), fft.frames_per_buffer());

        output.clear();
        for channel in 0..input.num_channels() {
            fft.freq_from_time_domain(input.channel(channel), &mut self.freq_input);

            self.filters_left[channel].filter(&self.freq_input, fft);
            self.filters_left[channel].get_filtered_signal(&mut self.filtered, fft);
            simd::add_pointwise(&self.filtered, output.channel_mut(0));

            self.filters_right[channel].filter(&self.freq_input, fft);
            self.filters_right[channel].get_filtered_signal(&mut self.filtered, fft);
            simd::add_pointwise(&self.filtered, output.channel_mut(1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_channel_delta_hrir_passes_input_through() {
        let frames = 16;
        let mut fft = FftManager::new(frames);
        let mut hrir = AudioBuffer::new(1, 4);
        hrir.channel_mut(0)[0] = 1.0;
        let mut decoder = AmbisonicBinauralDecoder::new(&hrir, &hrir, &mut fft);

        let input =
            AudioBuffer::from_channel_data(&[(0..frames).map(|i| i as Sample).collect::<Vec<_>>()]);
        let mut output = AudioBuffer::new(2, frames);
        decoder.process(&input, &mut output, &mut fft);
        for i in 0..frames {
            assert!((output[0][i] - i as Sample).abs() < 1e-4);
            assert!((output[1][i] - i as Sample).abs() < 1e-4);
        }
    }

    #[test]
    fn channels_accumulate_per_ear() {
        let frames = 8;
        let mut fft = FftManager::new(frames);
        // Two SH channels; left ear hears both at unit gain, right ear hears
        // the second negated.
        let left = AudioBuffer::from_channel_data(&[vec![1.0f32], vec![1.0f32]]);
        let right = AudioBuffer::from_channel_data(&[vec![1.0f32], vec![-1.0f32]]);
        let mut decoder = AmbisonicBinauralDecoder::new(&left, &right, &mut fft);

        let input = AudioBuffer::from_channel_data(&[vec![0.5f32; frames], vec![0.25f32; frames]]);
        let mut output = AudioBuffer::new(2, frames);
        decoder.process(&input, &mut output, &mut fft);
        for i in 0..frames {
            assert!((output[0][i] - 0.75).abs() < 1e-5);
            assert!((output[1][i] - 0.25).abs() < 1e-5);
        }
    }
}

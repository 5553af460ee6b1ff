//! Ambisonic encoder: spherical-harmonic panning of point sources.
//!
//! Each encoded input channel carries a source record (gain, azimuth,
//! elevation, distance). The encoder keeps a dense (order+1)^2 x K matrix of
//! SN3D-normalized spherical-harmonic weights; `process` is a plain matrix
//! product over planar audio rows and never allocates.

use std::collections::HashMap;

use ambra_core::{
    acn_sequence, num_ambisonic_channels, sn3d_normalization, Sample,
    NEGATIVE_120_DB_IN_AMPLITUDE, RADIANS_FROM_DEGREES,
};

use crate::buffer::AudioBuffer;
use crate::legendre::AssociatedLegendrePolynomialsGenerator;
use crate::simd;

/// Geometry and gain of one encoded source.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Source {
    pub gain: Sample,
    pub azimuth: Sample,
    pub elevation: Sample,
    pub distance: Sample,
}

pub struct AmbisonicEncoder {
    num_input_channels: usize,
    num_output_channels: usize,
    ambisonic_order: usize,
    alp_generator: AssociatedLegendrePolynomialsGenerator,
    sources: HashMap<usize, Source>,
    /// Encoding matrix, row major: (order+1)^2 rows by K columns.
    encoding_matrix: Vec<Sample>,
}

impl AmbisonicEncoder {
    pub fn new(num_input_channels: usize, ambisonic_order: usize) -> Self {
        assert!(num_input_channels > 0);
        assert!(ambisonic_order > 0);
        let num_output_channels = num_ambisonic_channels(ambisonic_order);
        Self {
            num_input_channels,
            num_output_channels,
            ambisonic_order,
            alp_generator: AssociatedLegendrePolynomialsGenerator::new(
                ambisonic_order,
                false,
                false,
            ),
            sources: HashMap::new(),
            encoding_matrix: vec![0.0; num_output_channels * num_input_channels],
        }
    }

    #[inline]
    pub fn num_input_channels(&self) -> usize {
        self.num_input_channels
    }

    #[inline]
    pub fn num_output_channels(&self) -> usize {
        self.num_output_channels
    }

    /// Updates the source feeding `input_channel`. Angles are in degrees,
    /// distance in meters (clamped to a 0.5 m minimum). A no-op when the
    /// record is unchanged. Sources whose effective gain falls below -120 dB
    /// are muted. Only call between render blocks.
    pub fn set_source(
        &mut self,
        input_channel: usize,
        gain: Sample,
        azimuth: Sample,
        elevation: Sample,
        distance: Sample,
    ) {
        assert!(input_channel < self.num_input_channels);
        let record = Source {
            gain,
            azimuth,
            elevation,
            distance,
        };
        if self.sources.get(&input_channel) == Some(&record) {
            return;
        }
        self.sources.insert(input_channel, record);

        let overall_gain = gain / distance.max(0.5);
        if overall_gain < NEGATIVE_120_DB_IN_AMPLITUDE {
            self.clear_column(input_channel);
            return;
        }

        let mut coefficients = vec![0.0; self.num_output_channels];
        self.sh_coeffs(azimuth, elevation, &mut coefficients);
        for (row, coefficient) in coefficients.iter().enumerate() {
            self.encoding_matrix[row * self.num_input_channels + input_channel] =
                coefficient * overall_gain;
        }
    }

    /// Removes the source record of `input_channel` and mutes the channel.
    pub fn remove_source(&mut self, input_channel: usize) {
        assert!(input_channel < self.num_input_channels);
        self.sources.remove(&input_channel);
        self.clear_column(input_channel);
    }

    /// Encodes a planar block: output = matrix * input. Shapes must match the
    /// encoder exactly. Allocation free.
    pub fn process(&self, input: &AudioBuffer, output: &mut AudioBuffer) {
        assert_eq!(input.num_channels(), self.num_input_channels);
        assert_eq!(output.num_channels(), self.num_output_channels);
        assert_eq!(input.num_frames(), output.num_frames());

        for row in 0..self.num_output_channels {
            let weights = &self.encoding_matrix
                [row * self.num_input_channels..(row + 1) * self.num_input_channels];
            let out_row = output.channel_mut(row);
            out_row.fill(0.0);
            for (column, &weight) in weights.iter().enumerate() {
                if weight != 0.0 {
                    simd::scalar_multiply_and_accumulate(weight, input.channel(column), out_row);
                }
            }
        }
    }

    /// Writes the real SN3D spherical-harmonic coefficients for a direction
    /// into `coefficients`, ACN ordered, (order+1)^2 entries.
    pub fn sh_coeffs(&self, azimuth: Sample, elevation: Sample, coefficients: &mut [Sample]) {
        assert_eq!(coefficients.len(), self.num_output_channels);
        let azimuth_rad = azimuth as f64 * RADIANS_FROM_DEGREES;
        let elevation_rad = elevation as f64 * RADIANS_FROM_DEGREES;

        let polynomials = self.alp_generator.generate(elevation_rad.sin());
        for degree in 0..=self.ambisonic_order as i32 {
            for order in -degree..=degree {
                let row = acn_sequence(degree, order);
                let azimuth_term = if order >= 0 {
                    (order as f64 * azimuth_rad).cos()
                } else {
                    (-order as f64 * azimuth_rad).sin()
                };
                coefficients[row] = (sn3d_normalization(degree, order)
                    * polynomials[self.alp_generator.index(degree, order.abs())]
                    * azimuth_term) as Sample;
            }
        }
    }

    fn clear_column(&mut self, input_channel: usize) {
        for row in 0..self.num_output_channels {
            self.encoding_matrix[row * self.num_input_channels + input_channel] = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_input_encodes_to_zero() {
        let mut encoder = AmbisonicEncoder::new(2, 2);
        encoder.set_source(0, 1.0, 30.0, 10.0, 1.0);
        encoder.set_source(1, 1.0, -90.0, 0.0, 2.0);
        let input = AudioBuffer::new(2, 16);
        let mut output = AudioBuffer::new(9, 16);
        encoder.process(&input, &mut output);
        for channel in output.channels() {
            assert!(channel.iter().all(|&s| s == 0.0));
        }
    }

    #[test]
    fn removed_source_is_muted() {
        let mut encoder = AmbisonicEncoder::new(1, 1);
        encoder.set_source(0, 1.0, 45.0, 0.0, 1.0);
        encoder.remove_source(0);
        let mut input = AudioBuffer::new(1, 8);
        input.channel_mut(0).fill(1.0);
        let mut output = AudioBuffer::new(4, 8);
        encoder.process(&input, &mut output);
        for channel in output.channels() {
            assert!(channel.iter().all(|&s| s == 0.0));
        }
    }

    #[test]
    fn distance_gain_equivalence() {
        // A source at (gain g, distance d) matches (gain g*d'/d, distance d')
        // column for column; powers of two keep the float math exact.
        let mut near = AmbisonicEncoder::new(1, 3);
        near.set_source(0, 0.5, 10.0, 20.0, 1.0);
        let mut far = AmbisonicEncoder::new(1, 3);
        far.set_source(0, 1.0, 10.0, 20.0, 2.0);
        assert_eq!(near.encoding_matrix, far.encoding_matrix);
    }

    #[test]
    fn minimum_distance_is_clamped() {
        let mut close = AmbisonicEncoder::new(1, 1);
        close.set_source(0, 1.0, 0.0, 0.0, 0.0);
        let mut at_half_meter = AmbisonicEncoder::new(1, 1);
        at_half_meter.set_source(0, 1.0, 0.0, 0.0, 0.5);
        assert_eq!(close.encoding_matrix, at_half_meter.encoding_matrix);
    }

    #[test]
    fn inaudible_source_is_muted() {
        let mut encoder = AmbisonicEncoder::new(1, 1);
        encoder.set_source(0, 1e-7, 0.0, 0.0, 1.0);
        assert!(encoder.encoding_matrix.iter().all(|&w| w == 0.0));
    }

    #[test]
    fn repeated_set_source_is_a_no_op() {
        let mut encoder = AmbisonicEncoder::new(1, 2);
        encoder.set_source(0, 1.0, 12.0, 34.0, 1.5);
        let before = encoder.encoding_matrix.clone();
        encoder.set_source(0, 1.0, 12.0, 34.0, 1.5);
        assert_eq!(before, encoder.encoding_matrix);
    }

    #[test]
    #[should_panic]
    fn out_of_range_channel_panics() {
        let mut encoder = AmbisonicEncoder::new(1, 1);
        encoder.set_source(1, 1.0, 0.0, 0.0, 1.0);
    }
}

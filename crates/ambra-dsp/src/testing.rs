//! Deterministic test-signal generators and comparison helpers, shared by
//! the unit and integration suites.

use ambra_core::{Sample, TWO_PI};

/// Writes silence.
pub fn generate_silence(output: &mut [Sample]) {
    output.fill(0.0);
}

/// Writes a sine wave of `frequency_hz` at `sample_rate`.
pub fn generate_sine_wave(frequency_hz: Sample, sample_rate: u32, output: &mut [Sample]) {
    assert!(frequency_hz >= 0.0);
    assert!(sample_rate > 0);
    for (i, sample) in output.iter_mut().enumerate() {
        let phase = i as Sample * TWO_PI / sample_rate as Sample * frequency_hz;
        *sample = phase.sin();
    }
}

/// Writes a sawtooth with the given tooth length in samples, spanning [-1, 1].
pub fn generate_sawtooth(tooth_length_samples: usize, output: &mut [Sample]) {
    assert!(tooth_length_samples > 0);
    for (i, sample) in output.iter_mut().enumerate() {
        *sample =
            (i % tooth_length_samples) as Sample / tooth_length_samples as Sample * 2.0 - 1.0;
    }
}

/// Writes a Kronecker delta delayed by `delay_samples`.
pub fn generate_dirac_impulse(delay_samples: usize, output: &mut [Sample]) {
    assert!(delay_samples < output.len());
    output.fill(0.0);
    output[delay_samples] = 1.0;
}

/// Sum of squared samples.
pub fn signal_energy(signal: &[Sample]) -> f64 {
    signal.iter().map(|&s| s as f64 * s as f64).sum()
}

/// Whether two signals match pointwise within `epsilon`.
pub fn signals_match(a: &[Sample], b: &[Sample], epsilon: Sample) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() <= epsilon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dirac() {
        let mut buffer = [0.0; 8];
        generate_dirac_impulse(3, &mut buffer);
        assert_eq!(signal_energy(&buffer), 1.0);
        assert_eq!(buffer[3], 1.0);
    }

    #[test]
    fn sine_energy() {
        let mut buffer = vec![0.0; 48000];
        generate_sine_wave(440.0, 48000, &mut buffer);
        // Average power of a full-scale sine is 1/2.
        let power = signal_energy(&buffer) / buffer.len() as f64;
        assert!((power - 0.5).abs() < 1e-3);
    }

    #[test]
    fn matching() {
        assert!(signals_match(&[1.0, 2.0], &[1.0, 2.000001], 1e-5));
        assert!(!signals_match(&[1.0], &[1.1], 1e-5));
        assert!(!signals_match(&[1.0], &[1.0, 2.0], 1e-5));
    }
}

//! Binaural decoding of first-order input against known filter vectors, for
//! HRIR kernels shorter than, equal to and longer than the block size.

use ambra_core::periphonic_ambisonic_degree_for_channel;
use ambra_dsp::{AmbisonicBinauralDecoder, AudioBuffer, FftManager};

const NUM_FIRST_ORDER_CHANNELS: usize = 4;
const FRAMES_PER_BUFFER: usize = 18;
const EPSILON: f32 = 1e-5;

/// Sample data where the first sample is 0 and every consecutive sample over
/// all channels increments by 0.001.
fn generate_audio_data(num_channels: usize, num_samples: usize) -> Vec<Vec<f32>> {
    let mut data = vec![vec![0.0f32; num_samples]; num_channels];
    let mut value = 0.0f32;
    for channel in data.iter_mut() {
        for sample in channel.iter_mut() {
            *sample = value;
            value += 0.001;
        }
    }
    data
}

/// Right-ear SH-HRIRs for a symmetric head: negative-degree channels flip
/// sign.
fn right_from_left_hrirs(left: &AudioBuffer) -> AudioBuffer {
    let mut right = AudioBuffer::new(left.num_channels(), left.num_frames());
    for channel in 0..left.num_channels() {
        let degree = periphonic_ambisonic_degree_for_channel(channel);
        let sign = if degree < 0 { -1.0 } else { 1.0 };
        for (dst, src) in right
            .channel_mut(channel)
            .iter_mut()
            .zip(left.channel(channel))
        {
            *dst = sign * src;
        }
    }
    right
}

fn run_decoder(hrir_len: usize) -> AudioBuffer {
    let input_data = generate_audio_data(NUM_FIRST_ORDER_CHANNELS, FRAMES_PER_BUFFER);
    let hrir_data = generate_audio_data(NUM_FIRST_ORDER_CHANNELS, hrir_len);

    let sh_hrirs_left = AudioBuffer::from_channel_data(&hrir_data);
    let sh_hrirs_right = right_from_left_hrirs(&sh_hrirs_left);
    let input = AudioBuffer::from_channel_data(&input_data);

    let mut fft_manager = FftManager::new(FRAMES_PER_BUFFER);
    let mut decoder =
        AmbisonicBinauralDecoder::new(&sh_hrirs_left, &sh_hrirs_right, &mut fft_manager);
    let mut output = AudioBuffer::new(2, FRAMES_PER_BUFFER);
    decoder.process(&input, &mut output, &mut fft_manager);
    output
}

fn check(output: &AudioBuffer, expected_left: &[f32], expected_right: &[f32]) {
    for sample in 0..FRAMES_PER_BUFFER {
        assert!(
            (output.channel(0)[sample] - expected_left[sample]).abs() < EPSILON,
            "left sample {sample}: {} vs {}",
            output.channel(0)[sample],
            expected_left[sample]
        );
        assert!(
            (output.channel(1)[sample] - expected_right[sample]).abs() < EPSILON,
            "right sample {sample}: {} vs {}",
            output.channel(1)[sample],
            expected_right[sample]
        );
    }
}

#[test]
fn short_filter() {
    let expected_left = [
        0.0042840000f32,
        0.0087780003,
        0.013486000,
        0.018412000,
        0.023560001,
        0.028934000,
        0.034538001,
        0.040376000,
        0.046452001,
        0.052770000,
        0.059333999,
        0.066147998,
        0.073215999,
        0.080541998,
        0.088129997,
        0.095983997,
        0.10410800,
        0.10638600,
    ];
    let expected_right = [
        0.0036720000f32,
        0.0074840002,
        0.011438000,
        0.015536000,
        0.019780001,
        0.024172001,
        0.028713999,
        0.033408001,
        0.038256001,
        0.043260001,
        0.048422001,
        0.053743999,
        0.059227999,
        0.064875998,
        0.070689999,
        0.076672003,
        0.082823999,
        0.084252000,
    ];
    let output = run_decoder(FRAMES_PER_BUFFER - 1);
    check(&output, &expected_left, &expected_right);
}

#[test]
fn same_size_filter() {
    let expected_left = [
        0.0045360001f32,
        0.0092879999,
        0.014260001,
        0.019455999,
        0.024879999,
        0.030536000,
        0.036428001,
        0.042560000,
        0.048935998,
        0.055560000,
        0.062436000,
        0.069568001,
        0.076959997,
        0.084615998,
        0.092540003,
        0.10073600,
        0.10920800,
        0.11796000,
    ];
    let expected_right = [
        0.0038880000f32,
        0.0079199998,
        0.012098000,
        0.016424000,
        0.020900000,
        0.025528001,
        0.030309999,
        0.035248000,
        0.040344000,
        0.045600001,
        0.051018000,
        0.056600001,
        0.062348001,
        0.068264000,
        0.074349999,
        0.080608003,
        0.087040000,
        0.093648002,
    ];
    let output = run_decoder(FRAMES_PER_BUFFER);
    check(&output, &expected_left, &expected_right);
}

#[test]
fn long_filter() {
    let expected_left = [
        0.0047880001f32,
        0.0097980006,
        0.015034000,
        0.020500001,
        0.026200000,
        0.032138001,
        0.038318001,
        0.044744000,
        0.051419999,
        0.058350001,
        0.065537997,
        0.072987996,
        0.080704004,
        0.088689998,
        0.096950002,
        0.10548800,
        0.11430800,
        0.12341400,
    ];
    let expected_right = [
        0.0041040001f32,
        0.0083560003,
        0.012758000,
        0.017312000,
        0.022020001,
        0.026883999,
        0.031906001,
        0.037087999,
        0.042431999,
        0.047940001,
        0.053613998,
        0.059455998,
        0.065467998,
        0.071652003,
        0.078010000,
        0.084543996,
        0.091256000,
        0.098148003,
    ];
    let output = run_decoder(FRAMES_PER_BUFFER + 1);
    check(&output, &expected_left, &expected_right);
}

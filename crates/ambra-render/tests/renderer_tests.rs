//! Renderer facade tests: state machine, channel bookkeeping and end-to-end
//! rendering against deterministic synthetic SH-HRIR assets.

use std::sync::Arc;

use ambra_core::num_ambisonic_channels;
use ambra_dsp::testing::signal_energy;
use ambra_dsp::{AmbisonicEncoder, AudioBuffer};
use ambra_render::wav::write_wav_bytes;
use ambra_render::{AudioElementType, BinauralRenderer, LoudspeakerLayout, MemoryAssetStore};

const SAMPLE_RATE: u32 = 48000;

/// First-order dipole weight shaping the synthetic ear filters. With left =
/// delta * [1, k, 0, ...] and right = delta * [1, -k, 0, ...], a source at
/// azimuth 90 degrees produces an energy ratio of ((1+k)/(1-k))^2 between
/// the ears; k = 0.6 lands on 12 dB.
const DIPOLE_WEIGHT: f32 = 0.6;

/// Builds "{order}OA_L"/"{order}OA_R" WAV assets: a delta on the W channel
/// plus a +/-k delta on ACN 1 (the y dipole), zeros elsewhere.
fn synthetic_assets(sample_rate: u32, hrir_len: usize) -> Arc<MemoryAssetStore> {
    let mut store = MemoryAssetStore::new();
    for order in 1..=7usize {
        let num_channels = num_ambisonic_channels(order);
        for (suffix, dipole_sign) in [("L", 1.0f32), ("R", -1.0f32)] {
            let mut interleaved = vec![0i16; num_channels * hrir_len];
            // Frame 0: W = 1.0, Y = sign * k.
            interleaved[0] = 32767;
            interleaved[1] = (dipole_sign * DIPOLE_WEIGHT * 32767.0).round() as i16;
            store.insert(
                format!("{order}OA_{suffix}"),
                write_wav_bytes(sample_rate, num_channels, &interleaved),
            );
        }
    }
    Arc::new(store)
}

fn make_renderer(buffer_size: usize) -> BinauralRenderer {
    BinauralRenderer::new(buffer_size, SAMPLE_RATE, synthetic_assets(SAMPLE_RATE, 16))
}

/// Ambisonic scene holding a Kronecker delta encoded at the given direction.
fn delta_scene(num_frames: usize, azimuth: f32, elevation: f32, order: usize) -> AudioBuffer {
    let mut mono = AudioBuffer::new(1, num_frames);
    mono.channel_mut(0)[0] = 1.0;
    let mut encoder = AmbisonicEncoder::new(1, order);
    encoder.set_source(0, 1.0, azimuth, elevation, 1.0);
    let mut scene = AudioBuffer::new(num_ambisonic_channels(order), num_frames);
    encoder.process(&mono, &mut scene);
    scene
}

fn broadband_ild_db(output: &AudioBuffer) -> f64 {
    let energy_left = signal_energy(output.channel(0));
    let energy_right = signal_energy(output.channel(1));
    10.0 * (energy_left / energy_right).log10()
}

#[test]
fn initialization() {
    let renderer = make_renderer(12);
    assert_eq!(renderer.buffer_size_per_channel(), 12);
    assert_eq!(renderer.sampling_rate(), SAMPLE_RATE);
    assert_eq!(renderer.num_input_channels(), 0);
    assert_eq!(renderer.num_output_channels(), 2);
    assert_eq!(renderer.num_audio_elements(), 0);
}

#[test]
fn add_and_remove_audio_element() {
    let mut renderer = make_renderer(12);
    renderer
        .add_audio_element(AudioElementType::Ambisonics(3))
        .unwrap();
    assert_eq!(renderer.num_input_channels(), 16);

    renderer.remove_last_audio_element().unwrap();
    assert_eq!(renderer.num_input_channels(), 0);
}

#[test]
fn mixed_element_types_are_rejected() {
    let mut renderer = make_renderer(12);
    renderer
        .add_audio_element(AudioElementType::Ambisonics(3))
        .unwrap();
    assert!(renderer
        .add_audio_element(AudioElementType::Loudspeakers(
            LoudspeakerLayout::Surround7_1_4
        ))
        .is_err());
    // The failed add must not have changed the configuration.
    assert_eq!(renderer.num_input_channels(), 16);

    renderer.remove_last_audio_element().unwrap();
    assert!(renderer.remove_last_audio_element().is_err());
    assert_eq!(renderer.num_input_channels(), 0);
}

#[test]
fn channel_budget_is_enforced() {
    let mut renderer = make_renderer(12);
    // One 7OA scene uses the full 64-channel budget.
    renderer
        .add_audio_element(AudioElementType::Ambisonics(7))
        .unwrap();
    assert_eq!(renderer.num_input_channels(), 64);
    assert!(matches!(
        renderer.add_audio_element(AudioElementType::Ambisonics(7)),
        Err(ambra_core::AmbraError::ResourceExhausted(_))
    ));
    assert_eq!(renderer.num_input_channels(), 64);
}

#[test]
fn several_elements_of_one_type_stack_their_channels() {
    let mut renderer = make_renderer(16);
    for _ in 0..3 {
        renderer
            .add_audio_element(AudioElementType::Loudspeakers(LoudspeakerLayout::Stereo))
            .unwrap();
    }
    assert_eq!(renderer.num_input_channels(), 6);
}

#[test]
fn render_ambisonics_and_measure_broadband_ild() {
    let num_frames = 1000;
    let ild_tolerance_db = 3.0;
    let azimuth_ilds: [(f32, f64); 4] =
        [(0.0, 0.0), (90.0, 12.0), (180.0, 0.0), (270.0, -12.0)];

    for order in 1..=7usize {
        for (azimuth, expected_ild) in azimuth_ilds {
            let mut renderer = make_renderer(num_frames);
            renderer
                .add_audio_element(AudioElementType::Ambisonics(order))
                .unwrap();

            let scene = delta_scene(num_frames, azimuth, 0.0, order);
            let mut output = AudioBuffer::new(2, num_frames);
            renderer.process(&scene, &mut output);

            let ild = broadband_ild_db(&output);
            assert!(
                (ild - expected_ild).abs() < ild_tolerance_db,
                "order {order}, azimuth {azimuth}: ILD {ild:.2} dB, expected {expected_ild} dB"
            );
        }
    }
}

#[test]
fn object_position_updates_pan_the_source() {
    let num_frames = 256;
    let mut renderer = make_renderer(num_frames);
    renderer
        .add_audio_element(AudioElementType::MonoObject)
        .unwrap();

    let mut input = AudioBuffer::new(1, num_frames);
    input.channel_mut(0)[0] = 1.0;

    // Hard left: left ear louder.
    renderer.update_object_position(0, 90.0, 0.0, 1.0).unwrap();
    let mut output = AudioBuffer::new(2, num_frames);
    renderer.process(&input, &mut output);
    assert!(broadband_ild_db(&output) > 6.0);

    // Hard right: right ear louder.
    renderer.update_object_position(0, -90.0, 0.0, 1.0).unwrap();
    let mut output = AudioBuffer::new(2, num_frames);
    renderer.process(&input, &mut output);
    assert!(broadband_ild_db(&output) < -6.0);
}

#[test]
fn object_updates_on_bad_indices_fail() {
    let mut renderer = make_renderer(64);
    renderer
        .add_audio_element(AudioElementType::MonoObject)
        .unwrap();
    assert!(renderer.update_object_position(1, 0.0, 0.0, 1.0).is_err());
    assert!(renderer.set_object_gain(3, 0.5).is_err());
}

#[test]
fn position_updates_on_ambisonic_elements_fail() {
    let mut renderer = make_renderer(64);
    renderer
        .add_audio_element(AudioElementType::Ambisonics(1))
        .unwrap();
    assert!(renderer.update_object_position(0, 0.0, 0.0, 1.0).is_err());
}

#[test]
fn bed_rendering_reaches_both_ears() {
    let num_frames = 256;
    let mut renderer = make_renderer(num_frames);
    renderer
        .add_audio_element(AudioElementType::Loudspeakers(
            LoudspeakerLayout::Surround7_1_4,
        ))
        .unwrap();
    assert_eq!(renderer.num_input_channels(), 12);

    // Drive only the center speaker (channel 2): equal energy in both ears.
    let mut input = AudioBuffer::new(12, num_frames);
    input.channel_mut(2)[0] = 1.0;
    let mut output = AudioBuffer::new(2, num_frames);
    renderer.process(&input, &mut output);

    let left = signal_energy(output.channel(0));
    let right = signal_energy(output.channel(1));
    assert!(left > 0.0);
    assert!((left - right).abs() / left < 1e-3);
}

#[test]
fn head_tracking_yaw_swaps_the_ears() {
    let num_frames = 512;
    let mut renderer = make_renderer(num_frames);
    renderer
        .add_audio_element(AudioElementType::Ambisonics(3))
        .unwrap();

    let scene = delta_scene(num_frames, 90.0, 0.0, 3);
    let mut output = AudioBuffer::new(2, num_frames);
    renderer.process(&scene, &mut output);
    assert!(broadband_ild_db(&output) > 6.0);

    // Rotate the world by -180 degrees about z: the source lands hard right.
    renderer.enable_head_tracking(true);
    renderer.set_head_rotation(0.0, 0.0, 0.0, 1.0);
    // First block interpolates toward the target; the second is settled.
    renderer.process(&scene, &mut output);
    renderer.process(&scene, &mut output);
    assert!(broadband_ild_db(&output) < -6.0);
}

#[test]
fn missing_assets_keep_the_renderer_empty() {
    let store = Arc::new(MemoryAssetStore::new());
    let mut renderer = BinauralRenderer::new(64, SAMPLE_RATE, store);
    assert!(matches!(
        renderer.add_audio_element(AudioElementType::Ambisonics(3)),
        Err(ambra_core::AmbraError::Asset(_))
    ));
    assert_eq!(renderer.num_audio_elements(), 0);
    assert_eq!(renderer.num_input_channels(), 0);
}

#[test]
fn resampled_assets_render_like_native_ones() {
    // Assets at 24 kHz get resampled to the 48 kHz runtime rate once.
    let num_frames = 512;
    let mut renderer =
        BinauralRenderer::new(num_frames, SAMPLE_RATE, synthetic_assets(24000, 64));
    renderer
        .add_audio_element(AudioElementType::Ambisonics(1))
        .unwrap();

    let scene = delta_scene(num_frames, 90.0, 0.0, 1);
    let mut output = AudioBuffer::new(2, num_frames);
    renderer.process(&scene, &mut output);
    // The interpolated delta still lateralizes left by roughly the dipole
    // ratio.
    let ild = broadband_ild_db(&output);
    assert!((ild - 12.0).abs() < 3.0, "ILD after resampling: {ild:.2} dB");
}

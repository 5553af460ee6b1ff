//! SH-HRIR bank creation from asset WAVs.
//!
//! A bank is one planar buffer with one channel per SH channel. Channel
//! counts must be a valid Ambisonic channel count; assets recorded at a
//! different rate are resampled once to the runtime rate.

use ambra_core::{is_valid_ambisonic_channel_count, AmbraError, AmbraResult};
use ambra_dsp::{simd, AudioBuffer};

use crate::assets::HrirAssetStore;
use crate::resampler::Resampler;
use crate::wav::{read_wav, WavData};

/// Builds an SH-HRIR bank from decoded WAV data, resampling to
/// `target_sample_rate_hz` when needed.
pub fn create_sh_hrirs(
    wav: &WavData,
    target_sample_rate_hz: u32,
    resampler: &mut Resampler,
) -> AmbraResult<AudioBuffer> {
    let num_channels = wav.num_channels;
    if !is_valid_ambisonic_channel_count(num_channels) {
        return Err(AmbraError::Asset(format!(
            "SH-HRIR channel count {num_channels} is not a valid Ambisonic channel count"
        )));
    }
    let num_frames = wav.num_frames();
    if num_frames == 0 {
        return Err(AmbraError::Asset("empty SH-HRIR data".to_string()));
    }

    // Deinterleave into planar floats.
    let mut interleaved_float = vec![0.0f32; wav.interleaved_samples.len()];
    simd::float_from_int16(&wav.interleaved_samples, &mut interleaved_float);
    let mut sh_hrirs = AudioBuffer::new(num_channels, num_frames);
    for channel in 0..num_channels {
        for frame in 0..num_frames {
            sh_hrirs.channel_mut(channel)[frame] =
                interleaved_float[frame * num_channels + channel];
        }
    }

    if wav.sample_rate_hz == target_sample_rate_hz {
        return Ok(sh_hrirs);
    }
    if !Resampler::are_sample_rates_supported(
        wav.sample_rate_hz as i64,
        target_sample_rate_hz as i64,
    ) {
        return Err(AmbraError::Asset(format!(
            "unsupported SH-HRIR resampling {} -> {}",
            wav.sample_rate_hz, target_sample_rate_hz
        )));
    }
    resampler.reset_state();
    resampler.set_rate_and_num_channels(
        wav.sample_rate_hz as i64,
        target_sample_rate_hz as i64,
        num_channels,
    )?;
    let mut resampled = AudioBuffer::new(num_channels, resampler.next_output_length(num_frames));
    resampler.process(&sh_hrirs, &mut resampled);
    Ok(resampled)
}

/// Looks up `key` in the asset store, parses the WAV and builds the bank.
pub fn create_sh_hrirs_from_assets(
    store: &dyn HrirAssetStore,
    key: &str,
    target_sample_rate_hz: u32,
    resampler: &mut Resampler,
) -> AmbraResult<AudioBuffer> {
    let bytes = store
        .get(key)
        .ok_or_else(|| AmbraError::Asset(format!("could not find asset \"{key}\"")))?;
    let wav = read_wav(&bytes)?;
    create_sh_hrirs(&wav, target_sample_rate_hz, resampler)
}

//! The renderer facade.
//!
//! Owns the audio-element list and the whole DSP chain. Per block:
//! encode channel-bed/object inputs into the Ambisonic mix bus, add direct
//! Ambisonic inputs, optionally rotate, run the binaural decoder, limit.
//! Configuration calls and `process` both take `&mut self`, so the borrow
//! checker serializes them; a renderer shared between threads goes behind the
//! caller's lock.

use std::sync::Arc;

use ambra_core::{
    num_ambisonic_channels, AmbraError, AmbraResult, NUM_BINAURAL_CHANNELS,
    MAX_SUPPORTED_AMBISONIC_ORDER, MAX_SUPPORTED_NUM_INPUT_CHANNELS,
    MIN_SUPPORTED_AMBISONIC_ORDER,
};
use ambra_dsp::{
    simd, AmbisonicBinauralDecoder, AmbisonicEncoder, AudioBuffer, FftManager, PeakLimiter,
    Quaternion, SoundFieldRotator,
};

use crate::assets::HrirAssetStore;
use crate::config::{config_table, AudioElementConfig};
use crate::element::AudioElementType;
use crate::hrir::create_sh_hrirs_from_assets;
use crate::resampler::Resampler;

/// Limiter release time applied to the binaural output, in milliseconds.
const LIMITER_RELEASE_MS: f64 = 50.0;
/// Limiter ceiling applied to the binaural output, in dBFS.
const LIMITER_CEILING_DB: f64 = -0.5;

/// DSP state present while the renderer is ready.
struct DspState {
    mix_bus: AudioBuffer,
    encoder: Option<AmbisonicEncoder>,
    encoder_input: AudioBuffer,
    /// Renderer input channel feeding each encoder column.
    encoder_channel_indices: Vec<usize>,
    rotator: SoundFieldRotator,
    decoder: AmbisonicBinauralDecoder,
    limiter: PeakLimiter,
}

pub struct BinauralRenderer {
    buffer_size_per_channel: usize,
    sampling_rate: u32,
    head_tracking_enabled: bool,
    world_rotation: Quaternion,
    assets: Arc<dyn HrirAssetStore>,
    resampler: Resampler,
    fft_manager: FftManager,
    audio_elements: Vec<AudioElementConfig>,
    dsp: Option<DspState>,
}

impl BinauralRenderer {
    /// Creates an empty renderer for the given block size and sampling rate.
    /// SH-HRIR banks are loaded from `assets` when elements are added.
    pub fn new(
        buffer_size_per_channel: usize,
        sampling_rate: u32,
        assets: Arc<dyn HrirAssetStore>,
    ) -> Self {
        assert!(buffer_size_per_channel > 0);
        assert!(sampling_rate > 0);
        Self {
            buffer_size_per_channel,
            sampling_rate,
            head_tracking_enabled: false,
            world_rotation: Quaternion::IDENTITY,
            assets,
            resampler: Resampler::new(),
            fft_manager: FftManager::new(buffer_size_per_channel),
            audio_elements: Vec::new(),
            dsp: None,
        }
    }

    #[inline]
    pub fn buffer_size_per_channel(&self) -> usize {
        self.buffer_size_per_channel
    }

    #[inline]
    pub fn sampling_rate(&self) -> u32 {
        self.sampling_rate
    }

    #[inline]
    pub fn num_output_channels(&self) -> usize {
        NUM_BINAURAL_CHANNELS
    }

    pub fn num_input_channels(&self) -> usize {
        self.audio_elements
            .iter()
            .map(|element| element.num_input_channels())
            .sum()
    }

    #[inline]
    pub fn num_audio_elements(&self) -> usize {
        self.audio_elements.len()
    }

    /// Appends an audio element and re-initializes the DSP. All elements must
    /// share one type; the summed channel widths are capped by the input
    /// budget. On failure the previous configuration is restored.
    pub fn add_audio_element(&mut self, element_type: AudioElementType) -> AmbraResult<()> {
        if let Some(last) = self.audio_elements.last() {
            if last.element_type() != element_type {
                log::error!(
                    "rendering mixed audio element types is not supported; remove the existing \
                     element before adding a different type"
                );
                return Err(AmbraError::FailedPrecondition(
                    "only same-typed audio elements are supported".to_string(),
                ));
            }
        }

        let mut element = AudioElementConfig::new(element_type);
        if let Some(last) = self.audio_elements.last() {
            element
                .set_first_channel_index(last.first_channel_index() + last.num_input_channels());
        }

        if self.num_input_channels() + element.num_input_channels()
            > MAX_SUPPORTED_NUM_INPUT_CHANNELS
        {
            log::error!(
                "more input channels requested than supported ({MAX_SUPPORTED_NUM_INPUT_CHANNELS})"
            );
            return Err(AmbraError::ResourceExhausted(
                "more input channels requested than supported".to_string(),
            ));
        }

        self.audio_elements.push(element);
        log::info!("added audio element: {element_type}");

        if let Err(error) = self.initialize_dsp() {
            // Restore the configuration that was live before the call.
            self.audio_elements.pop();
            if self.audio_elements.is_empty() {
                self.reset_dsp();
            } else if self.initialize_dsp().is_err() {
                log::error!("failed to restore previous configuration; renderer reset");
                self.reset();
            }
            return Err(error);
        }
        Ok(())
    }

    /// Removes the most recently added element. Succeeds as a no-op DSP-wise
    /// when that leaves the renderer empty.
    pub fn remove_last_audio_element(&mut self) -> AmbraResult<()> {
        let Some(removed) = self.audio_elements.pop() else {
            log::info!("no audio elements to remove");
            return Err(AmbraError::FailedPrecondition(
                "no audio elements to remove".to_string(),
            ));
        };
        log::info!("removed audio element: {}", removed.element_type());

        if self.audio_elements.is_empty() {
            self.reset_dsp();
            return Ok(());
        }
        self.initialize_dsp()
    }

    /// Moves every object channel of the element at `audio_element_index`.
    /// Angles in degrees, distance in meters.
    pub fn update_object_position(
        &mut self,
        audio_element_index: usize,
        azimuth: f32,
        elevation: f32,
        distance: f32,
    ) -> AmbraResult<()> {
        let Some(element) = self.audio_elements.get_mut(audio_element_index) else {
            return Err(AmbraError::InvalidArgument(
                "invalid audio element index".to_string(),
            ));
        };
        if !element.element_type().is_object() {
            return Err(AmbraError::FailedPrecondition(
                "no objects in the audio element".to_string(),
            ));
        }
        for source in element.encoded_sources_mut() {
            source.azimuth = azimuth;
            source.elevation = elevation;
            source.distance = distance;
        }
        self.update_ambisonic_encoder()
    }

    /// Adjusts the gain of every object channel of the indicated element.
    pub fn set_object_gain(&mut self, audio_element_index: usize, gain: f32) -> AmbraResult<()> {
        let Some(element) = self.audio_elements.get_mut(audio_element_index) else {
            return Err(AmbraError::InvalidArgument(
                "invalid audio element index".to_string(),
            ));
        };
        if !element.element_type().is_object() {
            return Err(AmbraError::FailedPrecondition(
                "no objects in the audio element".to_string(),
            ));
        }
        for source in element.encoded_sources_mut() {
            source.gain = gain;
        }
        self.update_ambisonic_encoder()
    }

    pub fn enable_head_tracking(&mut self, enable: bool) {
        self.head_tracking_enabled = enable;
    }

    /// Sets the head orientation as a unit quaternion (w, x, y, z).
    pub fn set_head_rotation(&mut self, w: f32, x: f32, y: f32, z: f32) {
        self.world_rotation = Quaternion::new(w, x, y, z).normalized();
    }

    /// Clears every element and all DSP state.
    pub fn reset(&mut self) {
        self.audio_elements.clear();
        self.reset_dsp();
    }

    /// Renders one block. `input` must carry every configured input channel,
    /// `output` is 2 channels of the same frame count; both match the
    /// configured buffer size. Never allocates.
    pub fn process(&mut self, input: &AudioBuffer, output: &mut AudioBuffer) {
        assert_eq!(input.num_channels(), self.num_input_channels());
        assert_eq!(input.num_frames(), self.buffer_size_per_channel);
        assert_eq!(output.num_channels(), NUM_BINAURAL_CHANNELS);
        assert_eq!(output.num_frames(), self.buffer_size_per_channel);
        let dsp = self
            .dsp
            .as_mut()
            .expect("process called on a renderer with no audio elements");

        // Encode channel-bed and object inputs into the mix bus.
        if let Some(encoder) = &dsp.encoder {
            for (column, &source_channel) in dsp.encoder_channel_indices.iter().enumerate() {
                dsp.encoder_input
                    .channel_mut(column)
                    .copy_from_slice(input.channel(source_channel));
            }
            encoder.process(&dsp.encoder_input, &mut dsp.mix_bus);
        } else {
            dsp.mix_bus.clear();
        }

        // Direct Ambisonic inputs bypass the encoder.
        for element in &self.audio_elements {
            if element.element_type().is_ambisonics() {
                for channel in 0..element.num_input_channels() {
                    simd::add_pointwise(
                        input.channel(element.first_channel_index() + channel),
                        dsp.mix_bus.channel_mut(channel),
                    );
                }
            }
        }

        if self.head_tracking_enabled {
            dsp.rotator.process(self.world_rotation, &mut dsp.mix_bus);
        }

        dsp.decoder
            .process(&dsp.mix_bus, output, &mut self.fft_manager);
        dsp.limiter.process_in_place(output);
    }

    /// Builds the whole DSP chain for the current element list.
    fn initialize_dsp(&mut self) -> AmbraResult<()> {
        if self.audio_elements.is_empty() {
            return Err(AmbraError::FailedPrecondition(
                "no audio elements configured; cannot initialize DSP".to_string(),
            ));
        }
        let order = self.audio_elements[0].binaural_filters_order();
        assert!((MIN_SUPPORTED_AMBISONIC_ORDER..=MAX_SUPPORTED_AMBISONIC_ORDER).contains(&order));
        let num_input_channels = self.num_input_channels();
        if num_input_channels == 0 {
            return Err(AmbraError::FailedPrecondition(
                "no input channels configured; cannot initialize DSP".to_string(),
            ));
        }

        self.reset_dsp();

        let num_mix_channels = num_ambisonic_channels(order);
        log::info!("initializing DSP:");
        log::info!("  - input channels: {num_input_channels}");
        log::info!("  - binaural filter order: {order}");
        log::info!("  - Ambisonic mix bus channels: {num_mix_channels}");
        log::debug!("\n{}", config_table(&self.audio_elements));

        let encoder_channel_indices = self.ambisonic_encoder_source_channel_indices();
        let encoder = if encoder_channel_indices.is_empty() {
            None
        } else {
            Some(AmbisonicEncoder::new(encoder_channel_indices.len(), order))
        };
        let encoder_input = AudioBuffer::new(
            encoder_channel_indices.len(),
            self.buffer_size_per_channel,
        );

        let sh_hrirs_left = create_sh_hrirs_from_assets(
            self.assets.as_ref(),
            &format!("{order}OA_L"),
            self.sampling_rate,
            &mut self.resampler,
        )?;
        let sh_hrirs_right = create_sh_hrirs_from_assets(
            self.assets.as_ref(),
            &format!("{order}OA_R"),
            self.sampling_rate,
            &mut self.resampler,
        )?;
        if sh_hrirs_left.num_channels() != sh_hrirs_right.num_channels()
            || sh_hrirs_left.num_frames() != sh_hrirs_right.num_frames()
        {
            return Err(AmbraError::Asset(
                "left and right SH-HRIR banks differ in shape".to_string(),
            ));
        }
        if sh_hrirs_left.num_channels() != num_mix_channels {
            return Err(AmbraError::Asset(format!(
                "SH-HRIR bank has {} channels, expected {num_mix_channels}",
                sh_hrirs_left.num_channels()
            )));
        }

        let decoder =
            AmbisonicBinauralDecoder::new(&sh_hrirs_left, &sh_hrirs_right, &mut self.fft_manager);

        self.dsp = Some(DspState {
            mix_bus: AudioBuffer::new(num_mix_channels, self.buffer_size_per_channel),
            encoder,
            encoder_input,
            encoder_channel_indices,
            rotator: SoundFieldRotator::new(order, self.buffer_size_per_channel),
            decoder,
            limiter: PeakLimiter::new(self.sampling_rate, LIMITER_RELEASE_MS, LIMITER_CEILING_DB),
        });
        self.update_ambisonic_encoder().ok();
        Ok(())
    }

    /// Drops the DSP chain and all its state.
    fn reset_dsp(&mut self) {
        if self.dsp.take().is_some() {
            log::info!("resetting DSP");
        }
    }

    /// Input channels that feed the encoder, in column order.
    fn ambisonic_encoder_source_channel_indices(&self) -> Vec<usize> {
        let mut indices = Vec::new();
        for element in &self.audio_elements {
            if element.needs_encoding() {
                for channel in 0..element.num_input_channels() {
                    indices.push(element.first_channel_index() + channel);
                }
            }
        }
        indices
    }

    /// Pushes every encoded source record into the encoder matrix.
    fn update_ambisonic_encoder(&mut self) -> AmbraResult<()> {
        let Some(dsp) = self.dsp.as_mut() else {
            return Err(AmbraError::FailedPrecondition(
                "DSP not initialized".to_string(),
            ));
        };
        let Some(encoder) = dsp.encoder.as_mut() else {
            // Nothing to encode (pure Ambisonic configuration).
            return Ok(());
        };
        let mut column = 0usize;
        for element in &self.audio_elements {
            for source in element.encoded_sources() {
                encoder.set_source(
                    column,
                    source.gain,
                    source.azimuth,
                    source.elevation,
                    source.distance,
                );
                column += 1;
            }
        }
        Ok(())
    }
}

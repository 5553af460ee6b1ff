//! Per-element channel bookkeeping.
//!
//! An audio element owns a contiguous range of renderer input channels.
//! Ambisonic elements feed the mix bus directly; loudspeaker and object
//! elements carry per-channel source geometry for the encoder.

use ambra_core::{num_ambisonic_channels, Sample, MAX_SUPPORTED_AMBISONIC_ORDER};

use crate::element::AudioElementType;
use crate::layouts::layout_channels;

/// Geometry and gain of one encoded input channel.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedSource {
    pub label: String,
    pub gain: Sample,
    pub azimuth: Sample,
    pub elevation: Sample,
    pub distance: Sample,
    pub is_lfe: bool,
}

/// Configuration of one audio element.
#[derive(Debug, Clone)]
pub struct AudioElementConfig {
    element_type: AudioElementType,
    first_channel_index: usize,
    num_input_channels: usize,
    binaural_filters_order: usize,
    /// Source records for channels that pass through the encoder. Empty for
    /// Ambisonic elements.
    encoded_sources: Vec<EncodedSource>,
}

impl AudioElementConfig {
    pub fn new(element_type: AudioElementType) -> Self {
        let (num_input_channels, binaural_filters_order, encoded_sources) = match element_type {
            AudioElementType::Ambisonics(order) => {
                // Binaural filters match the scene order; no up/downscaling.
                (num_ambisonic_channels(order), order, Vec::new())
            }
            AudioElementType::Loudspeakers(layout) => {
                let sources: Vec<EncodedSource> = layout_channels(layout)
                    .iter()
                    .map(|speaker| EncodedSource {
                        label: speaker.label.to_string(),
                        gain: 1.0,
                        azimuth: speaker.azimuth,
                        elevation: speaker.elevation,
                        distance: speaker.distance,
                        is_lfe: speaker.is_lfe,
                    })
                    .collect();
                (sources.len(), MAX_SUPPORTED_AMBISONIC_ORDER, sources)
            }
            AudioElementType::MonoObject => {
                let source = EncodedSource {
                    label: "Mono".to_string(),
                    gain: 1.0,
                    azimuth: 0.0,
                    elevation: 0.0,
                    distance: 1.0,
                    is_lfe: false,
                };
                (1, MAX_SUPPORTED_AMBISONIC_ORDER, vec![source])
            }
        };
        Self {
            element_type,
            first_channel_index: 0,
            num_input_channels,
            binaural_filters_order,
            encoded_sources,
        }
    }

    #[inline]
    pub fn element_type(&self) -> AudioElementType {
        self.element_type
    }

    #[inline]
    pub fn first_channel_index(&self) -> usize {
        self.first_channel_index
    }

    pub fn set_first_channel_index(&mut self, index: usize) {
        self.first_channel_index = index;
    }

    #[inline]
    pub fn num_input_channels(&self) -> usize {
        self.num_input_channels
    }

    /// Ambisonic order of the binaural filter bank this element renders
    /// through.
    #[inline]
    pub fn binaural_filters_order(&self) -> usize {
        self.binaural_filters_order
    }

    #[inline]
    pub fn needs_encoding(&self) -> bool {
        !self.encoded_sources.is_empty()
    }

    pub fn encoded_sources(&self) -> &[EncodedSource] {
        &self.encoded_sources
    }

    pub fn encoded_sources_mut(&mut self) -> &mut [EncodedSource] {
        &mut self.encoded_sources
    }
}

/// Renders the element list as a fixed-width table for the configuration
/// log.
pub fn config_table(elements: &[AudioElementConfig]) -> String {
    const WIDTHS: [usize; 7] = [5, 10, 10, 6, 8, 9, 8];
    const HEADERS: [&str; 7] = ["AE", "Type", "BinFlt", "Ch", "Azimuth", "Elevation", "Distance"];

    fn pad(value: &str, width: usize) -> String {
        format!("{value:>width$}")
    }

    let border: String = WIDTHS
        .iter()
        .map(|w| format!("+{}", "-".repeat(*w)))
        .collect::<String>()
        + "+\n";

    let mut table = border.clone();
    table += "|";
    for (header, width) in HEADERS.iter().zip(WIDTHS) {
        table += &pad(header, width);
        table += "|";
    }
    table += "\n";

    for (index, element) in elements.iter().enumerate() {
        table += &border;
        let type_name = element.element_type().to_string();
        let order = element.binaural_filters_order().to_string();
        for channel in 0..element.num_input_channels() {
            let absolute = element.first_channel_index() + channel;
            let (azimuth, elevation, distance) = element
                .encoded_sources()
                .get(channel)
                .map(|s| {
                    (
                        format!("{:.2}", s.azimuth),
                        format!("{:.2}", s.elevation),
                        format!("{:.2}", s.distance),
                    )
                })
                .unwrap_or_else(|| ("N/A".to_string(), "N/A".to_string(), "N/A".to_string()));
            table += "|";
            table += &pad(&index.to_string(), WIDTHS[0]);
            table += "|";
            table += &pad(&type_name, WIDTHS[1]);
            table += "|";
            table += &pad(&order, WIDTHS[2]);
            table += "|";
            table += &pad(&absolute.to_string(), WIDTHS[3]);
            table += "|";
            table += &pad(&azimuth, WIDTHS[4]);
            table += "|";
            table += &pad(&elevation, WIDTHS[5]);
            table += "|";
            table += &pad(&distance, WIDTHS[6]);
            table += "|\n";
        }
    }
    table += &border;
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::LoudspeakerLayout;

    #[test]
    fn ambisonics_widths() {
        for order in 1..=7 {
            let config = AudioElementConfig::new(AudioElementType::Ambisonics(order));
            assert_eq!(config.num_input_channels(), (order + 1) * (order + 1));
            assert_eq!(config.binaural_filters_order(), order);
            assert!(!config.needs_encoding());
        }
    }

    #[test]
    fn beds_use_the_top_filter_order() {
        let config = AudioElementConfig::new(AudioElementType::Loudspeakers(
            LoudspeakerLayout::Surround7_1_4,
        ));
        assert_eq!(config.num_input_channels(), 12);
        assert_eq!(config.binaural_filters_order(), 7);
        assert!(config.needs_encoding());
        assert_eq!(config.encoded_sources().len(), 12);
    }

    #[test]
    fn object_has_one_channel_at_default_position() {
        let config = AudioElementConfig::new(AudioElementType::MonoObject);
        assert_eq!(config.num_input_channels(), 1);
        let source = &config.encoded_sources()[0];
        assert_eq!(source.azimuth, 0.0);
        assert_eq!(source.distance, 1.0);
    }

    #[test]
    fn table_mentions_every_channel() {
        let elements = vec![
            AudioElementConfig::new(AudioElementType::Loudspeakers(LoudspeakerLayout::Stereo)),
        ];
        let table = config_table(&elements);
        assert!(table.contains("Stereo"));
        assert_eq!(table.matches("Stereo").count(), 2);
    }
}

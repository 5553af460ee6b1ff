//! Audio element types renderable by ambra.

use std::fmt;
use std::str::FromStr;

use ambra_core::{
    AmbraError, AmbraResult, MAX_SUPPORTED_AMBISONIC_ORDER, MIN_SUPPORTED_AMBISONIC_ORDER,
};

/// Loudspeaker layouts with a defined virtual-speaker configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoudspeakerLayout {
    Mono,
    Stereo,
    Surround3_1_2,
    Surround5_1_0,
    Surround5_1_2,
    Surround5_1_4,
    Surround7_1_0,
    Surround7_1_2,
    Surround7_1_4,
    Surround9_1_0,
    Surround9_1_2,
    Surround9_1_4,
    Surround9_1_6,
}

impl LoudspeakerLayout {
    pub const ALL: [LoudspeakerLayout; 13] = [
        LoudspeakerLayout::Mono,
        LoudspeakerLayout::Stereo,
        LoudspeakerLayout::Surround3_1_2,
        LoudspeakerLayout::Surround5_1_0,
        LoudspeakerLayout::Surround5_1_2,
        LoudspeakerLayout::Surround5_1_4,
        LoudspeakerLayout::Surround7_1_0,
        LoudspeakerLayout::Surround7_1_2,
        LoudspeakerLayout::Surround7_1_4,
        LoudspeakerLayout::Surround9_1_0,
        LoudspeakerLayout::Surround9_1_2,
        LoudspeakerLayout::Surround9_1_4,
        LoudspeakerLayout::Surround9_1_6,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LoudspeakerLayout::Mono => "Mono",
            LoudspeakerLayout::Stereo => "Stereo",
            LoudspeakerLayout::Surround3_1_2 => "3.1.2",
            LoudspeakerLayout::Surround5_1_0 => "5.1.0",
            LoudspeakerLayout::Surround5_1_2 => "5.1.2",
            LoudspeakerLayout::Surround5_1_4 => "5.1.4",
            LoudspeakerLayout::Surround7_1_0 => "7.1.0",
            LoudspeakerLayout::Surround7_1_2 => "7.1.2",
            LoudspeakerLayout::Surround7_1_4 => "7.1.4",
            LoudspeakerLayout::Surround9_1_0 => "9.1.0",
            LoudspeakerLayout::Surround9_1_2 => "9.1.2",
            LoudspeakerLayout::Surround9_1_4 => "9.1.4",
            LoudspeakerLayout::Surround9_1_6 => "9.1.6",
        }
    }
}

/// A renderable audio element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioElementType {
    /// Ambisonic scene of the given order (1..=7).
    Ambisonics(usize),
    /// Channel bed with a fixed loudspeaker layout.
    Loudspeakers(LoudspeakerLayout),
    /// Single mono point-source object.
    MonoObject,
}

impl AudioElementType {
    /// Every supported element type, in catalog order.
    pub fn all() -> Vec<AudioElementType> {
        let mut types: Vec<AudioElementType> = (MIN_SUPPORTED_AMBISONIC_ORDER
            ..=MAX_SUPPORTED_AMBISONIC_ORDER)
            .map(AudioElementType::Ambisonics)
            .collect();
        types.extend(LoudspeakerLayout::ALL.map(AudioElementType::Loudspeakers));
        types.push(AudioElementType::MonoObject);
        types
    }

    #[inline]
    pub fn is_ambisonics(self) -> bool {
        matches!(self, AudioElementType::Ambisonics(_))
    }

    #[inline]
    pub fn is_loudspeaker_layout(self) -> bool {
        matches!(self, AudioElementType::Loudspeakers(_))
    }

    #[inline]
    pub fn is_object(self) -> bool {
        matches!(self, AudioElementType::MonoObject)
    }

    /// The scene order for Ambisonic elements.
    pub fn ambisonic_order(self) -> AmbraResult<usize> {
        match self {
            AudioElementType::Ambisonics(order) => Ok(order),
            other => Err(AmbraError::InvalidArgument(format!(
                "{other} is not an Ambisonics element"
            ))),
        }
    }
}

impl fmt::Display for AudioElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioElementType::Ambisonics(order) => write!(f, "{order}OA"),
            AudioElementType::Loudspeakers(layout) => f.write_str(layout.name()),
            AudioElementType::MonoObject => f.write_str("OBA"),
        }
    }
}

impl FromStr for AudioElementType {
    type Err = AmbraError;

    fn from_str(name: &str) -> AmbraResult<Self> {
        if name == "OBA" {
            return Ok(AudioElementType::MonoObject);
        }
        if let Some(order_str) = name.strip_suffix("OA") {
            if let Ok(order) = order_str.parse::<usize>() {
                if (MIN_SUPPORTED_AMBISONIC_ORDER..=MAX_SUPPORTED_AMBISONIC_ORDER)
                    .contains(&order)
                {
                    return Ok(AudioElementType::Ambisonics(order));
                }
            }
            return Err(AmbraError::InvalidArgument(format!(
                "unsupported Ambisonics order in \"{name}\""
            )));
        }
        for layout in LoudspeakerLayout::ALL {
            if layout.name() == name {
                return Ok(AudioElementType::Loudspeakers(layout));
            }
        }
        Err(AmbraError::InvalidArgument(format!(
            "unknown audio element type \"{name}\""
        )))
    }
}

//! Virtual-loudspeaker positions for the supported channel-bed layouts.
//!
//! Azimuth is in degrees, positive to the left; elevation in degrees,
//! positive up; distance in meters. The LFE keeps its conventional below-ear
//! placement and is encoded like any other bed channel.

use ambra_core::Sample;

use crate::element::LoudspeakerLayout;

/// One virtual loudspeaker of a layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Loudspeaker {
    pub label: &'static str,
    pub azimuth: Sample,
    pub elevation: Sample,
    pub distance: Sample,
    pub is_lfe: bool,
}

const fn speaker(label: &'static str, azimuth: Sample, elevation: Sample) -> Loudspeaker {
    Loudspeaker {
        label,
        azimuth,
        elevation,
        distance: 1.0,
        is_lfe: false,
    }
}

const C: Loudspeaker = speaker("C", 0.0, 0.0);
const LFE: Loudspeaker = Loudspeaker {
    label: "LFE",
    azimuth: 0.0,
    elevation: -30.0,
    distance: 1.0,
    is_lfe: true,
};
const L30: Loudspeaker = speaker("L30", 30.0, 0.0);
const R30: Loudspeaker = speaker("R30", -30.0, 0.0);
const L45: Loudspeaker = speaker("L45", 45.0, 0.0);
const R45: Loudspeaker = speaker("R45", -45.0, 0.0);
const L60: Loudspeaker = speaker("L60", 60.0, 0.0);
const R60: Loudspeaker = speaker("R60", -60.0, 0.0);
const L90: Loudspeaker = speaker("L90", 90.0, 0.0);
const R90: Loudspeaker = speaker("R90", -90.0, 0.0);
const L110: Loudspeaker = speaker("L110", 110.0, 0.0);
const R110: Loudspeaker = speaker("R110", -110.0, 0.0);
const L135: Loudspeaker = speaker("L135", 135.0, 0.0);
const R135: Loudspeaker = speaker("R135", -135.0, 0.0);
const TL30: Loudspeaker = speaker("TL30", 30.0, 45.0);
const TR30: Loudspeaker = speaker("TR30", -30.0, 45.0);
const TL45: Loudspeaker = speaker("TL45", 45.0, 45.0);
const TR45: Loudspeaker = speaker("TR45", -45.0, 45.0);
const TL90: Loudspeaker = speaker("TL90", 90.0, 45.0);
const TR90: Loudspeaker = speaker("TR90", -90.0, 45.0);
const TL135: Loudspeaker = speaker("TL135", 135.0, 45.0);
const TR135: Loudspeaker = speaker("TR135", -135.0, 45.0);
const TL150: Loudspeaker = speaker("TL150", 150.0, 45.0);
const TR150: Loudspeaker = speaker("TR150", -150.0, 45.0);

/// Channel list of a layout, in the renderer's input-channel order.
pub fn layout_channels(layout: LoudspeakerLayout) -> &'static [Loudspeaker] {
    match layout {
        LoudspeakerLayout::Mono => &[C],
        LoudspeakerLayout::Stereo => &[L30, R30],
        LoudspeakerLayout::Surround3_1_2 => &[L45, R45, C, LFE, TL30, TR30],
        LoudspeakerLayout::Surround5_1_0 => &[L30, R30, C, LFE, L110, R110],
        LoudspeakerLayout::Surround5_1_2 => &[L30, R30, C, LFE, L110, R110, TL90, TR90],
        LoudspeakerLayout::Surround5_1_4 => {
            &[L30, R30, C, LFE, L110, R110, TL45, TR45, TL135, TR135]
        }
        LoudspeakerLayout::Surround7_1_0 => &[L30, R30, C, LFE, L90, R90, L135, R135],
        LoudspeakerLayout::Surround7_1_2 => {
            &[L30, R30, C, LFE, L90, R90, L135, R135, TL90, TR90]
        }
        LoudspeakerLayout::Surround7_1_4 => {
            &[L30, R30, C, LFE, L90, R90, L135, R135, TL45, TR45, TL135, TR135]
        }
        LoudspeakerLayout::Surround9_1_0 => {
            &[L30, R30, C, LFE, L60, R60, L90, R90, L135, R135]
        }
        LoudspeakerLayout::Surround9_1_2 => {
            &[L30, R30, C, LFE, L60, R60, L90, R90, L135, R135, TL90, TR90]
        }
        LoudspeakerLayout::Surround9_1_4 => {
            &[L30, R30, C, LFE, L60, R60, L90, R90, L135, R135, TL45, TR45, TL135, TR135]
        }
        LoudspeakerLayout::Surround9_1_6 => &[
            L30, R30, C, LFE, L60, R60, L90, R90, L135, R135, TL30, TR30, TL90, TR90, TL150,
            TR150,
        ],
    }
}

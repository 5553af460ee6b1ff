//! ambra-render: renderer facade and asset plumbing for ambra.
//!
//! ## Modules
//! - `element` - renderable audio element types
//! - `layouts` - virtual-loudspeaker tables for channel beds
//! - `config` - per-element channel bookkeeping
//! - `wav` - minimal 16-bit PCM RIFF reader/writer
//! - `resampler` - rational polyphase resampler for asset loading
//! - `assets` / `hrir` - SH-HRIR asset store and bank creation
//! - `renderer` - the `BinauralRenderer` facade

pub mod assets;
pub mod config;
pub mod element;
pub mod hrir;
pub mod layouts;
pub mod renderer;
pub mod resampler;
pub mod wav;

pub use assets::{DirectoryAssetStore, HrirAssetStore, MemoryAssetStore};
pub use config::{AudioElementConfig, EncodedSource};
pub use element::{AudioElementType, LoudspeakerLayout};
pub use renderer::BinauralRenderer;
pub use resampler::Resampler;

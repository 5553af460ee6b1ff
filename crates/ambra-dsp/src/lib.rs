//! ambra-dsp: the signal-processing core of the ambra binaural renderer.
//!
//! ## Modules
//! - `buffer` - aligned planar audio buffers
//! - `simd` - pointwise kernels with SSE/NEON paths and scalar fallbacks
//! - `fft` - shared real-FFT facility (forward, inverse, spectral MAC)
//! - `legendre` - associated Legendre polynomial tables
//! - `encoder` - spherical-harmonic encoding of point sources
//! - `partitioned_filter` - uniform-partition frequency-domain FIR
//! - `decoder` - SH-HRIR convolution bank summing to binaural stereo
//! - `limiter` - look-ahead-free peak limiter
//! - `rotator` - sound-field rotation for head tracking
//! - `testing` - deterministic signal generators for the test suites

pub mod buffer;
pub mod decoder;
pub mod encoder;
pub mod fft;
pub mod legendre;
pub mod limiter;
pub mod partitioned_filter;
pub mod rotator;
pub mod simd;
pub mod testing;

pub use buffer::AudioBuffer;
pub use decoder::AmbisonicBinauralDecoder;
pub use encoder::{AmbisonicEncoder, Source};
pub use fft::FftManager;
pub use legendre::AssociatedLegendrePolynomialsGenerator;
pub use limiter::PeakLimiter;
pub use partitioned_filter::PartitionedFftFilter;
pub use rotator::{Quaternion, SoundFieldRotator};

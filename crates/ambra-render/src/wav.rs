//! Minimal RIFF/WAVE codec: 16-bit PCM only.
//!
//! The reader accepts plain PCM and extensible PCM (with its fact chunk),
//! skips optional fmt extension bytes and rejects everything that is not
//! 16 bits per sample. The writer streams 16-bit samples behind a
//! placeholder header and patches the sizes on finalize.

use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use ambra_core::{AmbraError, AmbraResult};

const PCM_FORMAT: u16 = 0x1;
const EXTENSIBLE_WAV_FORMAT: u16 = 0xfffe;
const BYTES_PER_SAMPLE: usize = 2;

/// Decoded 16-bit PCM WAV data.
#[derive(Debug, Clone)]
pub struct WavData {
    pub num_channels: usize,
    pub sample_rate_hz: u32,
    /// Frame-interleaved samples.
    pub interleaved_samples: Vec<i16>,
}

impl WavData {
    #[inline]
    pub fn num_frames(&self) -> usize {
        self.interleaved_samples.len() / self.num_channels
    }
}

struct ByteReader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    fn take(&mut self, count: usize) -> AmbraResult<&'a [u8]> {
        if self.position + count > self.bytes.len() {
            return Err(AmbraError::Wav("unexpected end of data".to_string()));
        }
        let slice = &self.bytes[self.position..self.position + count];
        self.position += count;
        Ok(slice)
    }

    fn tag(&mut self) -> AmbraResult<[u8; 4]> {
        Ok(self.take(4)?.try_into().unwrap())
    }

    fn u16_le(&mut self) -> AmbraResult<u16> {
        Ok(u16::from_le_bytes(self.take(2)?.try_into().unwrap()))
    }

    fn u32_le(&mut self) -> AmbraResult<u32> {
        Ok(u32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }

    fn skip(&mut self, count: usize) -> AmbraResult<()> {
        self.take(count).map(|_| ())
    }
}

/// Parses a 16-bit PCM WAV from memory.
pub fn read_wav(bytes: &[u8]) -> AmbraResult<WavData> {
    let mut reader = ByteReader::new(bytes);

    if &reader.tag()? != b"RIFF" {
        return Err(AmbraError::Wav("missing RIFF header".to_string()));
    }
    reader.u32_le()?; // RIFF chunk size, unused.
    if &reader.tag()? != b"WAVE" {
        return Err(AmbraError::Wav("missing WAVE tag".to_string()));
    }
    if &reader.tag()? != b"fmt " {
        return Err(AmbraError::Wav("missing fmt chunk".to_string()));
    }
    let format_size = reader.u32_le()?;
    if format_size < 16 {
        return Err(AmbraError::Wav("fmt chunk too small".to_string()));
    }

    let format_tag = reader.u16_le()?;
    let num_channels = reader.u16_le()? as usize;
    let sample_rate_hz = reader.u32_le()?;
    reader.u32_le()?; // Average bytes per second.
    reader.u16_le()?; // Block align.
    let bits_per_sample = reader.u16_le()?;

    if format_size > 16 {
        // Optional extension: a two-byte size field plus that many bytes.
        let extension_size = reader.u16_le()? as usize;
        reader.skip(extension_size)?;
    }
    if format_tag == EXTENSIBLE_WAV_FORMAT {
        let fact_tag = reader.tag()?;
        if &fact_tag != b"fact" {
            return Err(AmbraError::Wav("extensible WAV without fact chunk".to_string()));
        }
        let fact_size = reader.u32_le()? as usize;
        reader.skip(fact_size)?;
    } else if format_tag != PCM_FORMAT {
        return Err(AmbraError::Wav(format!(
            "unsupported format tag {format_tag:#x}"
        )));
    }

    if bits_per_sample as usize != 8 * BYTES_PER_SAMPLE {
        return Err(AmbraError::Wav(format!(
            "unsupported bit depth {bits_per_sample}, only 16-bit PCM is handled"
        )));
    }
    if num_channels == 0 {
        return Err(AmbraError::Wav("zero channels".to_string()));
    }

    if &reader.tag()? != b"data" {
        return Err(AmbraError::Wav("missing data chunk".to_string()));
    }
    let data_size = reader.u32_le()? as usize;
    if data_size == 0 || data_size % BYTES_PER_SAMPLE != 0 {
        return Err(AmbraError::Wav("bad data chunk size".to_string()));
    }
    let payload = reader.take(data_size)?;
    let interleaved_samples: Vec<i16> = payload
        .chunks_exact(BYTES_PER_SAMPLE)
        .map(|pair| i16::from_le_bytes(pair.try_into().unwrap()))
        .collect();

    Ok(WavData {
        num_channels,
        sample_rate_hz,
        interleaved_samples,
    })
}

/// Serializes a 44-byte canonical PCM header.
fn wav_header(num_samples: usize, sample_rate_hz: u32, num_channels: usize) -> [u8; 44] {
    let data_bytes = (num_samples * BYTES_PER_SAMPLE) as u32;
    let byte_rate = sample_rate_hz * num_channels as u32 * BYTES_PER_SAMPLE as u32;
    let block_align = (num_channels * BYTES_PER_SAMPLE) as u16;

    let mut header = [0u8; 44];
    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&(36 + data_bytes).to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");
    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes());
    header[20..22].copy_from_slice(&PCM_FORMAT.to_le_bytes());
    header[22..24].copy_from_slice(&(num_channels as u16).to_le_bytes());
    header[24..28].copy_from_slice(&sample_rate_hz.to_le_bytes());
    header[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    header[32..34].copy_from_slice(&block_align.to_le_bytes());
    header[34..36].copy_from_slice(&16u16.to_le_bytes());
    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_bytes.to_le_bytes());
    header
}

/// Serializes a complete 16-bit PCM WAV into memory.
pub fn write_wav_bytes(
    sample_rate_hz: u32,
    num_channels: usize,
    interleaved_samples: &[i16],
) -> Vec<u8> {
    let mut bytes =
        Vec::with_capacity(44 + interleaved_samples.len() * BYTES_PER_SAMPLE);
    bytes.extend_from_slice(&wav_header(
        interleaved_samples.len(),
        sample_rate_hz,
        num_channels,
    ));
    for sample in interleaved_samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    bytes
}

/// Streaming 16-bit PCM writer. Writes a placeholder header up front and
/// patches the final sizes in `finalize`.
pub struct WavWriter {
    file: BufWriter<File>,
    sample_rate_hz: u32,
    num_channels: usize,
    samples_written: usize,
}

impl WavWriter {
    pub fn create(
        path: &Path,
        sample_rate_hz: u32,
        num_channels: usize,
    ) -> AmbraResult<Self> {
        let mut file = BufWriter::new(File::create(path)?);
        file.write_all(&wav_header(0, sample_rate_hz, num_channels))?;
        Ok(Self {
            file,
            sample_rate_hz,
            num_channels,
            samples_written: 0,
        })
    }

    /// Appends frame-interleaved samples.
    pub fn write_samples(&mut self, interleaved_samples: &[i16]) -> AmbraResult<()> {
        for sample in interleaved_samples {
            self.file.write_all(&sample.to_le_bytes())?;
        }
        self.samples_written += interleaved_samples.len();
        Ok(())
    }

    /// Rewrites the header with the final sizes and flushes the file.
    pub fn finalize(mut self) -> AmbraResult<()> {
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(&wav_header(
            self.samples_written,
            self.sample_rate_hz,
            self.num_channels,
        ))?;
        self.file.flush()?;
        Ok(())
    }
}

//! ambra: file-to-file binaural renderer.
//!
//! Reads a 16-bit PCM WAV, renders it through the binaural engine and writes
//! a stereo 16-bit WAV at the input rate. Object-based input additionally
//! takes a metadata file describing the source positions.

mod metadata;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;

use ambra_dsp::{simd, AudioBuffer};
use ambra_render::wav::{read_wav, WavWriter};
use ambra_render::{AudioElementType, BinauralRenderer, DirectoryAssetStore};

use crate::metadata::parse_source_list;

#[derive(Parser)]
#[command(name = "ambra", about = "Binaural renderer for Ambisonic, channel-bed and object audio")]
struct Cli {
    /// Input type: 1OA..7OA, Mono, Stereo, 3.1.2, 5.1.0, 5.1.2, 5.1.4,
    /// 7.1.0, 7.1.2, 7.1.4, 9.1.0, 9.1.2, 9.1.4, 9.1.6 or OBA
    #[arg(long = "input_type")]
    input_type: String,

    /// Object metadata file (required for OBA input)
    #[arg(long = "oba_metadata_file")]
    oba_metadata_file: Option<PathBuf>,

    /// Input WAV file (16-bit PCM)
    #[arg(long = "input_file")]
    input_file: PathBuf,

    /// Output WAV file (stereo, 16-bit PCM)
    #[arg(long = "output_file")]
    output_file: PathBuf,

    /// Frames per processing buffer
    #[arg(long = "buffer_size", default_value_t = 256)]
    buffer_size: usize,

    /// Directory holding the SH-HRIR assets ({order}OA_L.wav / {order}OA_R.wav)
    #[arg(long = "hrir_dir")]
    hrir_dir: PathBuf,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            log::error!("{error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let input_type: AudioElementType = cli
        .input_type
        .parse()
        .with_context(|| format!("bad --input_type \"{}\"", cli.input_type))?;

    if cli.buffer_size == 0 {
        bail!("--buffer_size must be positive");
    }

    // Object metadata, when rendering OBA.
    let source_list = if input_type.is_object() {
        let path = cli
            .oba_metadata_file
            .as_ref()
            .context("OBA input requires --oba_metadata_file")?;
        log::info!("processing OBA input with metadata file {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        parse_source_list(&text)
            .with_context(|| format!("failed to parse {}", path.display()))?
    } else {
        Vec::new()
    };

    // Input audio.
    let input_bytes = std::fs::read(&cli.input_file)
        .with_context(|| format!("failed to open {}", cli.input_file.display()))?;
    let input_wav = read_wav(&input_bytes)
        .with_context(|| format!("failed to parse {}", cli.input_file.display()))?;
    log::info!(
        "input: \"{}\"; {} channels; {} Hz; 16 bit; buffer size {} frames",
        cli.input_file.display(),
        input_wav.num_channels,
        input_wav.sample_rate_hz,
        cli.buffer_size
    );

    // Renderer configuration.
    let assets = Arc::new(DirectoryAssetStore::new(&cli.hrir_dir));
    let mut renderer = BinauralRenderer::new(cli.buffer_size, input_wav.sample_rate_hz, assets);

    if input_type.is_object() {
        for source in &source_list {
            log::info!(
                "object on input channel {}: azimuth {}, elevation {}, distance {}, gain {}",
                source.input_channel,
                source.azimuth,
                source.elevation,
                source.distance,
                source.gain
            );
            renderer
                .add_audio_element(input_type)
                .context("failed to add audio element")?;
            let element_index = renderer.num_audio_elements() - 1;
            renderer
                .update_object_position(
                    element_index,
                    source.azimuth,
                    source.elevation,
                    source.distance,
                )
                .context("failed to set object position")?;
            renderer
                .set_object_gain(element_index, source.gain)
                .context("failed to set object gain")?;
        }
    } else {
        renderer
            .add_audio_element(input_type)
            .context("failed to add audio element")?;
    }

    if input_wav.num_channels != renderer.num_input_channels() {
        bail!(
            "mismatching number of input channels ({} in the WAV, {} configured)",
            input_wav.num_channels,
            renderer.num_input_channels()
        );
    }

    // Streaming render loop.
    let num_channels = input_wav.num_channels;
    let num_output_channels = renderer.num_output_channels();
    let buffer_size = cli.buffer_size;

    let mut writer = WavWriter::create(
        &cli.output_file,
        input_wav.sample_rate_hz,
        num_output_channels,
    )
    .with_context(|| format!("failed to create {}", cli.output_file.display()))?;

    let mut input_block = AudioBuffer::new(num_channels, buffer_size);
    let mut output_block = AudioBuffer::new(num_output_channels, buffer_size);
    let mut frame_scratch = vec![0.0f32; num_channels];
    let mut interleaved_out = vec![0i16; num_output_channels * buffer_size];

    let total_frames = input_wav.num_frames();
    let mut frames_done = 0usize;
    while frames_done < total_frames {
        let frames_in_block = (total_frames - frames_done).min(buffer_size);

        // Deinterleave and convert; a short final block is zero padded.
        input_block.clear();
        for frame in 0..frames_in_block {
            let offset = (frames_done + frame) * num_channels;
            simd::float_from_int16(
                &input_wav.interleaved_samples[offset..offset + num_channels],
                &mut frame_scratch,
            );
            for (channel, &value) in frame_scratch.iter().enumerate() {
                input_block.channel_mut(channel)[frame] = value;
            }
        }

        renderer.process(&input_block, &mut output_block);

        simd::interleave_stereo_int16(
            output_block.channel(0),
            output_block.channel(1),
            &mut interleaved_out,
        );
        writer
            .write_samples(&interleaved_out)
            .context("failed to write output")?;

        frames_done += frames_in_block;
    }

    writer.finalize().context("failed to finalize output")?;
    log::info!("finished rendering \"{}\"", cli.output_file.display());
    Ok(())
}

//! File-based audio load/save.

use std::fs::{self, File};
use std::io::{BufWriter, Cursor, ErrorKind, Read, Write};
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use mp3lame_encoder::{Bitrate, Builder, DualPcm, FlushNoGap, MonoPcm, Quality};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tempfile::NamedTempFile;
use tracing::debug;

use super::{AudioError, AudioSample};

/// Recognized voice sample extensions, in lookup priority order.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["wav", "mp3", "flac"];

/// Bitrate used for compressed exports.
pub const MP3_BITRATE_KBPS: u32 = 192;

/// Reads and writes audio files.
///
/// WAV goes through `hound`; MP3 and FLAC are decoded with `symphonia`.
/// Every write lands in a temp file next to the destination and is renamed
/// into place once complete.
#[derive(Debug, Default)]
pub struct AudioIo;

impl AudioIo {
    /// Decode an audio file, choosing the decoder from its extension.
    pub fn load(path: &Path) -> Result<AudioSample, AudioError> {
        let is_wav = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("wav"));

        if is_wav {
            Self::read_wav(path)
        } else {
            Self::decode_compressed(path)
        }
    }

    pub fn read_wav(path: &Path) -> Result<AudioSample, AudioError> {
        let reader = WavReader::open(path).map_err(|e| wav_error(path.display(), e))?;
        samples_from_reader(reader, &path.display().to_string())
    }

    /// Decode an in-memory WAV file, e.g. an HTTP response body.
    pub fn decode_wav_bytes(bytes: &[u8], context: &str) -> Result<AudioSample, AudioError> {
        let reader = WavReader::new(Cursor::new(bytes)).map_err(|e| wav_error(context, e))?;
        samples_from_reader(reader, context)
    }

    /// Write 16-bit PCM WAV.
    pub fn write_wav(path: &Path, sample: &AudioSample) -> Result<(), AudioError> {
        persist_atomically(path, |file| {
            let spec = WavSpec {
                channels: sample.channel_count() as u16,
                sample_rate: sample.sample_rate(),
                bits_per_sample: 16,
                sample_format: SampleFormat::Int,
            };
            let context = path.display();
            let mut writer =
                WavWriter::new(BufWriter::new(file), spec).map_err(|e| wav_error(&context, e))?;

            let channels = sample.channels();
            for idx in 0..sample.frames() {
                for channel in channels {
                    writer
                        .write_sample(to_i16(channel[idx]))
                        .map_err(|e| wav_error(&context, e))?;
                }
            }

            writer.finalize().map_err(|e| wav_error(&context, e))
        })
    }

    /// Encode MP3 at a constant 192 kbps. Mono and stereo only.
    pub fn write_mp3(path: &Path, sample: &AudioSample) -> Result<(), AudioError> {
        let encoded = encode_mp3(sample)?;
        persist_atomically(path, |file| {
            file.write_all(&encoded).map_err(|e| io_error(path, e))
        })
    }

    /// Size of a file on disk in bytes.
    pub fn file_size(path: &Path) -> Result<u64, AudioError> {
        fs::metadata(path)
            .map(|m| m.len())
            .map_err(|e| io_error(path, e))
    }

    fn decode_compressed(path: &Path) -> Result<AudioSample, AudioError> {
        let file = File::open(path).map_err(|e| io_error(path, e))?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| decode_error(path, e))?;
        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| AudioError::Decode {
                path: path.to_path_buf(),
                message: "no supported audio track".to_string(),
            })?;
        let track_id = track.id;
        let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
        let mut channel_count = track.codec_params.channels.map(|c| c.count()).unwrap_or(0);
        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| decode_error(path, e))?;

        let mut interleaved = Vec::new();
        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(decode_error(path, e)),
            };

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    sample_rate = spec.rate;
                    channel_count = spec.channels.count();
                    let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                    buffer.copy_interleaved_ref(decoded);
                    interleaved.extend_from_slice(buffer.samples());
                }
                Err(SymphoniaError::DecodeError(msg)) => {
                    debug!("Skipping corrupt packet in {}: {msg}", path.display());
                }
                Err(e) => return Err(decode_error(path, e)),
            }
        }

        AudioSample::from_interleaved(&interleaved, channel_count, sample_rate)
    }
}

fn samples_from_reader<R: Read>(
    mut reader: WavReader<R>,
    context: &str,
) -> Result<AudioSample, AudioError> {
    let spec = reader.spec();
    let channel_count = spec.channels as usize;

    let interleaved = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| wav_error(context, e))?,
        SampleFormat::Int => {
            let max = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| wav_error(context, e))?
        }
    };

    AudioSample::from_interleaved(&interleaved, channel_count, spec.sample_rate)
}

fn encode_mp3(sample: &AudioSample) -> Result<Vec<u8>, AudioError> {
    let channel_count = sample.channel_count();
    if channel_count > 2 {
        return Err(AudioError::UnsupportedChannels(channel_count));
    }

    let mut builder =
        Builder::new().ok_or_else(|| AudioError::Encode("cannot allocate LAME".to_string()))?;
    builder
        .set_num_channels(channel_count as u8)
        .map_err(encode_error)?;
    builder
        .set_sample_rate(sample.sample_rate())
        .map_err(encode_error)?;
    builder.set_brate(Bitrate::Kbps192).map_err(encode_error)?;
    builder.set_quality(Quality::Best).map_err(encode_error)?;
    let mut encoder = builder.build().map_err(encode_error)?;

    let pcm: Vec<Vec<i16>> = sample
        .channels()
        .iter()
        .map(|c| c.iter().map(|&v| to_i16(v)).collect())
        .collect();

    let mut out = Vec::with_capacity(mp3lame_encoder::max_required_buffer_size(sample.frames()));
    let encoded = match pcm.as_slice() {
        [mono] => encoder.encode_to_vec(MonoPcm(mono.as_slice()), &mut out),
        [left, right] => encoder.encode_to_vec(
            DualPcm {
                left: left.as_slice(),
                right: right.as_slice(),
            },
            &mut out,
        ),
        _ => return Err(AudioError::UnsupportedChannels(channel_count)),
    };
    encoded.map_err(encode_error)?;

    // LAME needs up to 7200 bytes to flush its internal buffers.
    out.reserve(7200);
    encoder
        .flush_to_vec::<FlushNoGap>(&mut out)
        .map_err(encode_error)?;

    Ok(out)
}

fn persist_atomically<F>(path: &Path, write: F) -> Result<(), AudioError>
where
    F: FnOnce(&mut File) -> Result<(), AudioError>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".partial-")
        .tempfile_in(dir)
        .map_err(|e| io_error(dir, e))?;
    write(tmp.as_file_mut())?;
    finish(tmp, path)
}

fn finish(tmp: NamedTempFile, path: &Path) -> Result<(), AudioError> {
    tmp.persist(path)
        .map(|_| ())
        .map_err(|e| io_error(path, e.error))
}

fn to_i16(value: f32) -> i16 {
    (value.clamp(-1.0, 1.0) * f32::from(i16::MAX)).round() as i16
}

fn io_error(path: &Path, source: std::io::Error) -> AudioError {
    AudioError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn wav_error(context: impl std::fmt::Display, source: hound::Error) -> AudioError {
    AudioError::Wav {
        context: context.to_string(),
        source,
    }
}

fn decode_error(path: &Path, err: SymphoniaError) -> AudioError {
    AudioError::Decode {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

fn encode_error<E: std::fmt::Debug>(err: E) -> AudioError {
    AudioError::Encode(format!("{err:?}"))
}

//! Audio loading (decode, downmix, resample) and WAV output.

use std::fs::File;
use std::path::Path;

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Sample rate every track is resampled to on ingestion.
pub const INGEST_SAMPLE_RATE: u32 = 44100;

/// Load an audio file as mono samples at `target_rate`.
pub fn load_audio<P: AsRef<Path>>(
    path: P,
    target_rate: u32,
) -> Result<(Vec<f32>, u32), anyhow::Error> {
    let path = path.as_ref();
    let (samples, source_rate) = decode_mono(path)?;
    log::debug!(
        "Decoded {} samples at {} Hz from {:?}",
        samples.len(),
        source_rate,
        path
    );

    let samples = resample(samples, source_rate, target_rate)?;
    Ok((samples, target_rate))
}

/// Decode every packet of the first audio track, averaging channels to mono.
fn decode_mono(path: &Path) -> Result<(Vec<f32>, u32), anyhow::Error> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| anyhow::anyhow!("No audio track found in {:?}", path))?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| anyhow::anyhow!("Unknown sample rate in {:?}", path))?;

    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut samples = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                log::warn!("Error reading packet from {:?}: {}", path, e);
                break;
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => append_mono_samples(&mut samples, &decoded),
            Err(symphonia::core::errors::Error::DecodeError(e)) => {
                log::warn!("Skipping undecodable packet in {:?}: {}", path, e);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok((samples, sample_rate))
}

/// Append decoded audio to the sample buffer (converting to mono).
fn append_mono_samples(samples: &mut Vec<f32>, decoded: &AudioBufferRef) {
    macro_rules! downmix {
        ($buf:expr, $to_f32:expr) => {{
            let channels = $buf.spec().channels.count();
            for frame in 0..$buf.frames() {
                let mut sum = 0.0f32;
                for ch in 0..channels {
                    sum += $to_f32($buf.chan(ch)[frame]);
                }
                samples.push(sum / channels as f32);
            }
        }};
    }

    match decoded {
        AudioBufferRef::F32(buf) => downmix!(buf, |s: f32| s),
        AudioBufferRef::F64(buf) => downmix!(buf, |s: f64| s as f32),
        AudioBufferRef::S16(buf) => downmix!(buf, |s: i16| s as f32 / 32768.0),
        AudioBufferRef::S24(buf) => downmix!(buf, |s: symphonia::core::sample::i24| {
            s.inner() as f32 / 8388608.0
        }),
        AudioBufferRef::S32(buf) => downmix!(buf, |s: i32| s as f32 / 2147483648.0),
        AudioBufferRef::U8(buf) => downmix!(buf, |s: u8| (s as f32 - 128.0) / 128.0),
        _ => log::warn!("Unsupported sample format, packet dropped"),
    }
}

/// Resample a mono signal with a windowed-sinc interpolator.
///
/// Sample `n` at `from_rate` lands at `n * to_rate / from_rate`, so beat times
/// read against the source still match the output. The output is cut or
/// zero-padded to the exact resampled length.
fn resample(samples: Vec<f32>, from_rate: u32, to_rate: u32) -> Result<Vec<f32>, anyhow::Error> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples);
    }

    let ratio = to_rate as f64 / from_rate as f64;
    let expected_len = (samples.len() as f64 * ratio).round() as usize;
    log::debug!("Resampling {} Hz -> {} Hz", from_rate, to_rate);

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };
    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, params, samples.len(), 1)?;

    let mut output = resampler.process(&[samples], None)?.remove(0);
    let tail = resampler.process_partial(None::<&[Vec<f32>]>, None)?;
    output.extend_from_slice(&tail[0]);

    output.resize(expected_len, 0.0);
    Ok(output)
}

/// Write mono samples as a 16-bit PCM WAV file.
pub fn write_wav<P: AsRef<Path>>(
    path: P,
    samples: &[f32],
    sample_rate: u32,
) -> Result<(), anyhow::Error> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in samples {
        let clamped = sample.clamp(-1.0, 1.0);
        writer.write_sample((clamped * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Check if a file is a supported audio format.
pub fn is_supported_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            supported_extensions()
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
        .unwrap_or(false)
}

/// Supported audio file extensions.
pub fn supported_extensions() -> &'static [&'static str] {
    &["wav", "mp3", "flac", "aiff", "aif", "ogg"]
}

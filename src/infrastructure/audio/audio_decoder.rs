use std::io::Cursor;

use rubato::{FftFixedIn, Resampler};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::application::ports::TranscriptionError;

/// Sample rate Whisper expects.
pub const WHISPER_SAMPLE_RATE: u32 = 16_000;

const RESAMPLE_CHUNK: usize = 1024;

/// Decodes any container symphonia can probe into 16 kHz mono samples.
///
/// `extension` is passed to the prober as a hint; formats without a magic
/// header (raw ADTS, some MP3s) are only found through it.
pub fn decode_audio_to_pcm(
    data: Vec<u8>,
    extension: Option<&str>,
) -> Result<Vec<f32>, TranscriptionError> {
    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let source = MediaSourceStream::new(Box::new(Cursor::new(data)), Default::default());
    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            source,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(unsupported("probe"))?;

    let mut reader = probed.format;
    let track = reader
        .default_track()
        .ok_or_else(|| TranscriptionError::DecodingFailed("no audio track found".to_string()))?;

    let track_id = track.id;
    let params = track.codec_params.clone();
    let source_rate = params
        .sample_rate
        .ok_or_else(|| TranscriptionError::DecodingFailed("unknown sample rate".to_string()))?;

    let decoder = symphonia::default::get_codecs()
        .make(&params, &DecoderOptions::default())
        .map_err(unsupported("codec"))?;

    let mut collector = MonoCollector::new(params.channels.map_or(1, |c| c.count()));
    collector.drain(reader.as_mut(), decoder, track_id)?;
    let mono = collector.finish()?;

    let pcm = if source_rate == WHISPER_SAMPLE_RATE {
        mono
    } else {
        tracing::debug!(from = source_rate, to = WHISPER_SAMPLE_RATE, "Resampling audio");
        resample(&mono, source_rate, WHISPER_SAMPLE_RATE)?
    };

    tracing::debug!(
        samples = pcm.len(),
        duration_secs = pcm.len() as f32 / WHISPER_SAMPLE_RATE as f32,
        "Audio decoded to 16kHz mono PCM"
    );

    Ok(pcm)
}

/// Accumulates decoded packets of one track, averaging channels into mono.
struct MonoCollector {
    channels: usize,
    samples: Vec<f32>,
    skipped_frames: usize,
}

impl MonoCollector {
    fn new(channels: usize) -> Self {
        Self {
            channels: channels.max(1),
            samples: Vec::new(),
            skipped_frames: 0,
        }
    }

    fn drain(
        &mut self,
        reader: &mut dyn FormatReader,
        mut decoder: Box<dyn Decoder>,
        track_id: u32,
    ) -> Result<(), TranscriptionError> {
        loop {
            let packet = match reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    return Ok(());
                }
                Err(e) => return Err(decoding_failed("packet")(e)),
            };
            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) if decoded.frames() > 0 => {
                    let mut buffer =
                        SampleBuffer::<f32>::new(decoded.frames() as u64, *decoded.spec());
                    buffer.copy_interleaved_ref(decoded);
                    self.push(buffer.samples());
                }
                Ok(_) => {}
                Err(SymphoniaError::DecodeError(e)) => {
                    tracing::warn!(error = %e, "Skipping corrupt audio frame");
                    self.skipped_frames += 1;
                }
                Err(e) => return Err(decoding_failed("decode")(e)),
            }
        }
    }

    fn push(&mut self, interleaved: &[f32]) {
        if self.channels == 1 {
            self.samples.extend_from_slice(interleaved);
            return;
        }
        let channels = self.channels as f32;
        self.samples.extend(
            interleaved
                .chunks(self.channels)
                .map(|frame| frame.iter().sum::<f32>() / channels),
        );
    }

    fn finish(self) -> Result<Vec<f32>, TranscriptionError> {
        if self.skipped_frames > 0 {
            tracing::warn!(skipped = self.skipped_frames, "Audio had undecodable frames");
        }
        if self.samples.is_empty() {
            return Err(TranscriptionError::DecodingFailed(
                "no audio samples decoded".to_string(),
            ));
        }
        Ok(self.samples)
    }
}

fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, TranscriptionError> {
    let mut resampler =
        FftFixedIn::<f32>::new(from_rate as usize, to_rate as usize, RESAMPLE_CHUNK, 2, 1)
            .map_err(decoding_failed("resampler init"))?;

    let expected_len = (samples.len() as u64 * to_rate as u64 / from_rate as u64) as usize;
    let delay = resampler.output_delay();
    let mut output = Vec::with_capacity(delay + expected_len + resampler.output_frames_max());

    // Input runs out before the delayed tail comes through, so the stream is fed
    // zeros until `delay + expected_len` frames are out.
    let mut windows = samples.chunks(RESAMPLE_CHUNK);
    let mut chunk = vec![0.0f32; RESAMPLE_CHUNK];
    while output.len() < delay + expected_len {
        match windows.next() {
            Some(window) => {
                chunk[..window.len()].copy_from_slice(window);
                chunk[window.len()..].fill(0.0);
            }
            None => chunk.fill(0.0),
        }

        let frames = resampler
            .process(&[chunk.as_slice()], None)
            .map_err(decoding_failed("resample"))?;
        match frames.first() {
            Some(mono) if !mono.is_empty() => output.extend_from_slice(mono),
            _ => break,
        }
    }

    output.drain(..delay.min(output.len()));
    output.truncate(expected_len);
    Ok(output)
}

fn unsupported<E: std::fmt::Display>(what: &'static str) -> impl Fn(E) -> TranscriptionError {
    move |e| TranscriptionError::UnsupportedFormat(format!("{what}: {e}"))
}

fn decoding_failed<E: std::fmt::Display>(what: &'static str) -> impl Fn(E) -> TranscriptionError {
    move |e| TranscriptionError::DecodingFailed(format!("{what}: {e}"))
}

//! Local file decoding with Symphonia
//!
//! [`LocalAudioSource`] streams a local file packet by packet into a small
//! buffer of interleaved stereo `f32` frames. Every Symphonia sample
//! format goes through the same interleaving helper; only the normalization
//! closure differs. When the output device runs at a different rate the
//! decoded frames are passed through a rubato sinc resampler.

use crate::error::{AudioError, Result};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use std::collections::VecDeque;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;
use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::{Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, SeekMode, SeekTo};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::TimeBase;
use tracing::{debug, trace};

/// Output is always interleaved stereo
pub const OUTPUT_CHANNELS: usize = 2;

/// Preallocated decode buffer, in seconds
const BUFFER_SIZE_SECONDS: usize = 2;

/// Audio source for a local file with a streaming decoder
pub struct LocalAudioSource {
    path: PathBuf,
    source_sample_rate: u32,
    target_sample_rate: u32,

    // Symphonia streaming components
    format_reader: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    time_base: TimeBase,

    // Decoded stereo samples ready for output
    buffer: VecDeque<f32>,

    // Resampler and the frames waiting for a full input chunk
    resampler: Option<SincFixedIn<f32>>,
    pending: Vec<f32>,

    frames_read: u64,
    total_duration: Duration,
    is_eof: bool,
}

impl LocalAudioSource {
    /// Open and probe `path`, decoding at the file's own sample rate
    ///
    /// Only reads metadata; packets are decoded on demand.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
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
            .map_err(|e| AudioError::UnsupportedFormat(format!("Failed to probe file: {}", e)))?;
        let format_reader = probed.format;

        let track = format_reader
            .default_track()
            .ok_or_else(|| AudioError::UnsupportedFormat("No audio tracks found".into()))?;

        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| AudioError::UnsupportedFormat("Unknown sample rate".into()))?;
        let track_id = track.id;
        let time_base = track
            .codec_params
            .time_base
            .unwrap_or(TimeBase::new(1, sample_rate));

        // Zero when the container does not declare a frame count
        let total_duration = track
            .codec_params
            .n_frames
            .map(|frames| Duration::from_secs_f64(frames as f64 / sample_rate as f64))
            .unwrap_or(Duration::ZERO);

        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| {
                AudioError::UnsupportedFormat(format!("Failed to create decoder: {}", e))
            })?;

        debug!(
            path = %path.display(),
            sample_rate,
            duration_ms = total_duration.as_millis() as u64,
            "Opened audio file"
        );

        Ok(Self {
            path,
            source_sample_rate: sample_rate,
            target_sample_rate: sample_rate,
            format_reader,
            decoder,
            track_id,
            time_base,
            buffer: VecDeque::with_capacity(buffer_capacity(sample_rate)),
            resampler: None,
            pending: Vec::new(),
            frames_read: 0,
            total_duration,
            is_eof: false,
        })
    }

    /// Produce output at `target_sample_rate`, resampling if it differs
    pub fn resampled_to(mut self, target_sample_rate: u32) -> Result<Self> {
        self.target_sample_rate = target_sample_rate;
        self.buffer.reserve(buffer_capacity(target_sample_rate));

        if target_sample_rate == self.source_sample_rate {
            self.resampler = None;
            return Ok(self);
        }

        let params = SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        };

        // 0.1 s input chunks
        let chunk_frames = (self.source_sample_rate as usize / 10).max(1);
        let resampler = SincFixedIn::<f32>::new(
            target_sample_rate as f64 / self.source_sample_rate as f64,
            2.0,
            params,
            chunk_frames,
            OUTPUT_CHANNELS,
        )
        .map_err(|e| AudioError::ResampleError(e.to_string()))?;

        debug!(
            from = self.source_sample_rate,
            to = target_sample_rate,
            "Resampling enabled"
        );
        self.resampler = Some(resampler);
        Ok(self)
    }

    /// Fill `output` with interleaved stereo samples
    ///
    /// Returns the number of samples written; the remainder is silenced.
    pub fn read_samples(&mut self, output: &mut [f32]) -> Result<usize> {
        while self.buffer.len() < output.len() && !self.is_eof {
            self.decode_next_packet()?;
        }

        let written = self.buffer.len().min(output.len());
        for (slot, sample) in output.iter_mut().zip(self.buffer.drain(..written)) {
            *slot = sample;
        }
        output[written..].fill(0.0);

        self.frames_read += (written / OUTPUT_CHANNELS) as u64;
        Ok(written)
    }

    /// Move the playhead, clamped to the duration when it is known
    pub fn seek(&mut self, position: Duration) -> Result<()> {
        let position = if self.total_duration > Duration::ZERO {
            position.min(self.total_duration)
        } else {
            position
        };

        let ts = self.time_base.calc_timestamp(position.into());
        self.format_reader
            .seek(
                SeekMode::Accurate,
                SeekTo::TimeStamp {
                    ts,
                    track_id: self.track_id,
                },
            )
            .map_err(|e| AudioError::Decode(format!("Seek failed: {}", e)))?;

        self.decoder.reset();
        self.buffer.clear();
        self.pending.clear();
        if let Some(resampler) = self.resampler.as_mut() {
            resampler.reset();
        }
        self.frames_read = (position.as_secs_f64() * self.target_sample_rate as f64) as u64;
        self.is_eof = false;

        trace!(position_ms = position.as_millis() as u64, "Seeked");
        Ok(())
    }

    /// Total duration (zero if unknown)
    pub fn duration(&self) -> Duration {
        self.total_duration
    }

    /// Position of the next sample handed out
    pub fn position(&self) -> Duration {
        Duration::from_secs_f64(self.frames_read as f64 / self.target_sample_rate as f64)
    }

    /// Decoder ran dry and every buffered sample was handed out
    pub fn is_finished(&self) -> bool {
        self.is_eof && self.buffer.is_empty()
    }

    /// File path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Output sample rate
    pub fn sample_rate(&self) -> u32 {
        self.target_sample_rate
    }

    /// The file's own sample rate
    pub fn source_sample_rate(&self) -> u32 {
        self.source_sample_rate
    }

    /// Decode one packet into the ring buffer
    fn decode_next_packet(&mut self) -> Result<()> {
        let packet = match self.format_reader.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                self.finish();
                return Ok(());
            }
            Err(SymphoniaError::ResetRequired) => {
                self.finish();
                return Ok(());
            }
            Err(e) => return Err(AudioError::Decode(format!("Error reading packet: {}", e))),
        };

        if packet.track_id() != self.track_id {
            return Ok(());
        }

        let samples = match self.decoder.decode(&packet) {
            Ok(decoded) => convert_to_stereo_f32(decoded),
            // Corrupt packets are skipped
            Err(SymphoniaError::DecodeError(e)) => {
                trace!(error = %e, "Skipping undecodable packet");
                return Ok(());
            }
            Err(e) => return Err(AudioError::Decode(e.to_string())),
        };

        if self.resampler.is_some() {
            self.pending.extend_from_slice(&samples);
            self.drain_resampler()?;
        } else {
            self.push_samples(samples);
        }
        Ok(())
    }

    /// Resample every full chunk waiting in `pending`
    fn drain_resampler(&mut self) -> Result<()> {
        let Some(resampler) = self.resampler.as_mut() else {
            return Ok(());
        };

        let mut resampled_all = Vec::new();
        loop {
            let chunk_frames = resampler.input_frames_next();
            if self.pending.len() < chunk_frames * OUTPUT_CHANNELS {
                break;
            }

            let chunk: Vec<f32> = self.pending.drain(..chunk_frames * OUTPUT_CHANNELS).collect();
            let planar = deinterleave(&chunk);
            let resampled = resampler
                .process(&planar, None)
                .map_err(|e| AudioError::ResampleError(e.to_string()))?;
            resampled_all.extend(interleave(&resampled));
        }

        self.push_samples(resampled_all);
        Ok(())
    }

    fn push_samples(&mut self, samples: Vec<f32>) {
        self.buffer.extend(samples);
    }

    fn finish(&mut self) {
        self.is_eof = true;
        // Tail shorter than a resampler chunk is played as-is
        let tail = std::mem::take(&mut self.pending);
        self.push_samples(tail);
    }
}

fn buffer_capacity(sample_rate: u32) -> usize {
    BUFFER_SIZE_SECONDS * sample_rate as usize * OUTPUT_CHANNELS
}

fn deinterleave(samples: &[f32]) -> Vec<Vec<f32>> {
    let mut planar = vec![Vec::with_capacity(samples.len() / OUTPUT_CHANNELS); OUTPUT_CHANNELS];
    for frame in samples.chunks_exact(OUTPUT_CHANNELS) {
        for (channel, sample) in planar.iter_mut().zip(frame) {
            channel.push(*sample);
        }
    }
    planar
}

fn interleave(planar: &[Vec<f32>]) -> Vec<f32> {
    let frames = planar.first().map_or(0, Vec::len);
    let mut samples = Vec::with_capacity(frames * planar.len());
    for frame_idx in 0..frames {
        for channel in planar {
            samples.push(channel[frame_idx]);
        }
    }
    samples
}

/// Interleave a planar buffer of any sample type to stereo f32
///
/// Mono is duplicated; channels beyond the first two are dropped.
fn interleave_to_stereo_f32<T, F>(buf: &symphonia::core::audio::AudioBuffer<T>, normalize: F) -> Vec<f32>
where
    T: symphonia::core::sample::Sample,
    F: Fn(T) -> f32,
{
    let channels = buf.spec().channels.count();
    let frames = buf.frames();
    let left = buf.chan(0);
    let right = if channels > 1 { buf.chan(1) } else { left };

    let mut output = Vec::with_capacity(frames * OUTPUT_CHANNELS);
    for frame_idx in 0..frames {
        output.push(normalize(left[frame_idx]));
        output.push(normalize(right[frame_idx]));
    }
    output
}

/// Normalize any Symphonia sample format to stereo f32 in [-1.0, 1.0]
fn convert_to_stereo_f32(decoded: AudioBufferRef) -> Vec<f32> {
    match decoded {
        AudioBufferRef::F32(buf) => interleave_to_stereo_f32(&buf, |s| s),
        AudioBufferRef::F64(buf) => interleave_to_stereo_f32(&buf, |s| s as f32),
        AudioBufferRef::S8(buf) => interleave_to_stereo_f32(&buf, |s| s as f32 / i8::MAX as f32),
        AudioBufferRef::S16(buf) => interleave_to_stereo_f32(&buf, |s| s as f32 / i16::MAX as f32),
        AudioBufferRef::S24(buf) => interleave_to_stereo_f32(&buf, |s| s.inner() as f32 / 8388607.0),
        AudioBufferRef::S32(buf) => interleave_to_stereo_f32(&buf, |s| s as f32 / i32::MAX as f32),
        AudioBufferRef::U8(buf) => {
            interleave_to_stereo_f32(&buf, |s| (s as f32 / u8::MAX as f32) * 2.0 - 1.0)
        }
        AudioBufferRef::U16(buf) => {
            interleave_to_stereo_f32(&buf, |s| (s as f32 / u16::MAX as f32) * 2.0 - 1.0)
        }
        AudioBufferRef::U24(buf) => {
            interleave_to_stereo_f32(&buf, |s| (s.inner() as f32 / 16777215.0) * 2.0 - 1.0)
        }
        AudioBufferRef::U32(buf) => {
            interleave_to_stereo_f32(&buf, |s| (s as f64 / u32::MAX as f64 * 2.0 - 1.0) as f32)
        }
    }
}

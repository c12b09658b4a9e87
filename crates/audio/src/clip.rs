//! Decoded waveform storage and per-voice rendering.

use std::path::Path;

use thiserror::Error;

/// Errors raised while decoding a WAV file.
#[derive(Debug, Error)]
pub enum ClipError {
    #[error("could not read audio file: {0}")]
    Io(#[from] std::io::Error),
    #[error("not a RIFF/WAVE file")]
    NotWave,
    #[error("missing `{0}` chunk")]
    MissingChunk(&'static str),
    #[error("unsupported sample format (tag {format_tag}, {bits} bits); only 16-bit PCM is supported")]
    UnsupportedFormat { format_tag: u16, bits: u16 },
    #[error("unsupported channel count {0}")]
    UnsupportedChannels(u16),
}

/// Gains and playback settings applied to one render call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderParams {
    pub volume: f32,
    /// -1.0 = hard left, 0.0 = centre, 1.0 = hard right.
    pub pan: f32,
    /// Playback speed multiplier (1.0 = original pitch).
    pub pitch: f32,
    pub looping: bool,
}

impl RenderParams {
    /// Independent left/right gains for this pan position.
    pub fn gains(&self) -> (f32, f32) {
        let left = self.volume * if self.pan > 0.0 { 1.0 - self.pan } else { 1.0 };
        let right = self.volume * if self.pan < 0.0 { 1.0 + self.pan } else { 1.0 };
        (left, right)
    }
}

/// Result of rendering one voice into a buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rendered {
    /// Playhead (fractional source frame) to resume from.
    pub playhead: f32,
    /// The clip ran out and the voice is not looping.
    pub finished: bool,
}

/// A fully decoded sound held in memory.
///
/// Samples are interleaved when the clip is stereo.
#[derive(Debug, Clone)]
pub struct AudioClip {
    samples: Vec<f32>,
    num_samples: usize,
    channels: u16,
    sample_rate: u32,
}

impl AudioClip {
    /// Load a 16-bit PCM WAV file.
    pub fn from_file(path: &Path) -> Result<Self, ClipError> {
        let bytes = std::fs::read(path)?;
        Self::from_wav_bytes(&bytes)
    }

    /// Decode a 16-bit PCM WAV image.
    pub fn from_wav_bytes(bytes: &[u8]) -> Result<Self, ClipError> {
        if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
            return Err(ClipError::NotWave);
        }

        let mut format: Option<(u16, u16, u32, u16)> = None;
        let mut offset = 12;
        while offset + 8 <= bytes.len() {
            let id = &bytes[offset..offset + 4];
            let len = read_u32(bytes, offset + 4) as usize;
            let body_start = offset + 8;
            let body_end = body_start.saturating_add(len).min(bytes.len());
            let body = &bytes[body_start..body_end];

            match id {
                b"fmt " => {
                    if body.len() < 16 {
                        return Err(ClipError::MissingChunk("fmt "));
                    }
                    let format_tag = read_u16(body, 0);
                    let channels = read_u16(body, 2);
                    let sample_rate = read_u32(body, 4);
                    let bits = read_u16(body, 14);
                    format = Some((format_tag, channels, sample_rate, bits));
                }
                b"data" => {
                    let (format_tag, channels, sample_rate, bits) =
                        format.ok_or(ClipError::MissingChunk("fmt "))?;
                    if format_tag != 1 || bits != 16 {
                        return Err(ClipError::UnsupportedFormat { format_tag, bits });
                    }
                    if channels != 1 && channels != 2 {
                        return Err(ClipError::UnsupportedChannels(channels));
                    }
                    let samples: Vec<f32> = body
                        .chunks_exact(2)
                        .map(|pair| f32::from(i16::from_le_bytes([pair[0], pair[1]])) / 32768.0)
                        .collect();
                    return Ok(Self::from_samples(samples, channels, sample_rate));
                }
                _ => {}
            }

            // Chunks are word aligned.
            offset = body_start.saturating_add(len + (len & 1));
        }

        Err(ClipError::MissingChunk("data"))
    }

    /// Build a clip from already decoded (interleaved) samples.
    pub fn from_samples(samples: Vec<f32>, channels: u16, sample_rate: u32) -> Self {
        let channels = channels.clamp(1, 2);
        let num_samples = samples.len() / usize::from(channels);
        Self {
            samples,
            num_samples,
            channels,
            sample_rate,
        }
    }

    /// A zero-length clip used in place of sounds that failed to load.
    pub fn silent() -> Self {
        Self::from_samples(Vec::new(), 1, crate::DEFAULT_OUTPUT_RATE)
    }

    /// Number of sample frames (per channel).
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    pub fn num_channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn is_empty(&self) -> bool {
        self.num_samples == 0
    }

    /// Accumulate this clip into an interleaved stereo buffer, starting at
    /// `playhead`.
    ///
    /// Nearest-sample lookup (the playhead is truncated), no interpolation.
    /// A non-looping clip that runs out stops writing mid-buffer.
    pub fn render(
        &self,
        out: &mut [f32],
        playhead: f32,
        params: &RenderParams,
        output_rate: u32,
    ) -> Rendered {
        let len = self.num_samples;
        if len == 0 || playhead >= len as f32 {
            return Rendered {
                playhead,
                finished: true,
            };
        }

        let (left, right) = params.gains();
        let advance = (params.pitch * self.sample_rate as f32 / output_rate.max(1) as f32).max(0.0);
        let mut playhead = playhead.max(0.0);

        for frame in out.chunks_exact_mut(crate::OUTPUT_CHANNELS) {
            let index = (playhead as usize).min(len - 1);
            let (l, r) = match self.channels {
                1 => (self.samples[index], self.samples[index]),
                _ => (self.samples[index * 2], self.samples[index * 2 + 1]),
            };
            frame[0] += l * left;
            frame[1] += r * right;

            playhead += advance;
            if playhead >= len as f32 {
                if !params.looping {
                    return Rendered {
                        playhead,
                        finished: true,
                    };
                }
                playhead %= len as f32;
            }
        }

        Rendered {
            playhead,
            finished: false,
        }
    }
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Minimal 16-bit PCM WAV image with an extra chunk before `data`.
    pub(crate) fn wav_bytes(channels: u16, sample_rate: u32, samples: &[i16]) -> Vec<u8> {
        let data_len = (samples.len() * 2) as u32;
        let mut out = Vec::new();
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(4 + 24 + 12 + 8 + data_len).to_le_bytes());
        out.extend_from_slice(b"WAVE");
        out.extend_from_slice(b"fmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&channels.to_le_bytes());
        out.extend_from_slice(&sample_rate.to_le_bytes());
        out.extend_from_slice(&(sample_rate * u32::from(channels) * 2).to_le_bytes());
        out.extend_from_slice(&(channels * 2).to_le_bytes());
        out.extend_from_slice(&16u16.to_le_bytes());
        out.extend_from_slice(b"LIST");
        out.extend_from_slice(&3u32.to_le_bytes());
        out.extend_from_slice(&[0, 0, 0, 0]); // 3 bytes + pad
        out.extend_from_slice(b"data");
        out.extend_from_slice(&data_len.to_le_bytes());
        for s in samples {
            out.extend_from_slice(&s.to_le_bytes());
        }
        out
    }

    fn params(volume: f32, pan: f32, pitch: f32, looping: bool) -> RenderParams {
        RenderParams {
            volume,
            pan,
            pitch,
            looping,
        }
    }

    #[test]
    fn decodes_wav_and_skips_unknown_chunks() {
        let bytes = wav_bytes(2, 22050, &[16384, -16384, 0, 8192]);
        let clip = AudioClip::from_wav_bytes(&bytes).unwrap();
        assert_eq!(clip.num_channels(), 2);
        assert_eq!(clip.sample_rate(), 22050);
        assert_eq!(clip.num_samples(), 2);
        assert_eq!(clip.samples[0], 0.5);
        assert_eq!(clip.samples[1], -0.5);
    }

    #[test]
    fn rejects_non_wave_data() {
        assert!(matches!(
            AudioClip::from_wav_bytes(b"definitely not audio"),
            Err(ClipError::NotWave)
        ));
    }

    #[test]
    fn pan_gains_follow_linear_law() {
        assert_eq!(params(1.0, 0.0, 1.0, false).gains(), (1.0, 1.0));
        assert_eq!(params(0.5, 0.5, 1.0, false).gains(), (0.25, 0.5));
        assert_eq!(params(1.0, -0.25, 1.0, false).gains(), (1.0, 0.75));
    }

    #[test]
    fn mono_is_written_to_both_channels() {
        let clip = AudioClip::from_samples(vec![0.5; 8], 1, 48000);
        let mut out = vec![0.0; 4];
        clip.render(&mut out, 0.0, &params(1.0, 0.0, 1.0, false), 48000);
        assert_eq!(out, vec![0.5, 0.5, 0.5, 0.5]);
    }

    #[test]
    fn playhead_advances_by_pitch_times_rate_ratio() {
        let clip = AudioClip::from_samples(vec![0.0; 100], 1, 24000);
        let mut out = vec![0.0; 20];
        let rendered = clip.render(&mut out, 0.0, &params(1.0, 0.0, 2.0, false), 48000);
        // 10 frames * 2.0 * (24000 / 48000)
        assert!((rendered.playhead - 10.0).abs() < 1e-4);
        assert!(!rendered.finished);
    }

    #[test]
    fn nearest_sample_lookup_truncates() {
        let clip = AudioClip::from_samples(vec![1.0, 2.0, 3.0, 4.0], 1, 48000);
        let mut out = vec![0.0; 8];
        clip.render(&mut out, 0.0, &params(1.0, 0.0, 0.5, false), 48000);
        let left: Vec<f32> = out.iter().step_by(2).copied().collect();
        assert_eq!(left, vec![1.0, 1.0, 2.0, 2.0]);
    }

    #[test]
    fn one_shot_stops_mid_buffer() {
        let clip = AudioClip::from_samples(vec![1.0; 3], 1, 48000);
        let mut out = vec![0.0; 10];
        let rendered = clip.render(&mut out, 0.0, &params(1.0, 0.0, 1.0, false), 48000);
        assert!(rendered.finished);
        assert_eq!(&out[..6], &[1.0; 6]);
        assert_eq!(&out[6..], &[0.0; 4]);
    }

    #[test]
    fn looping_wraps_modulo_sample_count() {
        let clip = AudioClip::from_samples(vec![1.0; 4], 1, 48000);
        let mut out = vec![0.0; 2 * 5];
        let rendered = clip.render(&mut out, 2.5, &params(1.0, 0.0, 1.5, true), 48000);
        // 2.5 -> 4.0 wraps to 0.0 -> 1.5 -> 3.0 -> 4.5 wraps to 0.5 -> 2.0
        assert!((rendered.playhead - 2.0).abs() < 1e-5);
        assert!(rendered.playhead <= 3.0);
        assert!(!rendered.finished);
        assert!(out.iter().all(|&s| s == 1.0));
    }

    #[test]
    fn empty_clip_is_immediately_finished() {
        let mut out = vec![0.0; 4];
        let rendered = AudioClip::silent().render(&mut out, 0.0, &params(1.0, 0.0, 1.0, true), 48000);
        assert!(rendered.finished);
        assert_eq!(out, vec![0.0; 4]);
    }
}

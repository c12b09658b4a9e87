//! Output backends that drive [`Mixer::render`] at the buffer cadence.

use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::mixer::Mixer;
use crate::OUTPUT_CHANNELS;

// ── Device output (cpal) ───────────────────────────────────────────────────

/// A live hardware stream. Audio stops when this is dropped.
#[cfg(feature = "device")]
pub struct DeviceOutput {
    _stream: cpal::Stream,
    sample_rate: u32,
}

#[cfg(feature = "device")]
impl DeviceOutput {
    /// Open the default output device as a stereo stream fed by `mixer`.
    pub fn open(mixer: &Mixer) -> anyhow::Result<Self> {
        use anyhow::Context;
        use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .context("no default audio output device")?;
        let default_config = device
            .default_output_config()
            .context("querying default output config")?;
        let sample_rate = default_config.sample_rate().0;
        mixer.set_output_rate(sample_rate);

        let config = cpal::StreamConfig {
            channels: OUTPUT_CHANNELS as u16,
            sample_rate: default_config.sample_rate(),
            buffer_size: cpal::BufferSize::Default,
        };
        let err_fn = |err| log::error!("Audio stream error: {}", err);

        let stream = match default_config.sample_format() {
            cpal::SampleFormat::I16 => {
                let mixer = mixer.clone();
                let mut scratch = Vec::new();
                device.build_output_stream(
                    &config,
                    move |data: &mut [i16], _| {
                        scratch.resize(data.len(), 0.0);
                        mixer.render(&mut scratch);
                        for (out, s) in data.iter_mut().zip(&scratch) {
                            *out = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
                        }
                    },
                    err_fn,
                    None,
                )?
            }
            _ => {
                let mixer = mixer.clone();
                device.build_output_stream(
                    &config,
                    move |data: &mut [f32], _| mixer.render(data),
                    err_fn,
                    None,
                )?
            }
        };
        stream.play().context("starting audio stream")?;

        log::info!(
            "Audio output: {} @ {} Hz",
            device.name().unwrap_or_else(|_| "unknown device".into()),
            sample_rate
        );
        Ok(Self {
            _stream: stream,
            sample_rate,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

// ── Headless output ────────────────────────────────────────────────────────

/// Pulls buffers from the mixer on a background thread at real-time cadence
/// and discards them. Used when no audio device is wanted.
pub struct HeadlessOutput {
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    buffers: Arc<AtomicU64>,
}

impl HeadlessOutput {
    pub fn start(mixer: Mixer, buffer_frames: usize) -> io::Result<Self> {
        let buffer_frames = buffer_frames.max(1);
        let running = Arc::new(AtomicBool::new(true));
        let buffers = Arc::new(AtomicU64::new(0));
        let period =
            Duration::from_secs_f64(buffer_frames as f64 / f64::from(mixer.output_rate()));

        let worker = {
            let running = Arc::clone(&running);
            let buffers = Arc::clone(&buffers);
            thread::Builder::new()
                .name("audio-headless".into())
                .spawn(move || {
                    let mut buf = vec![0.0f32; buffer_frames * OUTPUT_CHANNELS];
                    while running.load(Ordering::Relaxed) {
                        mixer.render(&mut buf);
                        buffers.fetch_add(1, Ordering::Relaxed);
                        thread::sleep(period);
                    }
                })?
        };

        log::info!("Audio output: headless ({} frames per buffer)", buffer_frames);
        Ok(Self {
            running,
            worker: Some(worker),
            buffers,
        })
    }

    /// Buffers rendered so far.
    pub fn buffers_rendered(&self) -> u64 {
        self.buffers.load(Ordering::Relaxed)
    }
}

impl Drop for HeadlessOutput {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

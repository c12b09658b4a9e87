//! Voice pool and the mix pass run by the output callback.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::clip::RenderParams;
use crate::voice::{AudioSource, Voice};

/// Output rate assumed until a device reports its own.
pub const DEFAULT_OUTPUT_RATE: u32 = 48_000;

/// Identifies one acquisition of a pooled voice.
///
/// Once the voice finishes and is reused the handle goes stale and every
/// call made with it is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoiceHandle {
    index: usize,
    generation: u32,
}

#[derive(Debug)]
struct MixerState {
    voices: Vec<Voice>,
    output_rate: u32,
    master_volume: f32,
}

impl MixerState {
    fn voice_mut(&mut self, handle: VoiceHandle) -> Option<&mut Voice> {
        self.voices
            .get_mut(handle.index)
            .filter(|v| !v.is_free() && v.generation == handle.generation)
    }

    fn collect_finished(&mut self) {
        for voice in &mut self.voices {
            if voice.is_finished() {
                voice.release();
            }
        }
    }
}

/// The software mixer. Cheap to clone; all clones share one voice pool.
///
/// Every mutation and every render pass takes the same lock, so the output
/// thread never sees a half-started voice.
#[derive(Debug, Clone)]
pub struct Mixer {
    shared: Arc<Mutex<MixerState>>,
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_RATE)
    }
}

impl Mixer {
    pub fn new(output_rate: u32) -> Self {
        Self {
            shared: Arc::new(Mutex::new(MixerState {
                voices: Vec::new(),
                output_rate: output_rate.max(1),
                master_volume: 1.0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MixerState> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn output_rate(&self) -> u32 {
        self.lock().output_rate
    }

    /// Called by output backends once the device rate is known.
    pub fn set_output_rate(&self, rate: u32) {
        self.lock().output_rate = rate.max(1);
    }

    pub fn set_master_volume(&self, volume: f32) {
        self.lock().master_volume = volume.max(0.0);
    }

    /// Start playing `source`.
    ///
    /// Returns `None` without touching any voice when the source is already
    /// at its reference cap. Callers treat a missing handle as "not playing".
    pub fn play(
        &self,
        source: &Arc<AudioSource>,
        volume: f32,
        pan: f32,
        pitch: f32,
        looping: bool,
    ) -> Option<VoiceHandle> {
        let mut state = self.lock();
        state.collect_finished();

        if !source.try_acquire() {
            log::trace!(
                "Voice refused: source at cap ({} live)",
                source.live_refs()
            );
            return None;
        }

        let params = RenderParams {
            volume,
            pan: pan.clamp(-1.0, 1.0),
            pitch,
            looping,
        };

        let index = match state.voices.iter().position(Voice::is_free) {
            Some(index) => index,
            None => {
                state.voices.push(Voice::default());
                state.voices.len() - 1
            }
        };
        let voice = &mut state.voices[index];
        voice.start(Arc::clone(source), params);
        Some(VoiceHandle {
            index,
            generation: voice.generation,
        })
    }

    /// `play` with looping enabled.
    pub fn play_looped(
        &self,
        source: &Arc<AudioSource>,
        volume: f32,
        pan: f32,
        pitch: f32,
    ) -> Option<VoiceHandle> {
        self.play(source, volume, pan, pitch, true)
    }

    pub fn set_volume(&self, handle: VoiceHandle, volume: f32) {
        self.update_params(handle, |p| p.volume = volume);
    }

    pub fn set_pan(&self, handle: VoiceHandle, pan: f32) {
        self.update_params(handle, |p| p.pan = pan.clamp(-1.0, 1.0));
    }

    pub fn set_pitch(&self, handle: VoiceHandle, pitch: f32) {
        self.update_params(handle, |p| p.pitch = pitch);
    }

    fn update_params(&self, handle: VoiceHandle, f: impl FnOnce(&mut RenderParams)) {
        let mut state = self.lock();
        if let Some(params) = state.voice_mut(handle).and_then(|v| v.params.as_mut()) {
            f(params);
        }
    }

    /// Stop a voice and return it to the pool.
    pub fn stop(&self, handle: VoiceHandle) {
        let mut state = self.lock();
        if let Some(voice) = state.voice_mut(handle) {
            voice.release();
        }
    }

    /// True while the handle still refers to a voice that has not run out.
    pub fn is_playing(&self, handle: VoiceHandle) -> bool {
        self.lock()
            .voice_mut(handle)
            .is_some_and(|v| !v.is_finished())
    }

    /// Current volume, pan and pitch of a voice.
    pub fn params(&self, handle: VoiceHandle) -> Option<RenderParams> {
        self.lock().voice_mut(handle).and_then(|v| v.params)
    }

    /// Playhead of a live voice.
    pub fn playhead(&self, handle: VoiceHandle) -> Option<f32> {
        self.lock().voice_mut(handle).map(|v| v.playhead())
    }

    /// Return voices whose one-shot ran out to the pool. Runs on the game
    /// thread, never inside the output callback.
    pub fn collect_finished(&self) {
        self.lock().collect_finished();
    }

    /// Voices currently bound to a source (including finished, uncollected ones).
    pub fn active_voices(&self) -> usize {
        self.lock().voices.iter().filter(|v| !v.is_free()).count()
    }

    /// Total voice objects ever allocated by the pool.
    pub fn pool_size(&self) -> usize {
        self.lock().voices.len()
    }

    /// Output callback: overwrite `out` (interleaved stereo) with the mix of
    /// all active voices. Plain accumulation, so loud scenes may clip.
    pub fn render(&self, out: &mut [f32]) {
        out.fill(0.0);
        let Ok(mut state) = self.shared.lock() else {
            // A panic elsewhere poisoned the pool; stay silent rather than
            // unwinding across the device callback.
            return;
        };
        let rate = state.output_rate;
        let master = state.master_volume;
        for voice in state.voices.iter_mut() {
            voice.render(out, rate, master);
        }
    }
}

//! Reference-capped sources and the playback voices bound to them.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::clip::{AudioClip, RenderParams};

/// A clip plus a limit on how many voices may play it at the same time.
///
/// The live-reference counter is only changed while the mixer lock is held;
/// the atomic just makes the source shareable across threads.
#[derive(Debug)]
pub struct AudioSource {
    clip: AudioClip,
    max_refs: Option<u32>,
    refs: AtomicU32,
}

impl AudioSource {
    /// `max_refs = None` lets any number of voices share the clip.
    pub fn new(clip: AudioClip, max_refs: Option<u32>) -> Self {
        Self {
            clip,
            max_refs,
            refs: AtomicU32::new(0),
        }
    }

    pub fn clip(&self) -> &AudioClip {
        &self.clip
    }

    pub fn max_refs(&self) -> Option<u32> {
        self.max_refs
    }

    /// Number of voices currently bound to this source.
    pub fn live_refs(&self) -> u32 {
        self.refs.load(Ordering::Relaxed)
    }

    pub fn at_cap(&self) -> bool {
        self.max_refs.is_some_and(|max| self.live_refs() >= max)
    }

    /// Take a reference unless the cap is reached.
    pub(crate) fn try_acquire(&self) -> bool {
        if self.at_cap() {
            return false;
        }
        self.refs.fetch_add(1, Ordering::Relaxed);
        true
    }

    pub(crate) fn release(&self) {
        let _ = self
            .refs
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }
}

/// One playback slot in the mixer. Free exactly when it has no source.
#[derive(Debug, Default)]
pub struct Voice {
    source: Option<Arc<AudioSource>>,
    /// Fractional source frame to read next.
    pub(crate) playhead: f32,
    pub(crate) params: Option<RenderParams>,
    /// Set by the output callback when a one-shot runs out.
    pub(crate) finished: bool,
    /// Bumped on every acquisition so stale handles can be detected.
    pub(crate) generation: u32,
}

impl Voice {
    pub fn is_free(&self) -> bool {
        self.source.is_none()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn playhead(&self) -> f32 {
        self.playhead
    }

    pub fn params(&self) -> Option<RenderParams> {
        self.params
    }

    pub fn source(&self) -> Option<&Arc<AudioSource>> {
        self.source.as_ref()
    }

    /// Bind a source that has already been acquired.
    pub(crate) fn start(&mut self, source: Arc<AudioSource>, params: RenderParams) {
        self.source = Some(source);
        self.params = Some(params);
        self.playhead = 0.0;
        self.finished = false;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Drop the source and give back its reference.
    pub(crate) fn release(&mut self) {
        if let Some(source) = self.source.take() {
            source.release();
        }
        self.params = None;
        self.finished = false;
    }

    /// Add this voice's contribution to an interleaved stereo buffer.
    pub(crate) fn render(&mut self, out: &mut [f32], output_rate: u32, master_volume: f32) {
        if self.finished {
            return;
        }
        let (Some(source), Some(params)) = (self.source.as_ref(), self.params) else {
            return;
        };
        let params = RenderParams {
            volume: params.volume * master_volume,
            ..params
        };
        let rendered = source.clip().render(out, self.playhead, &params, output_rate);
        self.playhead = rendered.playhead;
        self.finished = rendered.finished;
    }
}

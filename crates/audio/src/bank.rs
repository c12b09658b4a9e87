use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::clip::AudioClip;
use crate::voice::AudioSource;

/// Path-keyed cache of decoded sources.
///
/// A clip is decoded on first request. If that fails the bank logs a warning
/// and caches a silent clip instead, so a missing sound never stops the game.
#[derive(Debug, Default)]
pub struct SoundBank {
    root: PathBuf,
    sources: HashMap<PathBuf, Arc<AudioSource>>,
}

impl SoundBank {
    /// Relative paths passed to [`SoundBank::source`] resolve against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            sources: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Fetch (loading if needed) the source for `path`.
    ///
    /// The reference cap is fixed by whichever call loads the clip first.
    pub fn source(&mut self, path: impl AsRef<Path>, max_refs: Option<u32>) -> Arc<AudioSource> {
        let path = path.as_ref();
        if let Some(source) = self.sources.get(path) {
            return Arc::clone(source);
        }

        let full = self.root.join(path);
        let clip = match AudioClip::from_file(&full) {
            Ok(clip) => {
                log::info!(
                    "Loaded sound {} ({} samples, {} ch, {} Hz)",
                    full.display(),
                    clip.num_samples(),
                    clip.num_channels(),
                    clip.sample_rate()
                );
                clip
            }
            Err(e) => {
                log::warn!("Failed to load sound {}: {}. Using silence.", full.display(), e);
                AudioClip::silent()
            }
        };

        let source = Arc::new(AudioSource::new(clip, max_refs));
        self.sources.insert(path.to_path_buf(), Arc::clone(&source));
        source
    }

    /// Insert an already-decoded clip under `path`, replacing any cached one.
    pub fn insert(
        &mut self,
        path: impl Into<PathBuf>,
        clip: AudioClip,
        max_refs: Option<u32>,
    ) -> Arc<AudioSource> {
        let source = Arc::new(AudioSource::new(clip, max_refs));
        self.sources.insert(path.into(), Arc::clone(&source));
        source
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

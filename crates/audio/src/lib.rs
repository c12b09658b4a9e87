//! Software audio mixer.
//!
//! Sounds are decoded once into an [`AudioClip`] and wrapped in an
//! [`AudioSource`] that caps how many voices may play it at once. The
//! [`Mixer`] owns a pool of [`Voice`]s behind a single lock shared with the
//! output callback, which accumulates every active voice into an interleaved
//! stereo `f32` buffer.

mod bank;
mod clip;
mod mixer;
mod output;
mod voice;

pub use bank::SoundBank;
pub use clip::{AudioClip, ClipError, RenderParams, Rendered};
pub use mixer::{Mixer, VoiceHandle, DEFAULT_OUTPUT_RATE};
pub use output::HeadlessOutput;
#[cfg(feature = "device")]
pub use output::DeviceOutput;
pub use voice::{AudioSource, Voice};

/// Interleaved output channel count (always stereo).
pub const OUTPUT_CHANNELS: usize = 2;

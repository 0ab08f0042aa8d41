//! LyricView - synchronized, scrollable lyrics
//!
//! Parses timestamped (optionally bilingual) lyrics and drives a lyric view:
//! the highlighted line follows a playback clock through a spring, while the
//! user can drag or fling through the lyrics and seek from a preview.
//! Rendering is left to the host; the engine hands out offsets and styling.

pub mod features;

pub use features::Settings;
pub use features::lyrics::engine::{
    FrameSnapshot, LineEmphasis, LoadOutcome, LoadToken, LyricViewConfig, LyricViewEngine,
    TapOutcome,
};
pub use features::lyrics::parser::{LyricError, LyricLine, parse_lyrics};

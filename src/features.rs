//! Feature modules - lyric logic separated from any UI toolkit
//!
//! Each feature module contains the core logic for a specific functionality.
//! Features should not depend on UI components directly.

pub mod lyrics;
pub mod settings;

pub use settings::{Settings, SettingsError};

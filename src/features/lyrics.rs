//! Lyrics module - parsing and view synchronization
//!
//! - `parser`: LRC parsing, bilingual merging, legacy-encoding file reading
//! - `engine`: timeline, scroll springs and touch interaction for a lyric view

pub mod engine;
pub mod parser;

// Re-export commonly used items
pub use parser::*;

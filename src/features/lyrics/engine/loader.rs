//! Background lyric parsing with last-load-wins semantics
//!
//! Every request is stamped with a fresh [`LoadToken`]. Parsing runs on tokio's
//! blocking pool when a runtime is available and inline otherwise; either way
//! the result travels back through a channel so the engine applies it on its
//! own thread. Results whose token is no longer the latest are stale.

use tokio::sync::mpsc;

use crate::features::lyrics::parser::{LyricLine, parse_lyrics};

/// Identifies one load request; later requests compare greater
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LoadToken(u64);

impl LoadToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// A finished parse, tagged with the request it answers
#[derive(Debug)]
pub struct ParsedLyrics {
    pub token: LoadToken,
    pub lines: Vec<LyricLine>,
}

/// What happened to a finished parse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Became the new timeline
    Applied { token: LoadToken, lines: usize },
    /// A newer load was requested meanwhile
    Discarded { token: LoadToken },
}

/// Issues load tokens and collects parse results
#[derive(Debug)]
pub struct LyricLoader {
    latest: LoadToken,
    in_flight: usize,
    tx: mpsc::UnboundedSender<ParsedLyrics>,
    rx: mpsc::UnboundedReceiver<ParsedLyrics>,
}

impl LyricLoader {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            latest: LoadToken::default(),
            in_flight: 0,
            tx,
            rx,
        }
    }

    /// Start parsing; the returned token becomes the only one that will be applied
    pub fn request(&mut self, primary: String, secondary: Option<String>) -> LoadToken {
        self.spawn_parse(move || parse_lyrics(&primary, secondary.as_deref()))
    }

    /// Run `parse` off the engine thread and deliver its lines under a fresh token
    ///
    /// A parse that panics still answers, with no lines, so `in_flight` always
    /// drains and [`Self::next`] never waits on a result that will not come.
    fn spawn_parse<F>(&mut self, parse: F) -> LoadToken
    where
        F: FnOnce() -> Vec<LyricLine> + Send + 'static,
    {
        let token = self.supersede();
        let tx = self.tx.clone();
        let job = move || {
            let start = std::time::Instant::now();
            let lines = match std::panic::catch_unwind(std::panic::AssertUnwindSafe(parse)) {
                Ok(lines) => lines,
                Err(_) => {
                    tracing::warn!("Lyric parse for load {} panicked, loading nothing", token.0);
                    Vec::new()
                }
            };
            tracing::debug!(
                "Parsed {} lyric lines for load {} in {:?}",
                lines.len(),
                token.0,
                start.elapsed()
            );
            // Receiver lives as long as the loader; a closed channel means nobody cares
            let _ = tx.send(ParsedLyrics { token, lines });
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(job);
            }
            Err(_) => job(),
        }
        self.in_flight += 1;
        token
    }

    /// Mint a new latest token without parsing, making everything in flight stale
    pub fn supersede(&mut self) -> LoadToken {
        self.latest = LoadToken(self.latest.0 + 1);
        self.latest
    }

    pub fn latest(&self) -> LoadToken {
        self.latest
    }

    pub fn is_current(&self, token: LoadToken) -> bool {
        token == self.latest
    }

    /// Number of parses not yet collected
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Take a finished parse if one is waiting
    pub fn try_next(&mut self) -> Option<ParsedLyrics> {
        let parsed = self.rx.try_recv().ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(parsed)
    }

    /// Wait for the next finished parse; `None` when nothing is in flight
    pub async fn next(&mut self) -> Option<ParsedLyrics> {
        if self.in_flight == 0 {
            return None;
        }
        let parsed = self.rx.recv().await?;
        self.in_flight -= 1;
        Some(parsed)
    }
}

impl Default for LyricLoader {
    fn default() -> Self {
        Self::new()
    }
}

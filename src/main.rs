//! lyricview - follow an LRC file in the terminal
//!
//! Usage: `lyricview <lyrics.lrc> [translation.lrc]`
//!
//! Plays the lyrics against a simulated clock and prints each line as it
//! becomes active.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, bail};
use lyricview::features::lyrics::{format_time, read_lyric_file};
use lyricview::{LoadOutcome, LyricViewEngine, Settings};

/// Simulated view size
const VIEW_WIDTH: f32 = 480.0;
const VIEW_HEIGHT: f32 = 800.0;
/// Keep playing this long after the last line starts
const TAIL_MS: u64 = 3000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let mut args = std::env::args_os().skip(1);
    let primary_path = args
        .next()
        .map(PathBuf::from)
        .context("usage: lyricview <lyrics.lrc> [translation.lrc]")?;
    let secondary_path = args.next().map(PathBuf::from);

    let primary = read_lyric_file(&primary_path)
        .with_context(|| format!("reading {}", primary_path.display()))?;
    let secondary = match &secondary_path {
        Some(path) => {
            Some(read_lyric_file(path).with_context(|| format!("reading {}", path.display()))?)
        }
        None => None,
    };

    let settings = Settings::load();
    let mut engine = LyricViewEngine::new(settings.to_view_config());
    engine.set_viewport_size(VIEW_WIDTH, VIEW_HEIGHT);
    engine.load_lyric(&primary, secondary.as_deref());

    match engine.next_load().await {
        Some(LoadOutcome::Applied { lines, .. }) if lines > 0 => {
            tracing::info!("Playing {} lines from {}", lines, primary_path.display());
        }
        _ => bail!("no timed lyric lines in {}", primary_path.display()),
    }

    let end_ms = engine.lines().last().map_or(0, |line| line.time_ms).saturating_add(TAIL_MS);
    run(&mut engine, end_ms).await;
    Ok(())
}

/// Drive the engine at 60 fps until `end_ms` or Ctrl-C
async fn run(engine: &mut LyricViewEngine, end_ms: u64) {
    let mut interval = tokio::time::interval(Duration::from_millis(16));
    let start = Instant::now();
    let mut last_frame = start;
    let mut shown = None;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = &mut ctrl_c => {
                tracing::info!("Interrupted");
                return;
            }
        }

        let now = Instant::now();
        let elapsed_ms = now.duration_since(start).as_millis() as u64;
        engine.update_time(elapsed_ms, false);
        engine.tick(now.duration_since(last_frame).as_secs_f32());
        last_frame = now;

        let active = engine.active_line_index();
        if shown != Some(active) {
            shown = Some(active);
            if let Some(line) = engine.active_line() {
                println!("[{}] {}", format_time(line.time_ms), line.text);
                if let Some(second) = &line.second_text {
                    println!("        {}", second);
                }
            }
            let frame = engine.frame();
            tracing::debug!(
                "line {} current_offset {:.1} viewport_offset {:.1}",
                active,
                frame.current_offset,
                frame.viewport_offset
            );
        }

        if elapsed_ms >= end_ms {
            return;
        }
    }
}

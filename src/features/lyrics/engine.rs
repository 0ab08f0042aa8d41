//! Lyric View Engine
//!
//! Keeps a scrolling lyric view in step with an external playback clock while
//! letting the user drag through the lyrics and seek from them.
//!
//! ## Architecture
//!
//! Two scroll offsets are tracked and never written by the same party:
//! - `current_offset`: where playback is, driven by the progress spring
//! - `viewport_offset`: what is drawn, driven by the viewport spring or a gesture
//!
//! ## Key Components
//!
//! - `LyricViewEngine`: facade the host drives (load, time, gestures, frames)
//! - `Timeline`: sorted lines, active-line search, memoized offsets
//! - `OffsetController`: both offsets and their springs
//! - `InteractionMachine`: drag / fling / preview / seek
//! - `LyricLoader`: background parsing with last-load-wins tokens
//! - `ReadyGate`: holds time updates until the view has a size
//! - `Spring`: analytic damped spring

pub mod interaction;
pub mod layout;
pub mod loader;
pub mod offset;
pub mod physics;
pub mod ready;
pub mod spring;
pub mod timeline;

pub use interaction::{
    InteractionConfig, InteractionMachine, InteractionState, PreviewState, SeekCallback,
    TapCallback, TapOutcome,
};
pub use layout::{EstimatedMeasure, HitRect, LayoutMetrics, LineMeasure};
pub use loader::{LoadOutcome, LoadToken, LyricLoader};
pub use offset::{OffsetController, ViewportDrive};
pub use spring::{Spring, SpringParams};
pub use timeline::Timeline;

use std::ops::Range;

use crate::features::lyrics::parser::{LyricLine, format_time};
use loader::ParsedLyrics;
use ready::{PendingCall, ReadyGate};

/// Configuration for the lyric view engine
///
/// Distances are in logical pixels, durations in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct LyricViewConfig {
    // === Text ===
    /// Size of lines that are not highlighted
    pub normal_text_size: f32,
    /// Size of the highlighted line
    pub current_text_size: f32,
    /// Translation size relative to the primary text
    pub translate_text_scale: f32,
    /// Whether translations are shown (and take up space)
    pub draw_translation: bool,
    /// Shown in place of lyrics when there are none
    pub label: String,

    // === Layout ===
    /// Gap between lyric lines
    pub sentence_divider: f32,
    /// Gap between a line and its translation
    pub translate_divider: f32,
    /// Vertical shift of the center line
    pub horizontal_offset: f32,
    /// Horizontal padding on each side of the text
    pub padding: f32,

    // === Springs ===
    /// Highlight progress spring
    pub progress_spring: SpringParams,
    /// Viewport follow spring
    pub viewport_spring: SpringParams,

    // === Interaction ===
    /// Preview stays up this long after the last gesture
    pub preview_keep_time: f32,
    /// Drag distance that reveals the preview
    pub preview_threshold: f32,
    /// Per-frame velocity retention while flinging
    pub fling_friction: f32,
    /// Fling stops below this speed (px/s)
    pub fling_stop_velocity: f32,

    // === Seek button ===
    /// Width of the time column the seek button sits in
    pub time_text_width: f32,
    /// Edge length of the square seek button
    pub drawable_width: f32,
}

impl Default for LyricViewConfig {
    fn default() -> Self {
        Self {
            // Text
            normal_text_size: 16.0,
            current_text_size: 18.0,
            translate_text_scale: 1.0,
            draw_translation: true,
            label: "No lyrics".to_string(),

            // Layout
            sentence_divider: 20.0,
            translate_divider: 4.0,
            horizontal_offset: 0.0,
            padding: 0.0,

            // Springs
            progress_spring: SpringParams::PROGRESS,
            viewport_spring: SpringParams::VIEWPORT,

            // Interaction
            preview_keep_time: 3.0,
            preview_threshold: 8.0,
            fling_friction: 0.95,
            fling_stop_velocity: 50.0,

            // Seek button
            time_text_width: 50.0,
            drawable_width: 30.0,
        }
    }
}

impl LyricViewConfig {
    fn interaction(&self) -> InteractionConfig {
        InteractionConfig {
            preview_keep_time: self.preview_keep_time,
            preview_threshold: self.preview_threshold,
            fling_friction: self.fling_friction,
            fling_stop_velocity: self.fling_stop_velocity,
        }
    }
}

/// Everything the renderer needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    pub viewport_offset: f32,
    pub current_offset: f32,
    pub animate_progress: f32,
    pub active_line: usize,
    pub last_line: Option<usize>,
    pub preview_visible: bool,
    /// Line under the center marker while previewing
    pub preview_line: Option<usize>,
    /// `mm:ss` of `preview_line`
    pub preview_time_label: Option<String>,
    /// Lines close enough to the viewport to be worth drawing
    pub visible_range: Range<usize>,
    /// Text to show instead of lyrics when the timeline is empty
    pub placeholder: Option<String>,
}

/// Per-line styling derived from the highlight cross-fade
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineEmphasis {
    /// Text scale relative to the normal size
    pub scale: f32,
    /// 0 = normal color, 1 = highlight color
    pub highlight: f32,
    /// Line sits under the preview marker
    pub timeline_selected: bool,
}

impl Default for LineEmphasis {
    fn default() -> Self {
        Self {
            scale: 1.0,
            highlight: 0.0,
            timeline_selected: false,
        }
    }
}

/// Main lyric engine - timeline, offsets, gestures and loading
pub struct LyricViewEngine {
    config: LyricViewConfig,
    timeline: Timeline,
    offsets: OffsetController,
    interaction: InteractionMachine,
    loader: LyricLoader,
    ready: ReadyGate<PendingCall>,
    measure: Box<dyn LineMeasure>,
    viewport_width: f32,
    viewport_height: f32,
}

impl LyricViewEngine {
    /// Create an engine that estimates line heights without fonts
    pub fn new(config: LyricViewConfig) -> Self {
        Self::with_measure(config, EstimatedMeasure::default())
    }

    /// Create an engine that measures lines with the host's text layout
    pub fn with_measure(config: LyricViewConfig, measure: impl LineMeasure + 'static) -> Self {
        Self {
            timeline: Timeline::new(),
            offsets: OffsetController::new(config.progress_spring, config.viewport_spring),
            interaction: InteractionMachine::new(config.interaction()),
            loader: LyricLoader::new(),
            ready: ReadyGate::new(),
            measure: Box::new(measure),
            viewport_width: 0.0,
            viewport_height: 0.0,
            config,
        }
    }

    pub fn config(&self) -> &LyricViewConfig {
        &self.config
    }

    /// Replace the whole configuration
    pub fn set_config(&mut self, config: LyricViewConfig) {
        self.offsets.set_progress_params(config.progress_spring);
        self.offsets.set_viewport_params(config.viewport_spring);
        self.interaction.set_config(config.interaction());
        self.config = config;
        self.layout_changed();
    }

    /// Swap the text measurement and re-measure every line
    pub fn set_measure(&mut self, measure: impl LineMeasure + 'static) {
        self.measure = Box::new(measure);
        self.layout_changed();
    }

    // === Loading ===

    /// Parse lyrics in the background; the result is applied by [`Self::tick`]
    /// (or [`Self::poll_loads`] / [`Self::next_load`]) unless a newer load came first
    pub fn load_lyric(&mut self, primary: &str, secondary: Option<&str>) -> LoadToken {
        self.reset();
        let token = self
            .loader
            .request(primary.to_owned(), secondary.map(str::to_owned));
        tracing::debug!("Requested lyric load {}", token.value());
        token
    }

    /// Use already parsed lines; anything still parsing becomes stale
    pub fn load_lines(&mut self, lines: Vec<LyricLine>) -> LoadToken {
        self.reset();
        let token = self.loader.supersede();
        self.apply_lines(lines);
        token
    }

    /// Apply every finished parse that is waiting
    pub fn poll_loads(&mut self) -> Vec<LoadOutcome> {
        let mut outcomes = Vec::new();
        while let Some(parsed) = self.loader.try_next() {
            outcomes.push(self.apply_parsed(parsed));
        }
        outcomes
    }

    /// Wait for the next finished parse and apply it; `None` when nothing is loading
    pub async fn next_load(&mut self) -> Option<LoadOutcome> {
        let parsed = self.loader.next().await?;
        Some(self.apply_parsed(parsed))
    }

    fn apply_parsed(&mut self, parsed: ParsedLyrics) -> LoadOutcome {
        if !self.loader.is_current(parsed.token) {
            tracing::debug!(
                "Discarding stale lyric load {} (latest is {})",
                parsed.token.value(),
                self.loader.latest().value()
            );
            return LoadOutcome::Discarded {
                token: parsed.token,
            };
        }
        let lines = parsed.lines.len();
        self.apply_lines(parsed.lines);
        LoadOutcome::Applied {
            token: parsed.token,
            lines,
        }
    }

    fn apply_lines(&mut self, lines: Vec<LyricLine>) {
        self.timeline.load(lines);
        tracing::info!("Loaded {} lyric lines", self.timeline.len());
        if self.ready.is_ready() && !self.timeline.is_empty() {
            self.relayout();
            self.offsets.jump_to(self.timeline.metrics().start_offset);
        }
    }

    /// Drop lyrics, gestures and animations
    pub fn reset(&mut self) {
        self.interaction.reset();
        self.offsets.reset();
        self.timeline.clear();
    }

    // === Playback ===

    /// Feed the playback position
    ///
    /// Nothing restarts while the active line stays the same. With `force`, the
    /// scroll is re-aimed at the line's offset if it moved.
    /// Calls made before the first [`Self::set_viewport_size`] run once it arrives.
    pub fn update_time(&mut self, time_ms: u64, force: bool) {
        if let Some(call) = self.ready.submit(PendingCall::UpdateTime { time_ms, force }) {
            self.run(call);
        }
    }

    fn run(&mut self, call: PendingCall) {
        match call {
            PendingCall::UpdateTime { time_ms, force } => self.apply_time(time_ms, force),
        }
    }

    fn apply_time(&mut self, time_ms: u64, force: bool) {
        if self.timeline.is_empty() {
            return;
        }
        let line = self.timeline.find_active_line(time_ms);
        let target = self.timeline.offset_of(line);
        let changed = self.offsets.set_active_line(line);
        // forcing the same line only re-aims; the highlight keeps its progress
        if changed || (force && target != self.offsets.animate_target()) {
            tracing::trace!("Active lyric line {} at {}ms", line, time_ms);
            self.offsets.smooth_scroll_to(target);
        }
    }

    // === Viewport ===

    /// Report the view size; the first call releases deferred time updates
    pub fn set_viewport_size(&mut self, width: f32, height: f32) {
        let changed = width != self.viewport_width || height != self.viewport_height;
        self.viewport_width = width;
        self.viewport_height = height;

        if changed || !self.ready.is_ready() {
            tracing::debug!("Lyric viewport resized to {}x{}", width, height);
            // measuring needs the size, so open the gate before laying out
            let pending = self.ready.open();
            self.relayout();
            if !self.timeline.is_empty() {
                self.offsets.jump_to(self.timeline.metrics().start_offset);
                let target = self.timeline.offset_of(self.offsets.active_line());
                self.offsets.smooth_scroll_to(target);
            }
            for call in pending {
                self.run(call);
            }
        }
    }

    pub fn viewport_size(&self) -> (f32, f32) {
        (self.viewport_width, self.viewport_height)
    }

    fn layout_metrics(&self) -> LayoutMetrics {
        let text_size = self.config.current_text_size.max(self.config.normal_text_size);
        LayoutMetrics {
            start_offset: self.viewport_height / 2.0 + self.config.horizontal_offset,
            sentence_divider: self.config.sentence_divider,
            translate_divider: self.config.translate_divider,
            text_size,
            second_text_size: text_size * self.config.translate_text_scale,
            content_width: (self.viewport_width - self.config.padding * 2.0).max(0.0),
            draw_translation: self.config.draw_translation,
        }
    }

    fn relayout(&mut self) {
        if !self.ready.is_ready() {
            return;
        }
        let metrics = self.layout_metrics();
        self.timeline.relayout(&*self.measure, metrics);
    }

    /// Sizing input changed: re-measure and glide to the active line's new offset
    fn layout_changed(&mut self) {
        self.relayout();
        if self.ready.is_ready() && !self.timeline.is_empty() {
            let target = self.timeline.offset_of(self.offsets.active_line());
            self.offsets.smooth_scroll_to(target);
        }
    }

    // === Runtime tuning ===

    pub fn set_sentence_divider_height(&mut self, height: f32) {
        self.config.sentence_divider = height;
        self.layout_changed();
    }

    pub fn set_translate_divider_height(&mut self, height: f32) {
        self.config.translate_divider = height;
        self.layout_changed();
    }

    pub fn set_horizontal_offset(&mut self, offset: f32) {
        self.config.horizontal_offset = offset;
        self.layout_changed();
    }

    pub fn set_padding(&mut self, padding: f32) {
        self.config.padding = padding;
        self.layout_changed();
    }

    pub fn set_translate_text_scale(&mut self, scale: f32) {
        self.config.translate_text_scale = scale;
        self.layout_changed();
    }

    pub fn set_normal_text_size(&mut self, size: f32) {
        self.config.normal_text_size = size;
        self.layout_changed();
    }

    pub fn set_current_text_size(&mut self, size: f32) {
        self.config.current_text_size = size;
        self.layout_changed();
    }

    pub fn set_draw_translation(&mut self, draw: bool) {
        self.config.draw_translation = draw;
        self.layout_changed();
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.config.label = label.into();
    }

    pub fn set_damping_ratio_for_lyric(&mut self, damping_ratio: f64) {
        self.config.progress_spring.damping_ratio = damping_ratio;
        self.offsets.set_progress_params(self.config.progress_spring);
    }

    pub fn set_stiffness_for_lyric(&mut self, stiffness: f64) {
        self.config.progress_spring.stiffness = stiffness;
        self.offsets.set_progress_params(self.config.progress_spring);
    }

    pub fn set_damping_ratio_for_viewport(&mut self, damping_ratio: f64) {
        self.config.viewport_spring.damping_ratio = damping_ratio;
        self.offsets.set_viewport_params(self.config.viewport_spring);
    }

    pub fn set_stiffness_for_viewport(&mut self, stiffness: f64) {
        self.config.viewport_spring.stiffness = stiffness;
        self.offsets.set_viewport_params(self.config.viewport_spring);
    }

    // === Gestures ===

    /// # Panics
    ///
    /// Panics when enabling dragging without a seek callback.
    pub fn set_draggable(&mut self, draggable: bool, on_seek: Option<SeekCallback>) {
        self.interaction.set_draggable(draggable, on_seek);
    }

    pub fn set_on_tap(&mut self, on_tap: Option<TapCallback>) {
        self.interaction.set_on_tap(on_tap);
    }

    pub fn on_pointer_down(&mut self) -> bool {
        self.interaction.pointer_down(&self.timeline)
    }

    pub fn on_scroll(&mut self, dy: f32) -> bool {
        self.interaction
            .scroll(dy, &mut self.timeline, &mut self.offsets)
    }

    pub fn on_fling(&mut self, velocity: f32) -> bool {
        self.interaction
            .fling(velocity, &mut self.timeline, &self.offsets)
    }

    pub fn on_pointer_up(&mut self) {
        self.interaction.pointer_up();
    }

    pub fn on_tap_confirmed(&mut self, x: f32, y: f32) -> TapOutcome {
        let target = self.seek_target();
        self.interaction
            .tap_confirmed(x, y, &target, &mut self.timeline, &mut self.offsets)
    }

    /// Hit area of the seek (play) button on the center line
    pub fn seek_target(&self) -> HitRect {
        HitRect::seek_button(
            self.config.time_text_width,
            self.config.drawable_width,
            self.layout_metrics().start_offset,
        )
    }

    pub fn interaction_state(&self) -> InteractionState {
        self.interaction.state()
    }

    pub fn is_preview_visible(&self) -> bool {
        self.interaction.is_preview_visible()
    }

    // === Frame ===

    /// Advance loads, gestures and springs by `dt` seconds
    ///
    /// This must be called every frame.
    pub fn tick(&mut self, dt: f32) {
        self.poll_loads();
        self.interaction
            .step(dt, &mut self.timeline, &mut self.offsets);
        self.offsets.step(dt, self.interaction.viewport_drive());
    }

    /// State for drawing the current frame
    pub fn frame(&mut self) -> FrameSnapshot {
        let viewport_offset = self.offsets.viewport_offset();
        let preview_line = self
            .interaction
            .preview_line(&mut self.timeline, &self.offsets);
        let preview_time_label = preview_line
            .and_then(|i| self.timeline.get(i))
            .map(|line| format_time(line.time_ms));
        let placeholder = self
            .timeline
            .is_empty()
            .then(|| self.config.label.clone());

        FrameSnapshot {
            viewport_offset,
            current_offset: self.offsets.current_offset(),
            animate_progress: self.offsets.animate_progress(),
            active_line: self.offsets.active_line(),
            last_line: self.offsets.last_line(),
            preview_visible: self.interaction.is_preview_visible(),
            preview_line,
            preview_time_label,
            visible_range: self
                .timeline
                .visible_range(viewport_offset, self.viewport_height),
            placeholder,
        }
    }

    /// Scale and highlight for line `index`
    pub fn line_emphasis(&mut self, index: usize) -> LineEmphasis {
        if index >= self.timeline.len() {
            return LineEmphasis::default();
        }
        let progress = self.offsets.animate_progress();
        let (current, normal) = (self.config.current_text_size, self.config.normal_text_size);

        if index == self.offsets.active_line() {
            LineEmphasis {
                scale: calc_scale_value(current, normal, progress, false),
                highlight: progress.clamp(0.0, 1.0),
                timeline_selected: false,
            }
        } else if self.offsets.last_line() == Some(index) && progress != 1.0 {
            LineEmphasis {
                scale: calc_scale_value(current, normal, progress, true),
                highlight: 1.0 - progress.clamp(0.0, 1.0),
                timeline_selected: false,
            }
        } else {
            let selected = self
                .interaction
                .preview_line(&mut self.timeline, &self.offsets)
                == Some(index);
            LineEmphasis {
                timeline_selected: selected,
                ..LineEmphasis::default()
            }
        }
    }

    // === Queries ===

    /// The highlighted line, if there are lyrics
    pub fn active_line(&self) -> Option<&LyricLine> {
        self.timeline.get(self.offsets.active_line())
    }

    pub fn active_line_index(&self) -> usize {
        self.offsets.active_line()
    }

    pub fn lines(&self) -> &[LyricLine] {
        self.timeline.lines()
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn offsets(&self) -> &OffsetController {
        &self.offsets
    }
}

/// Scale that grows from 1 to `current / normal` as `fraction` goes 0 -> 1
///
/// `reverse` shrinks instead. A zero `normal` size yields 1.
pub fn calc_scale_value(current: f32, normal: f32, fraction: f32, reverse: bool) -> f32 {
    if normal == 0.0 {
        return 1.0;
    }
    let fraction = if reverse { 1.0 - fraction } else { fraction };
    1.0 + ((current - normal) / normal) * fraction
}

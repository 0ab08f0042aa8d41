//! Touch interaction: drag, fling, and preview-then-seek
//!
//! ```text
//! Idle --pointer_down--> Touching --fling--> Flinging --settled--> Idle
//!                           |                                   ^
//!                           +------------ pointer_up -----------+
//! ```
//!
//! The seek preview (center line marker + play button) is tracked beside the
//! state as [`PreviewState`]. It appears once a drag moves further than the
//! preview threshold or a fling starts, and disappears after a keep-alive period of inactivity
//! or right after a seek the host accepted.

use super::layout::HitRect;
use super::offset::{OffsetController, ViewportDrive};
use super::physics::FlingScroller;
use super::timeline::Timeline;

/// Seek request: receives the chosen line's start time, returns whether it was handled
pub type SeekCallback = Box<dyn FnMut(u64) -> bool>;

/// Plain tap on the lyric view
pub type TapCallback = Box<dyn FnMut()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Touching,
    Flinging,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PreviewState {
    #[default]
    Hidden,
    /// `keep_alive` counts down (seconds) while idle; `None` while a gesture is running
    Visible { keep_alive: Option<f32> },
}

impl PreviewState {
    pub fn is_visible(&self) -> bool {
        matches!(self, PreviewState::Visible { .. })
    }
}

/// What a confirmed tap turned into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// Nothing to do (no lyrics)
    Ignored,
    /// Forwarded to the tap callback
    Tapped,
    /// Seek accepted by the host
    Seeked { line: usize, time_ms: u64 },
    /// Seek offered but the host declined it
    Declined { line: usize, time_ms: u64 },
}

/// Tunables for the state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionConfig {
    /// How long the preview stays up after the last gesture (seconds)
    pub preview_keep_time: f32,
    /// Accumulated drag distance that reveals the preview (pixels)
    pub preview_threshold: f32,
    /// Per-frame velocity retention during a fling
    pub fling_friction: f32,
    /// Fling stops below this speed (pixels per second)
    pub fling_stop_velocity: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            preview_keep_time: 3.0,
            preview_threshold: 8.0,
            fling_friction: 0.95,
            fling_stop_velocity: 50.0,
        }
    }
}

/// Gesture state machine driving the viewport
pub struct InteractionMachine {
    state: InteractionState,
    preview: PreviewState,
    drag_distance: f32,
    fling: FlingScroller,
    config: InteractionConfig,
    on_seek: Option<SeekCallback>,
    on_tap: Option<TapCallback>,
}

impl std::fmt::Debug for InteractionMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionMachine")
            .field("state", &self.state)
            .field("preview", &self.preview)
            .field("drag_distance", &self.drag_distance)
            .field("draggable", &self.on_seek.is_some())
            .finish()
    }
}

impl InteractionMachine {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            state: InteractionState::Idle,
            preview: PreviewState::Hidden,
            drag_distance: 0.0,
            fling: FlingScroller::new(config.fling_friction, config.fling_stop_velocity),
            config,
            on_seek: None,
            on_tap: None,
        }
    }

    pub fn set_config(&mut self, config: InteractionConfig) {
        self.fling.set_friction(config.fling_friction);
        self.fling.set_stop_velocity(config.fling_stop_velocity);
        self.config = config;
    }

    /// Enable or disable dragging
    ///
    /// # Panics
    ///
    /// Panics when `draggable` is true but no seek callback is given: a
    /// draggable view without a way to seek is a caller bug.
    pub fn set_draggable(&mut self, draggable: bool, on_seek: Option<SeekCallback>) {
        self.on_seek = match (draggable, on_seek) {
            (true, Some(on_seek)) => Some(on_seek),
            (true, None) => panic!("if draggable is true, a seek callback must be provided"),
            (false, _) => None,
        };
    }

    pub fn is_draggable(&self) -> bool {
        self.on_seek.is_some()
    }

    pub fn set_on_tap(&mut self, on_tap: Option<TapCallback>) {
        self.on_tap = on_tap;
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn preview(&self) -> PreviewState {
        self.preview
    }

    pub fn is_preview_visible(&self) -> bool {
        self.preview.is_visible()
    }

    /// How the offset controller may move the viewport right now
    pub fn viewport_drive(&self) -> ViewportDrive {
        match (self.state, self.preview) {
            (InteractionState::Touching | InteractionState::Flinging, _) => ViewportDrive::Direct,
            (InteractionState::Idle, PreviewState::Visible { .. }) => ViewportDrive::Free,
            (InteractionState::Idle, PreviewState::Hidden) => ViewportDrive::Follow,
        }
    }

    /// Drop any gesture, fling and preview
    pub fn reset(&mut self) {
        self.fling.force_finished();
        self.state = InteractionState::Idle;
        self.preview = PreviewState::Hidden;
        self.drag_distance = 0.0;
    }

    /// Finger down; only accepted when there is something to drag and somewhere to seek
    pub fn pointer_down(&mut self, timeline: &Timeline) -> bool {
        if timeline.is_empty() || self.on_seek.is_none() {
            return false;
        }
        self.fling.force_finished();
        if let PreviewState::Visible { keep_alive } = &mut self.preview {
            *keep_alive = None;
        }
        self.state = InteractionState::Touching;
        self.drag_distance = 0.0;
        true
    }

    /// Finger moved by `dy` pixels (positive when moving up)
    pub fn scroll(&mut self, dy: f32, timeline: &mut Timeline, offsets: &mut OffsetController) -> bool {
        if timeline.is_empty() || self.state != InteractionState::Touching {
            return false;
        }

        self.drag_distance += dy.abs();
        if !self.preview.is_visible() && self.drag_distance > self.config.preview_threshold {
            tracing::trace!("Lyric preview shown after {:.1}px drag", self.drag_distance);
            self.preview = PreviewState::Visible { keep_alive: None };
        }

        let (min, max) = timeline.bounds();
        offsets.set_viewport_direct((offsets.viewport_offset() - dy).clamp(min, max));
        true
    }

    /// Finger left with `velocity` (pixels per second, positive moves content down)
    pub fn fling(&mut self, velocity: f32, timeline: &mut Timeline, offsets: &OffsetController) -> bool {
        if timeline.is_empty() || self.state != InteractionState::Touching {
            return false;
        }
        let (min, max) = timeline.bounds();
        self.fling.fling(offsets.viewport_offset(), velocity, min, max);
        if self.fling.is_finished() {
            return false;
        }
        // a fling always ends in preview
        if !self.preview.is_visible() {
            tracing::trace!("Lyric preview shown by fling");
            self.preview = PreviewState::Visible { keep_alive: None };
        }
        self.state = InteractionState::Flinging;
        true
    }

    /// Finger released
    pub fn pointer_up(&mut self) {
        if self.state != InteractionState::Touching {
            return;
        }
        self.state = InteractionState::Idle;
        self.restart_keep_alive();
    }

    /// A single tap the host's recognizer confirmed (not part of a double tap)
    pub fn tap_confirmed(
        &mut self,
        x: f32,
        y: f32,
        seek_target: &HitRect,
        timeline: &mut Timeline,
        offsets: &mut OffsetController,
    ) -> TapOutcome {
        if timeline.is_empty() {
            return TapOutcome::Ignored;
        }
        if !self.preview.is_visible() || !seek_target.contains(x, y) || self.on_seek.is_none() {
            if let Some(on_tap) = self.on_tap.as_mut() {
                on_tap();
            }
            return TapOutcome::Tapped;
        }

        let line = timeline.nearest_line_to_offset(offsets.viewport_offset());
        let time_ms = timeline.get(line).map_or(0, |l| l.time_ms);
        let consumed = self.on_seek.as_mut().is_some_and(|on_seek| on_seek(time_ms));
        if !consumed {
            tracing::debug!("Seek to line {} ({}ms) declined", line, time_ms);
            return TapOutcome::Declined { line, time_ms };
        }

        tracing::debug!("Seek to line {} ({}ms)", line, time_ms);
        self.fling.force_finished();
        self.state = InteractionState::Idle;
        self.preview = PreviewState::Hidden;
        offsets.animate_viewport_to(timeline.offset_of(line));
        TapOutcome::Seeked { line, time_ms }
    }

    /// Advance fling and keep-alive timers by `dt` seconds
    pub fn step(&mut self, dt: f32, timeline: &mut Timeline, offsets: &mut OffsetController) {
        if self.state == InteractionState::Flinging {
            if let Some(position) = self.fling.update(dt) {
                offsets.set_viewport_direct(position);
            }
            if self.fling.is_finished() {
                self.state = InteractionState::Idle;
                self.adjust_center(timeline, offsets);
                self.restart_keep_alive();
            }
            return;
        }

        if self.state != InteractionState::Idle {
            return;
        }
        if let PreviewState::Visible {
            keep_alive: Some(remaining),
        } = &mut self.preview
        {
            *remaining -= dt;
            if *remaining <= 0.0 {
                self.hide_preview(timeline, offsets);
            }
        }
    }

    /// Line under the preview marker, while the preview is visible
    pub fn preview_line(&self, timeline: &mut Timeline, offsets: &OffsetController) -> Option<usize> {
        if !self.preview.is_visible() || timeline.is_empty() {
            return None;
        }
        Some(timeline.nearest_line_to_offset(offsets.viewport_offset()))
    }

    /// Settle the viewport exactly on the nearest line
    fn adjust_center(&self, timeline: &mut Timeline, offsets: &mut OffsetController) {
        if timeline.is_empty() {
            return;
        }
        let line = timeline.nearest_line_to_offset(offsets.viewport_offset());
        offsets.animate_viewport_to(timeline.offset_of(line));
    }

    fn restart_keep_alive(&mut self) {
        if let PreviewState::Visible { keep_alive } = &mut self.preview {
            *keep_alive = Some(self.config.preview_keep_time);
        }
    }

    /// Leave preview and glide back to the playing line
    fn hide_preview(&mut self, timeline: &mut Timeline, offsets: &mut OffsetController) {
        self.preview = PreviewState::Hidden;
        if timeline.is_empty() {
            return;
        }
        tracing::trace!("Lyric preview timed out");
        offsets.animate_viewport_to(offsets.current_offset());
        offsets.smooth_scroll_to(timeline.offset_of(offsets.active_line()));
    }
}

impl Default for InteractionMachine {
    fn default() -> Self {
        Self::new(InteractionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::features::lyrics::engine::layout::LayoutMetrics;
    use crate::features::lyrics::parser::LyricLine;

    const FRAME: f32 = 1.0 / 60.0;

    /// Five lines 60px apart starting at 400
    fn setup() -> (Timeline, OffsetController) {
        let mut timeline = Timeline::new();
        timeline.load((0..5).map(|i| LyricLine::new(i * 1000, format!("line {i}"))).collect());
        let metrics = LayoutMetrics {
            start_offset: 400.0,
            sentence_divider: 20.0,
            text_size: 20.0,
            content_width: 600.0,
            ..Default::default()
        };
        timeline.relayout(&|_: &str, size: f32, _: f32| size * 2.0, metrics);
        let mut offsets = OffsetController::default();
        offsets.jump_to(400.0);
        (timeline, offsets)
    }

    fn draggable(seeks: &Rc<RefCell<Vec<u64>>>, accept: bool) -> InteractionMachine {
        let mut machine = InteractionMachine::default();
        let seeks = Rc::clone(seeks);
        machine.set_draggable(
            true,
            Some(Box::new(move |time| {
                seeks.borrow_mut().push(time);
                accept
            })),
        );
        machine
    }

    const BUTTON: HitRect = HitRect {
        left: 10.0,
        top: 385.0,
        right: 40.0,
        bottom: 415.0,
    };

    #[test]
    fn test_down_requires_lyrics_and_callback() {
        let (timeline, _) = setup();
        let mut machine = InteractionMachine::default();
        assert!(!machine.pointer_down(&timeline));
        assert_eq!(machine.state(), InteractionState::Idle);

        let seeks = Rc::new(RefCell::new(Vec::new()));
        let mut machine = draggable(&seeks, true);
        assert!(!machine.pointer_down(&Timeline::new()));
        assert!(machine.pointer_down(&timeline));
        assert_eq!(machine.state(), InteractionState::Touching);
        assert_eq!(machine.viewport_drive(), ViewportDrive::Direct);
    }

    #[test]
    #[should_panic(expected = "seek callback")]
    fn test_draggable_without_callback_panics() {
        InteractionMachine::default().set_draggable(true, None);
    }

    #[test]
    fn test_scroll_clamps_and_reveals_preview() {
        let (mut timeline, mut offsets) = setup();
        let seeks = Rc::new(RefCell::new(Vec::new()));
        let mut machine = draggable(&seeks, true);
        machine.pointer_down(&timeline);

        machine.scroll(5.0, &mut timeline, &mut offsets);
        assert!(!machine.is_preview_visible());
        machine.scroll(5.0, &mut timeline, &mut offsets);
        assert!(machine.is_preview_visible());

        for dy in [400.0, -2000.0, 37.0, 5000.0, -13.0] {
            machine.scroll(dy, &mut timeline, &mut offsets);
            let v = offsets.viewport_offset();
            assert!((160.0..=400.0).contains(&v), "viewport {v} escaped bounds");
        }
    }

    #[test]
    fn test_drag_and_seek_accepted() {
        let (mut timeline, mut offsets) = setup();
        let seeks = Rc::new(RefCell::new(Vec::new()));
        let mut machine = draggable(&seeks, true);

        machine.pointer_down(&timeline);
        machine.scroll(118.0, &mut timeline, &mut offsets);
        machine.pointer_up();
        assert_eq!(machine.viewport_drive(), ViewportDrive::Free);

        let outcome = machine.tap_confirmed(20.0, 400.0, &BUTTON, &mut timeline, &mut offsets);
        assert_eq!(outcome, TapOutcome::Seeked { line: 2, time_ms: 2000 });
        assert_eq!(*seeks.borrow(), [2000]);
        assert!(!machine.is_preview_visible());
        assert_eq!(machine.viewport_drive(), ViewportDrive::Follow);

        for _ in 0..600 {
            offsets.step(FRAME, machine.viewport_drive());
        }
        assert_eq!(offsets.viewport_offset(), 280.0);
    }

    #[test]
    fn test_declined_seek_keeps_preview() {
        let (mut timeline, mut offsets) = setup();
        let seeks = Rc::new(RefCell::new(Vec::new()));
        let mut machine = draggable(&seeks, false);

        machine.pointer_down(&timeline);
        machine.scroll(120.0, &mut timeline, &mut offsets);
        machine.pointer_up();
        let before = (machine.preview(), offsets.viewport_offset());

        let outcome = machine.tap_confirmed(20.0, 400.0, &BUTTON, &mut timeline, &mut offsets);
        assert_eq!(outcome, TapOutcome::Declined { line: 2, time_ms: 2000 });
        assert_eq!((machine.preview(), offsets.viewport_offset()), before);
    }

    #[test]
    fn test_tap_outside_button_is_forwarded() {
        let (mut timeline, mut offsets) = setup();
        let seeks = Rc::new(RefCell::new(Vec::new()));
        let taps = Rc::new(RefCell::new(0));
        let mut machine = draggable(&seeks, true);
        let counter = Rc::clone(&taps);
        machine.set_on_tap(Some(Box::new(move || *counter.borrow_mut() += 1)));

        // no preview yet: even a tap on the button is a plain tap
        let outcome = machine.tap_confirmed(20.0, 400.0, &BUTTON, &mut timeline, &mut offsets);
        assert_eq!(outcome, TapOutcome::Tapped);
        let outcome = machine.tap_confirmed(300.0, 100.0, &BUTTON, &mut timeline, &mut offsets);
        assert_eq!(outcome, TapOutcome::Tapped);
        assert_eq!(*taps.borrow(), 2);
        assert!(seeks.borrow().is_empty());

        let mut empty = Timeline::new();
        let outcome = machine.tap_confirmed(300.0, 100.0, &BUTTON, &mut empty, &mut offsets);
        assert_eq!(outcome, TapOutcome::Ignored);
        assert_eq!(*taps.borrow(), 2);
    }

    #[test]
    fn test_preview_times_out_and_returns_to_follow() {
        let (mut timeline, mut offsets) = setup();
        let seeks = Rc::new(RefCell::new(Vec::new()));
        let mut machine = draggable(&seeks, true);

        machine.pointer_down(&timeline);
        machine.scroll(200.0, &mut timeline, &mut offsets);
        machine.pointer_up();
        assert_eq!(machine.preview(), PreviewState::Visible { keep_alive: Some(3.0) });

        for _ in 0..170 {
            machine.step(FRAME, &mut timeline, &mut offsets);
        }
        assert!(machine.is_preview_visible());

        for _ in 0..20 {
            machine.step(FRAME, &mut timeline, &mut offsets);
        }
        assert!(!machine.is_preview_visible());

        for _ in 0..600 {
            offsets.step(FRAME, machine.viewport_drive());
        }
        assert_eq!(offsets.viewport_offset(), 400.0);
    }

    #[test]
    fn test_new_touch_cancels_keep_alive() {
        let (mut timeline, mut offsets) = setup();
        let seeks = Rc::new(RefCell::new(Vec::new()));
        let mut machine = draggable(&seeks, true);

        machine.pointer_down(&timeline);
        machine.scroll(50.0, &mut timeline, &mut offsets);
        machine.pointer_up();
        machine.pointer_down(&timeline);
        for _ in 0..400 {
            machine.step(FRAME, &mut timeline, &mut offsets);
        }
        assert_eq!(machine.preview(), PreviewState::Visible { keep_alive: None });
    }

    #[test]
    fn test_fling_settles_on_a_line() {
        let (mut timeline, mut offsets) = setup();
        let seeks = Rc::new(RefCell::new(Vec::new()));
        let mut machine = draggable(&seeks, true);

        machine.pointer_down(&timeline);
        machine.scroll(20.0, &mut timeline, &mut offsets);
        assert!(machine.fling(-900.0, &mut timeline, &offsets));
        machine.pointer_up();
        assert_eq!(machine.state(), InteractionState::Flinging);

        let mut frames = 0;
        while machine.state() == InteractionState::Flinging {
            machine.step(FRAME, &mut timeline, &mut offsets);
            offsets.step(FRAME, machine.viewport_drive());
            let v = offsets.viewport_offset();
            assert!((160.0..=400.0).contains(&v));
            frames += 1;
            assert!(frames < 1000);
        }
        assert_eq!(machine.preview(), PreviewState::Visible { keep_alive: Some(3.0) });

        for _ in 0..120 {
            offsets.step(FRAME, machine.viewport_drive());
        }
        let settled = offsets.viewport_offset();
        let line = timeline.nearest_line_to_offset(settled);
        assert_eq!(settled, timeline.offset_of(line));
    }

    #[test]
    fn test_short_drag_fling_returns_to_playing_line() {
        let (mut timeline, mut offsets) = setup();
        let seeks = Rc::new(RefCell::new(Vec::new()));
        let mut machine = draggable(&seeks, true);

        machine.pointer_down(&timeline);
        machine.scroll(5.0, &mut timeline, &mut offsets);
        assert!(!machine.is_preview_visible());
        assert!(machine.fling(-2000.0, &mut timeline, &offsets));
        assert_eq!(machine.preview(), PreviewState::Visible { keep_alive: None });
        machine.pointer_up();

        for _ in 0..3000 {
            machine.step(FRAME, &mut timeline, &mut offsets);
            offsets.step(FRAME, machine.viewport_drive());
        }
        assert_eq!(machine.state(), InteractionState::Idle);
        assert!(!machine.is_preview_visible());
        assert_eq!(offsets.viewport_offset(), offsets.current_offset());
        assert_eq!(offsets.viewport_offset(), 400.0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let (mut timeline, mut offsets) = setup();
        let seeks = Rc::new(RefCell::new(Vec::new()));
        let mut machine = draggable(&seeks, true);
        machine.pointer_down(&timeline);
        machine.scroll(100.0, &mut timeline, &mut offsets);
        machine.fling(-2000.0, &mut timeline, &offsets);

        machine.reset();
        assert_eq!(machine.state(), InteractionState::Idle);
        assert_eq!(machine.preview(), PreviewState::Hidden);
        assert!(machine.is_draggable());
    }
}

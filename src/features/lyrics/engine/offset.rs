//! Offset controller: playback progress vs. what the user sees
//!
//! Two offsets are tracked separately so that manual scrolling never fights
//! the autoplay highlight:
//! - `current_offset` follows the active line via the progress spring
//! - `viewport_offset` is what gets drawn, via its own viewport spring
//!
//! How the viewport is driven at any moment is spelled out by [`ViewportDrive`].

use super::spring::{Spring, SpringParams};

/// Who owns `viewport_offset` this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportDrive {
    /// Autoplay: the progress spring keeps retargeting the viewport spring
    Follow,
    /// Preview is up: the viewport spring runs, but only toward targets set explicitly
    Free,
    /// A gesture writes the viewport directly; spring output is ignored
    Direct,
}

/// Owner of both offsets and the highlight cross-fade state
#[derive(Debug, Clone)]
pub struct OffsetController {
    progress: Spring,
    viewport: Spring,
    current_offset: f32,
    viewport_offset: f32,
    animate_start: f32,
    animate_target: f32,
    animate_progress: f32,
    active_line: usize,
    last_line: Option<usize>,
}

impl OffsetController {
    pub fn new(progress: SpringParams, viewport: SpringParams) -> Self {
        Self {
            progress: Spring::from_params(0.0, progress),
            viewport: Spring::from_params(0.0, viewport),
            current_offset: 0.0,
            viewport_offset: 0.0,
            animate_start: 0.0,
            animate_target: 0.0,
            animate_progress: 1.0,
            active_line: 0,
            last_line: None,
        }
    }

    /// Back to the origin with line 0 active and no animation in flight
    pub fn reset(&mut self) {
        self.jump_to(0.0);
        self.active_line = 0;
        self.last_line = None;
    }

    /// Place both offsets at `offset` without animating
    pub fn jump_to(&mut self, offset: f32) {
        self.progress.set_position(offset as f64);
        self.viewport.set_position(offset as f64);
        self.current_offset = offset;
        self.viewport_offset = offset;
        self.animate_start = offset;
        self.animate_target = offset;
        self.animate_progress = 1.0;
    }

    /// Change the highlighted line; returns false when it already was active
    pub fn set_active_line(&mut self, line: usize) -> bool {
        if line == self.active_line {
            return false;
        }
        self.last_line = Some(self.active_line);
        self.active_line = line;
        true
    }

    /// Start animating `current_offset` toward `target`
    pub fn smooth_scroll_to(&mut self, target: f32) {
        self.animate_start = self.current_offset;
        self.animate_target = target;
        self.animate_progress = normalize(self.animate_start, self.animate_target, self.current_offset);
        self.progress.set_target(target as f64);
    }

    /// Gesture-driven viewport write; pins the viewport spring at the same spot
    pub fn set_viewport_direct(&mut self, offset: f32) {
        self.viewport_offset = offset;
        self.viewport.set_position(offset as f64);
    }

    /// Glide the viewport toward an explicit target (snap, seek, return to follow)
    pub fn animate_viewport_to(&mut self, target: f32) {
        self.viewport.set_target(target as f64);
    }

    /// Advance both springs by `dt` seconds
    pub fn step(&mut self, dt: f32, drive: ViewportDrive) {
        if self.progress.is_animating() {
            self.progress.update(dt as f64);
            self.current_offset = self.progress.position() as f32;
            self.animate_progress =
                normalize(self.animate_start, self.animate_target, self.current_offset);

            if drive == ViewportDrive::Follow
                && self.viewport.target() as f32 != self.animate_target
            {
                self.viewport.set_target(self.animate_target as f64);
            }
        }

        if drive != ViewportDrive::Direct {
            self.viewport.update(dt as f64);
            self.viewport_offset = self.viewport.position() as f32;
        }
    }

    pub fn set_progress_params(&mut self, params: SpringParams) {
        self.progress.update_params(params);
    }

    pub fn set_viewport_params(&mut self, params: SpringParams) {
        self.viewport.update_params(params);
    }

    pub fn progress_params(&self) -> &SpringParams {
        self.progress.params()
    }

    pub fn viewport_params(&self) -> &SpringParams {
        self.viewport.params()
    }

    pub fn current_offset(&self) -> f32 {
        self.current_offset
    }

    pub fn viewport_offset(&self) -> f32 {
        self.viewport_offset
    }

    /// Cross-fade fraction between `last_line` and `active_line` styling
    pub fn animate_progress(&self) -> f32 {
        self.animate_progress
    }

    pub fn animate_target(&self) -> f32 {
        self.animate_target
    }

    pub fn active_line(&self) -> usize {
        self.active_line
    }

    pub fn last_line(&self) -> Option<usize> {
        self.last_line
    }

    /// Whether the progress spring is still moving
    pub fn is_progress_animating(&self) -> bool {
        self.progress.is_animating()
    }

    pub fn is_viewport_animating(&self) -> bool {
        self.viewport.is_animating()
    }
}

impl Default for OffsetController {
    fn default() -> Self {
        Self::new(SpringParams::PROGRESS, SpringParams::VIEWPORT)
    }
}

/// Fraction of the way from `min` to `max`; 1 when they coincide
pub fn normalize(min: f32, max: f32, value: f32) -> f32 {
    if min == max {
        return 1.0;
    }
    (value - min) / (max - min)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f32 = 1.0 / 60.0;

    fn run(controller: &mut OffsetController, drive: ViewportDrive, frames: usize) {
        for _ in 0..frames {
            controller.step(FRAME, drive);
        }
    }

    #[test]
    fn test_progress_runs_zero_to_one() {
        let mut controller = OffsetController::new(SpringParams::VIEWPORT, SpringParams::VIEWPORT);
        controller.jump_to(400.0);
        controller.set_active_line(1);
        controller.smooth_scroll_to(340.0);
        assert_eq!(controller.animate_progress(), 0.0);

        controller.step(FRAME, ViewportDrive::Follow);
        let early = controller.animate_progress();
        assert!(early > 0.0 && early < 1.0);

        run(&mut controller, ViewportDrive::Follow, 600);
        assert_eq!(controller.animate_progress(), 1.0);
        assert_eq!(controller.current_offset(), 340.0);
    }

    #[test]
    fn test_follow_drags_viewport_along() {
        let mut controller = OffsetController::default();
        controller.jump_to(400.0);
        controller.smooth_scroll_to(100.0);
        run(&mut controller, ViewportDrive::Follow, 600);
        assert_eq!(controller.viewport_offset(), 100.0);
    }

    #[test]
    fn test_direct_and_free_ignore_progress() {
        for drive in [ViewportDrive::Direct, ViewportDrive::Free] {
            let mut controller = OffsetController::default();
            controller.jump_to(400.0);
            controller.set_viewport_direct(250.0);
            controller.smooth_scroll_to(100.0);
            run(&mut controller, drive, 600);
            assert_eq!(controller.current_offset(), 100.0);
            assert_eq!(controller.viewport_offset(), 250.0, "{drive:?}");
        }
    }

    #[test]
    fn test_free_applies_explicit_viewport_target() {
        let mut controller = OffsetController::default();
        controller.jump_to(400.0);
        controller.set_viewport_direct(250.0);
        controller.animate_viewport_to(280.0);
        run(&mut controller, ViewportDrive::Free, 600);
        assert_eq!(controller.viewport_offset(), 280.0);
    }

    #[test]
    fn test_direct_suppresses_viewport_spring() {
        let mut controller = OffsetController::default();
        controller.jump_to(0.0);
        controller.animate_viewport_to(-300.0);
        run(&mut controller, ViewportDrive::Direct, 30);
        assert_eq!(controller.viewport_offset(), 0.0);
    }

    #[test]
    fn test_set_active_line_tracks_last() {
        let mut controller = OffsetController::default();
        assert!(!controller.set_active_line(0));
        assert_eq!(controller.last_line(), None);
        assert!(controller.set_active_line(3));
        assert_eq!(controller.last_line(), Some(0));
        assert!(controller.set_active_line(4));
        assert_eq!(controller.last_line(), Some(3));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(10.0, 10.0, 3.0), 1.0);
        assert_eq!(normalize(400.0, 300.0, 350.0), 0.5);
        assert!(normalize(400.0, 300.0, 290.0) > 1.0);
    }
}

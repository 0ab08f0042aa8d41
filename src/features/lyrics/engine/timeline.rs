//! Timeline index: sorted lyric lines plus their scroll offsets
//!
//! Offsets are measured from the line's vertical center. Line 0 sits at
//! `start_offset`; every later line is further negative by half of both
//! neighbours' heights plus the sentence divider. Offsets are computed lazily
//! and memoized per line in an [`OffsetCache`] that is dropped as a unit
//! whenever any sizing input changes.

use std::ops::Range;

use super::layout::{LayoutMetrics, LineMeasure};
use crate::features::lyrics::parser::LyricLine;

/// Memoized line offsets keyed by line index
#[derive(Debug, Clone, Default)]
pub struct OffsetCache {
    slots: Vec<Option<f32>>,
}

impl OffsetCache {
    fn resize(&mut self, len: usize) {
        self.slots.clear();
        self.slots.resize(len, None);
    }

    pub fn get(&self, index: usize) -> Option<f32> {
        self.slots.get(index).copied().flatten()
    }

    fn set(&mut self, index: usize, offset: f32) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = Some(offset);
        }
    }

    /// Forget every computed offset
    pub fn invalidate(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    /// Number of offsets currently memoized
    pub fn cached_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}

/// Sorted lyric lines with active-line lookup and offset queries
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    lines: Vec<LyricLine>,
    /// Measured height of each line (primary + translation block)
    heights: Vec<f32>,
    offsets: OffsetCache,
    metrics: LayoutMetrics,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all lines; heights must be re-measured before offsets are meaningful
    pub fn load(&mut self, mut lines: Vec<LyricLine>) {
        lines.sort_by_key(|line| line.time_ms);
        self.lines = lines;
        self.heights.clear();
        self.offsets.resize(self.lines.len());
    }

    /// Drop all lines
    pub fn clear(&mut self) {
        self.load(Vec::new());
    }

    pub fn lines(&self) -> &[LyricLine] {
        &self.lines
    }

    pub fn get(&self, index: usize) -> Option<&LyricLine> {
        self.lines.get(index)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn metrics(&self) -> &LayoutMetrics {
        &self.metrics
    }

    /// Whether line heights have been measured for the current lines
    pub fn is_measured(&self) -> bool {
        self.heights.len() == self.lines.len()
    }

    /// Re-measure every line with new layout inputs and drop cached offsets
    pub fn relayout(&mut self, measure: &dyn LineMeasure, metrics: LayoutMetrics) {
        self.metrics = metrics;
        self.heights = self
            .lines
            .iter()
            .map(|line| {
                let mut height = measure.measure(&line.text, metrics.text_size, metrics.content_width);
                if metrics.draw_translation && line.has_second_text() {
                    let second = line.second_text.as_deref().unwrap_or_default();
                    height += metrics.translate_divider
                        + measure.measure(second, metrics.second_text_size, metrics.content_width);
                }
                height
            })
            .collect();
        self.offsets.invalidate();
    }

    /// Change layout inputs that don't affect line heights
    pub fn set_metrics(&mut self, metrics: LayoutMetrics) {
        if self.metrics != metrics {
            self.metrics = metrics;
            self.offsets.invalidate();
        }
    }

    /// Explicitly drop every cached offset
    pub fn invalidate_offsets(&mut self) {
        self.offsets.invalidate();
    }

    pub fn offset_cache(&self) -> &OffsetCache {
        &self.offsets
    }

    /// Height of one line block, 0 when not measured
    pub fn line_height(&self, index: usize) -> f32 {
        self.heights.get(index).copied().unwrap_or(0.0)
    }

    /// Index of the line playing at `time_ms`
    ///
    /// The last line whose start time does not exceed `time_ms`; 0 before the
    /// first line or when empty.
    pub fn find_active_line(&self, time_ms: u64) -> usize {
        self.lines
            .partition_point(|line| line.time_ms <= time_ms)
            .saturating_sub(1)
    }

    /// Scroll offset that centers line `index`
    ///
    /// Indices past the end clamp to the last line; an empty timeline yields 0.
    pub fn offset_of(&mut self, index: usize) -> f32 {
        if self.lines.is_empty() {
            return 0.0;
        }
        let index = index.min(self.lines.len() - 1);
        if let Some(offset) = self.offsets.get(index) {
            return offset;
        }

        // Resume from the closest memoized predecessor
        let mut from = index;
        while from > 0 && self.offsets.get(from).is_none() {
            from -= 1;
        }
        let mut offset = self.offsets.get(from).unwrap_or(self.metrics.start_offset);
        self.offsets.set(from, offset);

        for i in from + 1..=index {
            offset -= (self.line_height(i - 1) + self.line_height(i)) / 2.0
                + self.metrics.sentence_divider;
            self.offsets.set(i, offset);
        }
        offset
    }

    /// Line whose offset is closest to `offset` (first wins on ties)
    pub fn nearest_line_to_offset(&mut self, offset: f32) -> usize {
        let mut nearest = 0;
        let mut min_distance = f32::MAX;
        for i in 0..self.lines.len() {
            let distance = (offset - self.offset_of(i)).abs();
            if distance < min_distance {
                min_distance = distance;
                nearest = i;
            }
        }
        nearest
    }

    /// Allowed viewport range as `(min, max)`, spanned by the first and last line offsets
    pub fn bounds(&mut self) -> (f32, f32) {
        if self.lines.is_empty() {
            return (0.0, 0.0);
        }
        let first = self.offset_of(0);
        let last = self.offset_of(self.lines.len() - 1);
        (first.min(last), first.max(last))
    }

    /// Lines worth drawing: those within one viewport height of `viewport_offset`
    pub fn visible_range(&mut self, viewport_offset: f32, viewport_height: f32) -> Range<usize> {
        let low = viewport_offset - viewport_height;
        let high = viewport_offset + viewport_height;
        let mut start = None;
        let mut end = 0;
        for i in 0..self.lines.len() {
            let offset = self.offset_of(i);
            if offset < low {
                break;
            }
            if offset <= high {
                start.get_or_insert(i);
                end = i + 1;
            }
        }
        match start {
            Some(start) => start..end,
            None => 0..0,
        }
    }
}

//! Layout inputs for lyric offset calculations
//!
//! The engine never shapes text itself. Line heights come from a
//! [`LineMeasure`] supplied by the host (which owns fonts and wrapping);
//! [`EstimatedMeasure`] is a font-free approximation used by default.

/// Everything the offset walk depends on
///
/// Any change here invalidates every cached line offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    /// Offset of line 0: viewport center plus the configured vertical shift
    pub start_offset: f32,
    /// Gap between two lyric lines
    pub sentence_divider: f32,
    /// Gap between a line and its translation
    pub translate_divider: f32,
    /// Size the primary text is laid out at (the larger of normal/current)
    pub text_size: f32,
    /// Size the translation is laid out at
    pub second_text_size: f32,
    /// Width available for wrapping
    pub content_width: f32,
    /// Whether translations take up space
    pub draw_translation: bool,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            start_offset: 0.0,
            sentence_divider: 0.0,
            translate_divider: 0.0,
            text_size: 0.0,
            second_text_size: 0.0,
            content_width: 0.0,
            draw_translation: true,
        }
    }
}

/// Text height measurement provided by the rendering layer
pub trait LineMeasure {
    /// Height of `text` wrapped to `width` at `text_size`
    fn measure(&self, text: &str, text_size: f32, width: f32) -> f32;
}

impl<F> LineMeasure for F
where
    F: Fn(&str, f32, f32) -> f32,
{
    fn measure(&self, text: &str, text_size: f32, width: f32) -> f32 {
        self(text, text_size, width)
    }
}

/// Font-free estimate: CJK glyphs are one em wide, everything else a fraction of it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatedMeasure {
    /// Advance of a non-CJK glyph in em
    pub glyph_width_ratio: f32,
    /// Line height in em
    pub line_height_ratio: f32,
}

impl Default for EstimatedMeasure {
    fn default() -> Self {
        Self {
            glyph_width_ratio: 0.55,
            line_height_ratio: 1.2,
        }
    }
}

impl LineMeasure for EstimatedMeasure {
    fn measure(&self, text: &str, text_size: f32, width: f32) -> f32 {
        if text.is_empty() {
            return 0.0;
        }
        let advance: f32 = text
            .chars()
            .map(|c| {
                if is_wide_char(c) {
                    text_size
                } else {
                    text_size * self.glyph_width_ratio
                }
            })
            .sum();
        let rows = if width > 0.0 {
            (advance / width).ceil().max(1.0)
        } else {
            1.0
        };
        rows * text_size * self.line_height_ratio
    }
}

/// Full-width scripts (CJK ideographs, kana, hangul, fullwidth forms)
fn is_wide_char(c: char) -> bool {
    matches!(c,
        '\u{1100}'..='\u{115F}' |
        '\u{2E80}'..='\u{A4CF}' |
        '\u{AC00}'..='\u{D7A3}' |
        '\u{F900}'..='\u{FAFF}' |
        '\u{FF00}'..='\u{FF60}' |
        '\u{20000}'..='\u{3FFFD}'
    )
}

/// Axis-aligned rectangle in view coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HitRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl HitRect {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Seek button placement: centered in the time column, vertically on the center line
    pub fn seek_button(time_column_width: f32, button_size: f32, center_y: f32) -> Self {
        let left = ((time_column_width - button_size) / 2.0).floor();
        let top = (center_y - button_size / 2.0).floor();
        Self::new(left, top, left + button_size, top + button_size)
    }

    /// Half-open containment, matching integer pixel rects
    pub fn contains(&self, x: f32, y: f32) -> bool {
        self.left < self.right
            && self.top < self.bottom
            && x >= self.left
            && x < self.right
            && y >= self.top
            && y < self.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_wraps() {
        let measure = EstimatedMeasure::default();
        let one_row = measure.measure("Hello", 20.0, 400.0);
        assert_eq!(one_row, 24.0);

        // 40 ideographs at 20px = 800px advance over 400px width: two rows
        let long = "字".repeat(40);
        assert_eq!(measure.measure(&long, 20.0, 400.0), 48.0);
        assert_eq!(measure.measure("", 20.0, 400.0), 0.0);
    }

    #[test]
    fn test_closure_measure() {
        let fixed = |_: &str, size: f32, _: f32| size * 2.0;
        assert_eq!(fixed.measure("anything", 10.0, 0.0), 20.0);
    }

    #[test]
    fn test_seek_button_rect() {
        let rect = HitRect::seek_button(50.0, 30.0, 400.0);
        assert_eq!(rect, HitRect::new(10.0, 385.0, 40.0, 415.0));
        assert!(rect.contains(10.0, 385.0));
        assert!(rect.contains(25.0, 400.0));
        assert!(!rect.contains(40.0, 400.0));
        assert!(!rect.contains(25.0, 300.0));
    }

    #[test]
    fn test_empty_rect_contains_nothing() {
        assert!(!HitRect::default().contains(0.0, 0.0));
    }
}

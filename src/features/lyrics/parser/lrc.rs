//! Standard LRC format parser
//!
//! Supports the common `[mm:ss.xx]text` format with line-level synchronization.
//! The fraction may carry 1 to 6 digits; several leading timestamps on one
//! line produce one entry each (repeated refrains).

use std::sync::LazyLock;

use regex::Regex;

use super::types::LyricLine;

/// One or more leading timestamps followed by non-empty text
static LINE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((?:\[\d{2,}:\d{2}\.\d{1,6}\])+)(.+)$").expect("valid LRC line pattern")
});

static TIME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\d{2,}):(\d{2})\.(\d{1,6})\]").expect("valid LRC time pattern"));

const BOM: char = '\u{FEFF}';

/// Normalize a fractional-second field to milliseconds
///
/// 1 digit is tenths, 2 hundredths, 3 milliseconds; longer fields are
/// truncated down to milliseconds.
fn fraction_to_ms(digits: &str) -> Option<u64> {
    let value: u64 = digits.parse().ok()?;
    let ms = match digits.len() {
        1 => value * 100,
        2 => value * 10,
        3 => value,
        4 => value / 10,
        5 => value / 100,
        6 => value / 1000,
        _ => return None,
    };
    Some(ms)
}

/// Convert the captured `mm`, `ss` and fraction fields to milliseconds
///
/// Returns `None` for a minutes field too large to represent.
fn parse_time(min: &str, sec: &str, fraction: &str) -> Option<u64> {
    let min: u64 = min.parse().ok()?;
    let sec: u64 = sec.parse().ok()?;
    let ms = fraction_to_ms(fraction)?;
    min.checked_mul(60_000)?
        .checked_add(sec * 1000)?
        .checked_add(ms)
}

/// Parse a single LRC line, which may have multiple timestamps
fn parse_line(line: &str) -> Vec<LyricLine> {
    let line = line.trim();
    let Some(caps) = LINE_PATTERN.captures(line) else {
        return Vec::new();
    };

    let text = caps[2].trim();
    if text.is_empty() {
        return Vec::new();
    }

    TIME_PATTERN
        .captures_iter(&caps[1])
        .filter_map(|t| parse_time(&t[1], &t[2], &t[3]))
        .map(|time_ms| LyricLine::new(time_ms, text))
        .collect()
}

/// Unwrap `Language="..."; Lyrics="...";` containers written by Media Monkey
fn unwrap_media_monkey(src: &str) -> &str {
    let after = src
        .find("Lyrics=\"")
        .map(|pos| &src[pos + "Lyrics=\"".len()..])
        .unwrap_or(src);
    after.rfind("\";").map(|pos| &after[..pos]).unwrap_or(after)
}

/// Parse LRC content into time-sorted lyric lines
///
/// Lines that don't start with a timestamp (metadata tags, blank lines,
/// garbage) are skipped. Lines sharing a timestamp keep their input order.
pub fn parse_lrc(src: &str) -> Vec<LyricLine> {
    let cleaned = src.replace(BOM, "");
    let content = unwrap_media_monkey(cleaned.trim());
    if content.trim().is_empty() {
        return Vec::new();
    }

    let lines = content.lines();
    let mut result = Vec::with_capacity(lines.size_hint().1.unwrap_or(128).min(1024));
    for line in lines {
        result.extend(parse_line(line));
    }

    // Stable: equal timestamps stay in input order
    result.sort_by_key(|line| line.time_ms);
    result
}

/// Write timestamp in LRC format with centisecond precision
pub fn write_timestamp(result: &mut String, time: u64) {
    use std::fmt::Write;
    let cs = (time % 1000) / 10;
    let sec = (time / 1000) % 60;
    let min = time / 60000;
    let _ = write!(result, "[{:02}:{:02}.{:02}]", min, sec, cs);
}

/// Convert lyrics to LRC text
///
/// Translations are written as a second line with the same timestamp, which
/// parses back into the same bilingual timeline.
pub fn stringify_lrc(lines: &[LyricLine]) -> String {
    let capacity: usize = lines
        .iter()
        .map(|x| x.text.len() + x.second_text.as_ref().map_or(0, |s| s.len() + 11) + 11)
        .sum();
    let mut result = String::with_capacity(capacity);

    for line in lines {
        write_timestamp(&mut result, line.time_ms);
        result.push_str(&line.text);
        result.push('\n');
        if let Some(second) = line.second_text.as_deref().filter(|s| !s.is_empty()) {
            write_timestamp(&mut result, line.time_ms);
            result.push_str(second);
            result.push('\n');
        }
    }

    result
}

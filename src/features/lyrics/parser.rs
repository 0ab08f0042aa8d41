//! Lyrics parsing module
//!
//! Turns LRC text (optionally with a second, time-aligned language) into a
//! sorted list of [`LyricLine`]s. Bilingual input comes in two shapes:
//! - two separate LRC texts sharing timestamps
//! - one text where each original line is followed by its translation under
//!   the same timestamp
//!
//! Parsing never fails loudly: malformed input yields an empty list.

mod encoding;
mod lrc;
mod types;

pub use encoding::{decode_lyric_bytes, read_lyric_file};
pub use lrc::{parse_lrc, stringify_lrc, write_timestamp};
pub use types::*;

/// Parse primary lyrics with an optional second-language text
pub fn parse_lyrics(primary: &str, secondary: Option<&str>) -> Vec<LyricLine> {
    let mut main = parse_lrc(primary);
    if main.is_empty() {
        return main;
    }

    match secondary.filter(|s| !s.trim().is_empty()) {
        Some(secondary) => {
            let translation = parse_lrc(secondary);
            merge_translation(&mut main, &translation);
            main
        }
        None => merge_adjacent_pairs(main),
    }
}

/// Merge translation lyrics into main lyrics by identical start time
///
/// When several translation lines share a timestamp the last one wins.
pub fn merge_translation(main: &mut [LyricLine], translation: &[LyricLine]) {
    for main_line in main.iter_mut() {
        if let Some(trans_line) = translation
            .iter()
            .rev()
            .find(|t| t.time_ms == main_line.time_ms)
        {
            main_line.second_text = Some(trans_line.text.clone());
        }
    }
}

/// Fold `[t]original` / `[t]translation` pairs into single bilingual lines
///
/// Pairs are formed left to right: a third line with the same timestamp is
/// not attached anywhere and starts a new pair instead.
pub fn merge_adjacent_pairs(lines: Vec<LyricLine>) -> Vec<LyricLine> {
    let mut result: Vec<LyricLine> = Vec::with_capacity(lines.len());
    let mut pair_open = false;

    for line in lines {
        if pair_open {
            if let Some(last) = result.last_mut().filter(|last| last.time_ms == line.time_ms) {
                last.second_text = Some(line.text);
                pair_open = false;
                continue;
            }
        }
        result.push(line);
        pair_open = true;
    }

    result
}

/// Format milliseconds as `mm:ss`
pub fn format_time(time_ms: u64) -> String {
    let min = time_ms / 60_000;
    let sec = (time_ms / 1000) % 60;
    format!("{:02}:{:02}", min, sec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_two_texts() {
        let main = "[00:01.00]Hello\n[00:03.00]World\n[00:05.00]Alone";
        let second = "[00:01.00]你好\n[00:03.00]世界";
        let lines = parse_lyrics(main, Some(second));
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].second_text.as_deref(), Some("你好"));
        assert_eq!(lines[1].second_text.as_deref(), Some("世界"));
        assert_eq!(lines[2].second_text, None);
    }

    #[test]
    fn test_merge_adjacent_same_time() {
        let lines = parse_lyrics("[00:01.00]A\n[00:01.00]B", None);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "A");
        assert_eq!(lines[0].second_text.as_deref(), Some("B"));
    }

    #[test]
    fn test_empty_secondary_uses_adjacent_merge() {
        let lines = parse_lyrics("[00:21.11]いつも\n[00:21.11]总会\n[00:28.32]駅の\n[00:28.32]穿过", Some(""));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].text, "駅の");
        assert_eq!(lines[1].second_text.as_deref(), Some("穿过"));
    }

    #[test]
    fn test_three_way_tie_pairs_first_two() {
        let lines = parse_lyrics("[00:01.00]A\n[00:01.00]B\n[00:01.00]C\n[00:02.00]D", None);
        let summary: Vec<(&str, Option<&str>)> = lines
            .iter()
            .map(|l| (l.text.as_str(), l.second_text.as_deref()))
            .collect();
        assert_eq!(summary, [("A", Some("B")), ("C", None), ("D", None)]);
    }

    #[test]
    fn test_monolingual_untouched() {
        let lines = parse_lyrics("[00:00.00]Hello\n[00:05.00]World", None);
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.second_text.is_none()));
    }

    #[test]
    fn test_empty_primary_ignores_secondary() {
        assert!(parse_lyrics("", Some("[00:01.00]x")).is_empty());
        assert!(parse_lyrics("garbage", None).is_empty());
    }

    #[test]
    fn test_stringify_reparses_to_same_timeline() {
        let lines = parse_lyrics("[00:01.50]A\n[00:04.20]B", Some("[00:01.50]甲"));
        let reparsed = parse_lyrics(&stringify_lrc(&lines), None);
        assert_eq!(reparsed, lines);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(207_500), "03:27");
        assert_eq!(format_time(59_999), "00:59");
        assert_eq!(format_time(6_000_000), "100:00");
    }
}

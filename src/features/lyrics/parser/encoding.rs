//! Reading lyric files with legacy encoding fallback
//!
//! Lyric files collected from old download tools are frequently stored in
//! GBK, Big5 or Shift-JIS. UTF-8 is tried first, then the common legacy
//! encodings in order of likelihood.

use std::path::Path;

use encoding_rs::{BIG5, EUC_JP, EUC_KR, GBK, SHIFT_JIS, WINDOWS_1252};

use super::types::LyricError;

/// Read a lyric file and decode it to a `String`
pub fn read_lyric_file(path: &Path) -> Result<String, LyricError> {
    let bytes = std::fs::read(path).map_err(|e| LyricError::Io(e.to_string()))?;
    if bytes.is_empty() {
        return Err(LyricError::Empty);
    }
    Ok(decode_lyric_bytes(&bytes))
}

/// Decode raw lyric bytes
pub fn decode_lyric_bytes(bytes: &[u8]) -> String {
    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    let encodings = [GBK, BIG5, SHIFT_JIS, EUC_JP, EUC_KR, WINDOWS_1252];
    for encoding in encodings {
        let (decoded, _, had_errors) = encoding.decode(bytes);
        if !had_errors && is_likely_valid_text(&decoded) {
            tracing::debug!("Decoded lyric file as {}", encoding.name());
            return decoded.into_owned();
        }
    }

    String::from_utf8_lossy(bytes).into_owned()
}

/// Heuristic check that decoded text isn't garbage
fn is_likely_valid_text(s: &str) -> bool {
    let suspicious = s
        .chars()
        .filter(|c| {
            (*c < ' ' && !matches!(*c, '\t' | '\n' | '\r'))
                || ('\u{E000}'..='\u{F8FF}').contains(c)
                || *c == '\u{FFFD}'
        })
        .count();

    suspicious <= (s.len() / 20).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_passthrough() {
        let text = "[00:01.00]你好";
        assert_eq!(decode_lyric_bytes(text.as_bytes()), text);
    }

    #[test]
    fn test_gbk_fallback() {
        let (bytes, _, _) = GBK.encode("[00:01.00]让我掉下眼泪的");
        assert_eq!(decode_lyric_bytes(&bytes), "[00:01.00]让我掉下眼泪的");
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_lyric_file(Path::new("/definitely/not/here.lrc")).unwrap_err();
        assert!(matches!(err, LyricError::Io(_)));
    }
}

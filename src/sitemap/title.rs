//! Title normalization for sitemap-derived content
//!
//! Upstream titles arrive percent-encoded, sometimes more than once (a
//! space observed as `%2520` is `%25` + `20`, i.e. encoded twice).
//! Decoding repeats until a fixed point; cleaning collapses whitespace and
//! surviving encoding artifacts and bounds the length for storage.

use percent_encoding::percent_decode_str;

/// Safety cap on decode passes for malformed deeply-encoded input
const MAX_DECODE_PASSES: usize = 5;

/// Ceiling on stored title length, in characters
const MAX_TITLE_LEN: usize = 255;

/// Reverses multi-pass percent-encoding
///
/// Decodes repeatedly until the value stops changing or the safety cap is
/// hit, then maps form-encoded `+` to a space.
pub fn decode_title(raw: &str) -> String {
    let mut current = raw.to_string();

    for _ in 0..MAX_DECODE_PASSES {
        let decoded = percent_decode_str(&current).decode_utf8_lossy().to_string();
        if decoded == current {
            break;
        }
        current = decoded;
    }

    current.replace('+', " ")
}

/// Cleans a decoded title for storage
///
/// Surviving `%XX` artifacts become spaces, whitespace runs collapse to a
/// single space, the result is trimmed and truncated to 255 characters.
/// `None` or all-whitespace input cleans to an empty string.
pub fn clean_title(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };

    // Replace leftover percent escapes with spaces
    let mut scrubbed = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(pos) = rest.find('%') {
        scrubbed.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        let mut chars = tail.chars();
        chars.next(); // the '%'
        let is_escape = matches!(
            (chars.next(), chars.next()),
            (Some(a), Some(b)) if a.is_ascii_hexdigit() && b.is_ascii_hexdigit()
        );

        if is_escape {
            scrubbed.push(' ');
            rest = &tail[3..];
        } else {
            scrubbed.push('%');
            rest = &tail[1..];
        }
    }
    scrubbed.push_str(rest);

    let collapsed = scrubbed.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() > MAX_TITLE_LEN {
        collapsed.chars().take(MAX_TITLE_LEN).collect()
    } else {
        collapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_single_pass() {
        assert_eq!(decode_title("Test%20Experience"), "Test Experience");
    }

    #[test]
    fn test_decode_double_encoded() {
        // %2520 is %25 ("%") + 20, a space encoded twice
        assert_eq!(decode_title("Test%2520Experience"), "Test Experience");
    }

    #[test]
    fn test_decode_plus_as_space() {
        assert_eq!(decode_title("Test+Experience"), "Test Experience");
    }

    #[test]
    fn test_decode_plain_text_unchanged() {
        assert_eq!(decode_title("Plain Title"), "Plain Title");
    }

    #[test]
    fn test_decode_punctuation() {
        assert_eq!(
            decode_title("Caf%C3%A9%20Corner%2C%20Vol.%201%21"),
            "Café Corner, Vol. 1!"
        );
    }

    #[test]
    fn test_decode_pass_cap_terminates() {
        // Six layers of encoding: one more than the cap unwinds
        let mut encoded = " ".to_string();
        for _ in 0..6 {
            encoded = encoded.replace('%', "%25").replace(' ', "%20");
        }

        let decoded = decode_title(&encoded);
        // The cap leaves one layer unresolved rather than looping forever
        assert_eq!(decoded, "%20");
    }

    #[test]
    fn test_clean_collapses_whitespace_and_artifacts() {
        assert_eq!(clean_title(Some("Test  %20  Experience  ")), "Test Experience");
    }

    #[test]
    fn test_clean_none_is_empty() {
        assert_eq!(clean_title(None), "");
    }

    #[test]
    fn test_clean_blank_is_empty() {
        assert_eq!(clean_title(Some("   ")), "");
        assert_eq!(clean_title(Some("")), "");
        assert_eq!(clean_title(Some(" %20 %20 ")), "");
    }

    #[test]
    fn test_clean_truncates_to_255_chars() {
        let long = "A".repeat(300);
        let cleaned = clean_title(Some(long.as_str()));
        assert_eq!(cleaned.chars().count(), 255);
    }

    #[test]
    fn test_clean_truncation_is_char_boundary_safe() {
        let long = "é".repeat(300);
        let cleaned = clean_title(Some(long.as_str()));
        assert_eq!(cleaned.chars().count(), 255);
    }

    #[test]
    fn test_clean_preserves_bare_percent() {
        assert_eq!(clean_title(Some("100% legit")), "100% legit");
    }

    #[test]
    fn test_decode_then_clean_pipeline() {
        let decoded = decode_title("My%2520Grand%2520%2520Gallery");
        assert_eq!(clean_title(Some(decoded.as_str())), "My Grand Gallery");
    }
}

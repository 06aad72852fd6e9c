//! Filesystem-safe basenames from free-form titles.

/// Characters stripped from titles before they become file names.
const FORBIDDEN: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Leaves room for the extension within Linux NAME_MAX (255 bytes).
const BASENAME_MAX: usize = 240;

/// Sanitizes a title for use as an output basename (no extension).
///
/// - Removes `\ / : * ? " < > |` and control characters
/// - Trims leading/trailing whitespace and dots
/// - Limits length to 240 bytes on a char boundary
///
/// Returns an empty string when nothing usable is left; callers fall back
/// to `VideoPlayback_<id>`.
pub fn sanitize_title(title: &str) -> String {
    let stripped: String = title
        .chars()
        .filter(|c| !FORBIDDEN.contains(c) && !c.is_control())
        .collect();

    let trimmed = stripped.trim_matches(|c: char| c.is_whitespace() || c == '.');

    if trimmed.len() > BASENAME_MAX {
        let mut take = BASENAME_MAX;
        while take > 0 && !trimmed.is_char_boundary(take) {
            take -= 1;
        }
        trimmed[..take].trim_end().to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_forbidden_characters() {
        assert_eq!(sanitize_title(r#"a\b/c:d*e?f"g<h>i|j"#), "abcdefghij");
    }

    #[test]
    fn keeps_spaces_and_unicode() {
        assert_eq!(sanitize_title("Café — live at 5"), "Café — live at 5");
    }

    #[test]
    fn trims_dots_and_spaces() {
        assert_eq!(sanitize_title("  ..clip..  "), "clip");
    }

    #[test]
    fn control_chars_removed() {
        assert_eq!(sanitize_title("line\none\ttab"), "lineonetab");
    }

    #[test]
    fn only_forbidden_is_empty() {
        assert_eq!(sanitize_title("<>?*"), "");
    }

    #[test]
    fn long_titles_are_cut_on_char_boundary() {
        let title = "é".repeat(200);
        let out = sanitize_title(&title);
        assert!(out.len() <= 240);
        assert!(out.chars().all(|c| c == 'é'));
    }
}

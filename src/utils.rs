use unicode_width::UnicodeWidthStr;

pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len - 3])
    }
}

/// Renders remaining seconds as M:SS, matching the exam header clock.
pub fn format_clock(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Terminal cell width of a string, used to place the cursor after
/// single-line form inputs.
pub fn display_width(s: &str) -> u16 {
    UnicodeWidthStr::width(s) as u16
}

/// Option index (0-based) to its display letter: 0 -> A, 1 -> B, ...
pub fn option_letter(index: usize) -> char {
    (b'A' + (index as u8).min(25)) as char
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string_no_truncation() {
        assert_eq!(truncate_string("Short string", 20), "Short string");
    }

    #[test]
    fn test_truncate_string_with_truncation() {
        let result = truncate_string("This is a very long string that should be truncated", 20);
        assert_eq!(result, "This is a very lo...");
        assert!(result.len() <= 20);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(2700), "45:00");
        assert_eq!(format_clock(61), "1:01");
        assert_eq!(format_clock(9), "0:09");
        assert_eq!(format_clock(0), "0:00");
    }

    #[test]
    fn test_display_width_wide_chars() {
        assert_eq!(display_width("abc"), 3);
        assert_eq!(display_width(""), 0);
        // CJK characters occupy two cells each.
        assert_eq!(display_width("日本"), 4);
    }

    #[test]
    fn test_option_letter() {
        assert_eq!(option_letter(0), 'A');
        assert_eq!(option_letter(3), 'D');
        assert_eq!(option_letter(25), 'Z');
    }
}

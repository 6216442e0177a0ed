use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\x1b\x{9b}][\[()#;?]*(?:[0-9]{1,4}(?:;[0-9]{0,4})*)?[0-9A-ORZcf-nqry=><]")
        .expect("ANSI escape pattern compiles")
});

/// Removes terminal colour and cursor escape sequences from task output.
pub fn strip_ansi(input: &str) -> Cow<'_, str> {
    ANSI_ESCAPE.replace_all(input, "")
}

#[cfg(test)]
mod tests {
    use super::strip_ansi;

    #[test]
    fn plain_text_is_borrowed() {
        assert!(matches!(strip_ansi("hello"), std::borrow::Cow::Borrowed("hello")));
    }

    #[test]
    fn colour_codes_are_removed() {
        assert_eq!(strip_ansi("\x1b[31;1mfailed\x1b[0m"), "failed");
    }

    #[test]
    fn csi_single_byte_form_is_removed() {
        assert_eq!(strip_ansi("\u{9b}2Kdone"), "done");
    }

    #[test]
    fn cursor_movement_is_removed() {
        assert_eq!(strip_ansi("50%\x1b[1A\x1b[2K60%"), "50%60%");
    }
}

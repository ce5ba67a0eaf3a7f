//! Normalization of extracted attachment text

/// Keep only `\n`, `\t`, `\r` and printable ASCII, then trim
///
/// Everything else is dropped, not replaced. This is lossy on purpose: the
/// output feeds a CSV consumer that expects plain ASCII text.
///
/// ```
/// use regs_harvest::attachments::clean_text;
///
/// assert_eq!(clean_text("  caf\u{e9}\u{0}\n"), "caf");
/// ```
#[must_use]
pub fn clean_text(text: &str) -> String {
    let kept: String = text
        .chars()
        .filter(|&c| matches!(c, '\n' | '\t' | '\r' | ' '..='~'))
        .collect();
    kept.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text("  \n\t "), "");
    }

    #[test]
    fn drops_control_and_non_ascii() {
        assert_eq!(clean_text("a\u{0}b\u{7}c"), "abc");
        assert_eq!(clean_text("na\u{ef}ve \u{2013} r\u{e9}sum\u{e9}"), "nave  rsum");
        assert_eq!(clean_text("\u{7f}del"), "del");
    }

    #[test]
    fn keeps_whitespace_controls_inside() {
        assert_eq!(clean_text("line one\r\n\tline two"), "line one\r\n\tline two");
    }

    #[test]
    fn trims_after_filtering() {
        // The non-ASCII character shields the space until it is dropped
        assert_eq!(clean_text("\u{a0} text \u{a0}"), "text");
    }

    #[test]
    fn cleaning_is_idempotent() {
        let samples = [
            "",
            "plain",
            "  padded  ",
            "mixed \u{fffd} content\u{0}\n\n",
            "\u{feff}BOM first",
            "tabs\tand\rreturns\n",
        ];
        for sample in samples {
            let once = clean_text(sample);
            assert_eq!(clean_text(&once), once, "not idempotent for {sample:?}");
        }
    }
}

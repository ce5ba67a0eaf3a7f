//! Choosing between inline comment text and attachment text

/// Final text for one comment and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    /// The chosen text (may be empty)
    pub text: String,
    /// True when the attachment text was chosen
    pub from_attachment: bool,
}

/// Pick the richer of the two texts
///
/// The attachment wins only when it is non-empty and strictly longer, in
/// characters, than the inline text. Ties go to the inline text.
///
/// ```
/// use regs_harvest::reconcile::reconcile;
///
/// let r = reconcile("See attached", "The full letter, three pages long.");
/// assert!(r.from_attachment);
/// ```
pub fn reconcile(comment_text: &str, attachment_text: &str) -> Reconciled {
    let attachment_len = attachment_text.chars().count();
    if attachment_len > 0 && attachment_len > comment_text.chars().count() {
        Reconciled {
            text: attachment_text.to_string(),
            from_attachment: true,
        }
    } else {
        Reconciled {
            text: comment_text.to_string(),
            from_attachment: false,
        }
    }
}

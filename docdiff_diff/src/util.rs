/// Length in chars, which is what the summaries count.
pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

pub(crate) fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

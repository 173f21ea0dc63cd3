/// Telegram counts message length in UTF-16 code units and rejects anything
/// over 4096; keep some headroom.
pub const MAX_MESSAGE_UNITS: usize = 4000;

/// Length of `text` as Telegram measures it.
pub fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Split `text` into consecutive pieces of at most `max_units` UTF-16 code
/// units. Cuts fall on char boundaries, so a surrogate pair is never split.
/// A text that fits is returned whole.
pub fn split_message(text: &str, max_units: usize) -> Vec<&str> {
    if max_units == 0 || utf16_len(text) <= max_units {
        return vec![text];
    }

    let mut chunks = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let end = cut_point(rest, max_units);
        let (head, tail) = rest.split_at(end);
        chunks.push(head);
        rest = tail;
    }
    chunks
}

/// Byte offset of the longest prefix of `text` within `max_units`. Always
/// advances by at least one char so the split makes progress.
fn cut_point(text: &str, max_units: usize) -> usize {
    let mut units = 0;
    for (idx, ch) in text.char_indices() {
        units += ch.len_utf16();
        if units > max_units {
            return if idx == 0 { ch.len_utf8() } else { idx };
        }
    }
    text.len()
}

//! Case-insensitive split of the response on the marker phrase.

/// Split `text` at the first case-insensitive occurrence of `marker`.
///
/// Returns `(analysis, diagram)`: the text before the marker and the text
/// after it, with the marker itself dropped. Without a match the whole text
/// is the analysis and the diagram is empty.
pub fn split<'a>(text: &'a str, marker: &str) -> (&'a str, &'a str) {
    match find_ignore_case(text, marker) {
        Some((start, end)) => (&text[..start], &text[end..]),
        None => (text, ""),
    }
}

/// Byte range of the first case-insensitive match of `needle` in `haystack`.
///
/// Comparison is done on lowercased chars, so the returned range always
/// lies on char boundaries of the original text even when lowercasing
/// changes the byte length.
fn find_ignore_case(haystack: &str, needle: &str) -> Option<(usize, usize)> {
    let needle: Vec<char> = needle.chars().flat_map(char::to_lowercase).collect();
    if needle.is_empty() {
        return Some((0, 0));
    }

    for (start, _) in haystack.char_indices() {
        if let Some(len) = match_len_at(&haystack[start..], &needle) {
            return Some((start, start + len));
        }
    }

    None
}

/// Length in bytes of `rest`'s prefix matching `needle`, if it matches.
fn match_len_at(rest: &str, needle: &[char]) -> Option<usize> {
    let mut expected = needle.iter();

    for (offset, ch) in rest.char_indices() {
        for lower in ch.to_lowercase() {
            if expected.next() != Some(&lower) {
                return None;
            }
        }
        if expected.len() == 0 {
            return Some(offset + ch.len_utf8());
        }
    }

    None
}

//! Sentence boundaries and legacy sentence-level anchors.
//!
//! Hosts hovering a line of the translation pass the matching sentence's
//! range to the renderer as the hovered-sentence overlay.

use crate::types::{Annotation, ContextKey, TextRange};

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '?' | '!' | '。')
}

/// Sentence ranges in UTF-16 units.
///
/// A sentence runs from its first non-whitespace char through its run of
/// terminators. Leading whitespace belongs to no sentence. Trailing text
/// with no terminator forms a final sentence.
pub fn sentence_ranges(text: &str) -> Vec<TextRange> {
    let mut out = Vec::new();
    let mut unit = 0usize;
    let mut start: Option<usize> = None;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        let width = c.len_utf16();
        if start.is_none() && !c.is_whitespace() {
            start = Some(unit);
        }
        unit += width;
        // "?!" and "..." close a single sentence.
        if is_terminator(c) && !chars.peek().copied().is_some_and(is_terminator) {
            if let Some(s) = start.take() {
                out.push(TextRange::new(s, unit));
            }
        }
    }
    if let Some(s) = start {
        let end = text.trim_end().encode_utf16().count();
        out.push(TextRange::new(s, end.max(s)));
    }
    out
}

/// Index of the sentence containing `offset`, if any.
pub fn sentence_at(ranges: &[TextRange], offset: usize) -> Option<usize> {
    ranges.iter().position(|r| r.contains(offset))
}

/// Legacy sentence-anchored annotations for one sentence of a context.
pub fn annotations_for_sentence<'a>(
    annotations: &'a [Annotation],
    context: &'a ContextKey,
    sentence: usize,
) -> impl Iterator<Item = &'a Annotation> + 'a {
    annotations
        .iter()
        .filter(move |a| &a.context_key == context && a.sentence_index == Some(sentence))
}

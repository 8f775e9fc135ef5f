//! Deciding whether a range refers to an existing annotation.
//!
//! Two strategies exist, chosen per context kind:
//! - offset proximity: same context, both bounds within a tolerance
//! - text search: same context and same literal text, relocated in the
//!   current content by substring search (for views whose passages reflow),
//!   then held to the same bound tolerance so repeated words stay distinct

use crate::text::{Utf16Index, utf16_len};
use crate::types::{Annotation, ContextKey, TextRange};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchStrategy {
    OffsetProximity { tolerance: usize },
    TextSearch { tolerance: usize },
}

impl MatchStrategy {
    /// The record a save at `range` should update, if any.
    ///
    /// Tombstones are candidates too: re-saving a cleared range revives the
    /// record instead of minting a duplicate. When several records qualify the
    /// closest one wins.
    ///
    /// `content` is the context's current plain text. Text-search candidates
    /// are compared at the position they re-anchor to in it, falling back to
    /// the stored offsets when the text no longer occurs.
    pub fn find_existing<'a>(
        &self,
        annotations: &'a [Annotation],
        context: &ContextKey,
        range: TextRange,
        text: &str,
        content: &str,
    ) -> Option<&'a Annotation> {
        let in_context = annotations.iter().filter(|a| &a.context_key == context);
        match *self {
            MatchStrategy::OffsetProximity { tolerance } => in_context
                .filter(|a| within(a.range(), range, tolerance))
                .min_by_key(|a| distance(a.range(), range)),
            MatchStrategy::TextSearch { tolerance } => {
                let text = text.trim();
                in_context
                    .filter(|a| a.text.trim() == text)
                    .filter_map(|a| {
                        let live = self.reanchor(a, content).unwrap_or_else(|| a.range());
                        within(live, range, tolerance).then(|| (a, distance(live, range)))
                    })
                    .min_by_key(|(_, d)| *d)
                    .map(|(a, _)| a)
            }
        }
    }

    /// Where `annotation` lives in `content` right now.
    ///
    /// Proximity contexts trust the stored offsets, clipped to the content.
    /// Text-search contexts look for the stored text, preferring the
    /// occurrence nearest the stored start.
    pub fn reanchor(&self, annotation: &Annotation, content: &str) -> Option<TextRange> {
        let index = Utf16Index::new(content);
        match self {
            MatchStrategy::OffsetProximity { .. } => {
                let range = annotation.range().clip(index.len_utf16());
                (!range.is_empty()).then_some(range)
            }
            MatchStrategy::TextSearch { .. } => {
                let len = utf16_len(&annotation.text);
                index
                    .find_all(&annotation.text)
                    .into_iter()
                    .min_by_key(|start| start.abs_diff(annotation.start_offset))
                    .map(|start| TextRange::new(start, start + len))
            }
        }
    }
}

/// A live (non-tombstone) annotation at exactly `range`.
pub fn find_exact<'a>(
    annotations: &'a [Annotation],
    context: &ContextKey,
    range: TextRange,
) -> Option<&'a Annotation> {
    annotations
        .iter()
        .rev()
        .find(|a| &a.context_key == context && a.range() == range && !a.is_tombstone())
}

fn within(a: TextRange, b: TextRange, tolerance: usize) -> bool {
    a.start.abs_diff(b.start) <= tolerance && a.end.abs_diff(b.end) <= tolerance
}

fn distance(a: TextRange, b: TextRange) -> usize {
    a.start.abs_diff(b.start) + a.end.abs_diff(b.end)
}

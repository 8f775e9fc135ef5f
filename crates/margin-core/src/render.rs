//! Highlight rendering: partition passage text into styled segments.
//!
//! One pass stamps each highlight's identity over its range (later highlights
//! win on overlap), then one left-to-right scan merges consecutive characters
//! with the same `(owner, hovered-sentence)` state. Segment count is bounded
//! by state transitions, not by the number of annotations.

use crate::color::HighlightColor;
use crate::text::Utf16Index;
use crate::types::{Annotation, AnnotationId, ContextKey, InteractionState, TextRange};

/// How a highlight is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HighlightMode {
    /// Solid colour-block background: no note attached.
    Block,
    /// Coloured underline: the annotation carries a note.
    Underline,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HighlightStyle {
    pub annotation_id: AnnotationId,
    pub color: HighlightColor,
    pub mode: HighlightMode,
    /// Active, hovered or being edited: stronger background plus ring.
    pub active: bool,
}

/// A maximal run of text sharing one visual state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment<'t> {
    pub text: &'t str,
    pub range: TextRange,
    pub highlight: Option<HighlightStyle>,
    /// Inside the hovered sentence and not owned by any highlight.
    pub sentence_hover: bool,
    /// Last run of a note-bearing highlight; draw the note marker after it.
    pub note_indicator: bool,
}

/// Annotations of `context` that should be drawn as highlights, ordered by
/// start offset. Colourless records (note-only or tombstones) are excluded.
pub fn visible_highlights<'a>(
    annotations: &'a [Annotation],
    context: &ContextKey,
) -> Vec<&'a Annotation> {
    let mut visible: Vec<_> = annotations
        .iter()
        .filter(|a| &a.context_key == context && a.color.is_some())
        .collect();
    visible.sort_by_key(|a| a.start_offset);
    visible
}

/// Renderer bound to one passage text. Reusable across UI state changes.
pub struct HighlightRenderer<'t> {
    index: Utf16Index<'t>,
}

impl<'t> HighlightRenderer<'t> {
    pub fn new(text: &'t str) -> Self {
        Self {
            index: Utf16Index::new(text),
        }
    }

    pub fn text(&self) -> &'t str {
        self.index.text()
    }

    /// Partition the text.
    ///
    /// `highlights` are stamped in slice order; offsets past the end of the
    /// text are clipped. Colourless entries are skipped.
    pub fn render(
        &self,
        highlights: &[&Annotation],
        ui: &InteractionState,
        hovered_sentence: Option<TextRange>,
    ) -> Vec<Segment<'t>> {
        let text = self.index.text();
        let len = self.index.len_utf16();
        if text.is_empty() {
            return Vec::new();
        }

        let mut owners: Vec<Option<usize>> = vec![None; len];
        for (i, annotation) in highlights.iter().enumerate() {
            if annotation.color.is_none() {
                continue;
            }
            let range = annotation.range().clip(len);
            for slot in &mut owners[range.start..range.end] {
                *slot = Some(i);
            }
        }

        let hovered = hovered_sentence.map(|r| r.clip(len));
        let state_at = |unit: usize| {
            let owner = owners[unit];
            let hover = owner.is_none() && hovered.is_some_and(|r| r.contains(unit));
            (owner, hover)
        };

        struct Run {
            state: (Option<usize>, bool),
            bytes: (usize, usize),
            units: (usize, usize),
        }

        let mut runs: Vec<Run> = Vec::new();
        let mut unit = 0;
        for (byte, ch) in text.char_indices() {
            let state = state_at(unit);
            let next_unit = unit + ch.len_utf16();
            let next_byte = byte + ch.len_utf8();
            match runs.last_mut() {
                Some(run) if run.state == state => {
                    run.bytes.1 = next_byte;
                    run.units.1 = next_unit;
                }
                _ => runs.push(Run {
                    state,
                    bytes: (byte, next_byte),
                    units: (unit, next_unit),
                }),
            }
            unit = next_unit;
        }

        let mut owned: Vec<(Option<usize>, Segment<'t>)> = runs
            .into_iter()
            .map(|run| {
                let (owner, sentence_hover) = run.state;
                let segment = Segment {
                    text: &text[run.bytes.0..run.bytes.1],
                    range: TextRange::new(run.units.0, run.units.1),
                    highlight: owner.and_then(|i| style_for(highlights[i], ui)),
                    sentence_hover,
                    note_indicator: false,
                };
                (owner, segment)
            })
            .collect();

        // Mark the final run of each note-bearing highlight.
        let mut marked = vec![false; highlights.len()];
        for (owner, segment) in owned.iter_mut().rev() {
            if let Some(i) = *owner {
                if !marked[i] && highlights[i].has_note() {
                    segment.note_indicator = true;
                }
                marked[i] = true;
            }
        }
        let segments: Vec<Segment<'t>> = owned.into_iter().map(|(_, s)| s).collect();

        tracing::trace!(
            highlights = highlights.len(),
            segments = segments.len(),
            "rendered highlight segments"
        );
        segments
    }
}

fn style_for(annotation: &Annotation, ui: &InteractionState) -> Option<HighlightStyle> {
    let color = annotation.color?;
    let mode = if annotation.has_note() {
        HighlightMode::Underline
    } else {
        HighlightMode::Block
    };
    Some(HighlightStyle {
        annotation_id: annotation.id.clone(),
        color,
        mode,
        active: ui.is_emphasised(&annotation.id),
    })
}

//! Core annotation types: records, context identity, pending selections and
//! the transient UI state shared between the text view and the sidebar.
//!
//! All offsets are UTF-16 code units into the plain-text content of a context,
//! matching what a browser reports for live DOM text.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::color::{self, HighlightColor};

/// Opaque, stable annotation identifier. Assigned at first save.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationId(pub SmolStr);

impl AnnotationId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(SmolStr::new(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AnnotationId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Identifies which passage, unit or exam an annotation belongs to.
///
/// This is the partition key for every query; it never changes after creation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextKey(pub SmolStr);

impl ContextKey {
    pub fn new(key: impl AsRef<str>) -> Self {
        Self(SmolStr::new(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContextKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// What kind of view hosts a context. Drives the matching strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextKind {
    #[default]
    Reading,
    Listening,
    Exam,
    /// Exam review, where passages may reformat between save and display.
    ExamReview,
}

/// A context key paired with the kind of view it is shown in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotationContext {
    pub key: ContextKey,
    pub kind: ContextKind,
}

impl AnnotationContext {
    pub fn new(key: impl Into<ContextKey>, kind: ContextKind) -> Self {
        Self {
            key: key.into(),
            kind,
        }
    }
}

/// A half-open `[start, end)` UTF-16 range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    /// Create a range, ordering the bounds.
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }

    /// Clip both bounds to `len`.
    pub fn clip(&self, len: usize) -> Self {
        Self {
            start: self.start.min(len),
            end: self.end.min(len),
        }
    }

    pub fn to_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for TextRange {
    fn from(r: Range<usize>) -> Self {
        Self::new(r.start, r.end)
    }
}

/// One user mark on a text passage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: AnnotationId,
    pub context_key: ContextKey,
    pub start_offset: usize,
    pub end_offset: usize,
    /// Literal substring at save time. Fallback matcher when content reflows.
    pub text: String,
    #[serde(default, with = "color::optional")]
    pub color: Option<HighlightColor>,
    #[serde(default)]
    pub note: String,
    /// Creation/update time, milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Legacy sentence-level anchor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentence_index: Option<usize>,
}

impl Annotation {
    pub fn range(&self) -> TextRange {
        TextRange::new(self.start_offset, self.end_offset)
    }

    /// Whether the note has any non-whitespace content.
    pub fn has_note(&self) -> bool {
        !self.note.trim().is_empty()
    }

    /// Cleared colour and note: semantically deleted.
    pub fn is_tombstone(&self) -> bool {
        self.color.is_none() && !self.has_note()
    }

    /// The same record with colour and note cleared.
    pub fn cleared(&self, timestamp: i64) -> Self {
        Self {
            color: None,
            note: String::new(),
            timestamp,
            ..self.clone()
        }
    }
}

/// Screen point in client coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in client coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Zero width or height, as some browsers report for collapsed edge cases.
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Anchor for the floating menu.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct MenuPosition {
    pub top: f64,
    pub left: f64,
}

/// A captured selection waiting for save or cancel. Never persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingSelection {
    pub range: TextRange,
    pub text: String,
    pub menu_position: MenuPosition,
    pub selected_color: Option<HighlightColor>,
    pub note_input: String,
    /// The annotation this menu was opened on, if it re-opened an exact match.
    pub existing: Option<AnnotationId>,
    /// Set when "add note" created a record during this menu session.
    pub created: Option<AnnotationId>,
}

/// Transient UI state shared by the text view and the sidebar.
///
/// Both sides read all three ids; each side sets and clears `hovered`
/// independently.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InteractionState {
    pub active: Option<AnnotationId>,
    pub hovered: Option<AnnotationId>,
    pub editing: Option<AnnotationId>,
}

impl InteractionState {
    pub fn hover(&mut self, id: &AnnotationId) {
        self.hovered = Some(id.clone());
    }

    /// Clear the hover only if it still points at `id`.
    pub fn unhover(&mut self, id: &AnnotationId) {
        if self.hovered.as_ref() == Some(id) {
            self.hovered = None;
        }
    }

    /// Active, hovered, or being edited.
    pub fn is_emphasised(&self, id: &AnnotationId) -> bool {
        self.active.as_ref() == Some(id)
            || self.hovered.as_ref() == Some(id)
            || self.editing.as_ref() == Some(id)
    }
}

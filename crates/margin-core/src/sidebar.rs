//! Sidebar of note cards.
//!
//! Shows every annotation of the context with a non-empty note, plus the one
//! currently being edited (so a fresh "add note" target shows up at once).
//! Edits are proposed to the host through an [`AnnotationSink`].

use crate::color::HighlightColor;
use crate::platform::{Clock, SystemClock};
use crate::store::AnnotationSink;
use crate::types::{Annotation, AnnotationId, ContextKey, InteractionState};

/// One card as the host should draw it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SidebarCard<'a> {
    pub id: &'a AnnotationId,
    pub color: Option<HighlightColor>,
    /// Source text, truncated for display.
    pub preview: String,
    pub note: &'a str,
    /// In edit mode the host shows a text area holding [`AnnotationSidebar::draft`].
    pub editing: bool,
    pub hovered: bool,
    pub active: bool,
}

/// Scroll requests the host carries out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SidebarEffect {
    ScrollHighlightIntoView(AnnotationId),
    ScrollCardIntoView(AnnotationId),
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct EditSession {
    id: AnnotationId,
    draft: String,
    /// Never had a saved note before this session.
    newly_created: bool,
}

pub struct AnnotationSidebar<C = SystemClock> {
    context: ContextKey,
    preview_chars: usize,
    editing: Option<EditSession>,
    clock: C,
}

impl AnnotationSidebar<SystemClock> {
    pub fn new(context: ContextKey, preview_chars: usize) -> Self {
        Self::with_clock(context, preview_chars, SystemClock)
    }
}

impl<C: Clock> AnnotationSidebar<C> {
    pub fn with_clock(context: ContextKey, preview_chars: usize, clock: C) -> Self {
        Self {
            context,
            preview_chars,
            editing: None,
            clock,
        }
    }

    pub fn editing_id(&self) -> Option<&AnnotationId> {
        self.editing.as_ref().map(|e| &e.id)
    }

    pub fn draft(&self) -> Option<&str> {
        self.editing.as_ref().map(|e| e.draft.as_str())
    }

    /// Cards for the context, in the order the host supplied the records.
    pub fn cards<'a>(
        &self,
        annotations: &'a [Annotation],
        ui: &InteractionState,
    ) -> Vec<SidebarCard<'a>> {
        let editing = self.editing_id();
        annotations
            .iter()
            .filter(|a| a.context_key == self.context)
            .filter(|a| a.has_note() || Some(&a.id) == editing)
            .map(|a| SidebarCard {
                id: &a.id,
                color: a.color,
                preview: truncate(&a.text, self.preview_chars),
                note: a.note.as_str(),
                editing: Some(&a.id) == editing,
                hovered: ui.hovered.as_ref() == Some(&a.id),
                active: ui.active.as_ref() == Some(&a.id),
            })
            .collect()
    }

    /// Start editing a record. `newly_created` marks a record minted by the
    /// current interaction, which a cancel must withdraw.
    pub fn begin_edit(
        &mut self,
        annotation: &Annotation,
        newly_created: bool,
        ui: &mut InteractionState,
    ) {
        self.editing = Some(EditSession {
            id: annotation.id.clone(),
            draft: annotation.note.clone(),
            newly_created: newly_created && !annotation.has_note(),
        });
        ui.editing = Some(annotation.id.clone());
        ui.active = Some(annotation.id.clone());
    }

    /// Clicking a card that is not being edited enters edit mode and asks the
    /// host to scroll the matching highlight into view.
    pub fn click_card(
        &mut self,
        annotation: &Annotation,
        ui: &mut InteractionState,
    ) -> Option<SidebarEffect> {
        if self.editing_id() == Some(&annotation.id) {
            return None;
        }
        self.begin_edit(annotation, false, ui);
        Some(SidebarEffect::ScrollHighlightIntoView(annotation.id.clone()))
    }

    /// Clicking a highlight in the text scrolls its card into view.
    pub fn click_highlight(&self, id: &AnnotationId, ui: &mut InteractionState) -> SidebarEffect {
        ui.active = Some(id.clone());
        SidebarEffect::ScrollCardIntoView(id.clone())
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        if let Some(session) = &mut self.editing {
            session.draft = text.into();
        }
    }

    pub fn hover_card(&self, id: &AnnotationId, ui: &mut InteractionState) {
        ui.hover(id);
    }

    pub fn leave_card(&self, id: &AnnotationId, ui: &mut InteractionState) {
        ui.unhover(id);
    }

    /// Save the draft. An empty draft behaves exactly like [`cancel`](Self::cancel).
    pub fn save(
        &mut self,
        annotations: &[Annotation],
        ui: &mut InteractionState,
        sink: &mut impl AnnotationSink,
    ) -> Option<Annotation> {
        let draft = self.editing.as_ref()?.draft.trim().to_owned();
        if draft.is_empty() {
            self.cancel(annotations, ui, sink);
            return None;
        }
        let session = self.finish(ui)?;
        let Some(existing) = annotations.iter().find(|a| a.id == session.id) else {
            tracing::warn!(id = %session.id, "edited annotation no longer in store");
            return None;
        };
        let updated = Annotation {
            note: draft,
            timestamp: self.clock.now_millis(),
            ..existing.clone()
        };
        tracing::debug!(id = %updated.id, "sidebar note saved");
        sink.save(updated.clone());
        Some(updated)
    }

    /// Leave edit mode. A record created in this session with no saved note
    /// is withdrawn (colour and note cleared) rather than left as an
    /// invisible orphan.
    pub fn cancel(
        &mut self,
        annotations: &[Annotation],
        ui: &mut InteractionState,
        sink: &mut impl AnnotationSink,
    ) {
        let Some(session) = self.finish(ui) else {
            return;
        };
        if !session.newly_created {
            return;
        }
        if let Some(existing) = annotations.iter().find(|a| a.id == session.id) {
            tracing::debug!(id = %session.id, "withdrawing unsaved new annotation");
            sink.withdraw(existing.cleared(self.clock.now_millis()));
        }
    }

    /// Delete immediately by clearing colour and note.
    pub fn delete(
        &mut self,
        annotation: &Annotation,
        ui: &mut InteractionState,
        sink: &mut impl AnnotationSink,
    ) -> Annotation {
        if self.editing_id() == Some(&annotation.id) {
            self.finish(ui);
        }
        ui.unhover(&annotation.id);
        if ui.active.as_ref() == Some(&annotation.id) {
            ui.active = None;
        }
        let cleared = annotation.cleared(self.clock.now_millis());
        tracing::debug!(id = %cleared.id, "sidebar delete");
        sink.save(cleared.clone());
        cleared
    }

    fn finish(&mut self, ui: &mut InteractionState) -> Option<EditSession> {
        let session = self.editing.take()?;
        if ui.editing.as_ref() == Some(&session.id) {
            ui.editing = None;
        }
        Some(session)
    }
}

/// Truncate to `max` chars, appending an ellipsis when shortened.
fn truncate(text: &str, max: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max) {
        Some((byte, _)) => format!("{}…", text[..byte].trim_end()),
        None => text.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::AnnotationStore;

    struct FixedClock;

    impl Clock for FixedClock {
        fn now_millis(&self) -> i64 {
            42
        }
    }

    fn ann(id: &str, note: &str) -> Annotation {
        Annotation {
            id: id.into(),
            context_key: "ctx".into(),
            start_offset: 4,
            end_offset: 13,
            text: "quick fox".into(),
            color: Some(HighlightColor::Yellow),
            note: note.into(),
            timestamp: 0,
            sentence_index: None,
        }
    }

    fn sidebar() -> AnnotationSidebar<FixedClock> {
        AnnotationSidebar::with_clock("ctx".into(), 40, FixedClock)
    }

    #[test]
    fn only_noted_annotations_get_cards() {
        let list = vec![ann("plain", ""), ann("noted", "idiom?"), ann("blank", "   ")];
        let s = sidebar();
        let cards = s.cards(&list, &InteractionState::default());
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].id.as_str(), "noted");
        assert_eq!(cards[0].note, "idiom?");
        assert_eq!(cards[0].preview, "quick fox");
    }

    #[test]
    fn editing_target_shows_even_without_note() {
        let list = vec![ann("fresh", "")];
        let mut s = sidebar();
        let mut ui = InteractionState::default();
        s.begin_edit(&list[0], true, &mut ui);
        let cards = s.cards(&list, &ui);
        assert_eq!(cards.len(), 1);
        assert!(cards[0].editing);
        assert!(cards[0].active);
        assert_eq!(ui.editing, Some("fresh".into()));
    }

    #[test]
    fn tombstones_never_get_cards() {
        let list = vec![ann("gone", "").cleared(1)];
        let cards = sidebar().cards(&list, &InteractionState::default());
        assert!(cards.is_empty());
    }

    #[test]
    fn click_card_then_highlight_round_trip() {
        let list = vec![ann("a", "note")];
        let mut s = sidebar();
        let mut ui = InteractionState::default();
        assert_eq!(
            s.click_card(&list[0], &mut ui),
            Some(SidebarEffect::ScrollHighlightIntoView("a".into()))
        );
        assert_eq!(s.draft(), Some("note"));
        // Clicking the card being edited does nothing.
        assert_eq!(s.click_card(&list[0], &mut ui), None);
        assert_eq!(
            s.click_highlight(&"a".into(), &mut ui),
            SidebarEffect::ScrollCardIntoView("a".into())
        );
    }

    #[test]
    fn save_updates_note() {
        let mut store = AnnotationStore::from_records(vec![ann("a", "old")]);
        let mut s = sidebar();
        let mut ui = InteractionState::default();
        s.click_card(&store.as_slice()[0].clone(), &mut ui);
        s.set_draft("  new note ");
        let snapshot = store.clone();
        let saved = s.save(snapshot.as_slice(), &mut ui, &mut store).unwrap();
        assert_eq!(saved.note, "new note");
        assert_eq!(saved.timestamp, 42);
        assert_eq!(store.as_slice()[0].note, "new note");
        assert_eq!(s.editing_id(), None);
        assert_eq!(ui.editing, None);
    }

    #[test]
    fn empty_save_on_new_annotation_withdraws_it() {
        let before = AnnotationStore::new();
        let mut store = before.clone();
        store.upsert(ann("fresh", ""));
        let mut s = sidebar();
        let mut ui = InteractionState::default();
        s.begin_edit(&store.as_slice()[0].clone(), true, &mut ui);
        s.set_draft("   ");
        let snapshot = store.clone();
        assert!(s.save(snapshot.as_slice(), &mut ui, &mut store).is_none());
        assert_eq!(store, before);
    }

    #[test]
    fn cancel_on_existing_note_keeps_it() {
        let mut store = AnnotationStore::from_records(vec![ann("a", "keep me")]);
        let mut s = sidebar();
        let mut ui = InteractionState::default();
        s.click_card(&store.as_slice()[0].clone(), &mut ui);
        s.set_draft("");
        let snapshot = store.clone();
        s.cancel(snapshot.as_slice(), &mut ui, &mut store);
        assert_eq!(store.as_slice()[0].note, "keep me");
    }

    #[test]
    fn cancel_through_upsert_only_host_clears_fields() {
        let mut saved = Vec::new();
        let list = vec![ann("fresh", "")];
        let mut s = sidebar();
        let mut ui = InteractionState::default();
        s.begin_edit(&list[0], true, &mut ui);
        s.cancel(&list, &mut ui, &mut |a: Annotation| saved.push(a));
        assert_eq!(saved.len(), 1);
        assert!(saved[0].is_tombstone());
    }

    #[test]
    fn delete_clears_and_resets_ui() {
        let mut store = AnnotationStore::from_records(vec![ann("a", "note")]);
        let mut s = sidebar();
        let mut ui = InteractionState::default();
        let target = store.as_slice()[0].clone();
        s.click_card(&target, &mut ui);
        s.hover_card(&target.id, &mut ui);
        let cleared = s.delete(&target, &mut ui, &mut store);
        assert!(cleared.is_tombstone());
        assert_eq!(ui, InteractionState::default());
        assert!(s.cards(store.as_slice(), &ui).is_empty());
    }

    #[test]
    fn hover_is_shared_but_cleared_independently() {
        let s = sidebar();
        let mut ui = InteractionState::default();
        let a: AnnotationId = "a".into();
        let b: AnnotationId = "b".into();
        s.hover_card(&a, &mut ui);
        // The text view hovers another span before the card's leave fires.
        ui.hover(&b);
        s.leave_card(&a, &mut ui);
        assert_eq!(ui.hovered, Some(b));
    }

    #[test]
    fn truncates_long_previews() {
        assert_eq!(truncate("abcdef", 3), "abc…");
        assert_eq!(truncate("ab cdef", 3), "ab…");
        assert_eq!(truncate("가나다", 3), "가나다");
    }
}

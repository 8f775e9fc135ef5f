//! Interactive selection lifecycle.
//!
//! `Idle -> MenuOpen` on a mouse-up that yields a usable selection inside the
//! bound container. From `MenuOpen` the menu either commits (save, colour
//! choice, blur with a note) or cancels (cancel, click-away, blur without a
//! note). Both end back in `Idle` with the live selection cleared.

use crate::color::HighlightColor;
use crate::config::EngineConfig;
use crate::matching::{MatchStrategy, find_exact};
use crate::platform::{Clock, SelectionProvider, SystemClock};
use crate::store::AnnotationSink;
use crate::types::{
    Annotation, AnnotationContext, AnnotationId, MenuPosition, PendingSelection, Point, Rect,
};

#[derive(Clone, Debug, PartialEq, Default)]
pub enum ControllerState {
    #[default]
    Idle,
    MenuOpen(PendingSelection),
}

/// What the floating menu needs to draw itself.
#[derive(Clone, Debug, PartialEq)]
pub struct MenuView<'a> {
    pub visible: bool,
    pub position: MenuPosition,
    pub selection_text: &'a str,
    pub selected_color: Option<HighlightColor>,
    pub note_input: &'a str,
    /// The menu re-opened an existing annotation; the host shows "delete".
    pub editing_existing: bool,
}

/// Result of "add note": the record the note will attach to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoteTarget {
    pub id: AnnotationId,
    /// Minted by this action. Cancelling without a note must withdraw it.
    pub newly_created: bool,
}

/// Drives selection -> menu -> commit/cancel for one context.
pub struct SelectionController<P, C = SystemClock> {
    provider: P,
    clock: C,
    context: AnnotationContext,
    strategy: MatchStrategy,
    menu_offset: f64,
    state: ControllerState,
    /// Container text as of the last mouse-up that opened the menu.
    content: String,
    minted: u64,
}

impl<P: SelectionProvider> SelectionController<P, SystemClock> {
    pub fn new(provider: P, context: AnnotationContext, config: &EngineConfig) -> Self {
        Self::with_clock(provider, SystemClock, context, config)
    }
}

impl<P: SelectionProvider, C: Clock> SelectionController<P, C> {
    pub fn with_clock(
        provider: P,
        clock: C,
        context: AnnotationContext,
        config: &EngineConfig,
    ) -> Self {
        let strategy = config.strategy_for(context.kind);
        Self {
            provider,
            clock,
            context,
            strategy,
            menu_offset: config.menu_offset,
            state: ControllerState::Idle,
            content: String::new(),
            minted: 0,
        }
    }

    pub fn context(&self) -> &AnnotationContext {
        &self.context
    }

    pub fn strategy(&self) -> MatchStrategy {
        self.strategy
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn pending(&self) -> Option<&PendingSelection> {
        match &self.state {
            ControllerState::MenuOpen(pending) => Some(pending),
            ControllerState::Idle => None,
        }
    }

    pub fn is_menu_open(&self) -> bool {
        self.pending().is_some()
    }

    pub fn menu(&self) -> MenuView<'_> {
        match &self.state {
            ControllerState::MenuOpen(p) => MenuView {
                visible: true,
                position: p.menu_position,
                selection_text: &p.text,
                selected_color: p.selected_color,
                note_input: &p.note_input,
                editing_existing: p.existing.is_some(),
            },
            ControllerState::Idle => MenuView {
                visible: false,
                position: MenuPosition::default(),
                selection_text: "",
                selected_color: None,
                note_input: "",
                editing_existing: false,
            },
        }
    }

    /// Handle the end of a pointer selection gesture.
    ///
    /// Returns `true` if the menu opened. Missing, collapsed, whitespace-only
    /// or out-of-container selections are ignored without any state change.
    ///
    /// A new selection while the menu is open replaces it, cancelling the
    /// old one: a record "add note" minted for it is withdrawn through `sink`.
    pub fn handle_mouse_up(
        &mut self,
        pointer: Point,
        annotations: &[Annotation],
        sink: &mut impl AnnotationSink,
    ) -> bool {
        let container = match self.provider.container_text() {
            Ok(container) => container,
            Err(e) => {
                tracing::debug!(error = %e, "container text unavailable, ignoring selection");
                return false;
            }
        };
        let Some(raw) = self.provider.read_selection(&container) else {
            return false;
        };
        let Some(mapped) = container.map_selection(&raw) else {
            tracing::trace!("selection ignored");
            return false;
        };

        let withdrawn = match std::mem::take(&mut self.state) {
            ControllerState::MenuOpen(previous) => self.withdraw_created(&previous, sink),
            ControllerState::Idle => None,
        };
        let existing = find_exact(annotations, &self.context.key, mapped.range)
            .filter(|a| Some(&a.id) != withdrawn.as_ref());
        let menu_position = self.menu_position(raw.bounding_rect, pointer);

        tracing::debug!(
            context = %self.context.key,
            start = mapped.range.start,
            end = mapped.range.end,
            existing = existing.is_some(),
            "annotation menu opened"
        );
        self.content = container.as_str().to_owned();

        self.state = ControllerState::MenuOpen(PendingSelection {
            range: mapped.range,
            text: mapped.text,
            menu_position,
            selected_color: existing.and_then(|a| a.color),
            note_input: existing.map(|a| a.note.clone()).unwrap_or_default(),
            existing: existing.map(|a| a.id.clone()),
            created: None,
        });
        true
    }

    pub fn set_note_input(&mut self, text: impl Into<String>) {
        if let ControllerState::MenuOpen(pending) = &mut self.state {
            pending.note_input = text.into();
        }
    }

    /// Pick a colour. For highlight-only flows this is an immediate save.
    pub fn choose_color(
        &mut self,
        color: HighlightColor,
        annotations: &[Annotation],
        sink: &mut impl AnnotationSink,
    ) -> Option<Annotation> {
        if let ControllerState::MenuOpen(pending) = &mut self.state {
            pending.selected_color = Some(color);
        }
        self.commit(annotations, sink)
    }

    /// Explicit save.
    pub fn save(
        &mut self,
        annotations: &[Annotation],
        sink: &mut impl AnnotationSink,
    ) -> Option<Annotation> {
        self.commit(annotations, sink)
    }

    /// Persist the pending range right away so a note can be attached to it.
    ///
    /// The menu stays open. If the record is new, cancelling or blurring
    /// without a note withdraws it again.
    pub fn add_note(
        &mut self,
        annotations: &[Annotation],
        sink: &mut impl AnnotationSink,
    ) -> Option<NoteTarget> {
        let pending = self.pending()?.clone();
        if let Some(id) = &pending.created {
            return Some(NoteTarget {
                id: id.clone(),
                newly_created: true,
            });
        }
        let (annotation, newly_created) = self.build_record(&pending, annotations);
        let id = annotation.id.clone();
        sink.save(annotation);

        if let ControllerState::MenuOpen(pending) = &mut self.state {
            pending.existing = Some(id.clone());
            if newly_created {
                pending.created = Some(id.clone());
            }
        }
        tracing::debug!(%id, newly_created, "note target saved");
        Some(NoteTarget { id, newly_created })
    }

    /// Focus left the note input: keep a typed note, otherwise cancel.
    pub fn blur(
        &mut self,
        annotations: &[Annotation],
        sink: &mut impl AnnotationSink,
    ) -> Option<Annotation> {
        let has_note = self
            .pending()
            .is_some_and(|p| !p.note_input.trim().is_empty());
        if has_note {
            self.commit(annotations, sink)
        } else {
            self.cancel(sink);
            None
        }
    }

    /// Close without saving. A record minted by "add note" in this session
    /// is withdrawn so no empty orphan is left behind.
    pub fn cancel(&mut self, sink: &mut impl AnnotationSink) {
        let ControllerState::MenuOpen(pending) = std::mem::take(&mut self.state) else {
            return;
        };
        self.withdraw_created(&pending, sink);
        self.provider.clear_selection();
    }

    /// Close without saving or withdrawing, e.g. when editing moves to the
    /// sidebar.
    pub fn dismiss(&mut self) {
        self.state = ControllerState::Idle;
        self.provider.clear_selection();
    }

    /// Clear the annotation under the menu (colour and note), leaving a
    /// tombstone for the host.
    pub fn delete(
        &mut self,
        annotations: &[Annotation],
        sink: &mut impl AnnotationSink,
    ) -> Option<Annotation> {
        let ControllerState::MenuOpen(pending) = std::mem::take(&mut self.state) else {
            return None;
        };
        self.provider.clear_selection();

        let target = pending
            .created
            .as_ref()
            .or(pending.existing.as_ref())
            .and_then(|id| annotations.iter().find(|a| &a.id == id))
            .or_else(|| {
                self.strategy.find_existing(
                    annotations,
                    &self.context.key,
                    pending.range,
                    &pending.text,
                    &self.content,
                )
            })?;
        let cleared = target.cleared(self.clock.now_millis());
        tracing::debug!(id = %cleared.id, "annotation cleared from menu");
        sink.save(cleared.clone());
        Some(cleared)
    }

    fn commit(
        &mut self,
        annotations: &[Annotation],
        sink: &mut impl AnnotationSink,
    ) -> Option<Annotation> {
        let ControllerState::MenuOpen(pending) = std::mem::take(&mut self.state) else {
            return None;
        };
        self.provider.clear_selection();

        let (annotation, newly_created) = self.build_record(&pending, annotations);
        if annotation.is_tombstone() {
            if newly_created {
                tracing::trace!("nothing to save for an empty new selection");
                return None;
            }
            if self.withdraw_created(&pending, sink).is_some() {
                return None;
            }
        }
        tracing::debug!(
            id = %annotation.id,
            newly_created,
            color = ?annotation.color,
            has_note = annotation.has_note(),
            "annotation committed"
        );
        sink.save(annotation.clone());
        Some(annotation)
    }

    /// Build the record a commit would save, reusing an existing id when the
    /// range matches one. The flag is `true` when a new id was minted.
    fn build_record(
        &mut self,
        pending: &PendingSelection,
        annotations: &[Annotation],
    ) -> (Annotation, bool) {
        let known = pending.created.clone().or_else(|| pending.existing.clone());
        let matched = known.or_else(|| {
            self.strategy
                .find_existing(
                    annotations,
                    &self.context.key,
                    pending.range,
                    &pending.text,
                    &self.content,
                )
                .map(|a| a.id.clone())
        });
        let newly_created = matched.is_none();
        let id = matched.unwrap_or_else(|| self.mint_id());
        let sentence_index = annotations
            .iter()
            .find(|a| a.id == id)
            .and_then(|a| a.sentence_index);

        let annotation = Annotation {
            id,
            context_key: self.context.key.clone(),
            start_offset: pending.range.start,
            end_offset: pending.range.end,
            text: pending.text.clone(),
            color: pending.selected_color,
            note: pending.note_input.trim().to_owned(),
            timestamp: self.clock.now_millis(),
            sentence_index,
        };
        (annotation, newly_created)
    }

    /// Withdraw the record "add note" minted during `pending`'s session, if
    /// any, and return its id.
    fn withdraw_created(
        &self,
        pending: &PendingSelection,
        sink: &mut impl AnnotationSink,
    ) -> Option<AnnotationId> {
        let id = pending.created.clone()?;
        let cleared = Annotation {
            id: id.clone(),
            context_key: self.context.key.clone(),
            start_offset: pending.range.start,
            end_offset: pending.range.end,
            text: pending.text.clone(),
            color: None,
            note: String::new(),
            timestamp: self.clock.now_millis(),
            sentence_index: None,
        };
        tracing::debug!(%id, "withdrawing annotation created this session");
        sink.withdraw(cleared);
        Some(id)
    }

    fn mint_id(&mut self) -> AnnotationId {
        self.minted += 1;
        AnnotationId::new(format!("ann-{}-{}", self.clock.now_millis(), self.minted))
    }

    fn menu_position(&self, rect: Option<Rect>, pointer: Point) -> MenuPosition {
        match rect.filter(|r| !r.is_degenerate()) {
            Some(r) => MenuPosition {
                top: r.y - self.menu_offset,
                left: r.x + r.width / 2.0,
            },
            None => MenuPosition {
                top: pointer.y - self.menu_offset,
                left: pointer.x,
            },
        }
    }
}

//! Select, highlight, annotate and delete through the public API.

use std::cell::{Cell, RefCell};

use margin_core::{
    AnnotationContext, AnnotationSidebar, AnnotationStore, Clock, ContainerText, ContextKind,
    EngineConfig, HighlightColor, HighlightMode, HighlightRenderer, InteractionState,
    PlatformError, Point, RawSelection, Rect, Segment, SelectionController, SelectionProvider,
    visible_highlights,
};

const TEXT: &str = "The quick fox jumped.";

struct FakeSelection {
    selection: RefCell<Option<RawSelection>>,
}

impl FakeSelection {
    fn select(&self, start: usize, end: usize) {
        let container = ContainerText::from_runs([TEXT]);
        *self.selection.borrow_mut() = Some(RawSelection {
            anchor: container.point_at(start),
            focus: container.point_at(end),
            bounding_rect: Some(Rect::new(10.0, 50.0, 60.0, 18.0)),
        });
    }
}

impl SelectionProvider for FakeSelection {
    fn container_text(&self) -> Result<ContainerText, PlatformError> {
        Ok(ContainerText::from_runs([TEXT]))
    }

    fn read_selection(&self, _container: &ContainerText) -> Option<RawSelection> {
        self.selection.borrow().clone()
    }

    fn clear_selection(&self) {
        self.selection.borrow_mut().take();
    }
}

struct Ticks(Cell<i64>);

impl Clock for Ticks {
    fn now_millis(&self) -> i64 {
        self.0.set(self.0.get() + 1);
        self.0.get()
    }
}

fn render(store: &AnnotationStore, ui: &InteractionState) -> Vec<Segment<'static>> {
    let highlights = visible_highlights(store.as_slice(), &"unit-1".into());
    HighlightRenderer::new(TEXT).render(&highlights, ui, None)
}

#[test]
fn highlight_then_note_then_delete() {
    let mut store = AnnotationStore::new();
    let ui = InteractionState::default();
    let mut controller = SelectionController::with_clock(
        FakeSelection {
            selection: RefCell::new(None),
        },
        Ticks(Cell::new(0)),
        AnnotationContext::new("unit-1", ContextKind::Reading),
        &EngineConfig::default(),
    );
    let sidebar = AnnotationSidebar::with_clock("unit-1".into(), 40, Ticks(Cell::new(0)));

    // Highlight "quick fox" in yellow.
    controller.provider().select(4, 13);
    let snapshot = store.clone();
    assert!(controller.handle_mouse_up(Point::new(0.0, 0.0), snapshot.as_slice(), &mut store));
    assert_eq!(controller.menu().selection_text, "quick fox");
    let snapshot = store.clone();
    controller
        .choose_color(HighlightColor::Yellow, snapshot.as_slice(), &mut store)
        .expect("saved");

    let segments = render(&store, &ui);
    let texts: Vec<_> = segments.iter().map(|s| s.text).collect();
    assert_eq!(texts, vec!["The ", "quick fox", " jumped."]);
    let style = segments[1].highlight.as_ref().unwrap();
    assert_eq!(style.color, HighlightColor::Yellow);
    assert_eq!(style.mode, HighlightMode::Block);
    assert!(!segments[1].note_indicator);
    assert!(sidebar.cards(store.as_slice(), &ui).is_empty());

    // Reselect the same range and add a note.
    controller.provider().select(4, 13);
    let snapshot = store.clone();
    assert!(controller.handle_mouse_up(Point::new(0.0, 0.0), snapshot.as_slice(), &mut store));
    assert!(controller.menu().editing_existing);
    assert_eq!(controller.menu().selected_color, Some(HighlightColor::Yellow));
    controller.set_note_input("idiom?");
    let snapshot = store.clone();
    controller.save(snapshot.as_slice(), &mut store).expect("saved");
    assert_eq!(store.len(), 1);

    let segments = render(&store, &ui);
    assert_eq!(segments.len(), 3);
    assert_eq!(
        segments[1].highlight.as_ref().unwrap().mode,
        HighlightMode::Underline
    );
    assert!(segments[1].note_indicator);
    let cards = sidebar.cards(store.as_slice(), &ui);
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].note, "idiom?");

    // Delete from the menu.
    controller.provider().select(4, 13);
    let snapshot = store.clone();
    assert!(controller.handle_mouse_up(Point::new(0.0, 0.0), snapshot.as_slice(), &mut store));
    let snapshot = store.clone();
    let cleared = controller
        .delete(snapshot.as_slice(), &mut store)
        .expect("deleted");
    assert!(cleared.is_tombstone());

    let segments = render(&store, &ui);
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].text, TEXT);
    assert!(segments[0].highlight.is_none());
    assert!(sidebar.cards(store.as_slice(), &ui).is_empty());
}

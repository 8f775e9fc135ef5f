//! margin-core: framework-free text annotation engine.
//!
//! This crate provides:
//! - `ContainerText` - maps DOM selection boundaries to UTF-16 offsets
//! - `SelectionController` - selection -> menu -> commit/cancel lifecycle
//! - `HighlightRenderer` - partitions passage text into styled segments
//! - `AnnotationSidebar` - note cards, edit mode, scroll-sync effects
//! - `MatchStrategy` - offset-proximity or text-search identity of annotations
//! - `PassageLoader` - stale-response guard for passage fetches
//!
//! The engine never owns the annotation list. Hosts pass it in and receive
//! proposed records through an `AnnotationSink`.

pub mod color;
pub mod config;
pub mod controller;
pub mod html;
pub mod matching;
pub mod offset;
pub mod passage;
pub mod platform;
pub mod render;
pub mod sentence;
pub mod sidebar;
pub mod store;
pub mod text;
pub mod types;

pub use color::{HighlightColor, UnknownColor};
pub use config::EngineConfig;
pub use controller::{ControllerState, MenuView, NoteTarget, SelectionController};
pub use html::render_html;
pub use matching::{MatchStrategy, find_exact};
pub use offset::{ContainerText, MappedSelection};
pub use passage::{
    Passage, PassageError, PassageLoader, PassageRequest, PassageSource, PassageState,
    Resolution, Ticket,
};
pub use platform::{
    BoundaryPoint, Clock, PlatformError, RawSelection, SelectionProvider, SystemClock,
};
pub use render::{HighlightMode, HighlightRenderer, HighlightStyle, Segment, visible_highlights};
pub use sentence::{annotations_for_sentence, sentence_at, sentence_ranges};
pub use sidebar::{AnnotationSidebar, SidebarCard, SidebarEffect};
pub use smol_str::SmolStr;
pub use store::{AnnotationSink, AnnotationStore};
pub use text::{Utf16Index, utf16_len};
pub use types::{
    Annotation, AnnotationContext, AnnotationId, ContextKey, ContextKind, InteractionState,
    MenuPosition, PendingSelection, Point, Rect, TextRange,
};

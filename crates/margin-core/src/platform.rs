//! Platform abstraction traits for the annotation engine.
//!
//! These traits are the seam between the engine logic and the host
//! environment (browser DOM, native UI, tests). The engine never reaches for
//! a global selection or clock; it is handed one.

use crate::offset::ContainerText;
use crate::types::Rect;

/// Error type for platform operations.
#[derive(Debug, Clone)]
pub struct PlatformError(pub String);

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for PlatformError {}

impl From<&str> for PlatformError {
    fn from(s: &str) -> Self {
        PlatformError(s.to_string())
    }
}

impl From<String> for PlatformError {
    fn from(s: String) -> Self {
        PlatformError(s)
    }
}

/// A selection boundary expressed against the container's text runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundaryPoint {
    /// Index into the container's text runs.
    pub run: usize,
    /// UTF-16 offset inside that run.
    pub offset: usize,
}

impl BoundaryPoint {
    pub fn new(run: usize, offset: usize) -> Self {
        Self { run, offset }
    }
}

/// The live selection as the platform reports it.
///
/// A boundary of `None` lies outside the bound container.
#[derive(Clone, Debug, PartialEq)]
pub struct RawSelection {
    pub anchor: Option<BoundaryPoint>,
    pub focus: Option<BoundaryPoint>,
    pub bounding_rect: Option<Rect>,
}

/// Current-selection capability bound to one container.
///
/// The browser implementation reads `window.getSelection()`; tests use a fake.
pub trait SelectionProvider {
    /// Text runs of the bound container, in document order.
    fn container_text(&self) -> Result<ContainerText, PlatformError>;

    /// The active selection measured against `container`, or `None` if there
    /// is none. `container` is the value `container_text` just returned.
    fn read_selection(&self, container: &ContainerText) -> Option<RawSelection>;

    /// Programmatically clear the live selection.
    fn clear_selection(&self);
}

/// Wall-clock source for annotation timestamps and canvas versions.
pub trait Clock {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

/// `web_time` backed clock; works on native and in the browser.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        web_time::SystemTime::now()
            .duration_since(web_time::UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or_default()
    }
}

impl<T: Clock> Clock for &T {
    fn now_millis(&self) -> i64 {
        (*self).now_millis()
    }
}

impl<T: Clock> Clock for std::rc::Rc<T> {
    fn now_millis(&self) -> i64 {
        (**self).now_millis()
    }
}

//! Loading and debounced saving of one canvas page.
//!
//! Network calls run as detached local tasks handed to a [`Spawner`], so
//! the host never holds a borrow of the persistence across an await. Task
//! results land in shared state guarded by generation counters: a fetch for
//! a page the user already left is discarded, and only the newest save
//! decides the save status.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use web_time::Instant;

use crate::canvas::CanvasListener;
use crate::config::CanvasConfig;
use crate::debounce::Debouncer;
use crate::error::PersistenceError;
use crate::stroke::{CanvasData, Stroke};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetType {
    Textbook,
    Exam,
}

/// Identifies one canvas page.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasKey {
    pub target_id: SmolStr,
    pub target_type: TargetType,
    pub page_index: u32,
}

impl CanvasKey {
    pub fn new(target_id: impl AsRef<str>, target_type: TargetType, page_index: u32) -> Self {
        Self {
            target_id: SmolStr::new(target_id),
            target_type,
            page_index,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    #[default]
    Private,
}

/// A stored canvas record as returned by the annotation service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasRecord {
    #[serde(default)]
    pub id: Option<SmolStr>,
    #[serde(flatten)]
    pub key: CanvasKey,
    pub data: CanvasData,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveCanvasRequest {
    #[serde(flatten)]
    pub key: CanvasKey,
    pub data: CanvasData,
    pub visibility: Visibility,
}

/// The remote canvas annotation service.
pub trait CanvasApi: Clone + 'static {
    /// Zero or one record is expected; the first is authoritative.
    fn get_canvas_annotations(
        &self,
        key: &CanvasKey,
    ) -> impl Future<Output = Result<Vec<CanvasRecord>, PersistenceError>>;

    fn save_canvas_annotation(
        &self,
        request: SaveCanvasRequest,
    ) -> impl Future<Output = Result<(), PersistenceError>>;
}

pub type LocalTask = Pin<Box<dyn Future<Output = ()>>>;

/// Runs detached tasks on the host's single-threaded executor.
pub trait Spawner {
    fn spawn(&self, task: LocalTask);
}

impl<F: Fn(LocalTask)> Spawner for F {
    fn spawn(&self, task: LocalTask) {
        self(task)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    /// `None` when nothing is stored for the page yet.
    Loaded(Option<CanvasData>),
    Failed(PersistenceError),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum SaveStatus {
    #[default]
    Idle,
    /// A debounced write is waiting for its quiet period.
    Pending,
    Saving,
    Saved {
        version: i64,
    },
    /// The host should show a "not saved" indicator.
    Failed(PersistenceError),
}

#[derive(Debug, Default)]
struct Shared {
    load: LoadState,
    load_generation: u64,
    save: SaveStatus,
    save_generation: u64,
}

pub struct CanvasPersistence<A: CanvasApi, S: Spawner> {
    api: A,
    spawner: S,
    key: CanvasKey,
    debouncer: Debouncer<SaveCanvasRequest>,
    shared: Rc<RefCell<Shared>>,
}

impl<A: CanvasApi, S: Spawner> CanvasPersistence<A, S> {
    /// Bind to a page and start fetching it.
    pub fn new(api: A, spawner: S, key: CanvasKey, config: &CanvasConfig) -> Self {
        let mut persistence = Self {
            api,
            spawner,
            key,
            debouncer: Debouncer::new(config.autosave_debounce),
            shared: Rc::default(),
        };
        persistence.reload();
        persistence
    }

    pub fn key(&self) -> &CanvasKey {
        &self.key
    }

    pub fn load_state(&self) -> LoadState {
        self.shared.borrow().load.clone()
    }

    /// Stored data once loaded, if any exists for the page.
    pub fn loaded(&self) -> Option<CanvasData> {
        match &self.shared.borrow().load {
            LoadState::Loaded(data) => data.clone(),
            _ => None,
        }
    }

    pub fn save_status(&self) -> SaveStatus {
        if self.debouncer.is_pending() {
            return SaveStatus::Pending;
        }
        self.shared.borrow().save.clone()
    }

    /// When the host should next call [`poll`](Self::poll).
    pub fn deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Switch pages. A pending write for the old page is sent right away,
    /// then the new page is fetched.
    pub fn set_key(&mut self, key: CanvasKey) {
        if key == self.key {
            return;
        }
        self.flush();
        tracing::debug!(target_id = %key.target_id, page = key.page_index, "canvas page changed");
        self.key = key;
        self.reload();
    }

    /// Fetch the current page. Earlier in-flight fetches become stale.
    pub fn reload(&mut self) {
        let generation = {
            let mut shared = self.shared.borrow_mut();
            shared.load_generation += 1;
            shared.load = LoadState::Loading;
            shared.load_generation
        };
        let api = self.api.clone();
        let key = self.key.clone();
        let shared = Rc::clone(&self.shared);
        self.spawner.spawn(Box::pin(async move {
            let result = api.get_canvas_annotations(&key).await;
            let mut shared = shared.borrow_mut();
            if shared.load_generation != generation {
                tracing::warn!(
                    target_id = %key.target_id,
                    page = key.page_index,
                    "discarding stale canvas fetch"
                );
                return;
            }
            shared.load = match result {
                Ok(records) => {
                    if records.len() > 1 {
                        tracing::debug!(
                            count = records.len(),
                            "multiple canvas records, using the first"
                        );
                    }
                    LoadState::Loaded(records.into_iter().next().map(|r| r.data))
                }
                Err(error) => {
                    tracing::warn!(%error, "canvas fetch failed");
                    LoadState::Failed(error)
                }
            };
        }));
    }

    /// Queue a debounced write of `data` for the current page.
    pub fn record_change(&mut self, data: CanvasData, now: Instant) {
        tracing::trace!(version = data.version, "canvas change queued");
        let request = self.request(data);
        self.debouncer.push(request, now);
    }

    /// Send the queued write if its quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.debouncer.poll(now) {
            Some(request) => {
                self.dispatch(request);
                true
            }
            None => false,
        }
    }

    /// Manual save: drop any queued write and persist `data` now.
    pub fn save_now(&mut self, data: CanvasData) {
        if self.debouncer.cancel() {
            tracing::trace!("queued canvas write superseded by manual save");
        }
        let request = self.request(data);
        self.dispatch(request);
    }

    /// Send the queued write immediately, if there is one.
    pub fn flush(&mut self) -> bool {
        match self.debouncer.take() {
            Some(request) => {
                self.dispatch(request);
                true
            }
            None => false,
        }
    }

    fn request(&self, data: CanvasData) -> SaveCanvasRequest {
        SaveCanvasRequest {
            key: self.key.clone(),
            data,
            visibility: Visibility::Private,
        }
    }

    fn dispatch(&self, request: SaveCanvasRequest) {
        let generation = {
            let mut shared = self.shared.borrow_mut();
            shared.save_generation += 1;
            shared.save = SaveStatus::Saving;
            shared.save_generation
        };
        let version = request.data.version;
        tracing::debug!(
            target_id = %request.key.target_id,
            page = request.key.page_index,
            version,
            lines = request.data.lines.len(),
            "saving canvas"
        );
        let api = self.api.clone();
        let shared = Rc::clone(&self.shared);
        self.spawner.spawn(Box::pin(async move {
            let result = api.save_canvas_annotation(request).await;
            let mut shared = shared.borrow_mut();
            if let Err(error) = &result {
                tracing::warn!(%error, version, "canvas save failed");
            }
            if shared.save_generation != generation {
                return;
            }
            shared.save = match result {
                Ok(()) => SaveStatus::Saved { version },
                Err(error) => SaveStatus::Failed(error),
            };
        }));
    }
}

impl<A: CanvasApi, S: Spawner> CanvasListener for CanvasPersistence<A, S> {
    fn on_change(&mut self, lines: &[Stroke], version: i64) {
        let data = CanvasData {
            lines: lines.to_vec(),
            version,
        };
        self.record_change(data, Instant::now());
    }
}

impl<A: CanvasApi, S: Spawner> Drop for CanvasPersistence<A, S> {
    /// Teardown never drops the user's last strokes.
    fn drop(&mut self) {
        if self.flush() {
            tracing::debug!("flushed pending canvas write on teardown");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::time::Duration;

    use super::*;
    use crate::tool::Tool;

    #[derive(Clone, Default)]
    struct FakeApi {
        stored: Rc<RefCell<Vec<CanvasRecord>>>,
        saved: Rc<RefCell<Vec<SaveCanvasRequest>>>,
        fail_saves: Rc<Cell<bool>>,
        fail_fetch: Rc<Cell<bool>>,
    }

    impl CanvasApi for FakeApi {
        fn get_canvas_annotations(
            &self,
            key: &CanvasKey,
        ) -> impl Future<Output = Result<Vec<CanvasRecord>, PersistenceError>> {
            let result = if self.fail_fetch.get() {
                Err(PersistenceError::Fetch("offline".into()))
            } else {
                Ok(self
                    .stored
                    .borrow()
                    .iter()
                    .filter(|r| &r.key == key)
                    .cloned()
                    .collect())
            };
            async move { result }
        }

        fn save_canvas_annotation(
            &self,
            request: SaveCanvasRequest,
        ) -> impl Future<Output = Result<(), PersistenceError>> {
            let result = if self.fail_saves.get() {
                Err(PersistenceError::Save("rejected".into()))
            } else {
                self.saved.borrow_mut().push(request);
                Ok(())
            };
            async move { result }
        }
    }

    /// Collects spawned tasks; the test decides when they run.
    #[derive(Clone, Default)]
    struct Queue(Rc<RefCell<Vec<LocalTask>>>);

    impl Spawner for Queue {
        fn spawn(&self, task: LocalTask) {
            self.0.borrow_mut().push(task);
        }
    }

    impl Queue {
        async fn run(&self) {
            loop {
                let tasks: Vec<_> = self.0.borrow_mut().drain(..).collect();
                if tasks.is_empty() {
                    break;
                }
                for task in tasks {
                    task.await;
                }
            }
        }

        fn len(&self) -> usize {
            self.0.borrow().len()
        }
    }

    fn key(page: u32) -> CanvasKey {
        CanvasKey::new("textbook-1", TargetType::Textbook, page)
    }

    fn data(version: i64, strokes: usize) -> CanvasData {
        let stroke = Stroke {
            id: "s".into(),
            tool: Tool::Pen,
            points: vec![0.0, 0.0, 1.0, 1.0],
            color: "#1f2937".into(),
            stroke_width: 2.0,
            opacity: 1.0,
        };
        CanvasData {
            lines: vec![stroke; strokes],
            version,
        }
    }

    fn open(api: &FakeApi, queue: &Queue) -> CanvasPersistence<FakeApi, Queue> {
        CanvasPersistence::new(api.clone(), queue.clone(), key(0), &CanvasConfig::default())
    }

    #[tokio::test]
    async fn loads_first_record_for_key() {
        let api = FakeApi::default();
        for version in [7, 8] {
            api.stored.borrow_mut().push(CanvasRecord {
                id: None,
                key: key(0),
                data: data(version, 1),
            });
        }
        let queue = Queue::default();
        let p = open(&api, &queue);
        assert_eq!(p.load_state(), LoadState::Loading);
        queue.run().await;
        assert_eq!(p.loaded().map(|d| d.version), Some(7));
    }

    #[tokio::test]
    async fn empty_page_loads_as_none() {
        let api = FakeApi::default();
        let queue = Queue::default();
        let p = open(&api, &queue);
        queue.run().await;
        assert_eq!(p.load_state(), LoadState::Loaded(None));
    }

    #[tokio::test]
    async fn stale_fetch_is_discarded() {
        let api = FakeApi::default();
        api.stored.borrow_mut().push(CanvasRecord {
            id: None,
            key: key(0),
            data: data(1, 1),
        });
        let queue = Queue::default();
        let mut p = open(&api, &queue);
        // Navigate before the first fetch resolves.
        p.set_key(key(1));
        queue.run().await;
        assert_eq!(p.load_state(), LoadState::Loaded(None));
    }

    #[tokio::test]
    async fn fetch_failure_is_recorded() {
        let api = FakeApi::default();
        api.fail_fetch.set(true);
        let queue = Queue::default();
        let p = open(&api, &queue);
        queue.run().await;
        assert!(matches!(p.load_state(), LoadState::Failed(PersistenceError::Fetch(_))));
    }

    #[tokio::test]
    async fn burst_of_changes_writes_latest_once() {
        let api = FakeApi::default();
        let queue = Queue::default();
        let mut p = open(&api, &queue);
        queue.run().await;

        let t0 = Instant::now();
        for i in 1..=5 {
            p.record_change(data(i, i as usize), t0 + Duration::from_millis(i as u64 * 100));
        }
        assert_eq!(p.save_status(), SaveStatus::Pending);
        assert!(!p.poll(t0 + Duration::from_millis(1400)));
        assert!(p.poll(t0 + Duration::from_millis(1500)));
        assert!(!p.poll(t0 + Duration::from_millis(9000)));
        assert_eq!(p.save_status(), SaveStatus::Saving);
        queue.run().await;

        let saved = api.saved.borrow();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].data, data(5, 5));
        assert_eq!(saved[0].visibility, Visibility::Private);
        assert_eq!(saved[0].key, key(0));
        drop(saved);
        assert_eq!(p.save_status(), SaveStatus::Saved { version: 5 });
    }

    #[tokio::test]
    async fn teardown_flushes_pending_write() {
        let api = FakeApi::default();
        let queue = Queue::default();
        let mut p = open(&api, &queue);
        p.record_change(data(3, 2), Instant::now());
        drop(p);
        queue.run().await;
        let saved = api.saved.borrow();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].data.version, 3);
    }

    #[tokio::test]
    async fn manual_save_cancels_pending_write() {
        let api = FakeApi::default();
        let queue = Queue::default();
        let mut p = open(&api, &queue);
        queue.run().await;
        let t0 = Instant::now();
        p.record_change(data(1, 1), t0);
        p.save_now(data(2, 2));
        assert!(!p.poll(t0 + Duration::from_secs(10)));
        queue.run().await;
        let saved = api.saved.borrow();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].data.version, 2);
    }

    #[tokio::test]
    async fn page_switch_writes_old_page_first() {
        let api = FakeApi::default();
        let queue = Queue::default();
        let mut p = open(&api, &queue);
        p.record_change(data(1, 1), Instant::now());
        p.set_key(key(4));
        // One fetch for page 0, one write for page 0, one fetch for page 4.
        assert_eq!(queue.len(), 3);
        queue.run().await;
        assert_eq!(api.saved.borrow()[0].key, key(0));
        assert_eq!(p.key(), &key(4));
    }

    #[tokio::test]
    async fn failed_save_keeps_strokes_and_reports() {
        let api = FakeApi::default();
        api.fail_saves.set(true);
        let queue = Queue::default();
        let mut p = open(&api, &queue);
        p.save_now(data(1, 1));
        queue.run().await;
        assert!(matches!(p.save_status(), SaveStatus::Failed(PersistenceError::Save(_))));
        assert!(api.saved.borrow().is_empty());
    }

    #[tokio::test]
    async fn wired_as_canvas_listener() {
        use crate::canvas::StrokeCanvas;
        use crate::surface::{DrawingSurface, FrameScheduler};
        use margin_core::Point;

        struct NullSurface;
        impl DrawingSurface for NullSurface {
            fn begin_stroke(&mut self, _: &Stroke) {}
            fn extend_stroke(&mut self, _: &[f64]) {}
            fn end_stroke(&mut self) {}
            fn redraw(&mut self, _: &[Stroke]) {}
            fn resize(&mut self, _: f64, _: f64) {}
        }
        impl FrameScheduler for () {
            fn request_frame(&mut self) {}
        }

        let api = FakeApi::default();
        let queue = Queue::default();
        let mut p = open(&api, &queue);
        let mut canvas = StrokeCanvas::new(NullSurface, (), CanvasConfig::default());
        canvas.pointer_down(Point::new(1.0, 1.0));
        canvas.pointer_move(Point::new(2.0, 2.0));
        canvas.pointer_up(&mut p);
        assert_eq!(p.save_status(), SaveStatus::Pending);
        assert!(p.flush());
        queue.run().await;
        assert_eq!(api.saved.borrow()[0].data, canvas.to_canvas_data());
    }

    #[test]
    fn request_wire_format() {
        let request = SaveCanvasRequest {
            key: key(2),
            data: CanvasData::default(),
            visibility: Visibility::Private,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "targetId": "textbook-1",
                "targetType": "TEXTBOOK",
                "pageIndex": 2,
                "data": { "lines": [], "version": 0 },
                "visibility": "PRIVATE"
            })
        );
    }
}

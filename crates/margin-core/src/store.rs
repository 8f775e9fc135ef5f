//! The upsert boundary between the engine and the host's annotation store.
//!
//! The engine never mutates the host's array. It proposes complete records
//! through an [`AnnotationSink`]; the host merges them by id.
//! [`AnnotationStore`] is a small in-memory host used by tests and simple
//! embeddings.

use crate::types::{Annotation, AnnotationId, ContextKey};

/// Receiver for records proposed by the engine.
pub trait AnnotationSink {
    /// Upsert a complete record by id.
    fn save(&mut self, annotation: Annotation);

    /// Retract a record created earlier in the same interaction that ended
    /// with nothing worth keeping. `annotation` arrives already cleared.
    ///
    /// Hosts that only support upserts get the cleared record saved.
    fn withdraw(&mut self, annotation: Annotation) {
        self.save(annotation);
    }
}

impl<F: FnMut(Annotation)> AnnotationSink for F {
    fn save(&mut self, annotation: Annotation) {
        self(annotation)
    }
}

/// In-memory, insertion-ordered annotation store.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnnotationStore {
    records: Vec<Annotation>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<Annotation>) -> Self {
        Self { records }
    }

    pub fn as_slice(&self) -> &[Annotation] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &AnnotationId) -> Option<&Annotation> {
        self.records.iter().find(|a| &a.id == id)
    }

    /// Records belonging to one context, in insertion order.
    pub fn for_context<'a>(
        &'a self,
        context: &'a ContextKey,
    ) -> impl Iterator<Item = &'a Annotation> + 'a {
        self.records.iter().filter(move |a| &a.context_key == context)
    }

    /// Replace the record with the same id, or append.
    pub fn upsert(&mut self, annotation: Annotation) {
        match self.records.iter_mut().find(|a| a.id == annotation.id) {
            Some(existing) => *existing = annotation,
            None => self.records.push(annotation),
        }
    }

    pub fn remove(&mut self, id: &AnnotationId) -> Option<Annotation> {
        let pos = self.records.iter().position(|a| &a.id == id)?;
        Some(self.records.remove(pos))
    }

    /// Drop every tombstone. Returns how many were removed.
    pub fn purge_tombstones(&mut self) -> usize {
        let before = self.records.len();
        self.records.retain(|a| !a.is_tombstone());
        before - self.records.len()
    }
}

impl AnnotationSink for AnnotationStore {
    fn save(&mut self, annotation: Annotation) {
        tracing::trace!(id = %annotation.id, "store upsert");
        self.upsert(annotation);
    }

    fn withdraw(&mut self, annotation: Annotation) {
        tracing::trace!(id = %annotation.id, "store withdraw");
        self.remove(&annotation.id);
    }
}

//! Passage fetching with a stale-response guard.
//!
//! Generation is slow and the user may move to another unit before a fetch
//! resolves. Every fetch carries a [`Ticket`]; only the newest ticket's
//! result is applied, so a late response never lands on the wrong context.

use std::future::Future;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Inputs to the passage generator.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassageRequest {
    pub institute_name: String,
    pub level: String,
    pub unit_number: u32,
    pub language: String,
    #[serde(default)]
    pub source_content: String,
}

/// Generated passage text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Passage {
    pub korean_text: String,
    #[serde(default)]
    pub english_translation: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Error, Diagnostic)]
#[non_exhaustive]
pub enum PassageError {
    #[error("passage source failed: {0}")]
    #[diagnostic(code(margin::passage::source))]
    Source(String),

    #[error("passage source returned no text")]
    #[diagnostic(code(margin::passage::empty))]
    Empty,
}

/// Remote passage generator. Opaque, possibly slow, possibly failing.
pub trait PassageSource {
    fn generate(
        &self,
        request: &PassageRequest,
    ) -> impl Future<Output = Result<Passage, PassageError>>;
}

/// Proof that a fetch was started; hand it back with the result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    request: PassageRequest,
}

impl Ticket {
    pub fn request(&self) -> &PassageRequest {
        &self.request
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum PassageState {
    #[default]
    Empty,
    Loading(PassageRequest),
    Ready {
        request: PassageRequest,
        passage: Passage,
    },
    Failed {
        request: PassageRequest,
        error: PassageError,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    /// A newer fetch started since; the result was dropped.
    Stale,
}

#[derive(Debug, Default)]
pub struct PassageLoader {
    generation: u64,
    state: PassageState,
}

impl PassageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PassageState {
        &self.state
    }

    pub fn passage(&self) -> Option<&Passage> {
        match &self.state {
            PassageState::Ready { passage, .. } => Some(passage),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, PassageState::Loading(_))
    }

    /// Start a fetch. Any earlier ticket becomes stale.
    pub fn begin(&mut self, request: PassageRequest) -> Ticket {
        self.generation += 1;
        tracing::debug!(
            generation = self.generation,
            unit = request.unit_number,
            "passage fetch started"
        );
        self.state = PassageState::Loading(request.clone());
        Ticket {
            generation: self.generation,
            request,
        }
    }

    /// Apply a result if `ticket` is still the newest.
    pub fn resolve(&mut self, ticket: Ticket, result: Result<Passage, PassageError>) -> Resolution {
        if ticket.generation != self.generation {
            tracing::warn!(
                stale = ticket.generation,
                current = self.generation,
                "discarding stale passage response"
            );
            return Resolution::Stale;
        }
        let result = result.and_then(|p| {
            if p.korean_text.trim().is_empty() {
                Err(PassageError::Empty)
            } else {
                Ok(p)
            }
        });
        let request = ticket.request;
        self.state = match result {
            Ok(passage) => PassageState::Ready { request, passage },
            Err(error) => {
                tracing::warn!(%error, "passage fetch failed");
                PassageState::Failed { request, error }
            }
        };
        Resolution::Applied
    }

    /// Forget the current passage and invalidate in-flight fetches.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = PassageState::Empty;
    }
}

/// Run one fetch for `ticket`. Pair with [`PassageLoader::resolve`]; the
/// loader is not borrowed across the await, so newer fetches may begin
/// meanwhile.
pub async fn fetch<S: PassageSource>(
    source: &S,
    ticket: Ticket,
) -> (Ticket, Result<Passage, PassageError>) {
    let result = source.generate(&ticket.request).await;
    (ticket, result)
}

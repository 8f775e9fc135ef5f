//! Engine configuration.
//!
//! Plain data with serde support; hosts load it from whatever source they own
//! (a JSON blob in local storage, a settings file, hard-coded defaults).

use serde::{Deserialize, Serialize};

use crate::matching::MatchStrategy;
use crate::types::ContextKind;

/// Tuning knobs for the text annotation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// How far (in UTF-16 units, per bound) a saved range may drift and still
    /// count as the same annotation. Text-search contexts apply it after
    /// relocating the stored text.
    pub match_tolerance: usize,
    /// Characters of source text shown on a sidebar card before truncation.
    pub preview_chars: usize,
    /// Vertical gap between the selection and the floating menu anchor.
    pub menu_offset: f64,
    /// Context kinds that relocate annotations by text search instead of offsets.
    pub text_search_kinds: Vec<ContextKind>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            match_tolerance: 2,
            preview_chars: 40,
            menu_offset: 10.0,
            text_search_kinds: vec![ContextKind::ExamReview],
        }
    }
}

impl EngineConfig {
    /// Matching strategy for a context kind.
    pub fn strategy_for(&self, kind: ContextKind) -> MatchStrategy {
        if self.text_search_kinds.contains(&kind) {
            MatchStrategy::TextSearch {
                tolerance: self.match_tolerance,
            }
        } else {
            MatchStrategy::OffsetProximity {
                tolerance: self.match_tolerance,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exam_review_searches_by_text() {
        let config = EngineConfig::default();
        assert_eq!(
            config.strategy_for(ContextKind::ExamReview),
            MatchStrategy::TextSearch { tolerance: 2 }
        );
        assert_eq!(
            config.strategy_for(ContextKind::Reading),
            MatchStrategy::OffsetProximity { tolerance: 2 }
        );
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"matchTolerance": 1}"#).unwrap();
        assert_eq!(config.match_tolerance, 1);
        assert_eq!(config.preview_chars, 40);
        assert_eq!(config.text_search_kinds, vec![ContextKind::ExamReview]);
    }
}

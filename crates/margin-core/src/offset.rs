//! Selection-to-offset mapping.
//!
//! A container's rendered text is a sequence of text runs (one per DOM text
//! node). The offset of a boundary is the UTF-16 length of everything from
//! the start of the container up to that boundary, which is what measuring a
//! cloned range from the container start would report.

use crate::platform::{BoundaryPoint, RawSelection};
use crate::text::{Utf16Index, utf16_len};
use crate::types::TextRange;

/// Concatenated text content of a container, remembering run boundaries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContainerText {
    full: String,
    /// UTF-16 start offset of each run, plus a final entry for the total.
    run_starts: Vec<usize>,
}

impl ContainerText {
    pub fn from_runs<I, S>(runs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut full = String::new();
        let mut run_starts = vec![0];
        let mut total = 0;
        for run in runs {
            let run = run.as_ref();
            full.push_str(run);
            total += utf16_len(run);
            run_starts.push(total);
        }
        Self { full, run_starts }
    }

    /// Full plain text, markup ignored.
    pub fn as_str(&self) -> &str {
        &self.full
    }

    pub fn run_count(&self) -> usize {
        self.run_starts.len() - 1
    }

    pub fn len_utf16(&self) -> usize {
        self.run_starts.last().copied().unwrap_or(0)
    }

    /// Container-relative offset of a boundary, or `None` if the run does not exist.
    ///
    /// An in-run offset past the end of the run is clamped to the run length.
    pub fn offset_of(&self, point: BoundaryPoint) -> Option<usize> {
        if point.run >= self.run_count() {
            return None;
        }
        let start = self.run_starts[point.run];
        let run_len = self.run_starts[point.run + 1] - start;
        Some(start + point.offset.min(run_len))
    }

    /// Inverse of [`offset_of`](Self::offset_of): the boundary for a
    /// container offset. Offsets on a run edge resolve to the earlier run.
    pub fn point_at(&self, offset: usize) -> Option<BoundaryPoint> {
        if self.run_count() == 0 || offset > self.len_utf16() {
            return None;
        }
        let run = self.run_starts[1..]
            .partition_point(|&end| end < offset)
            .min(self.run_count() - 1);
        Some(BoundaryPoint::new(run, offset - self.run_starts[run]))
    }

    /// Map a live selection onto container offsets.
    ///
    /// Returns `None` for selections that are outside the container,
    /// collapsed, or whitespace-only. Those are ordinary interaction noise.
    pub fn map_selection(&self, selection: &RawSelection) -> Option<MappedSelection> {
        let anchor = self.offset_of(selection.anchor?)?;
        let focus = self.offset_of(selection.focus?)?;
        let range = TextRange::new(anchor, focus);
        if range.is_empty() {
            return None;
        }
        let text = Utf16Index::new(&self.full).slice(range.to_range());
        if text.trim().is_empty() {
            return None;
        }
        Some(MappedSelection {
            range,
            text: text.to_owned(),
        })
    }
}

/// A selection resolved to stable offsets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MappedSelection {
    pub range: TextRange,
    /// Exactly `full_text[range]`.
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sel(a: (usize, usize), f: (usize, usize)) -> RawSelection {
        RawSelection {
            anchor: Some(BoundaryPoint::new(a.0, a.1)),
            focus: Some(BoundaryPoint::new(f.0, f.1)),
            bounding_rect: None,
        }
    }

    #[test]
    fn offsets_span_markup_runs() {
        // "The <mark>quick</mark> fox jumped."
        let c = ContainerText::from_runs(["The ", "quick", " fox jumped."]);
        assert_eq!(c.as_str(), "The quick fox jumped.");
        let m = c.map_selection(&sel((1, 0), (2, 4))).unwrap();
        assert_eq!(m.range, TextRange::new(4, 13));
        assert_eq!(m.text, "quick fox");
    }

    #[test]
    fn backwards_selection_is_ordered() {
        let c = ContainerText::from_runs(["The ", "quick", " fox jumped."]);
        let m = c.map_selection(&sel((2, 4), (1, 0))).unwrap();
        assert_eq!(m.range, TextRange::new(4, 13));
    }

    #[test]
    fn mapped_text_matches_slice_for_every_sub_range() {
        let runs = ["가나 ", "다라마", " 😀 bar", "baz"];
        let c = ContainerText::from_runs(runs);
        let idx = Utf16Index::new(c.as_str());
        let len = c.len_utf16();
        for start in 0..len {
            for end in start + 1..=len {
                let a = c.point_at(start).unwrap();
                let f = c.point_at(end).unwrap();
                let selection = RawSelection {
                    anchor: Some(a),
                    focus: Some(f),
                    bounding_rect: None,
                };
                if let Some(m) = c.map_selection(&selection) {
                    assert_eq!(m.text, idx.slice(m.range.to_range()));
                    assert_eq!(m.range, TextRange::new(start, end));
                }
            }
        }
    }

    #[test]
    fn ignores_collapsed_whitespace_and_outside_selections() {
        let c = ContainerText::from_runs(["The ", "quick"]);
        assert!(c.map_selection(&sel((1, 2), (1, 2))).is_none());
        assert!(c.map_selection(&sel((0, 3), (0, 4))).is_none());
        let outside = RawSelection {
            anchor: None,
            focus: Some(BoundaryPoint::new(0, 1)),
            bounding_rect: None,
        };
        assert!(c.map_selection(&outside).is_none());
        assert!(c.map_selection(&sel((0, 0), (7, 0))).is_none());
    }

    #[test]
    fn point_at_round_trips() {
        let c = ContainerText::from_runs(["ab", "", "cde"]);
        for offset in 0..=c.len_utf16() {
            let p = c.point_at(offset).unwrap();
            assert_eq!(c.offset_of(p), Some(offset));
        }
        assert_eq!(c.point_at(6), None);
    }
}

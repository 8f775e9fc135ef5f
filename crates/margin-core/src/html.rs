//! HTML emission for rendered highlight segments.
//!
//! Hosts that render through `innerHTML` (or server-side) use this; hosts
//! with their own component tree read the segments directly.

use std::fmt::Write;

use crate::render::{HighlightMode, Segment};

/// CSS class prefix shared by every highlight element.
pub const HIGHLIGHT_CLASS: &str = "hl";

/// Render segments to an HTML fragment.
///
/// Highlights become `<mark>` elements carrying `data-annotation-id`, so
/// click and hover handlers can resolve the annotation from the DOM.
pub fn render_html(segments: &[Segment<'_>]) -> String {
    let mut out = String::new();
    for segment in segments {
        let text = html_escape::encode_text(segment.text);
        match &segment.highlight {
            None if segment.sentence_hover => {
                let _ = write!(out, "<span class=\"sentence-hover\">{text}</span>");
            }
            None => out.push_str(&text),
            Some(style) => {
                let mode = match style.mode {
                    HighlightMode::Block => "block",
                    HighlightMode::Underline => "note",
                };
                let active = if style.active { " hl-active" } else { "" };
                let id = html_escape::encode_double_quoted_attribute(style.annotation_id.as_str());
                let _ = write!(
                    out,
                    "<mark class=\"{HIGHLIGHT_CLASS} hl-{color} hl-{mode}{active}\" data-annotation-id=\"{id}\">{text}",
                    color = style.color.as_str(),
                );
                if segment.note_indicator {
                    out.push_str("<sup class=\"hl-note-indicator\" aria-hidden=\"true\"></sup>");
                }
                out.push_str("</mark>");
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::HighlightColor;
    use crate::render::HighlightRenderer;
    use crate::types::{Annotation, InteractionState, TextRange};

    fn ann(id: &str, start: usize, end: usize, note: &str) -> Annotation {
        Annotation {
            id: id.into(),
            context_key: "ctx".into(),
            start_offset: start,
            end_offset: end,
            text: String::new(),
            color: Some(HighlightColor::Yellow),
            note: note.into(),
            timestamp: 0,
            sentence_index: None,
        }
    }

    #[test]
    fn plain_highlight() {
        let a = ann("a1", 4, 13, "");
        let segments = HighlightRenderer::new("The quick fox jumped.").render(
            &[&a],
            &InteractionState::default(),
            None,
        );
        insta::assert_snapshot!(
            render_html(&segments),
            @r#"The <mark class="hl hl-yellow hl-block" data-annotation-id="a1">quick fox</mark> jumped."#
        );
    }

    #[test]
    fn active_note_highlight_with_indicator() {
        let a = ann("a1", 4, 13, "idiom?");
        let ui = InteractionState {
            active: Some("a1".into()),
            ..Default::default()
        };
        let segments = HighlightRenderer::new("The quick fox jumped.").render(&[&a], &ui, None);
        insta::assert_snapshot!(
            render_html(&segments),
            @r#"The <mark class="hl hl-yellow hl-note hl-active" data-annotation-id="a1">quick fox<sup class="hl-note-indicator" aria-hidden="true"></sup></mark> jumped."#
        );
    }

    #[test]
    fn escapes_text_and_wraps_hovered_sentence() {
        let segments = HighlightRenderer::new("a<b & c. Next").render(
            &[],
            &InteractionState::default(),
            Some(TextRange::new(0, 8)),
        );
        insta::assert_snapshot!(
            render_html(&segments),
            @r#"<span class="sentence-hover">a&lt;b &amp; c.</span> Next"#
        );
    }
}

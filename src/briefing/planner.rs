//! Splits narration text into bounded, labelled chunks.

use crate::defaults::{LABEL_MAX_CHARS, MIN_CHUNK_CHARS, SUMMARY_MAX_CHUNKS};
use serde::Serialize;

/// Markup stripped from derived labels.
const LABEL_MARKUP: [char; 2] = ['*', '#'];

/// One unit of narration, mapped to exactly one synthesized section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextChunk {
    /// Position in narration order.
    pub index: usize,
    pub text: String,
    pub label: String,
}

/// Tuning for [`plan_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannerOptions {
    /// Segments with this many characters or fewer are discarded.
    pub min_chars: usize,
    pub label_max_chars: usize,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self {
            min_chars: MIN_CHUNK_CHARS,
            label_max_chars: LABEL_MAX_CHARS,
        }
    }
}

/// Plan chunks with default options; at most `max_chunks` are kept.
pub fn plan(source_text: &str, max_chunks: usize) -> Vec<TextChunk> {
    plan_with(source_text, max_chunks, PlannerOptions::default())
}

/// Split `source_text` on blank lines, drop short segments and keep the
/// first `max_chunks` in their original order.
pub fn plan_with(source_text: &str, max_chunks: usize, options: PlannerOptions) -> Vec<TextChunk> {
    paragraphs(source_text)
        .filter(|segment| segment.chars().count() > options.min_chars)
        .take(max_chunks)
        .enumerate()
        .map(|(index, text)| TextChunk {
            index,
            label: derive_label(text, index, options.label_max_chars),
            text: text.to_string(),
        })
        .collect()
}

/// Paragraphs separated by one or more blank lines.
fn paragraphs(text: &str) -> impl Iterator<Item = &str> {
    let mut segments = Vec::new();
    let mut start: Option<usize> = None;
    let mut end = 0;

    for (offset, line) in line_spans(text) {
        if line.trim().is_empty() {
            if let Some(s) = start.take() {
                segments.push(&text[s..end]);
            }
        } else {
            if start.is_none() {
                start = Some(offset);
            }
            end = offset + line.len();
        }
    }
    if let Some(s) = start {
        segments.push(&text[s..end]);
    }

    segments.into_iter().map(str::trim)
}

/// Lines of `text` with their byte offsets, line terminators excluded.
fn line_spans(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.split_inclusive('\n').scan(0usize, |offset, raw| {
        let start = *offset;
        *offset += raw.len();
        Some((start, raw.trim_end_matches(['\n', '\r'])))
    })
}

/// Label from the leading sentence of `text`, stripped of markup and cut to
/// `max_chars`. Falls back to `"Part {index+1}"`.
pub fn derive_label(text: &str, index: usize, max_chars: usize) -> String {
    let sentence = text.split(['.', '!', '?', '\n']).next().unwrap_or_default();
    let stripped = sentence.replace(LABEL_MARKUP, "");
    let stripped = stripped.trim();

    if stripped.is_empty() {
        return format!("Part {}", index + 1);
    }

    let label: String = stripped.chars().take(max_chars).collect();
    format!("{}...", label.trim_end())
}

/// Default cap for the quick-summary pass.
pub fn plan_summary(source_text: &str) -> Vec<TextChunk> {
    plan(source_text, SUMMARY_MAX_CHUNKS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(n: usize) -> String {
        format!("Paragraph number {n} explains the lesson content in detail.")
    }

    #[test]
    fn twelve_paragraphs_capped_to_eight_in_order() {
        let text = (0..12).map(paragraph).collect::<Vec<_>>().join("\n\n");
        let chunks = plan(&text, 8);

        assert_eq!(chunks.len(), 8);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
            assert_eq!(chunk.text, paragraph(i));
        }
    }

    #[test]
    fn fewer_valid_segments_than_cap() {
        let text = format!("{}\n\nshort\n\n{}\n\n", paragraph(1), paragraph(2));
        let chunks = plan(&text, 8);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, paragraph(1));
        assert_eq!(chunks[1].text, paragraph(2));
        assert_eq!(chunks[1].index, 1);
    }

    #[test]
    fn segments_at_threshold_are_noise() {
        let exactly_twenty = "a".repeat(20);
        let twenty_one = "b".repeat(21);
        let text = format!("{exactly_twenty}\n\n{twenty_one}");
        let chunks = plan(&text, 8);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, twenty_one);
    }

    #[test]
    fn multiple_blank_lines_and_crlf_split_once() {
        let text = format!(
            "{}\r\n\r\n\r\n{}\n   \n\n{}",
            paragraph(0),
            paragraph(1),
            paragraph(2)
        );
        let chunks = plan(&text, 8);
        let texts: Vec<_> = chunks.iter().map(|c| c.text.clone()).collect();
        assert_eq!(texts, vec![paragraph(0), paragraph(1), paragraph(2)]);
    }

    #[test]
    fn single_newlines_stay_within_a_chunk() {
        let text = "First line of the paragraph\nsecond line of the same paragraph";
        let chunks = plan(text, 8);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, text);
    }

    #[test]
    fn zero_cap_yields_nothing() {
        assert!(plan(&paragraph(0), 0).is_empty());
        assert!(plan("", 8).is_empty());
    }

    #[test]
    fn planning_is_deterministic() {
        let text = (0..5).map(paragraph).collect::<Vec<_>>().join("\n\n");
        assert_eq!(plan(&text, 3), plan(&text, 3));
    }

    #[test]
    fn label_uses_leading_sentence_without_markup() {
        assert_eq!(
            derive_label("**Overview**. The rest of the text.", 0, 30),
            "Overview..."
        );
        assert_eq!(
            derive_label("## Core Concepts explained with analogies. More.", 1, 30),
            "Core Concepts explained with a..."
        );
    }

    #[test]
    fn label_falls_back_to_part_number() {
        assert_eq!(derive_label("***. trailing", 2, 30), "Part 3");
        assert_eq!(derive_label("", 0, 30), "Part 1");
    }

    #[test]
    fn label_truncation_respects_char_boundaries() {
        let label = derive_label("Überziehwarnung während des Anflugs ist kritisch.", 0, 10);
        assert_eq!(label, "Überziehwa...");
    }

    #[test]
    fn plan_summary_uses_default_cap() {
        let text = (0..20).map(paragraph).collect::<Vec<_>>().join("\n\n");
        assert_eq!(plan_summary(&text).len(), SUMMARY_MAX_CHUNKS);
    }
}

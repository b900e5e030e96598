//! Deep-dive topic breakdown: parsing, chunk mapping and transcript.

use crate::briefing::planner::TextChunk;
use crate::error::{LessonError, Result};
use serde::{Deserialize, Serialize};

/// One topic-scoped coaching script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub topic_title: String,
    pub teaching_script: String,
}

/// Parse the generated `[{topicTitle, teachingScript}]` array.
///
/// Anything that does not yield at least one chapter is a planning failure:
/// without chapters there is nothing to narrate.
pub fn parse_chapters(json: &str) -> Result<Vec<Chapter>> {
    let body = strip_code_fence(json.trim());

    let chapters: Vec<Chapter> =
        serde_json::from_str(body).map_err(|e| LessonError::PlanningFailed {
            message: format!("Failed to parse deep-dive chapters: {}", e),
        })?;

    if chapters.is_empty() {
        return Err(LessonError::PlanningFailed {
            message: "Deep-dive breakdown contained no chapters".to_string(),
        });
    }

    Ok(chapters)
}

/// Models sometimes wrap JSON in a markdown fence despite the MIME type.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Each chapter becomes one chunk; the title is used as the label.
pub fn chapters_to_chunks(chapters: &[Chapter]) -> Vec<TextChunk> {
    chapters
        .iter()
        .enumerate()
        .map(|(index, chapter)| {
            let title = chapter.topic_title.trim();
            TextChunk {
                index,
                text: chapter.teaching_script.clone(),
                label: if title.is_empty() {
                    format!("Part {}", index + 1)
                } else {
                    title.to_string()
                },
            }
        })
        .collect()
}

/// Full text of the deep dive: a `##` heading and the script per chapter,
/// in chapter order, each followed by a blank line.
pub fn transcript(chapters: &[Chapter]) -> String {
    chapters
        .iter()
        .map(|c| format!("## {}\n\n{}\n\n", c.topic_title, c.teaching_script))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {"topicTitle": "Angle of Attack", "teachingScript": "Start with the wing."},
        {"topicTitle": "Stall Recovery", "teachingScript": "Reduce the angle first."}
    ]"#;

    #[test]
    fn parses_camel_case_chapters() {
        let chapters = parse_chapters(SAMPLE).unwrap();
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0].topic_title, "Angle of Attack");
        assert_eq!(chapters[1].teaching_script, "Reduce the angle first.");
    }

    #[test]
    fn fenced_json_is_accepted() {
        let fenced = format!("```json\n{SAMPLE}\n```");
        assert_eq!(parse_chapters(&fenced).unwrap().len(), 2);
    }

    #[test]
    fn invalid_json_is_planning_failure() {
        for bad in ["not json", "{\"topicTitle\": \"x\"}", "[{\"topicTitle\": 1}]", ""] {
            assert!(
                matches!(parse_chapters(bad), Err(LessonError::PlanningFailed { .. })),
                "expected PlanningFailed for {bad:?}"
            );
        }
    }

    #[test]
    fn empty_array_is_planning_failure() {
        assert!(matches!(
            parse_chapters("[]"),
            Err(LessonError::PlanningFailed { .. })
        ));
    }

    #[test]
    fn chunks_follow_chapter_order() {
        let chapters = parse_chapters(SAMPLE).unwrap();
        let chunks = chapters_to_chunks(&chapters);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[0].label, "Angle of Attack");
        assert_eq!(chunks[0].text, "Start with the wing.");
        assert_eq!(chunks[1].index, 1);
        assert_eq!(chunks[1].label, "Stall Recovery");
    }

    #[test]
    fn blank_title_falls_back_to_part_number() {
        let chapters = vec![Chapter {
            topic_title: "  ".to_string(),
            teaching_script: "Script".to_string(),
        }];
        assert_eq!(chapters_to_chunks(&chapters)[0].label, "Part 1");
    }

    #[test]
    fn transcript_joins_headings_and_scripts() {
        let chapters = parse_chapters(SAMPLE).unwrap();
        assert_eq!(
            transcript(&chapters),
            "## Angle of Attack\n\nStart with the wing.\n\n## Stall Recovery\n\nReduce the angle first.\n\n"
        );
    }
}

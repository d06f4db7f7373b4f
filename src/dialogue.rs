//! Strict parsing of the model's dialogue JSON.
//!
//! The model is asked to follow a response schema, but nothing it returns is
//! trusted until it has been checked here. Any deviation rejects the whole
//! reply; partial dialogues are never returned.

use crate::models::{DialogueLine, DialogueResult};
use crate::{Error, Result};
use serde_json::Value;

/// Parse raw model output into an ordered list of dialogue lines.
pub fn parse_dialogue(text: &str) -> Result<DialogueResult> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(Error::MalformedResponse("empty response".to_string()));
    }

    let value: Value = serde_json::from_str(trimmed)
        .map_err(|e| Error::MalformedResponse(format!("invalid JSON: {}", e)))?;

    let entries = value
        .get("dialogue")
        .ok_or_else(|| Error::MalformedResponse("missing `dialogue` field".to_string()))?
        .as_array()
        .ok_or_else(|| Error::MalformedResponse("`dialogue` is not an array".to_string()))?;

    if entries.is_empty() {
        return Err(Error::MalformedResponse("`dialogue` is empty".to_string()));
    }

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| parse_line(index, entry))
        .collect()
}

/// Plain-text transcript with one numbered `n. speaker: line` row per
/// dialogue line. Numbers start at 1 and match [`line_at`].
pub fn render_transcript(lines: &[DialogueLine]) -> String {
    lines
        .iter()
        .enumerate()
        .map(|(i, l)| format!("{}. {}: {}", i + 1, l.speaker, l.line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Look up a line by its 1-based transcript number.
pub fn line_at(lines: &[DialogueLine], number: usize) -> Option<&DialogueLine> {
    number.checked_sub(1).and_then(|index| lines.get(index))
}

fn parse_line(index: usize, entry: &Value) -> Result<DialogueLine> {
    let field = |name: &str| -> Result<String> {
        let value = entry
            .get(name)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                Error::MalformedResponse(format!("line {} has no string `{}`", index, name))
            })?;
        if value.trim().is_empty() {
            return Err(Error::MalformedResponse(format!(
                "line {} has an empty `{}`",
                index, name
            )));
        }
        Ok(value.to_string())
    };

    Ok(DialogueLine {
        speaker: field("speaker")?,
        line: field("line")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parses_lines_in_order_unmodified() {
        let text = r#"
            {"dialogue": [
                {"speaker": "Barista", "line": "¡Hola! ¿Qué desea?"},
                {"speaker": "Cliente", "line": "  Un café, por favor.  "}
            ]}
        "#;

        let lines = parse_dialogue(text).unwrap();
        assert_eq!(
            lines,
            vec![
                DialogueLine::new("Barista", "¡Hola! ¿Qué desea?"),
                DialogueLine::new("Cliente", "  Un café, por favor.  "),
            ]
        );
    }

    #[test]
    fn test_render_transcript_keeps_order_and_text() {
        let lines = vec![
            DialogueLine::new("Guía", "Mira el puente."),
            DialogueLine::new("Turista", "¡Qué bonito!"),
        ];
        assert_eq!(
            render_transcript(&lines),
            "1. Guía: Mira el puente.\n2. Turista: ¡Qué bonito!"
        );
        assert_eq!(render_transcript(&[]), "");
    }

    #[test]
    fn test_line_at_is_one_based_and_bounded() {
        let lines = vec![
            DialogueLine::new("A", "Hola"),
            DialogueLine::new("B", "Adiós"),
        ];
        assert_eq!(line_at(&lines, 1), Some(&lines[0]));
        assert_eq!(line_at(&lines, 2), Some(&lines[1]));
        assert_eq!(line_at(&lines, 0), None);
        assert_eq!(line_at(&lines, 3), None);
    }

    #[test]
    fn test_ignores_extra_fields() {
        let text = r#"{"dialogue": [{"speaker": "A", "line": "Hi", "mood": "happy"}], "title": "x"}"#;
        assert_eq!(parse_dialogue(text).unwrap().len(), 1);
    }

    #[test]
    fn test_rejects_missing_dialogue() {
        let err = parse_dialogue(r#"{"lines": []}"#).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn test_rejects_non_array_dialogue() {
        for text in [
            r#"{"dialogue": "hello"}"#,
            r#"{"dialogue": {"speaker": "A", "line": "B"}}"#,
            r#"{"dialogue": null}"#,
        ] {
            let err = parse_dialogue(text).unwrap_err();
            assert!(matches!(err, Error::MalformedResponse(_)), "{}", text);
        }
    }

    #[test]
    fn test_rejects_empty_dialogue() {
        let err = parse_dialogue(r#"{"dialogue": []}"#).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn test_rejects_invalid_json_and_blank_text() {
        assert!(matches!(
            parse_dialogue("Sure! Here is a dialogue:").unwrap_err(),
            Error::MalformedResponse(_)
        ));
        assert!(matches!(
            parse_dialogue("   \n").unwrap_err(),
            Error::MalformedResponse(_)
        ));
    }

    #[test]
    fn test_rejects_bad_entries() {
        for text in [
            r#"{"dialogue": [{"speaker": "A"}]}"#,
            r#"{"dialogue": [{"speaker": "A", "line": 3}]}"#,
            r#"{"dialogue": [{"speaker": "", "line": "Hola"}]}"#,
            r#"{"dialogue": [{"speaker": "A", "line": "Hola"}, "oops"]}"#,
        ] {
            let err = parse_dialogue(text).unwrap_err();
            assert!(matches!(err, Error::MalformedResponse(_)), "{}", text);
        }
    }
}

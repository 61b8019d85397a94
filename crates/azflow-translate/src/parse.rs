use std::collections::HashSet;

use azflow_core::Infrastructure;

use crate::TranslateError;

/// Drop markdown code-fence lines such as "```json" and "```".
fn strip_fences(raw: &str) -> String {
    raw.lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Byte ranges of balanced top-level `{...}` blocks. Braces inside JSON
/// strings are ignored.
fn object_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' if depth > 0 => in_string = true,
            '{' => {
                if depth == 0 {
                    start = i;
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    spans.push((start, i + 1));
                }
            }
            _ => {}
        }
    }
    spans
}

/// The single JSON object in raw translator output.
pub fn extract_json_object(raw: &str) -> Result<String, TranslateError> {
    let text = strip_fences(raw);
    let spans = object_spans(&text);
    match spans.as_slice() {
        [] => Err(TranslateError::NoJson),
        [(start, end)] => Ok(text[*start..*end].to_string()),
        _ => Err(TranslateError::AmbiguousOutput {
            blocks: spans.len(),
        }),
    }
}

/// Parse and validate raw translator output.
pub fn parse_infrastructure(raw: &str) -> Result<Infrastructure, TranslateError> {
    let result = extract_json_object(raw).and_then(|json| {
        let infra: Infrastructure = serde_json::from_str(&json)
            .map_err(|e| TranslateError::SchemaMismatch(e.to_string()))?;
        validate(&infra)?;
        Ok(infra)
    });
    if let Err(e) = &result {
        tracing::warn!(error = %e, len = raw.len(), "rejected translator output");
    }
    result
}

/// Reference checks serde cannot express.
fn validate(infra: &Infrastructure) -> Result<(), TranslateError> {
    let mismatch = |msg: String| Err(TranslateError::SchemaMismatch(msg));

    let mut ids = HashSet::new();
    for id in infra.node_ids() {
        if id.trim().is_empty() {
            return mismatch("node with an empty id".to_string());
        }
        if !ids.insert(id) {
            return mismatch(format!("duplicate node id '{id}'"));
        }
    }

    let groups: HashSet<&str> = infra.groups.iter().map(|g| g.id.as_str()).collect();
    let parents = infra
        .groups
        .iter()
        .map(|g| (g.id.as_str(), g.parent_id.as_deref()))
        .chain(
            infra
                .services
                .iter()
                .map(|s| (s.id.as_str(), s.parent_id.as_deref())),
        );
    for (id, parent) in parents {
        if let Some(parent) = parent {
            if !groups.contains(parent) {
                return mismatch(format!("'{id}' has parentId '{parent}', which is not a group"));
            }
        }
    }

    for c in &infra.connections {
        for endpoint in [&c.source, &c.target] {
            if !ids.contains(endpoint.as_str()) {
                return mismatch(format!(
                    "connection '{}' references unknown node '{endpoint}'",
                    c.id
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{"services":[{"id":"a","name":"A","category":"compute"}],"connections":[]}"#;

    #[test]
    fn accepts_fenced_output() {
        let raw = format!("Here you go:\n```json\n{MINIMAL}\n```\nEnjoy.");
        let infra = parse_infrastructure(&raw).unwrap();
        assert_eq!(infra.services[0].id, "a");
    }

    #[test]
    fn braces_inside_strings_do_not_count() {
        let raw = r#"{"description":"uses } and { freely","services":[]}"#;
        assert_eq!(extract_json_object(raw).unwrap(), raw);
    }

    #[test]
    fn zero_blocks_is_no_json() {
        assert!(matches!(
            extract_json_object("I could not do that."),
            Err(TranslateError::NoJson)
        ));
        assert!(matches!(
            extract_json_object("{ unterminated"),
            Err(TranslateError::NoJson)
        ));
    }

    #[test]
    fn two_blocks_are_ambiguous() {
        let raw = format!("first {MINIMAL} then {MINIMAL}");
        assert!(matches!(
            extract_json_object(&raw),
            Err(TranslateError::AmbiguousOutput { blocks: 2 })
        ));
    }

    #[test]
    fn wrong_shape_is_schema_mismatch() {
        let raw = r#"{"services":[{"id":"a"}]}"#;
        assert!(matches!(
            parse_infrastructure(raw),
            Err(TranslateError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn references_are_checked() {
        let dangling_parent =
            r#"{"services":[{"id":"a","name":"A","category":"compute","parentId":"rg"}]}"#;
        let unknown_endpoint = r#"{"services":[{"id":"a","name":"A","category":"compute"}],
            "connections":[{"id":"c","source":"a","target":"b"}]}"#;
        let duplicate = r#"{"services":[{"id":"a","name":"A","category":"compute"},
            {"id":"a","name":"B","category":"storage"}]}"#;
        for raw in [dangling_parent, unknown_endpoint, duplicate] {
            assert!(
                matches!(parse_infrastructure(raw), Err(TranslateError::SchemaMismatch(_))),
                "{raw}"
            );
        }
    }
}

//! Plain-text extraction from rich-text documents.
//!
//! Worklog comments arrive either as a plain string or as an Atlassian
//! Document Format tree. The tree is walked depth-first and every text
//! fragment is collected, in this order for each node: `text`, `content`,
//! `attrs.text`, `marks`, `children`.

use serde_json::Value;

/// Maximum nesting the walker follows before giving up.
pub const MAX_DEPTH: usize = 256;

#[derive(Debug)]
struct DepthExceeded;

/// Flatten a rich-text document to a single line of plain text.
///
/// Whitespace runs collapse to one space. Returns `None` for absent or
/// null input, non-text scalars, documents with no text at all, and
/// documents nested deeper than [`MAX_DEPTH`].
#[must_use]
pub fn flatten_document(value: Option<&Value>) -> Option<String> {
    let value = value?;
    match value {
        Value::Null | Value::Bool(_) | Value::Number(_) => None,
        Value::String(s) => Some(s.clone()),
        Value::Object(_) | Value::Array(_) => {
            let mut pieces = Vec::new();
            walk(value, 0, &mut pieces).ok()?;
            let joined = pieces.join(" ");
            let text = joined.split_whitespace().collect::<Vec<_>>().join(" ");
            if text.is_empty() { None } else { Some(text) }
        }
    }
}

fn walk<'a>(node: &'a Value, depth: usize, out: &mut Vec<&'a str>) -> Result<(), DepthExceeded> {
    if depth > MAX_DEPTH {
        return Err(DepthExceeded);
    }

    match node {
        Value::String(s) => out.push(s),
        Value::Array(items) => {
            for item in items {
                walk(item, depth + 1, out)?;
            }
        }
        Value::Object(map) => {
            if let Some(Value::String(text)) = map.get("text") {
                out.push(text);
            }
            if let Some(content) = map.get("content") {
                walk_children(content, depth, out)?;
            }
            if let Some(Value::String(text)) = map.get("attrs").and_then(|a| a.get("text")) {
                out.push(text);
            }
            if let Some(marks) = map.get("marks") {
                walk_children(marks, depth, out)?;
            }
            if let Some(children) = map.get("children") {
                walk_children(children, depth, out)?;
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }

    Ok(())
}

/// Child collections are only followed when they are arrays or objects.
fn walk_children<'a>(
    value: &'a Value,
    depth: usize,
    out: &mut Vec<&'a str>,
) -> Result<(), DepthExceeded> {
    match value {
        Value::Array(_) | Value::Object(_) => walk(value, depth + 1, out),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, json};

    #[test]
    fn test_paragraph_document() {
        let doc = json!({
            "type": "doc",
            "content": [{
                "type": "paragraph",
                "content": [
                    {"type": "text", "text": "Fixed"},
                    {"type": "text", "text": "the bug"}
                ]
            }]
        });
        assert_eq!(flatten_document(Some(&doc)).as_deref(), Some("Fixed the bug"));
    }

    #[test]
    fn test_plain_string_passes_through() {
        let value = json!("  already   plain ");
        assert_eq!(
            flatten_document(Some(&value)).as_deref(),
            Some("  already   plain ")
        );
    }

    #[test]
    fn test_absent_and_scalars() {
        assert_eq!(flatten_document(None), None);
        assert_eq!(flatten_document(Some(&Value::Null)), None);
        assert_eq!(flatten_document(Some(&json!(42))), None);
        assert_eq!(flatten_document(Some(&json!(true))), None);
    }

    #[test]
    fn test_visit_order_and_whitespace() {
        let doc = json!({
            "text": "a",
            "children": [{"text": "e"}],
            "marks": [{"text": "d"}],
            "attrs": {"text": "c"},
            "content": [{"text": "  b\n\n"}]
        });
        assert_eq!(flatten_document(Some(&doc)).as_deref(), Some("a b c d e"));
    }

    #[test]
    fn test_mention_attrs_text() {
        let doc = json!({
            "type": "doc",
            "content": [{
                "type": "paragraph",
                "content": [
                    {"type": "text", "text": "Paired with"},
                    {"type": "mention", "attrs": {"id": "abc", "text": "@Dana"}}
                ]
            }]
        });
        assert_eq!(
            flatten_document(Some(&doc)).as_deref(),
            Some("Paired with @Dana")
        );
    }

    #[test]
    fn test_document_without_text() {
        let doc = json!({"type": "doc", "content": [{"type": "rule"}]});
        assert_eq!(flatten_document(Some(&doc)), None);
    }

    #[test]
    fn test_malformed_children_are_ignored() {
        let doc = json!({"content": 42, "text": 7});
        assert_eq!(flatten_document(Some(&doc)), None);
    }

    /// `levels` objects each wrapping the next in a one-element `content`.
    fn nested(levels: usize, text: &str) -> Value {
        let mut doc = json!({ "text": text });
        for _ in 0..levels {
            let mut node = Map::new();
            node.insert("content".to_string(), Value::Array(vec![doc]));
            doc = Value::Object(node);
        }
        doc
    }

    /// Drop a deep document one level at a time.
    fn dismantle(mut doc: Value) {
        loop {
            let inner = match &mut doc {
                Value::Object(node) => match node.remove("content") {
                    Some(Value::Array(mut items)) => items.pop(),
                    _ => None,
                },
                _ => None,
            };
            match inner {
                Some(inner) => doc = inner,
                None => break,
            }
        }
    }

    #[test]
    fn test_pathological_nesting_yields_none() {
        let doc = nested(100_000, "deep");
        assert_eq!(flatten_document(Some(&doc)), None);
        dismantle(doc);
    }

    #[test]
    fn test_nesting_within_bound() {
        let doc = nested(50, "shallow");
        assert_eq!(flatten_document(Some(&doc)).as_deref(), Some("shallow"));
        dismantle(doc);
    }
}

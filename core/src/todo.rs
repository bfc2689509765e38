//! Todo content codec.
//!
//! A post's `content` column is the only stored representation of its todo
//! list: there is no dedicated table. The column started life as free text,
//! later became a JSON array of strings, and finally a JSON array of
//! `{text, completed}` objects. This module owns both directions of that
//! conversion:
//!
//! - [`decode`] accepts all three historical shapes and never fails; any
//!   parse problem degrades to best-effort plain-text splitting. Older
//!   posts must render, not crash.
//! - [`encode`] always emits the one canonical shape: a compact JSON array
//!   of `{"text", "completed"}` objects, in list order, with no other keys.
//!
//! Item ids are a session concept used for stable list diffing. They are
//! never persisted: encoding strips them, and decoding synthesizes a
//! deterministic `"<index>-<text>"` id for any item that lacks one, so
//! repeated decodes of unchanged content produce identical ids.

use serde::Serialize;
use serde_json::Value;

/// A single entry in a post's todo/schedule list.
///
/// `id` is unique within one post's list at any point in time and stable
/// across edits whenever the source item already carried an id. `text` is
/// non-empty after trimming; items that would decode to empty text are
/// dropped by [`decode`] and never reach a list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TodoItem {
    /// Session-local identity, not persisted
    pub id: String,
    /// User-visible label, trimmed and non-empty
    pub text: String,
    /// Whether the entry is checked off
    pub completed: bool,
}

impl TodoItem {
    /// Creates a new incomplete item
    #[must_use]
    pub const fn new(id: String, text: String) -> Self {
        Self {
            id,
            text,
            completed: false,
        }
    }
}

/// Canonical wire projection of an item. Key order matters: readers of the
/// stored column expect `text` before `completed`.
#[derive(Serialize)]
struct EncodedTodo<'a> {
    text: &'a str,
    completed: bool,
}

/// Deterministic id for an item that arrived without one.
fn synthesized_id(index: usize, text: &str) -> String {
    format!("{index}-{text}")
}

/// Decode a post's raw `content` string into its todo list.
///
/// Accepted shapes, tried in order:
///
/// 1. JSON array of strings - each non-blank trimmed string becomes an
///    incomplete item with a synthesized id.
/// 2. JSON array of objects - `text` is coerced to a string and trimmed,
///    `completed` is coerced to a boolean, `id` is kept when it is a
///    non-empty string and synthesized otherwise.
/// 3. Anything else (valid JSON that is not an array, or not JSON at all)
///    - treated as legacy plain text: one item per non-blank line.
///
/// Items whose resolved text is empty are dropped in every branch. Array
/// elements that are neither strings nor objects are skipped. This
/// function never fails.
#[must_use]
pub fn decode(content: &str) -> Vec<TodoItem> {
    if content.is_empty() {
        return Vec::new();
    }

    if let Ok(Value::Array(entries)) = serde_json::from_str::<Value>(content) {
        return entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| decode_entry(index, entry))
            .collect();
    }

    // Legacy plain text: newline-separated labels, all incomplete.
    content
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(index, line)| TodoItem::new(synthesized_id(index, line), line.to_string()))
        .collect()
}

/// Decode one array element; `None` drops it from the list.
fn decode_entry(index: usize, entry: &Value) -> Option<TodoItem> {
    match entry {
        Value::String(raw) => {
            let text = raw.trim();
            if text.is_empty() {
                return None;
            }
            Some(TodoItem::new(synthesized_id(index, text), text.to_string()))
        },
        Value::Object(fields) => {
            let text = coerce_text(fields.get("text"));
            let text = text.trim();
            if text.is_empty() {
                return None;
            }

            let id = match fields.get("id") {
                Some(Value::String(id)) if !id.trim().is_empty() => id.clone(),
                _ => synthesized_id(index, text),
            };

            Some(TodoItem {
                id,
                text: text.to_string(),
                completed: coerce_completed(fields.get("completed")),
            })
        },
        _ => None,
    }
}

/// Stringify a `text` field the way loosely-typed writers produced it:
/// strings pass through, numbers and booleans render, everything else is
/// empty (and the item gets dropped for blank text).
fn coerce_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        _ => String::new(),
    }
}

/// Truthiness of a `completed` field: missing/null/false/0/"" are
/// incomplete, everything else is complete.
fn coerce_completed(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
        Some(Value::Null) | None => false,
    }
}

/// Encode a todo list into the canonical stored `content` string.
///
/// Output is a compact JSON array of `{"text", "completed"}` objects in
/// list order. Ids are deliberately not persisted. Pure and total.
#[must_use]
pub fn encode(todos: &[TodoItem]) -> String {
    let projected: Vec<EncodedTodo<'_>> = todos
        .iter()
        .map(|todo| EncodedTodo {
            text: &todo.text,
            completed: todo.completed,
        })
        .collect();

    // Serializing strings and bools cannot fail; the fallback keeps the
    // signature total.
    serde_json::to_string(&projected).unwrap_or_else(|_| String::from("[]"))
}

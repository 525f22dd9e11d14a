//! JSON body to form values translation.
//!
//! # Design
//! Every step is a pure function over borrowed data. The caller checks the
//! guards with [`should_translate`] before reading the body, so requests that
//! do not qualify keep their body untouched, then hands the collected bytes
//! to [`translate`].
//!
//! Values are flattened with a fixed policy: strings verbatim, numbers in
//! shortest round-trip decimal form, booleans as `"1"`/`"0"`, arrays element
//! by element. Objects and nulls have no form representation and are
//! skipped; an array holding one is dropped as a whole rather than
//! translated partially.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{DecodeError, SkipReason};
use crate::query::parse_query;
use crate::values::FormValues;

const JSON_MEDIA_TYPE: &str = "application/json";

/// The parts of a request the translation looks at, as plain data.
#[derive(Debug, Clone, Copy)]
pub struct JsonRequest<'a> {
    pub method: &'a str,
    pub content_type: Option<&'a str>,
    /// Raw query string, without the leading `?`.
    pub query: Option<&'a str>,
    pub body: &'a [u8],
}

/// Result of a successful translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translated {
    /// Values decoded from the body alone. Present even when empty.
    pub post_form: FormValues,
    /// `post_form` overlaid with the query string; `None` when `post_form`
    /// is empty.
    pub form: Option<FormValues>,
}

/// Plain substring match, not a media-type parse.
pub fn accepts_content_type(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.contains(JSON_MEDIA_TYPE))
}

pub fn accepts_method(method: &str) -> bool {
    matches!(method, "POST" | "PUT" | "PATCH")
}

pub fn should_translate(content_type: Option<&str>, method: &str) -> bool {
    accepts_content_type(content_type) && accepts_method(method)
}

/// Run the full translation over an already collected request.
pub fn translate(request: &JsonRequest<'_>) -> Result<Translated, SkipReason> {
    if !accepts_content_type(request.content_type) {
        return Err(SkipReason::ContentType);
    }
    if !accepts_method(request.method) {
        return Err(SkipReason::Method);
    }
    let post_form = decode_form(request.body)?;
    let form = combine(&post_form, request.query);
    Ok(Translated { post_form, form })
}

/// Decode the first JSON value in `body` and require it to be an object.
///
/// Bytes after a complete first value are not inspected.
pub fn decode_object(body: &[u8]) -> Result<Map<String, Value>, DecodeError> {
    let mut stream = serde_json::Deserializer::from_slice(body).into_iter::<Value>();
    match stream.next() {
        None => Err(DecodeError::Empty),
        Some(Err(err)) => Err(DecodeError::Malformed(err.to_string())),
        Some(Ok(Value::Object(object))) => Ok(object),
        Some(Ok(other)) => Err(DecodeError::NotAnObject(kind(&other))),
    }
}

pub fn decode_form(body: &[u8]) -> Result<FormValues, DecodeError> {
    decode_object(body).map(|object| translate_object(&object))
}

/// Flatten a decoded JSON object into form values.
pub fn translate_object(object: &Map<String, Value>) -> FormValues {
    let mut values = FormValues::new();
    for (key, value) in object {
        match value {
            Value::Array(items) => match translate_array(items) {
                Some(sequence) => values.insert_all(key.clone(), sequence),
                None => debug!(%key, "discarding array holding an unsupported element"),
            },
            other => match scalar_to_string(other) {
                Some(text) => values.set(key.clone(), text),
                None => debug!(%key, kind = kind(other), "skipping unsupported value"),
            },
        }
    }
    values
}

/// Copy `post_form` and overlay the query string onto it. Each query key
/// replaces the copied sequence with its first query value.
///
/// A query string that fails to parse is ignored.
pub fn combine(post_form: &FormValues, query: Option<&str>) -> Option<FormValues> {
    if post_form.is_empty() {
        return None;
    }
    let mut form = post_form.clone();
    if let Some(raw) = query {
        match parse_query(raw) {
            Ok(overlay) => {
                for (key, values) in &overlay {
                    if let Some(first) = values.first() {
                        form.set(key.clone(), first.clone());
                    }
                }
            }
            Err(err) => debug!(error = %err, "skipping query overlay"),
        }
    }
    Some(form)
}

/// Any unsupported element drops the whole array; elements after it are not
/// re-added.
fn translate_array(items: &[Value]) -> Option<Vec<String>> {
    items.iter().map(scalar_to_string).collect()
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => number.as_f64().map(format_number),
        Value::Bool(true) => Some("1".to_string()),
        Value::Bool(false) => Some("0".to_string()),
        Value::Array(_) | Value::Object(_) | Value::Null => None,
    }
}

// f64 Display is the shortest string that round-trips and never uses
// exponent notation.
fn format_number(number: f64) -> String {
    number.to_string()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

//! Query-string merging.
//!
//! Parameters are merged into a URL, not appended: a key already present in
//! the query string is overwritten in place, unrelated keys keep their
//! position and new keys go last. The query string is rebuilt from the merged
//! pairs, so a URL never ends up with two `?` fragments.

use serde_json::Value;
use url::form_urlencoded;

use crate::{Error, Result};

/// Ordered query parameters, one entry per key.
///
/// A key maps to several values when the source held an array; those values
/// are serialized as repeated `key=value` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: Vec<(String, Vec<String>)>,
}

impl QueryParams {
    /// Parse an already-encoded query string (without the leading `?`).
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let mut params = Self::default();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            params.push(key.into_owned(), value.into_owned());
        }
        params
    }

    /// Flatten a JSON parameter container.
    ///
    /// Objects contribute one key per field, strings are parsed as encoded
    /// query strings, `null` contributes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] for numbers, booleans and arrays at
    /// the top level, which have no key to attach to.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::String(query) => Ok(Self::parse(query.trim_start_matches('?'))),
            Value::Object(map) => {
                let mut params = Self::default();
                for (key, value) in map {
                    params.set(key.clone(), flatten(value));
                }
                Ok(params)
            }
            other => Err(Error::invalid_request(format!(
                "query parameters must be an object or a string, got {other}"
            ))),
        }
    }

    /// Returns `true` if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Values for a key, in order.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, values)| values.as_slice())
    }

    /// Replace the values of a key, keeping its position if it exists.
    pub fn set(&mut self, key: String, values: Vec<String>) {
        match self.entries.iter_mut().find(|(name, _)| *name == key) {
            Some((_, existing)) => *existing = values,
            None => self.entries.push((key, values)),
        }
    }

    fn push(&mut self, key: String, value: String) {
        match self.entries.iter_mut().find(|(name, _)| *name == key) {
            Some((_, existing)) => existing.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    /// Merge `other` over `self`; keys from `other` win.
    pub fn merge(&mut self, other: Self) {
        for (key, values) in other.entries {
            self.set(key, values);
        }
    }

    /// Encode as a query string (without the leading `?`).
    #[must_use]
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, values) in &self.entries {
            for value in values {
                serializer.append_pair(key, value);
            }
        }
        serializer.finish()
    }
}

fn flatten(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(scalar).collect(),
        other => vec![scalar(other)],
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(_) | Value::Number(_) | Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Merge parameters into the query string of `url`.
///
/// Works on absolute and relative URLs alike and keeps any `#fragment`.
/// An empty merge result drops the `?` entirely.
///
/// # Errors
///
/// Returns an error if `params` cannot be flattened, see
/// [`QueryParams::from_value`].
///
/// # Example
///
/// ```
/// use courier_core::merge_query;
/// use serde_json::json;
///
/// let url = merge_query("/x?a=0&b=2", &json!({"a": 1})).expect("merge");
/// assert_eq!(url, "/x?a=1&b=2");
/// ```
pub fn merge_query(url: &str, params: &Value) -> Result<String> {
    let (without_fragment, fragment) = match url.split_once('#') {
        Some((head, fragment)) => (head, Some(fragment)),
        None => (url, None),
    };
    let (path, query) = without_fragment
        .split_once('?')
        .unwrap_or((without_fragment, ""));

    let mut merged = QueryParams::parse(query);
    merged.merge(QueryParams::from_value(params)?);

    let mut result = path.to_string();
    if !merged.is_empty() {
        result.push('?');
        result.push_str(&merged.encode());
    }
    if let Some(fragment) = fragment {
        result.push('#');
        result.push_str(fragment);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};
    use serde_json::json;

    use super::*;

    #[test]
    fn merge_overwrites_existing_key() {
        let url = merge_query("/x?a=0&b=2", &json!({"a": 1})).expect("merge");
        check!(url == "/x?a=1&b=2");
    }

    #[test]
    fn merge_is_idempotent() {
        let once = merge_query("/x?a=0&b=2", &json!({"a": 1})).expect("merge");
        let twice = merge_query(&once, &json!({"a": 1})).expect("merge");
        check!(once == twice);
    }

    #[test]
    fn merge_appends_new_keys_last() {
        let url = merge_query("https://api.example.com/items?page=2", &json!({"q": "rust"}))
            .expect("merge");
        check!(url == "https://api.example.com/items?page=2&q=rust");
    }

    #[test]
    fn merge_without_existing_query() {
        let url = merge_query("/users", &json!({"id": 7, "active": true})).expect("merge");
        check!(url == "/users?active=true&id=7" || url == "/users?id=7&active=true");
    }

    #[test]
    fn empty_params_keep_url_without_question_mark() {
        check!(merge_query("/users", &json!({})).expect("merge") == "/users");
        check!(merge_query("/users?", &json!({})).expect("merge") == "/users");
    }

    #[test]
    fn merge_keeps_fragment() {
        let url = merge_query("/doc?a=1#section", &json!({"b": 2})).expect("merge");
        check!(url == "/doc?a=1&b=2#section");
    }

    #[test]
    fn merge_repeats_array_values() {
        let url = merge_query("/search?tag=old", &json!({"tag": ["a", "b"]})).expect("merge");
        check!(url == "/search?tag=a&tag=b");
    }

    #[test]
    fn merge_from_query_string_params() {
        let url = merge_query("/x?a=0", &json!("?a=5&c=3")).expect("merge");
        check!(url == "/x?a=5&c=3");
    }

    #[test]
    fn merge_encodes_special_characters() {
        let url = merge_query("/x", &json!({"q": "a b&c"})).expect("merge");
        check!(url == "/x?q=a+b%26c");
    }

    #[test]
    fn null_values_become_empty() {
        let url = merge_query("/x", &json!({"cursor": null})).expect("merge");
        check!(url == "/x?cursor=");
    }

    #[test]
    fn scalar_params_are_rejected() {
        let_assert!(Err(Error::InvalidRequest(_)) = merge_query("/x", &json!(42)));
        let_assert!(Err(Error::InvalidRequest(_)) = merge_query("/x", &json!([1])));
    }

    #[test]
    fn parsed_params_group_repeated_keys() {
        let params = QueryParams::parse("a=1&b=2&a=3");
        check!(params.get("a") == Some(&["1".to_string(), "3".to_string()][..]));
        check!(params.encode() == "a=1&a=3&b=2");
    }
}

//! Flat command parameters for URL-mode commands.

use serde_json::{Map, Number, Value};

/// A single flat parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Bool(bool),
    Number(Number),
    Text(String),
    List(Vec<String>),
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        ParamValue::List(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Number(value.into())
    }
}

/// Ordered key/value parameters. Keys are logical (snake_case) names; the URL
/// executor maps them onto the wire names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandParameters {
    entries: Vec<(String, ParamValue)>,
}

impl CommandParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, replacing an earlier value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn with_opt<V: Into<ParamValue>>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self,
        }
    }

    /// Copy scalar and string-array members of a validated argument map,
    /// skipping `exclude` and anything nested.
    pub fn extend_from_args(&mut self, args: &Map<String, Value>, exclude: &[&str]) -> &mut Self {
        for (key, value) in args {
            if exclude.contains(&key.as_str()) {
                continue;
            }
            let param = match value {
                Value::Bool(b) => ParamValue::Bool(*b),
                Value::Number(n) => ParamValue::Number(n.clone()),
                Value::String(s) => ParamValue::Text(s.clone()),
                Value::Array(items) => ParamValue::List(
                    items
                        .iter()
                        .filter_map(|v| v.as_str().map(str::to_string))
                        .collect(),
                ),
                Value::Null | Value::Object(_) => continue,
            };
            self.insert(key.clone(), param);
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

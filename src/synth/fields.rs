// Copyright (c) 2025 - Cowboy AI, Inc.
//! Field maps returned by the synthesizer

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Scalar value of a synthesized field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl FieldValue {
    /// Render for a report cell
    pub fn to_cell(&self) -> String {
        match self {
            FieldValue::Bool(b) => String::from(if *b { "True" } else { "False" }),
            FieldValue::Int(i) => i.to_string(),
            FieldValue::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_cell())
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        FieldValue::Int(i64::from(v))
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        FieldValue::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

/// Ordered map of field name to value
///
/// Ordered so that logging and serialization are stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap(BTreeMap<String, FieldValue>);

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: &str, value: impl Into<FieldValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<FieldValue>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }

    /// Text value; integers and booleans are rendered
    pub fn text(&self, key: &str) -> Option<String> {
        self.0.get(key).map(FieldValue::to_cell)
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        match self.0.get(key) {
            Some(FieldValue::Int(i)) => Some(*i),
            _ => None,
        }
    }

    /// Non-negative integer, clamped at zero
    pub fn uint(&self, key: &str) -> Option<u64> {
        self.int(key).map(|i| i.max(0) as u64)
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        match self.0.get(key) {
            Some(FieldValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn text_or(&self, key: &str, default: &str) -> String {
        self.text(key).unwrap_or_else(|| default.to_string())
    }
}

impl FromIterator<(String, FieldValue)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_getters() {
        let map = FieldMap::new()
            .with("name", "web001")
            .with("thin", true)
            .with("capacity_mib", 40_960i64);

        assert_eq!(map.text("name").as_deref(), Some("web001"));
        assert_eq!(map.bool("thin"), Some(true));
        assert_eq!(map.int("capacity_mib"), Some(40_960));
        assert_eq!(map.text("capacity_mib").as_deref(), Some("40960"));
        assert_eq!(map.int("name"), None);
        assert_eq!(map.text_or("missing", "-"), "-");
    }

    #[test]
    fn test_bool_cell_rendering() {
        assert_eq!(FieldValue::Bool(true).to_cell(), "True");
        assert_eq!(FieldValue::Bool(false).to_cell(), "False");
    }

    #[test]
    fn test_uint_clamps_negative() {
        let map = FieldMap::new().with("size_mib", -5i64);
        assert_eq!(map.uint("size_mib"), Some(0));
    }
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Capability tags declared by components.
//!
//! Components declare tags as a loose mapping, for example
//! `{"modalities": ["SAR", "EO"], "category": "spatial_filter",
//! "description": "..."}`. Parsing turns that into one set of values per
//! axis. An axis with no values is "untagged" and matches every filter.

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

pub const MODALITY: &str = "modality";
pub const CATEGORY: &str = "category";

const DECLARED_MODALITIES: &str = "modalities";
const DECLARED_DESCRIPTION: &str = "description";

/// Axis name to declared values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilityTags {
    axes: BTreeMap<String, BTreeSet<String>>,
}

impl CapabilityTags {
    /// Tags from `(axis, values)` pairs. Empty value lists leave the axis untagged.
    pub fn from_axes<I, A, V, S>(axes: I) -> Self
    where
        I: IntoIterator<Item = (A, V)>,
        A: Into<String>,
        V: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tags = Self::default();
        for (axis, values) in axes {
            let values: BTreeSet<String> = values.into_iter().map(Into::into).collect();
            if !values.is_empty() {
                tags.axes.insert(axis.into(), values);
            }
        }
        tags
    }

    /// Parse a declared tag mapping. Returns the tags and the optional
    /// description carried alongside them.
    pub fn from_declared(declared: &Value) -> Result<(Self, Option<String>), String> {
        let map = declared
            .as_object()
            .ok_or_else(|| format!("expected a mapping, found {}", json_kind(declared)))?;

        let mut tags = Self::default();
        let mut description = None;

        for (key, value) in map {
            if key == DECLARED_DESCRIPTION {
                match value {
                    Value::String(text) => description = Some(text.clone()),
                    Value::Null => {}
                    other => {
                        return Err(format!(
                            "'description' must be a string, found {}",
                            json_kind(other)
                        ))
                    }
                }
                continue;
            }

            let axis = if key == DECLARED_MODALITIES {
                MODALITY
            } else {
                key.as_str()
            };
            let values = string_values(key, value)?;
            if !values.is_empty() {
                tags.axes.insert(axis.to_string(), values);
            }
        }

        Ok((tags, description))
    }

    /// Whether the component declares any value on `axis`.
    pub fn is_tagged(&self, axis: &str) -> bool {
        self.axes.get(axis).map_or(false, |v| !v.is_empty())
    }

    pub fn values(&self, axis: &str) -> impl Iterator<Item = &str> {
        self.axes.get(axis).into_iter().flatten().map(String::as_str)
    }

    /// Filter rule: untagged axes match anything, tagged axes need membership.
    pub fn matches(&self, axis: &str, value: &str) -> bool {
        match self.axes.get(axis) {
            Some(values) if !values.is_empty() => values.contains(value),
            _ => true,
        }
    }

    pub fn axes(&self) -> impl Iterator<Item = &str> {
        self.axes.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }
}

fn string_values(key: &str, value: &Value) -> Result<BTreeSet<String>, String> {
    match value {
        Value::Null => Ok(BTreeSet::new()),
        Value::String(s) => Ok(BTreeSet::from([s.clone()])),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(format!(
                    "'{}' entries must be strings, found {}",
                    key,
                    json_kind(other)
                )),
            })
            .collect(),
        other => Err(format!(
            "'{}' must be a string or list of strings, found {}",
            key,
            json_kind(other)
        )),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_declared_mapping() {
        let (tags, description) = CapabilityTags::from_declared(&json!({
            "modalities": ["SAR", "EO"],
            "category": "spatial_filter",
            "description": "Lee speckle filter",
        }))
        .unwrap();

        assert_eq!(tags.values(MODALITY).collect::<Vec<_>>(), vec!["EO", "SAR"]);
        assert_eq!(tags.values(CATEGORY).collect::<Vec<_>>(), vec!["spatial_filter"]);
        assert_eq!(description.as_deref(), Some("Lee speckle filter"));
    }

    #[test]
    fn empty_lists_leave_axis_untagged() {
        let (tags, _) =
            CapabilityTags::from_declared(&json!({"modalities": [], "category": null})).unwrap();
        assert!(!tags.is_tagged(MODALITY));
        assert!(!tags.is_tagged(CATEGORY));
        assert!(tags.matches(MODALITY, "anything"));
    }

    #[test]
    fn rejects_malformed_declarations() {
        let cases = vec![
            json!(["SAR"]),
            json!({"modalities": "SAR", "category": 3}),
            json!({"modalities": ["SAR", 1]}),
            json!({"description": ["not", "text"]}),
        ];
        for declared in cases {
            assert!(
                CapabilityTags::from_declared(&declared).is_err(),
                "expected {} to be rejected",
                declared
            );
        }
    }

    #[test]
    fn matches_requires_membership_when_tagged() {
        let tags = CapabilityTags::from_axes([(MODALITY, vec!["SAR"])]);
        assert!(tags.matches(MODALITY, "SAR"));
        assert!(!tags.matches(MODALITY, "EO"));
        assert!(tags.matches(CATEGORY, "contrast_enhancement"));
    }
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Step parameter values and the constraints components declare for them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::errors::ParameterViolation;

/// A single parameter value. Enumerated choices travel as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ParamValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Bool(_) => "bool",
            ParamValue::Int(_) => "int",
            ParamValue::Float(_) => "float",
            ParamValue::Str(_) => "string",
        }
    }

    /// Numeric view; ints widen to floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(v) => Some(*v as f64),
            ParamValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(v) => write!(f, "{}", v),
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Str(v) => write!(f, "{}", v),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v.into())
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Str(v)
    }
}

/// Parameter name to value, ordered by name.
pub type Parameters = BTreeMap<String, ParamValue>;

/// Declared type and bounds of a parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamKind {
    Int { min: Option<i64>, max: Option<i64> },
    Float { min: Option<f64>, max: Option<f64> },
    Bool,
    Str,
    Choice(Vec<String>),
}

impl ParamKind {
    fn type_name(&self) -> &'static str {
        match self {
            ParamKind::Int { .. } => "int",
            ParamKind::Float { .. } => "float",
            ParamKind::Bool => "bool",
            ParamKind::Str | ParamKind::Choice(_) => "string",
        }
    }
}

/// A tunable parameter a component declares.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    pub name: String,
    pub kind: ParamKind,
    pub required: bool,
    pub default: Option<ParamValue>,
    pub description: String,
}

impl ParameterSpec {
    pub fn new(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            default: None,
            description: String::new(),
        }
    }

    pub fn int(name: impl Into<String>, min: Option<i64>, max: Option<i64>) -> Self {
        Self::new(name, ParamKind::Int { min, max })
    }

    pub fn float(name: impl Into<String>, min: Option<f64>, max: Option<f64>) -> Self {
        Self::new(name, ParamKind::Float { min, max })
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Bool)
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Str)
    }

    pub fn choice<I, S>(name: impl Into<String>, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            name,
            ParamKind::Choice(choices.into_iter().map(Into::into).collect()),
        )
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<ParamValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Convert `value` to the declared type and check its bounds.
    ///
    /// Integer literals are accepted for float parameters; nothing else is
    /// converted implicitly.
    pub fn coerce(&self, value: &ParamValue) -> Result<ParamValue, ParameterViolation> {
        let mismatch = || ParameterViolation::TypeMismatch {
            expected: self.kind.type_name(),
            found: value.type_name(),
        };

        match (&self.kind, value) {
            (ParamKind::Int { min, max }, ParamValue::Int(v)) => {
                let below = min.map_or(false, |m| *v < m);
                let above = max.map_or(false, |m| *v > m);
                if below || above {
                    return Err(ParameterViolation::OutOfRange {
                        value: *v as f64,
                        min: bound_text(min.map(|m| m.to_string()), "-inf"),
                        max: bound_text(max.map(|m| m.to_string()), "inf"),
                    });
                }
                Ok(ParamValue::Int(*v))
            }
            (ParamKind::Float { min, max }, ParamValue::Int(_) | ParamValue::Float(_)) => {
                let v = value.as_f64().ok_or_else(mismatch)?;
                let below = min.map_or(false, |m| v < m);
                let above = max.map_or(false, |m| v > m);
                if below || above || v.is_nan() {
                    return Err(ParameterViolation::OutOfRange {
                        value: v,
                        min: bound_text(min.map(|m| m.to_string()), "-inf"),
                        max: bound_text(max.map(|m| m.to_string()), "inf"),
                    });
                }
                Ok(ParamValue::Float(v))
            }
            (ParamKind::Bool, ParamValue::Bool(v)) => Ok(ParamValue::Bool(*v)),
            (ParamKind::Str, ParamValue::Str(v)) => Ok(ParamValue::Str(v.clone())),
            (ParamKind::Choice(choices), ParamValue::Str(v)) => {
                if choices.iter().any(|c| c == v) {
                    Ok(ParamValue::Str(v.clone()))
                } else {
                    Err(ParameterViolation::NotAChoice {
                        value: v.clone(),
                        choices: choices.clone(),
                    })
                }
            }
            _ => Err(mismatch()),
        }
    }
}

fn bound_text(bound: Option<String>, unbounded: &str) -> String {
    bound.unwrap_or_else(|| unbounded.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce_table_driven() {
        struct TestCase {
            name: &'static str,
            spec: ParameterSpec,
            value: ParamValue,
            expected: Result<ParamValue, &'static str>,
        }

        let test_cases = vec![
            TestCase {
                name: "int within range",
                spec: ParameterSpec::int("size", Some(1), Some(15)),
                value: ParamValue::Int(7),
                expected: Ok(ParamValue::Int(7)),
            },
            TestCase {
                name: "int above range",
                spec: ParameterSpec::int("size", Some(1), Some(15)),
                value: ParamValue::Int(16),
                expected: Err("outside"),
            },
            TestCase {
                name: "float accepts int literal",
                spec: ParameterSpec::float("sigma", Some(0.0), None),
                value: ParamValue::Int(2),
                expected: Ok(ParamValue::Float(2.0)),
            },
            TestCase {
                name: "float below range",
                spec: ParameterSpec::float("sigma", Some(0.0), None),
                value: ParamValue::Float(-0.5),
                expected: Err("[0, inf]"),
            },
            TestCase {
                name: "int rejects float",
                spec: ParameterSpec::int("size", None, None),
                value: ParamValue::Float(2.5),
                expected: Err("expected int, found float"),
            },
            TestCase {
                name: "bool rejects string",
                spec: ParameterSpec::boolean("normalize"),
                value: ParamValue::Str("yes".to_string()),
                expected: Err("expected bool, found string"),
            },
            TestCase {
                name: "choice member",
                spec: ParameterSpec::choice("method", ["nearest", "bilinear"]),
                value: ParamValue::Str("bilinear".to_string()),
                expected: Ok(ParamValue::Str("bilinear".to_string())),
            },
            TestCase {
                name: "choice non-member",
                spec: ParameterSpec::choice("method", ["nearest", "bilinear"]),
                value: ParamValue::Str("cubic".to_string()),
                expected: Err("not one of"),
            },
        ];

        for test_case in test_cases {
            let result = test_case.spec.coerce(&test_case.value);
            match (result, test_case.expected) {
                (Ok(actual), Ok(expected)) => {
                    assert_eq!(actual, expected, "Test case '{}'", test_case.name)
                }
                (Err(violation), Err(fragment)) => assert!(
                    violation.to_string().contains(fragment),
                    "Test case '{}': '{}' does not mention '{}'",
                    test_case.name,
                    violation,
                    fragment
                ),
                (actual, expected) => panic!(
                    "Test case '{}': expected {:?}, got {:?}",
                    test_case.name, expected, actual
                ),
            }
        }
    }

    #[test]
    fn untagged_yaml_values_keep_their_type() {
        let parsed: Parameters =
            serde_yaml::from_str("a: true\nb: 3\nc: 3.0\nd: bilinear\n").unwrap();
        assert_eq!(parsed["a"], ParamValue::Bool(true));
        assert_eq!(parsed["b"], ParamValue::Int(3));
        assert_eq!(parsed["c"], ParamValue::Float(3.0));
        assert_eq!(parsed["d"], ParamValue::Str("bilinear".to_string()));
    }
}

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value as JsonValue;

// ---------------------------------------------------------------------------
// FieldValue – a single named field of an observation
// ---------------------------------------------------------------------------

/// A dynamically-typed observation field as it appears in stored results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{s}"),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Float(v) => write!(f, "{v:.4}"),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Null => write!(f, "<null>"),
        }
    }
}

impl FieldValue {
    /// Interpret the value as an `f64`. Only numeric variants qualify.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

/// Named fields of one observation: field_name → value.
pub type Fields = BTreeMap<String, FieldValue>;

// ---------------------------------------------------------------------------
// MatchRecord / MatchupRecord – one primary observation and its matches
// ---------------------------------------------------------------------------

/// A secondary observation matched to a primary one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchRecord {
    /// Name of the secondary dataset this observation came from.
    pub source: String,
    #[serde(flatten)]
    pub fields: Fields,
}

impl MatchRecord {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            fields: Fields::new(),
        }
    }

    pub fn with_field(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    /// Numeric value of `field`, if present.
    pub fn value(&self, field: &str) -> Option<f64> {
        self.fields.get(field).and_then(FieldValue::as_f64)
    }
}

/// A primary observation with every secondary observation matched to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchupRecord {
    #[serde(flatten)]
    pub fields: Fields,
    pub matches: Vec<MatchRecord>,
}

impl MatchupRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn with_match(mut self, m: MatchRecord) -> Self {
        self.matches.push(m);
        self
    }

    /// Numeric value of `field`, if present.
    pub fn value(&self, field: &str) -> Option<f64> {
        self.fields.get(field).and_then(FieldValue::as_f64)
    }
}

// ---------------------------------------------------------------------------
// MatchupParams / MatchupResults – a stored matchup execution
// ---------------------------------------------------------------------------

/// The request parameters a matchup execution was run with.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchupParams {
    /// Primary dataset name.
    pub primary: String,
    /// Secondary dataset names, in configured order.
    pub matchup: Vec<String>,
    /// The complete stored parameter object, passed through untouched.
    pub raw: JsonValue,
}

impl MatchupParams {
    pub fn new(primary: impl Into<String>, matchup: Vec<String>) -> Self {
        let primary = primary.into();
        let raw = serde_json::json!({ "primary": primary, "matchup": matchup });
        Self {
            primary,
            matchup,
            raw,
        }
    }

    /// The first configured secondary dataset; the only one plotted.
    pub fn first_secondary(&self) -> Option<&str> {
        self.matchup.first().map(String::as_str)
    }
}

/// Everything stored for one execution id.
#[derive(Debug, Clone)]
pub struct MatchupResults {
    pub params: MatchupParams,
    /// Execution statistics, opaque to this crate.
    pub stats: JsonValue,
    pub records: Vec<MatchupRecord>,
}

impl MatchupResults {
    /// Total number of (record, match) pairs regardless of source.
    pub fn pair_count(&self) -> usize {
        self.records.iter().map(|r| r.matches.len()).sum()
    }
}

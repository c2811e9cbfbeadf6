// Flat data points and tag naming

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;


/// Reserved tag carrying the UID of the most recently read card
pub const CARD_UID_TAG: &str = "card.uid";

/// Member name of the start-of-structure marker (`prefix.^`)
pub const START_MARKER: &str = "^";

/// Member name of the end-of-structure marker (`prefix.$`)
pub const END_MARKER: &str = "$";

/// Member name carrying an array's element count (`prefix.length`)
pub const LENGTH_MEMBER: &str = "length";

/// Scalar carried by a data point.
///
/// Structural values never appear here; objects and arrays are expanded by
/// the flattener before reaching the store.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl TagValue {
    pub fn is_none(&self) -> bool {
        matches!(self, TagValue::None)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TagValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TagValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view; integers widen to f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TagValue::Int(i) => Some(*i as f64),
            TagValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TagValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::None => write!(f, "<none>"),
            TagValue::Bool(b) => write!(f, "{}", b),
            TagValue::Int(i) => write!(f, "{}", i),
            TagValue::Float(x) => write!(f, "{}", x),
            TagValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for TagValue {
    fn from(b: bool) -> Self {
        TagValue::Bool(b)
    }
}

impl From<i64> for TagValue {
    fn from(i: i64) -> Self {
        TagValue::Int(i)
    }
}

impl From<i32> for TagValue {
    fn from(i: i32) -> Self {
        TagValue::Int(i64::from(i))
    }
}

impl From<f64> for TagValue {
    fn from(x: f64) -> Self {
        TagValue::Float(x)
    }
}

impl From<String> for TagValue {
    fn from(s: String) -> Self {
        TagValue::Text(s)
    }
}

impl From<&str> for TagValue {
    fn from(s: &str) -> Self {
        TagValue::Text(s.to_string())
    }
}

/// A single flat fact: tag, scalar value and the time it became true
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// Dotted tag path (e.g., "games.0.name"), stored as the producer wrote it
    pub tag: String,

    pub value: TagValue,

    /// UTC, millisecond precision
    pub timestamp: DateTime<Utc>,
}

impl DataPoint {
    /// Create a point stamped with the current time
    pub fn new(tag: impl Into<String>, value: impl Into<TagValue>) -> Self {
        Self::at(tag, value, now_millis())
    }

    /// Create a point with an explicit timestamp
    pub fn at(tag: impl Into<String>, value: impl Into<TagValue>, timestamp: DateTime<Utc>) -> Self {
        Self {
            tag: tag.into(),
            value: value.into(),
            timestamp: timestamp.trunc_subsecs(3),
        }
    }

    /// Valueless boundary marker
    pub fn marker(tag: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self::at(tag, TagValue::None, timestamp)
    }

    /// The invalid point returned for tags that were never published
    pub fn empty() -> Self {
        Self::at(String::new(), TagValue::None, now_millis())
    }

    /// A point is valid when it has a tag and a value
    pub fn is_valid(&self) -> bool {
        !self.tag.is_empty() && !self.value.is_none()
    }

    /// Case-folded tag used as the store key
    pub fn normalized_tag(&self) -> String {
        normalize_tag(&self.tag)
    }
}

/// Fold a tag to its canonical (lower-case) form
pub fn normalize_tag(tag: &str) -> String {
    tag.to_lowercase()
}

/// Current UTC time truncated to milliseconds
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

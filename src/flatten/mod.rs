//! Tree-to-tag flattening.
//!
//! Expands a JSON document into an ordered sequence of flat [`DataPoint`]s
//! whose tags are dotted paths into the document. Consumers rebuild
//! structure from the framing:
//!
//! - objects below the top level: `prefix.^`, members in insertion order, `prefix.$`
//! - arrays at any depth: `prefix.^`, elements `prefix.0..n`, `prefix.length`, `prefix.$`
//!   (an empty prefix still keeps the dot: `.^`, `.0`, `.length`, `.$`)
//! - scalars: one point at `prefix`
//!
//! `null` leaves are dropped. Every point of one call carries the same timestamp.

use crate::point::{DataPoint, TagValue, END_MARKER, LENGTH_MEMBER, START_MARKER};
use chrono::{DateTime, Utc};
use serde_json::{Number, Value};


/// Flatten `value` addressed by `prefix`
pub fn flatten(value: &Value, prefix: &str, timestamp: DateTime<Utc>) -> Vec<DataPoint> {
    let mut points = Vec::new();
    flatten_into(value, prefix, timestamp, &mut points);
    points
}

/// Flatten a whole document (empty prefix, no outer object framing)
pub fn flatten_document(document: &Value, timestamp: DateTime<Utc>) -> Vec<DataPoint> {
    flatten(document, "", timestamp)
}

/// Join a tag prefix and an object member name
pub fn join(prefix: &str, member: &str) -> String {
    if prefix.is_empty() {
        member.to_string()
    } else {
        format!("{}.{}", prefix, member)
    }
}

fn flatten_into(value: &Value, prefix: &str, timestamp: DateTime<Utc>, out: &mut Vec<DataPoint>) {
    match value {
        Value::Object(members) => {
            // The top-level object is not framed
            let framed = !prefix.is_empty();
            if framed {
                out.push(DataPoint::marker(join(prefix, START_MARKER), timestamp));
            }
            for (key, member) in members {
                flatten_into(member, &join(prefix, key), timestamp, out);
            }
            if framed {
                out.push(DataPoint::marker(join(prefix, END_MARKER), timestamp));
            }
        }
        Value::Array(elements) => {
            // Array members always take a dot, even at an empty prefix
            let member = |name: &str| format!("{}.{}", prefix, name);
            out.push(DataPoint::marker(member(START_MARKER), timestamp));
            for (index, element) in elements.iter().enumerate() {
                flatten_into(element, &member(&index.to_string()), timestamp, out);
            }
            out.push(DataPoint::at(
                member(LENGTH_MEMBER),
                elements.len() as i64,
                timestamp,
            ));
            out.push(DataPoint::marker(member(END_MARKER), timestamp));
        }
        Value::Null => {}
        Value::Bool(b) => out.push(DataPoint::at(prefix, *b, timestamp)),
        Value::Number(n) => out.push(DataPoint::at(prefix, classify_number(n), timestamp)),
        Value::String(s) => out.push(DataPoint::at(prefix, s.as_str(), timestamp)),
    }
}

/// Integral numbers become `Int`, everything else `Float`
pub fn classify_number(number: &Number) -> TagValue {
    if let Some(i) = number.as_i64() {
        return TagValue::Int(i);
    }
    // u64 above i64::MAX
    if let Some(u) = number.as_u64() {
        return TagValue::Float(u as f64);
    }
    match number.as_f64() {
        Some(f) if is_integral(f) => TagValue::Int(f as i64),
        Some(f) => TagValue::Float(f),
        None => TagValue::None,
    }
}

/// True when `f` equals its floor within a relative 1e-12 tolerance and fits in i64
fn is_integral(f: f64) -> bool {
    if !f.is_finite() || f < i64::MIN as f64 || f >= i64::MAX as f64 {
        return false;
    }
    let floor = f.floor();
    (f - floor).abs() * 1e12 <= f.abs().min(floor.abs())
}

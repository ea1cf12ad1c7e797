//! Condition evaluation.
//!
//! Every comparison is total: it yields `true` or `false` and never an
//! error. Absent fields, operand shapes that do not fit the operator,
//! patterns that do not compile, and unknown operators all evaluate to
//! `false`.

use crate::fields::{self, FieldValue};
use crate::policy::{Condition, Operator, Policy};
use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde_json::Value;
use std::borrow::Cow;
use warden_types::Context;

// ============================================================================
// Public API
// ============================================================================

/// Evaluates a single condition against the context.
pub fn evaluate_condition(condition: &Condition, context: &Context) -> bool {
    let field = fields::resolve(context, &condition.field);
    if field.is_undefined() {
        return false;
    }
    let operand = &condition.value;

    match &condition.operator {
        Operator::Equals => strict_equals(field, operand),
        Operator::NotEquals => !strict_equals(field, operand),
        Operator::Contains => contains(field, operand),
        Operator::NotContains => !contains(field, operand),
        Operator::GreaterThan => compare(field, operand, |a, b| a > b),
        Operator::LessThan => compare(field, operand, |a, b| a < b),
        Operator::InRange => in_range(field, operand),
        Operator::Regex => regex_matches(field, operand),
        Operator::Unknown(_) => false,
    }
}

/// Whether a policy applies to the context: every condition holds.
///
/// A policy without conditions always applies. The `logicalOperator` field
/// on conditions is not consulted.
pub fn policy_applies(policy: &Policy, context: &Context) -> bool {
    policy
        .conditions
        .iter()
        .all(|cond| evaluate_condition(cond, context))
}

// ============================================================================
// Operators
// ============================================================================

/// Type-preserving equality between a field and an operand.
fn strict_equals(field: FieldValue<'_>, operand: &Value) -> bool {
    match (field, operand) {
        (FieldValue::Bool(a), Value::Bool(b)) => a == *b,
        (FieldValue::Number(a), Value::Number(b)) => b.as_f64().is_some_and(|b| a == b),
        (FieldValue::Text(a), Value::String(b)) => a == b.as_str(),
        (FieldValue::List(items), Value::Array(values)) => {
            items.len() == values.len()
                && items
                    .iter()
                    .zip(values)
                    .all(|(item, value)| value.as_str() == Some(item.as_str()))
        }
        (FieldValue::Timestamp(at), Value::String(s)) => {
            DateTime::parse_from_rfc3339(s).is_ok_and(|parsed| parsed == at)
        }
        _ => false,
    }
}

fn contains(field: FieldValue<'_>, operand: &Value) -> bool {
    match field_text(field) {
        Some(haystack) => haystack.contains(operand_text(operand).as_ref()),
        None => false,
    }
}

fn compare(field: FieldValue<'_>, operand: &Value, op: impl Fn(f64, f64) -> bool) -> bool {
    match (field_number(field), operand_number(operand)) {
        (Some(a), Some(b)) => op(a, b),
        _ => false,
    }
}

fn in_range(field: FieldValue<'_>, operand: &Value) -> bool {
    let Some([min, max]) = operand.as_array().map(Vec::as_slice).and_then(|bounds| {
        match bounds {
            [min, max] => Some([operand_number(min)?, operand_number(max)?]),
            _ => None,
        }
    }) else {
        return false;
    };
    field_number(field).is_some_and(|v| min <= v && v <= max)
}

fn regex_matches(field: FieldValue<'_>, operand: &Value) -> bool {
    let Some(pattern) = operand.as_str() else {
        return false;
    };
    let Some(text) = field_text(field) else {
        return false;
    };
    match Regex::new(pattern) {
        Ok(re) => re.is_match(&text),
        Err(err) => {
            tracing::warn!(pattern = %pattern, error = %err, "Invalid regex in policy condition");
            false
        }
    }
}

// ============================================================================
// Coercions
// ============================================================================

/// Text form of a field, or `None` when undefined.
///
/// Lists join with `,`; timestamps render as RFC 3339 with millisecond
/// precision and a `Z` suffix.
pub(crate) fn field_text<'a>(field: FieldValue<'a>) -> Option<Cow<'a, str>> {
    match field {
        FieldValue::Undefined => None,
        FieldValue::Bool(b) => Some(Cow::Borrowed(if b { "true" } else { "false" })),
        FieldValue::Number(n) => Some(Cow::Owned(number_text(n))),
        FieldValue::Text(s) => Some(Cow::Borrowed(s)),
        FieldValue::List(items) => Some(Cow::Owned(items.join(","))),
        FieldValue::Timestamp(at) => Some(Cow::Owned(timestamp_text(at))),
    }
}

/// Numeric form of a field, or `None` when it has none.
///
/// Booleans map to 1/0, text is parsed, timestamps become Unix milliseconds.
pub(crate) fn field_number(field: FieldValue<'_>) -> Option<f64> {
    let n = match field {
        FieldValue::Undefined | FieldValue::List(_) => return None,
        FieldValue::Bool(b) => f64::from(u8::from(b)),
        FieldValue::Number(n) => n,
        FieldValue::Text(s) => s.trim().parse::<f64>().ok()?,
        FieldValue::Timestamp(at) => at.timestamp_millis() as f64,
    };
    (!n.is_nan()).then_some(n)
}

pub(crate) fn operand_number(operand: &Value) -> Option<f64> {
    let n = match operand {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Bool(b) => f64::from(u8::from(*b)),
        _ => return None,
    };
    (!n.is_nan()).then_some(n)
}

fn operand_text(operand: &Value) -> Cow<'_, str> {
    match operand {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Null => Cow::Borrowed("null"),
        Value::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
        Value::Number(n) => Cow::Owned(n.as_f64().map_or_else(|| n.to_string(), number_text)),
        Value::Array(items) => Cow::Owned(
            items
                .iter()
                .map(|item| operand_text(item).into_owned())
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Cow::Owned(operand.to_string()),
    }
}

/// Integral values render without a fractional part (`1`, not `1.0`).
fn number_text(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

fn timestamp_text(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ============================================================================
// Tests
// ============================================================================

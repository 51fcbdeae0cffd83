//! Purpose: Map loosely-typed XML-RPC response values onto typed results.
//! Exports: crate-internal shape helpers used by the client and value objects.
//! Role: Validate response shape once, at the binding boundary.
//! Invariants: Shape mismatches raise `ErrorKind::Protocol` naming the remote method.
//! Invariants: Only the documented empty-string/falsy conventions become `None`.
#![allow(clippy::result_large_err)]

use crate::core::error::{Error, ErrorKind};
use std::collections::BTreeMap;
use xmlrpc::Value;

type ApiResult<T> = Result<T, Error>;

fn shape_error(method: &str, expected: &str, value: &Value) -> Error {
    Error::new(ErrorKind::Protocol)
        .with_message(format!("expected {expected}, got {}", describe(value)))
        .with_method(method)
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Int(_) | Value::Int64(_) => "int",
        Value::Bool(_) => "bool",
        Value::String(_) => "string",
        Value::Double(_) => "double",
        Value::DateTime(_) => "datetime",
        Value::Base64(_) => "base64",
        Value::Struct(_) => "struct",
        Value::Array(_) => "array",
        Value::Nil => "nil",
    }
}

/// The remote's "nothing here" sentinels: boolean false, integer zero, nil.
pub(crate) fn is_falsy(value: &Value) -> bool {
    matches!(
        value,
        Value::Bool(false) | Value::Int(0) | Value::Int64(0) | Value::Nil
    )
}

pub(crate) fn expect_struct<'a>(
    method: &str,
    value: &'a Value,
) -> ApiResult<&'a BTreeMap<String, Value>> {
    value
        .as_struct()
        .ok_or_else(|| shape_error(method, "a struct", value))
}

pub(crate) fn expect_array<'a>(method: &str, value: &'a Value) -> ApiResult<&'a [Value]> {
    value
        .as_array()
        .ok_or_else(|| shape_error(method, "an array", value))
}

pub(crate) fn expect_string<'a>(method: &str, value: &'a Value) -> ApiResult<&'a str> {
    value
        .as_str()
        .ok_or_else(|| shape_error(method, "a string", value))
}

pub(crate) fn expect_bool(method: &str, value: &Value) -> ApiResult<bool> {
    value
        .as_bool()
        .ok_or_else(|| shape_error(method, "a bool", value))
}

pub(crate) fn expect_int(method: &str, value: &Value) -> ApiResult<i64> {
    value
        .as_i64()
        .ok_or_else(|| shape_error(method, "an int", value))
}

pub(crate) fn expect_count(method: &str, value: &Value) -> ApiResult<u64> {
    let count = expect_int(method, value)?;
    u64::try_from(count).map_err(|_| {
        Error::new(ErrorKind::Protocol)
            .with_message(format!("expected a non-negative count, got {count}"))
            .with_method(method)
    })
}

/// Empty string means "none" on this wire.
pub(crate) fn optional_string(method: &str, value: &Value) -> ApiResult<Option<String>> {
    let text = expect_string(method, value)?;
    if text.is_empty() {
        Ok(None)
    } else {
        Ok(Some(text.to_string()))
    }
}

pub(crate) fn struct_field<'a>(
    method: &str,
    record: &'a BTreeMap<String, Value>,
    key: &str,
) -> ApiResult<&'a Value> {
    record.get(key).ok_or_else(|| {
        Error::new(ErrorKind::Protocol)
            .with_message(format!("record is missing field '{key}'"))
            .with_method(method)
    })
}

pub(crate) fn struct_string(
    method: &str,
    record: &BTreeMap<String, Value>,
    key: &str,
) -> ApiResult<String> {
    let value = struct_field(method, record, key)?;
    Ok(expect_string(method, value)?.to_string())
}

pub(crate) fn struct_int(
    method: &str,
    record: &BTreeMap<String, Value>,
    key: &str,
) -> ApiResult<i64> {
    expect_int(method, struct_field(method, record, key)?)
}

/// Absent field falls back to `default`; older servers omit the flag entirely
/// and some encode booleans as 0/1 ints.
pub(crate) fn struct_bool_or(
    method: &str,
    record: &BTreeMap<String, Value>,
    key: &str,
    default: bool,
) -> ApiResult<bool> {
    match record.get(key) {
        None => Ok(default),
        Some(Value::Int(flag)) => Ok(*flag != 0),
        Some(Value::Int64(flag)) => Ok(*flag != 0),
        Some(value) => expect_bool(method, value),
    }
}

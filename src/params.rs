// ABOUTME: Normalization of submitted form and query parameters into JSON values
// ABOUTME: Trims strings, maps blank values to null, and parses designated boolean fields
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 webtools contributors

use crate::errors::{AppError, AppResult};
use serde_json::{Map, Value};

/// Normalized request parameters
pub type ParamMap = Map<String, Value>;

/// Normalize raw request parameters
///
/// Every value is trimmed; blank values become `null`. Values of `bool_keys` are
/// parsed as JSON booleans (`true`/`false`), everything else stays a string.
///
/// # Errors
///
/// Returns an invalid-input error naming the key when a boolean field holds
/// anything other than `true` or `false`
pub fn normalize_params<I, K, V>(params: I, bool_keys: &[&str]) -> AppResult<ParamMap>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: AsRef<str>,
{
    params
        .into_iter()
        .map(|(key, value)| {
            let key = key.into();
            let value = normalize_value(&key, value.as_ref(), bool_keys)?;
            Ok((key, value))
        })
        .collect()
}

fn normalize_value(key: &str, raw: &str, bool_keys: &[&str]) -> AppResult<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }
    if !bool_keys.contains(&key) {
        return Ok(Value::String(trimmed.to_owned()));
    }
    serde_json::from_str::<bool>(trimmed)
        .map(Value::Bool)
        .map_err(|e| {
            AppError::invalid_input(format!("parameter '{key}' must be true or false"))
                .with_source(e)
        })
}

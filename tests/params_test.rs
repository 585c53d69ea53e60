// ABOUTME: Integration tests for request parameter normalization
// ABOUTME: Covers trimming, blank-to-null conversion, and boolean field parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 webtools contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use serde_json::{json, Value};
use std::collections::HashMap;
use webtools::errors::ErrorCode;
use webtools::params::normalize_params;

#[test]
fn test_values_are_trimmed_and_blanks_become_null() {
    let raw: HashMap<String, String> = [
        ("name", "  Ada Lovelace "),
        ("email", ""),
        ("note", " \t "),
        ("city", "London"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_owned(), v.to_owned()))
    .collect();

    let params = normalize_params(raw, &[]).unwrap();
    assert_eq!(
        Value::Object(params),
        json!({"name": "Ada Lovelace", "email": null, "note": null, "city": "London"})
    );
}

#[test]
fn test_bool_keys_are_parsed() {
    let params = normalize_params(
        [("active", " true "), ("archived", "false"), ("label", "true")],
        &["active", "archived"],
    )
    .unwrap();

    assert_eq!(params["active"], Value::Bool(true));
    assert_eq!(params["archived"], Value::Bool(false));
    // Not a designated key: stays text
    assert_eq!(params["label"], Value::String("true".into()));
}

#[test]
fn test_blank_bool_key_is_null() {
    let params = normalize_params([("active", "")], &["active"]).unwrap();
    assert_eq!(params["active"], Value::Null);
}

#[test]
fn test_invalid_bool_is_rejected() {
    let error = normalize_params([("active", "yes")], &["active"]).unwrap_err();
    assert_eq!(error.code, ErrorCode::InvalidInput);
    assert!(error.message.contains("active"));
}

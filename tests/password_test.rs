// ABOUTME: Integration tests for the password hashing context
// ABOUTME: Legacy bcrypt verification, upgrade detection, and scheme selection by policy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 webtools contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{fast_policy, legacy_bcrypt_hash};
use webtools::auth::{PasswordContext, PasswordScheme};
use webtools::config::{HashAlgorithm, PasswordPolicy};

#[test]
fn test_legacy_hash_verifies_and_is_upgraded() {
    let context = PasswordContext::new(fast_policy()).unwrap();
    let legacy = legacy_bcrypt_hash("s3cret");

    let outcome = context.verify_and_update("s3cret", &legacy).unwrap();
    assert!(outcome.valid);
    let upgraded = outcome.upgraded_hash.expect("legacy hash should be upgraded");
    assert_eq!(HashAlgorithm::identify(&upgraded), Some(HashAlgorithm::Argon2id));
    assert!(context.verify_and_update("s3cret", &upgraded).unwrap().valid);
}

#[test]
fn test_wrong_password_never_upgrades() {
    let context = PasswordContext::new(fast_policy()).unwrap();
    let legacy = legacy_bcrypt_hash("s3cret");

    let outcome = context.verify_and_update("wrong", &legacy).unwrap();
    assert!(!outcome.valid);
    assert_eq!(outcome.upgraded_hash, None);
}

#[test]
fn test_malformed_hashes_are_invalid() {
    let context = PasswordContext::new(fast_policy()).unwrap();
    for hash in [
        "",
        "plaintext",
        "$2b$04$tooshort",
        "$argon2id$v=19$m=1024,t=1,p=1$not-base64!$x",
        "$pbkdf2-sha256$29000$N2bMWasV4rw3Zsy5F2LsXQ$abc",
    ] {
        let outcome = context.verify_and_update("s3cret", hash).unwrap();
        assert!(!outcome.valid, "hash {hash:?}");
    }
}

#[test]
fn test_weaker_bcrypt_cost_is_upgraded_under_bcrypt_scheme() {
    let policy = PasswordPolicy {
        scheme: HashAlgorithm::Bcrypt,
        deprecated: vec![HashAlgorithm::Argon2id],
        bcrypt_cost: 5,
        ..fast_policy()
    };
    let context = PasswordContext::new(policy).unwrap();

    let weak = legacy_bcrypt_hash("s3cret");
    let outcome = context.verify_and_update("s3cret", &weak).unwrap();
    assert!(outcome.valid);
    let upgraded = outcome.upgraded_hash.unwrap();
    assert!(upgraded.starts_with("$2b$05$"), "got {upgraded}");

    let outcome = context.verify_and_update("s3cret", &upgraded).unwrap();
    assert_eq!(outcome.upgraded_hash, None);
}

#[test]
fn test_invalid_policy_is_rejected() {
    let policy = PasswordPolicy {
        bcrypt_cost: 40,
        ..PasswordPolicy::default()
    };
    assert!(PasswordContext::new(policy).is_err());
}

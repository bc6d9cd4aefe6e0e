//! End-to-end tests of the public krip API on the default providers.

use krip::{CryptError, ErrorKind, KeyUsage, Krip, Overrides, Secret};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const SECRET: &str = "MY_SPECIAL_KEY";

fn krip() -> Krip {
    Krip::default()
}

fn secret() -> Secret {
    Secret::from(SECRET)
}

/// Replace the hex digit at `index` with a different one.
fn flip_hex_char(s: &str, index: usize) -> String {
    let mut chars: Vec<char> = s.chars().collect();
    chars[index] = if chars[index] == '0' { '1' } else { '0' };
    chars.into_iter().collect()
}

fn assert_decrypt_failure(err: &CryptError) {
    assert!(err.is_processing_failure(), "unexpected error: {err:?}");
    assert_eq!(err.to_string(), "Could not decrypt this value.");
}

// ---------------------------------------------------------------------------
// Encryption round-trip
// ---------------------------------------------------------------------------

#[tokio::test]
async fn object_round_trip_and_wire_length() {
    let value = json!({"some": "data"});
    let plaintext_len = r#"{"some":"data"}"#.len();

    let encrypted = krip().encrypt(&value, &secret(), None).await.unwrap();
    assert_eq!(encrypted.len(), 24 + 2 * (plaintext_len + 16));
    assert!(encrypted
        .chars()
        .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));

    let decrypted = krip().decrypt(&encrypted, &secret(), None).await.unwrap();
    assert_eq!(decrypted, value);
}

#[tokio::test]
async fn scalar_values_round_trip() {
    let k = krip();
    for value in [
        json!("text"),
        json!(42),
        json!(1.5),
        json!(true),
        json!(null),
        json!([1, "two", {"three": 3}]),
        json!("ünïcödé ✓"),
    ] {
        let encrypted = k.encrypt(&value, &secret(), None).await.unwrap();
        assert_eq!(k.decrypt(&encrypted, &secret(), None).await.unwrap(), value);
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Account {
    id: u64,
    owner: String,
    tags: Vec<String>,
}

#[tokio::test]
async fn typed_round_trip() {
    let account = Account {
        id: 7,
        owner: "ada".into(),
        tags: vec!["admin".into()],
    };
    let encrypted = krip().encrypt(&account, &secret(), None).await.unwrap();
    let back: Account = krip().decrypt_as(&encrypted, &secret(), None).await.unwrap();
    assert_eq!(back, account);
}

#[tokio::test]
async fn encryption_is_not_deterministic() {
    let value = json!({"some": "data"});
    let a = krip().encrypt(&value, &secret(), None).await.unwrap();
    let b = krip().encrypt(&value, &secret(), None).await.unwrap();
    assert_ne!(a, b);
    assert_ne!(&a[..24], &b[..24]);
}

#[tokio::test]
async fn separate_instances_share_derived_keys() {
    let encrypted = Krip::default()
        .encrypt("portable", &secret(), None)
        .await
        .unwrap();
    let decrypted = Krip::default()
        .decrypt(&encrypted, &secret(), None)
        .await
        .unwrap();
    assert_eq!(decrypted, json!("portable"));
}

#[tokio::test]
async fn larger_nonce_round_trip() {
    let o = Overrides::new().with_nonce_size(16);
    let encrypted = krip().encrypt("wide", &secret(), Some(&o)).await.unwrap();
    assert_eq!(encrypted.len(), 32 + 2 * ("\"wide\"".len() + 16));
    assert_eq!(
        krip().decrypt(&encrypted, &secret(), Some(&o)).await.unwrap(),
        json!("wide")
    );

    // Decoding with the default nonce size misreads the boundary.
    let err = krip().decrypt(&encrypted, &secret(), None).await.unwrap_err();
    assert_decrypt_failure(&err);
}

// ---------------------------------------------------------------------------
// Authentication failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn any_single_character_change_is_rejected() {
    let k = krip();
    let encrypted = k.encrypt(&json!({"some": "data"}), &secret(), None).await.unwrap();

    for i in 0..encrypted.len() {
        let tampered = flip_hex_char(&encrypted, i);
        let err = k.decrypt(&tampered, &secret(), None).await.unwrap_err();
        assert_decrypt_failure(&err);
    }
}

#[tokio::test]
async fn wrong_secret_is_rejected() {
    let encrypted = krip().encrypt("classified", &secret(), None).await.unwrap();
    let err = krip()
        .decrypt(&encrypted, &Secret::from("NOT_MY_KEY"), None)
        .await
        .unwrap_err();
    assert_decrypt_failure(&err);
    assert_eq!(err.kind(), Some(ErrorKind::Operation));
}

#[tokio::test]
async fn malformed_input_looks_like_any_other_decrypt_failure() {
    for input in ["", "ABC", "ZZZZZZZZZZZZZZZZZZZZZZZZ00", "not even close"] {
        let err = krip().decrypt(input, &secret(), None).await.unwrap_err();
        assert_decrypt_failure(&err);
    }
}

#[tokio::test]
async fn truncated_ciphertext_is_rejected() {
    let encrypted = krip().encrypt("short", &secret(), None).await.unwrap();
    let truncated = &encrypted[..encrypted.len() - 2];
    let err = krip().decrypt(truncated, &secret(), None).await.unwrap_err();
    assert_decrypt_failure(&err);
}

// ---------------------------------------------------------------------------
// Secrets
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_or_falsy_secrets_are_contract_violations() {
    for secret in [
        Secret::from(""),
        Secret::from(json!(null)),
        Secret::from(json!(false)),
        Secret::from(json!(0)),
    ] {
        let err = krip().encrypt("x", &secret, None).await.unwrap_err();
        assert!(err.is_contract_violation());
        assert_eq!(err.to_string(), "The secret must be provided.");

        let err = krip().decrypt("00", &secret, None).await.unwrap_err();
        assert!(err.is_contract_violation());
    }
}

#[tokio::test]
async fn object_secret_round_trip() {
    let secret = Secret::from(json!({"some": "key"}));
    let encrypted = krip().encrypt("payload", &secret, None).await.unwrap();
    assert_eq!(
        krip().decrypt(&encrypted, &secret, None).await.unwrap(),
        json!("payload")
    );

    // Same as the text of its JSON form.
    let as_text = Secret::from(r#"{"some":"key"}"#);
    assert_eq!(
        krip().decrypt(&encrypted, &as_text, None).await.unwrap(),
        json!("payload")
    );
}

#[tokio::test]
async fn empty_byte_secret_is_still_a_secret() {
    let empty = Secret::from(Vec::<u8>::new());
    let encrypted = krip().encrypt("payload", &empty, None).await.unwrap();
    assert_eq!(
        krip().decrypt(&encrypted, &empty, None).await.unwrap(),
        json!("payload")
    );
    let err = krip().decrypt(&encrypted, &secret(), None).await.unwrap_err();
    assert_decrypt_failure(&err);
}

#[tokio::test]
async fn json_string_secret_matches_its_text_form() {
    let encrypted = krip()
        .encrypt("payload", &Secret::from("pw"), None)
        .await
        .unwrap();
    assert_eq!(
        krip()
            .decrypt(&encrypted, &Secret::from(json!("pw")), None)
            .await
            .unwrap(),
        json!("payload")
    );
}

#[tokio::test]
async fn byte_secret_matches_its_text_form() {
    let encrypted = krip()
        .encrypt("payload", &Secret::from(SECRET.as_bytes()), None)
        .await
        .unwrap();
    assert_eq!(
        krip().decrypt(&encrypted, &secret(), None).await.unwrap(),
        json!("payload")
    );
}

// ---------------------------------------------------------------------------
// Generated keys
// ---------------------------------------------------------------------------

#[tokio::test]
async fn generated_key_metadata() {
    let key = krip().generate_secret(None).await.unwrap();
    assert_eq!(key.algorithm().name, "AES-GCM");
    assert_eq!(key.algorithm().length, 256);
    assert!(!key.extractable());
    assert_eq!(key.key_type(), "secret");
    assert_eq!(key.usages().names(), vec!["decrypt", "encrypt"]);
    assert!(key.usages().allows(KeyUsage::Encrypt));
    assert!(key.usages().allows(KeyUsage::Decrypt));
}

#[tokio::test]
async fn generated_key_can_be_reused_as_secret() {
    for bits in [128, 192, 256] {
        let o = Overrides::new().with_key_length(bits);
        let key = krip().generate_secret(Some(&o)).await.unwrap();
        assert_eq!(key.algorithm().length, bits);

        let secret = Secret::from(key);
        let encrypted = krip().encrypt(&json!([1, 2, 3]), &secret, None).await.unwrap();
        assert_eq!(
            krip().decrypt(&encrypted, &secret, None).await.unwrap(),
            json!([1, 2, 3])
        );
    }
}

#[tokio::test]
async fn generated_keys_are_distinct() {
    let a = Secret::from(krip().generate_secret(None).await.unwrap());
    let b = Secret::from(krip().generate_secret(None).await.unwrap());
    let encrypted = krip().encrypt("x", &a, None).await.unwrap();
    let err = krip().decrypt(&encrypted, &b, None).await.unwrap_err();
    assert_decrypt_failure(&err);
}

#[tokio::test]
async fn unsupported_key_length_is_surfaced_unwrapped() {
    let o = Overrides::new().with_key_length(512);
    let err = krip().generate_secret(Some(&o)).await.unwrap_err();
    assert!(matches!(err, CryptError::Primitive(_)));
    assert_eq!(err.kind(), Some(ErrorKind::NotSupported));
}

// ---------------------------------------------------------------------------
// Hashing
// ---------------------------------------------------------------------------

const SOME_DATA_SHA256: &str = "c67cdc294fe06519bd9b7948e27059b643edf540877335b271957ab95dd551b7";
const SOME_DATA_SHA1: &str = "b5f97e50a8d6fb167b83b3c7084b0d15109429c0";

#[tokio::test]
async fn hash_matches_sha256_of_the_json_text() {
    let digest = krip()
        .hash(json!({"some": "data"}), Some("SHA-256"), None)
        .await
        .unwrap();
    assert_eq!(digest, SOME_DATA_SHA256);

    let by_default = krip().hash(json!({"some": "data"}), None, None).await.unwrap();
    assert_eq!(by_default, SOME_DATA_SHA256);
}

#[tokio::test]
async fn hash_differs_per_algorithm() {
    let value = json!({"some": "data"});
    let sha1 = krip().hash(value.clone(), Some("SHA-1"), None).await.unwrap();
    let sha384 = krip().hash(value.clone(), Some("SHA-384"), None).await.unwrap();
    let sha512 = krip().hash(value, Some("SHA-512"), None).await.unwrap();

    assert_eq!(sha1, SOME_DATA_SHA1);
    assert_ne!(sha1, SOME_DATA_SHA256);
    assert_eq!(sha384.len(), 96);
    assert_eq!(sha512.len(), 128);
}

#[tokio::test]
async fn hash_is_deterministic() {
    let a = krip().hash("foo", Some("SHA-1"), None).await.unwrap();
    let b = krip().hash("foo", Some("SHA-1"), None).await.unwrap();
    assert_eq!(a, b);
    assert_eq!(a, "0beec7b5ea3f0fdbc95d0dd47f3c5bc275da8a33");
}

#[tokio::test]
async fn hash_accepts_any_case_and_rejects_unlisted() {
    let lower = krip().hash("foo", Some("sha-256"), None).await.unwrap();
    assert_eq!(
        lower,
        "2c26b46b68ffc68ff99b453c1d30413413422d706483bfa0f98a5e886266e7ae"
    );

    let err = krip().hash("foo", Some("MD5"), None).await.unwrap_err();
    assert!(err.is_contract_violation());
    assert_eq!(
        err.to_string(),
        r#"The algorithm must be one of "SHA-1", "SHA-256", "SHA-384", "SHA-512"."#
    );
}

#[tokio::test]
async fn hash_of_json_string_equals_hash_of_text() {
    let from_value = krip().hash(json!("abc"), None, None).await.unwrap();
    let from_text = krip().hash("abc", None, None).await.unwrap();
    assert_eq!(from_value, from_text);
    assert_eq!(
        from_value,
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[tokio::test]
async fn hash_of_bytes_equals_hash_of_text() {
    let from_bytes = krip().hash(b"foo".to_vec(), Some("SHA-1"), None).await.unwrap();
    let from_text = krip().hash("foo", Some("SHA-1"), None).await.unwrap();
    assert_eq!(from_bytes, from_text);
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[test]
fn non_object_options_are_contract_violations() {
    for bad in [json!("fast"), json!(12), json!([1, 2])] {
        let err = Overrides::try_from(bad).unwrap_err();
        assert!(err.is_contract_violation());
        assert_eq!(err.to_string(), "The options must be a plain object.");
    }
}

#[tokio::test]
async fn options_from_json_apply_to_calls() {
    let o = Overrides::try_from(json!({"ivSize": 16, "charset": "UTF8"})).unwrap();
    let encrypted = krip().encrypt("wide", &secret(), Some(&o)).await.unwrap();
    assert_eq!(encrypted.len(), 32 + 2 * ("\"wide\"".len() + 16));
    assert_eq!(
        krip().decrypt(&encrypted, &secret(), Some(&o)).await.unwrap(),
        json!("wide")
    );
}

#[tokio::test]
async fn unsupported_charset_is_an_encrypt_failure() {
    let o = Overrides::new().with_charset("latin1");
    let err = krip().encrypt("x", &secret(), Some(&o)).await.unwrap_err();
    assert_eq!(err.to_string(), "Could not encrypt this value.");
    assert_eq!(err.kind(), Some(ErrorKind::Encoding));
}

#[tokio::test]
async fn unsupported_nonce_size_is_an_encrypt_failure() {
    let o = Overrides::new().with_nonce_size(8);
    let err = krip().encrypt("x", &secret(), Some(&o)).await.unwrap_err();
    assert_eq!(err.to_string(), "Could not encrypt this value.");
    assert_eq!(err.kind(), Some(ErrorKind::NotSupported));
}

#[tokio::test]
async fn custom_stringify_and_parse() {
    // Tag strings on the way in, strip the tag on the way out.
    let o = Overrides::new()
        .with_stringify(|v| format!("tagged:{v}"))
        .with_parse(|text| match text.strip_prefix("tagged:") {
            Some(rest) => serde_json::from_str(rest).unwrap_or(Value::Null),
            None => Value::Null,
        });
    let encrypted = krip().encrypt(&json!({"n": 1}), &secret(), Some(&o)).await.unwrap();

    assert_eq!(
        krip().decrypt(&encrypted, &secret(), Some(&o)).await.unwrap(),
        json!({"n": 1})
    );
    // The default parser falls back to the raw text.
    assert_eq!(
        krip().decrypt(&encrypted, &secret(), None).await.unwrap(),
        json!(r#"tagged:{"n":1}"#)
    );
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_calls_are_independent() {
    let k = krip();
    let mut handles = Vec::new();
    for i in 0..32 {
        let k = k.clone();
        handles.push(tokio::spawn(async move {
            let secret = Secret::from(format!("secret-{i}"));
            let encrypted = k.encrypt(&json!({"i": i}), &secret, None).await?;
            let decrypted = k.decrypt(&encrypted, &secret, None).await?;
            Ok::<_, CryptError>(decrypted)
        }));
    }
    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.await.unwrap().unwrap(), json!({"i": i}));
    }
}

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use quantum_cipher::codec::HuffmanCodec;
use quantum_cipher::error::{Error, ValidationError};
use quantum_cipher::{CipherConfig, DecryptRequest, EncryptRequest, ErrorKind, QuantumCipher};

fn cipher() -> QuantumCipher {
    QuantumCipher::new(CipherConfig {
        shots: 1024,
        key_exchange_shots: 64,
        ..CipherConfig::default()
    })
    .unwrap()
}

#[test]
fn test_all_zero_round_trip_scenario() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let response = cipher()
        .encrypt(&EncryptRequest::bits("0000", "0000"), &mut rng)
        .unwrap();

    assert_eq!(response.encoded_bits, "0000");
    assert_eq!(response.shared_key, "0000");
    assert_eq!(response.decrypted_bits, "0000");
    assert_eq!(response.code_table, None);
    assert_eq!(response.recovered_text, None);
    assert_eq!(response.matches_original, None);
}

#[test]
fn test_missing_input_scenario() {
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let err = cipher().encrypt(&EncryptRequest::default(), &mut rng).unwrap_err();
    assert!(matches!(err, Error::Validation(ValidationError::MissingInput)));

    // An empty message counts as missing too
    let err = cipher().encrypt(&EncryptRequest::message(""), &mut rng).unwrap_err();
    assert!(matches!(err, Error::Validation(ValidationError::MissingInput)));
}

#[test]
fn test_conflicting_input() {
    let request = EncryptRequest {
        message: Some("hi".to_string()),
        pre_encoded_bits: Some("0101".to_string()),
        shared_key: Some("1".to_string()),
    };
    let err = cipher().encrypt(&request, &mut ChaCha8Rng::seed_from_u64(3)).unwrap_err();
    assert!(matches!(err, Error::Validation(ValidationError::ConflictingInput)));
}

#[test]
fn test_bits_require_shared_key() {
    let request = EncryptRequest {
        pre_encoded_bits: Some("0101".to_string()),
        ..Default::default()
    };
    let err = cipher().encrypt(&request, &mut ChaCha8Rng::seed_from_u64(4)).unwrap_err();
    assert!(matches!(err, Error::Validation(ValidationError::MissingSharedKey)));
}

#[test]
fn test_message_round_trip_with_generated_key() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let response = cipher().encrypt(&EncryptRequest::message("abba"), &mut rng).unwrap();

    // a and b are equally frequent: one bit each
    assert_eq!(response.encoded_bits.len(), 4);
    assert_eq!(response.original_message.as_deref(), Some("abba"));
    assert!(response.code_table.is_some());
    assert!(response.shared_key.len() <= 4);
    assert_eq!(response.decrypted_bits, response.encoded_bits);
    assert_eq!(response.recovered_text.as_deref(), Some("abba"));
    assert_eq!(response.matches_original, Some(true));
}

#[test]
fn test_message_round_trip_with_supplied_key() {
    let mut rng = ChaCha8Rng::seed_from_u64(6);
    let request = EncryptRequest::message("aab").with_shared_key("101");
    let response = cipher().encrypt(&request, &mut rng).unwrap();

    assert_eq!(response.shared_key, "101");
    assert_eq!(response.matches_original, Some(true));

    // The returned tree decodes the ciphertext's decryption independently
    let tree = response.tree.as_ref().unwrap();
    assert_eq!(HuffmanCodec::decode(&response.decrypted_bits, Some(tree)).unwrap(), "aab");
}

#[test]
fn test_decrypt_defaults_reference_to_ciphertext() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let request = DecryptRequest {
        ciphertext_bits: "101".to_string(),
        shared_key: "11".to_string(),
        reference_bits: None,
    };
    let response = cipher().decrypt(&request, &mut rng).unwrap();
    assert_eq!(response.decrypted_bits, "101");
}

#[test]
fn test_decrypt_with_reference() {
    let mut rng = ChaCha8Rng::seed_from_u64(8);
    let request = DecryptRequest {
        ciphertext_bits: "0110".to_string(),
        shared_key: "1".to_string(),
        reference_bits: Some("1001".to_string()),
    };
    let response = cipher().decrypt(&request, &mut rng).unwrap();
    assert_eq!(response.decrypted_bits, "1001");
}

#[test]
fn test_decrypt_requires_fields() {
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let request = DecryptRequest {
        ciphertext_bits: "0110".to_string(),
        ..Default::default()
    };
    let err = cipher().decrypt(&request, &mut rng).unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::EmptyField { field: "shared_key" })
    ));
}

#[test]
fn test_timeout_surfaces_as_timeout() {
    let cipher = QuantumCipher::new(CipherConfig {
        timeout_ms: Some(0),
        ..CipherConfig::default()
    })
    .unwrap();
    let err = cipher
        .encrypt(&EncryptRequest::bits("0101", "11"), &mut ChaCha8Rng::seed_from_u64(10))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Timeout);
}

#[test]
fn test_zero_shots_rejected() {
    let result = QuantumCipher::new(CipherConfig {
        shots: 0,
        ..CipherConfig::default()
    });
    assert_eq!(result.unwrap_err().kind(), ErrorKind::Validation);
}

#[test]
fn test_seeded_config_is_reproducible() {
    let config = CipherConfig {
        seed: Some(99),
        shots: 128,
        key_exchange_shots: 32,
        ..CipherConfig::default()
    };
    let cipher = QuantumCipher::new(config).unwrap();
    let request = EncryptRequest::message("hello");

    let a = cipher.encrypt(&request, &mut cipher.config().rng()).unwrap();
    let b = cipher.encrypt(&request, &mut cipher.config().rng()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_requests_and_responses_use_json() {
    let request: EncryptRequest = serde_json::from_str(r#"{"message": "AB"}"#).unwrap();
    let response = cipher()
        .encrypt(&request.with_shared_key("1"), &mut ChaCha8Rng::seed_from_u64(11))
        .unwrap();

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["encoded_bits"], "01");
    assert_eq!(json["code_table"]["A"], "0");
    assert_eq!(json["matches_original"], true);
}

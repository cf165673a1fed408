// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Envelope JSON as it appears on the wire

use secure_gateway::crypto::{
    decrypt, encrypt, generate_key_pair, EncryptedEnvelope, IncomingEnvelope,
};

#[test]
fn test_envelope_survives_json_transport() {
    let (_, client_sec) = generate_key_pair();
    let (gateway_pub, gateway_sec) = generate_key_pair();

    let envelope = encrypt(br#"{"op":"ping"}"#, &gateway_pub, &client_sec).unwrap();
    let wire = serde_json::to_string(&envelope).unwrap();
    assert!(wire.contains("\"cipherText\""));
    assert!(wire.contains("\"publicKey\""));
    assert!(wire.contains("\"nonce\""));

    let received: IncomingEnvelope = serde_json::from_str(&wire).unwrap();
    assert!(!received.is_bodyless());
    let decoded = received.complete().unwrap().decode().unwrap();

    let opened = decrypt(&decoded.cipher_text, &decoded.nonce, &decoded.public_key, &gateway_sec).unwrap();
    assert_eq!(opened, br#"{"op":"ping"}"#);
}

#[test]
fn test_incomplete_envelopes_report_missing_fields() {
    let cases = [
        (r#"{"publicKey":"cGs=","nonce":"bm4="}"#, (false, true, true)),
        (r#"{"cipherText":"Y3Q=","nonce":"bm4="}"#, (true, false, true)),
        (r#"{"cipherText":"Y3Q=","publicKey":"cGs=","nonce":" "}"#, (true, true, false)),
    ];

    for (json, (cipher_text, public_key, nonce)) in cases {
        let incoming: IncomingEnvelope = serde_json::from_str(json).unwrap();
        let presence = incoming.complete().unwrap_err();
        assert_eq!(
            (presence.cipher_text, presence.public_key, presence.nonce),
            (cipher_text, public_key, nonce),
            "{}",
            json
        );
    }
}

#[test]
fn test_gateway_envelope_decodes_from_its_own_json() {
    let envelope = EncryptedEnvelope::from_bytes(&[1, 2, 3], &[4u8; 32], &[5u8; 24]);
    let parsed: EncryptedEnvelope = serde_json::from_str(&serde_json::to_string(&envelope).unwrap()).unwrap();
    let decoded = parsed.decode().unwrap();
    assert_eq!(decoded.cipher_text, vec![1, 2, 3]);
    assert_eq!(decoded.public_key, vec![4u8; 32]);
    assert_eq!(decoded.nonce, vec![5u8; 24]);
}

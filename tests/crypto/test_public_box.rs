// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Box construction properties over many inputs

use secure_gateway::crypto::{
    decrypt, encrypt, generate_key_pair, public_key_for, CryptoError, NONCE_LEN, TAG_LEN,
};

fn sample_plaintexts() -> Vec<Vec<u8>> {
    vec![
        b"x".to_vec(),
        br#"{"op":"ping"}"#.to_vec(),
        vec![0u8; 1024],
        (0..=255u8).collect(),
        "ünïcødé payload".as_bytes().to_vec(),
    ]
}

#[test]
fn test_round_trip_for_many_key_pairs() {
    for plaintext in sample_plaintexts() {
        let (sender_pub, sender_sec) = generate_key_pair();
        let (recipient_pub, recipient_sec) = generate_key_pair();

        let decoded = encrypt(&plaintext, &recipient_pub, &sender_sec)
            .unwrap()
            .decode()
            .unwrap();
        assert_eq!(decoded.public_key, sender_pub);
        assert_eq!(decoded.nonce.len(), NONCE_LEN);
        assert_eq!(decoded.cipher_text.len(), plaintext.len() + TAG_LEN);

        let opened = decrypt(&decoded.cipher_text, &decoded.nonce, &sender_pub, &recipient_sec).unwrap();
        assert_eq!(opened, plaintext);
    }
}

#[test]
fn test_any_single_byte_change_fails() {
    let (sender_pub, sender_sec) = generate_key_pair();
    let (recipient_pub, recipient_sec) = generate_key_pair();
    let decoded = encrypt(br#"{"op":"ping"}"#, &recipient_pub, &sender_sec)
        .unwrap()
        .decode()
        .unwrap();

    for i in 0..decoded.cipher_text.len() {
        let mut cipher_text = decoded.cipher_text.clone();
        cipher_text[i] ^= 0x80;
        assert_eq!(
            decrypt(&cipher_text, &decoded.nonce, &sender_pub, &recipient_sec),
            Err(CryptoError::DecryptionFailed),
            "cipherText byte {} altered",
            i
        );
    }

    for i in 0..decoded.nonce.len() {
        let mut nonce = decoded.nonce.clone();
        nonce[i] ^= 0x01;
        assert_eq!(
            decrypt(&decoded.cipher_text, &nonce, &sender_pub, &recipient_sec),
            Err(CryptoError::DecryptionFailed),
            "nonce byte {} altered",
            i
        );
    }
}

#[test]
fn test_nonces_are_fresh() {
    let (_, sender_sec) = generate_key_pair();
    let (recipient_pub, _) = generate_key_pair();

    let first = encrypt(b"same", &recipient_pub, &sender_sec).unwrap();
    let second = encrypt(b"same", &recipient_pub, &sender_sec).unwrap();
    assert_ne!(first.nonce, second.nonce);
    assert_ne!(first.cipher_text, second.cipher_text);
}

#[test]
fn test_failures_have_one_shape() {
    let (sender_pub, sender_sec) = generate_key_pair();
    let (recipient_pub, recipient_sec) = generate_key_pair();
    let decoded = encrypt(b"payload", &recipient_pub, &sender_sec)
        .unwrap()
        .decode()
        .unwrap();
    let (_, stranger_sec) = generate_key_pair();

    let failures = [
        decrypt(&decoded.cipher_text, &decoded.nonce, &sender_pub, &stranger_sec),
        decrypt(&decoded.cipher_text[..TAG_LEN - 1], &decoded.nonce, &sender_pub, &recipient_sec),
        decrypt(&decoded.cipher_text, &decoded.nonce[..12], &sender_pub, &recipient_sec),
        decrypt(&decoded.cipher_text, &decoded.nonce, &sender_pub[..31], &recipient_sec),
        decrypt(&decoded.cipher_text, &decoded.nonce, &[0u8; 32], &recipient_sec),
    ];
    for failure in failures {
        assert_eq!(failure, Err(CryptoError::DecryptionFailed));
    }
}

#[test]
fn test_public_key_for_matches_generated_pair() {
    let (public, secret) = generate_key_pair();
    assert_eq!(public_key_for(&secret).unwrap(), public);
}

//! Edge case tests for herald-vapid
//!
//! Key shape rules, base64url conversion and key pair loading.

use herald_vapid::*;

fn key_with(body: &str) -> String {
    format!("B{body}")
}

// ============================================================================
// PUBLIC KEY SHAPE TESTS
// ============================================================================

#[test]
fn test_shape_matches_pattern() {
    // ^B[A-Za-z0-9_-]{87}$
    let alphabet = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";
    let body: String = alphabet.chars().cycle().take(87).collect();
    assert!(is_valid_public_key(&key_with(&body)));
}

#[test]
fn test_every_forbidden_char_rejected() {
    for bad in ['+', '/', '=', ' ', '.', '~', 'é'] {
        let mut body: String = "a".repeat(86);
        body.push(bad);
        let key = key_with(&body);
        assert!(!is_valid_public_key(&key), "{bad:?} should be rejected");
    }
}

#[test]
fn test_empty_and_prefix_only() {
    assert!(!is_valid_public_key(""));
    assert!(!is_valid_public_key("B"));
}

#[test]
fn test_lowercase_prefix_rejected() {
    let key = format!("b{}", "a".repeat(87));
    assert!(!is_valid_public_key(&key));
}

// ============================================================================
// CONVERSION TESTS
// ============================================================================

#[test]
fn test_round_trip_various_lengths() {
    for len in [0usize, 1, 2, 3, 4, 31, 32, 33, 65, 66] {
        let bytes: Vec<u8> = (0..len).map(|i| (i * 37 % 256) as u8).collect();
        let encoded = key_to_url_safe_base64(&bytes);
        assert_eq!(key_to_binary(&encoded).unwrap(), bytes, "length {len}");
    }
}

#[test]
fn test_round_trip_high_bytes() {
    let bytes = vec![0xff, 0xfe, 0xfb, 0xef, 0xbe, 0x3f];
    let encoded = key_to_url_safe_base64(&bytes);
    assert!(encoded.contains('_') || encoded.contains('-'));
    assert_eq!(key_to_binary(&encoded).unwrap(), bytes);
}

#[test]
fn test_padded_input_accepted() {
    // Already a multiple of four, no extra padding added
    assert_eq!(key_to_binary("AQI=").unwrap(), vec![1, 2]);
}

#[test]
fn test_decode_error_message() {
    let err = key_to_binary("!!!!").unwrap_err();
    assert!(err.to_string().contains("Malformed"));
}

// ============================================================================
// KEY PAIR TESTS
// ============================================================================

#[test]
fn test_key_pair_rejects_bad_public_key() {
    let private = key_to_url_safe_base64(&[3u8; 32]);
    let err = VapidKeyPair::new("not-a-key", &private, DEFAULT_SUBJECT).unwrap_err();
    assert!(matches!(err, VapidError::InvalidPublicKey(_)));
}

#[test]
fn test_key_pair_matching_browser_key() {
    let mut public = vec![0x04u8];
    public.extend([5u8; 65]);
    let public = key_to_url_safe_base64(&public);
    let private = key_to_url_safe_base64(&[3u8; 32]);

    let lookup = |name: &str| match name {
        ENV_PUBLIC_KEY | ENV_BROWSER_PUBLIC_KEY => Some(public.clone()),
        ENV_PRIVATE_KEY => Some(private.clone()),
        ENV_SUBJECT => Some("  mailto:push@example.com ".to_string()),
        _ => None,
    };

    let pair = VapidKeyPair::from_lookup(lookup).unwrap();
    assert_eq!(pair.subject(), "mailto:push@example.com");
    assert!(pair.ensure_matches(&public).is_ok());
}

#[test]
fn test_blank_variable_treated_as_missing() {
    let lookup = |name: &str| match name {
        ENV_PUBLIC_KEY => Some("   ".to_string()),
        _ => None,
    };
    let err = VapidKeyPair::from_lookup(lookup).unwrap_err();
    assert!(matches!(err, VapidError::MissingVar(ENV_PUBLIC_KEY)));
}

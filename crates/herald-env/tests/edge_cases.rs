//! Edge case tests for herald-env
//!
//! Environment resolution and domain allow-list matching.

use herald_env::*;

// ============================================================================
// ENVIRONMENT TESTS
// ============================================================================

#[test]
fn test_localhost_is_development() {
    assert_eq!(Environment::from_hostname("localhost"), Environment::Development);
}

#[test]
fn test_netlify_is_production() {
    assert_eq!(Environment::from_hostname("sadtrans.netlify.app"), Environment::Production);
}

#[test]
fn test_hostname_is_normalized() {
    assert_eq!(Environment::from_hostname(" LOCALHOST "), Environment::Development);
    assert_eq!(Environment::from_hostname("Tunnel.NGROK.io"), Environment::Development);
}

#[test]
fn test_loopback_variants_are_production() {
    // Only the exact loopback address counts
    assert_eq!(Environment::from_hostname("127.0.0.2"), Environment::Production);
    assert_eq!(Environment::from_hostname("::1"), Environment::Production);
}

// ============================================================================
// DOMAIN PATTERN TESTS
// ============================================================================

#[test]
fn test_wildcard_subdomain_allowed() {
    let resolver = EnvironmentResolver::new(
        EnvironmentProfile::new(Environment::Production, &["app.example.com"]),
        EnvironmentProfile::new(Environment::Development, &["*.ngrok.io"]),
    );
    assert!(resolver.is_domain_allowed("abc.ngrok.io"));
}

#[test]
fn test_wildcard_does_not_match_embedded_suffix() {
    let resolver = EnvironmentResolver::new(
        EnvironmentProfile::new(Environment::Production, &["*.ngrok.io"]),
        EnvironmentProfile::new(Environment::Development, &["*.ngrok.io"]),
    );
    assert!(!resolver.is_domain_allowed("abc.ngrok.io.evil.com"));
}

#[test]
fn test_allowed_domains_listing() {
    let resolver = EnvironmentResolver::default();
    let dev = resolver.allowed_domains(Environment::Development);
    assert!(dev.contains(&DomainPattern::parse("*.ngrok.io")));
    assert!(dev.contains(&DomainPattern::Exact("localhost".into())));
}

#[test]
fn test_empty_allow_list_rejects_everything() {
    let resolver = EnvironmentResolver::new(
        EnvironmentProfile::new(Environment::Production, &[]),
        EnvironmentProfile::new(Environment::Development, &[]),
    );
    assert!(!resolver.is_domain_allowed("localhost"));
    assert!(!resolver.is_domain_allowed("sadtrans.netlify.app"));
}

// ============================================================================
// CONFIG TESTS
// ============================================================================

#[test]
fn test_profile_serializes_patterns_as_strings() {
    let profile = EnvironmentProfile::new(Environment::Development, &["*.ngrok.io"])
        .with_push_app_id("dev-app");
    let json = serde_json::to_value(&profile).unwrap();
    assert_eq!(json["allowed_domains"][0], "*.ngrok.io");
    assert_eq!(json["environment"], "development");
    assert_eq!(json["push_app_id"], "dev-app");
}

#[test]
fn test_invalid_json_config() {
    let err = EnvironmentResolver::from_json("{not json").unwrap_err();
    assert!(matches!(err, EnvError::InvalidConfig(_)));
}

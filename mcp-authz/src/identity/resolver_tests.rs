//! Tests for identity resolution

use crate::identity::ambient::{AmbientSource, StaticEnvironment};
use crate::identity::resolver::*;
use crate::policy::{PolicyStore, RoleDefinition, default_roles};

fn store() -> PolicyStore {
    PolicyStore::seeded(default_roles(), Vec::new(), Vec::new())
}

fn resolver() -> IdentityResolver {
    IdentityResolver::default()
}

#[test]
fn test_credential_digest_truncates_to_prefix_len() {
    assert_eq!(credential_digest("admin_abc123xyz_more"), "admin_abc123xy");
    assert_eq!(credential_digest("short"), "short");
    assert_eq!(credential_digest(""), "");
    // Multi-byte characters are never split
    assert_eq!(credential_digest("ééééééééééééééééé").chars().count(), CREDENTIAL_PREFIX_LEN);
}

#[test]
fn test_masked_credential_hides_tail() {
    assert_eq!(masked("admin_abc123xyz"), "admin_…");
    assert_eq!(masked("ab"), "ab…");
}

#[test]
fn test_registered_role_claim_wins() {
    let store = store();
    let env = StaticEnvironment::new()
        .with("AGENT_ROLE", "editor")
        .with("AGENT_API_KEY", "admin_abc123xyz");
    store.map_credential_prefix("admin_", "admin");

    let resolution = resolver().resolve(&store.read(), &env);
    assert_eq!(resolution.role, "editor");
    assert_eq!(resolution.source, ResolutionSource::RoleClaim);
    assert_eq!(resolution.credential_digest, None);
}

#[test]
fn test_unregistered_claim_falls_through_to_credential() {
    let store = store();
    store.map_credential_prefix("admin_", "admin");
    let env = StaticEnvironment::new()
        .with("AGENT_ROLE", "superuser")
        .with("AGENT_API_KEY", "admin_abc123xyz");

    let resolution = resolver().resolve(&store.read(), &env);
    assert_eq!(resolution.role, "admin");
    assert_eq!(resolution.source, ResolutionSource::Credential);
    assert_eq!(resolution.credential_digest.as_deref(), Some("admin_abc123xy"));
}

#[test]
fn test_unmatched_credential_yields_default() {
    let store = store();
    let env = StaticEnvironment::new().with("AGENT_API_KEY", "unknown-key-0001");

    let resolution = resolver().resolve(&store.read(), &env);
    assert_eq!(resolution.role, "viewer");
    assert_eq!(resolution.source, ResolutionSource::Credential);
}

#[test]
fn test_no_inputs_yields_default_even_if_unregistered() {
    let store = PolicyStore::new();
    let env = StaticEnvironment::new();

    let resolution = resolver().resolve(&store.read(), &env);
    assert_eq!(resolution.role, "viewer");
    assert_eq!(resolution.source, ResolutionSource::Default);
    assert!(!store.contains_role("viewer"));
}

#[test]
fn test_empty_inputs_count_as_absent() {
    let store = store();
    let env = StaticEnvironment::new()
        .with("AGENT_ROLE", "")
        .with("AGENT_API_KEY", "");
    assert_eq!(env.var("AGENT_ROLE"), None);
    assert_eq!(env.raw_var("AGENT_ROLE").as_deref(), Some(""));

    let resolution = resolver().resolve(&store.read(), &env);
    assert_eq!(resolution.source, ResolutionSource::Default);
}

#[test]
fn test_custom_variable_names_and_default() {
    let store = store();
    let resolver = IdentityResolver::new("MY_ROLE", "MY_KEY", "author");
    let env = StaticEnvironment::new().with("AGENT_ROLE", "admin");

    assert_eq!(resolver.resolve(&store.read(), &env).role, "author");

    env.set("MY_ROLE", "admin");
    assert_eq!(resolver.resolve(&store.read(), &env).role, "admin");
}

#[test]
fn test_resolution_follows_changing_inputs() {
    let store = store();
    let env = StaticEnvironment::new().with("AGENT_ROLE", "editor");
    let resolver = resolver();

    assert_eq!(resolver.resolve(&store.read(), &env).role, "editor");
    env.remove("AGENT_ROLE");
    assert_eq!(resolver.resolve(&store.read(), &env).role, "viewer");
    // Unchanged inputs give the same answer
    assert_eq!(
        resolver.resolve(&store.read(), &env),
        resolver.resolve(&store.read(), &env)
    );
}

#[test]
fn test_short_prefix_matches_through_scan() {
    let store = store();
    store.map_credential_prefix("admin_", "admin");
    assert_eq!(
        resolver().resolve_from_credential(&store.read(), "admin_abc123xyz"),
        "admin"
    );
}

#[test]
fn test_credential_equal_to_short_prefix() {
    let store = store();
    store.map_credential_prefix("ed_key", "editor");
    assert_eq!(resolver().resolve_from_credential(&store.read(), "ed_key"), "editor");
}

#[test]
fn test_exact_fourteen_char_prefix_beats_earlier_scan_match() {
    let store = store();
    store.map_credential_prefix("sk_", "viewer");
    store.map_credential_prefix("sk_live_editor", "editor");

    assert_eq!(
        resolver().resolve_from_credential(&store.read(), "sk_live_editor_9f8e7d"),
        "editor"
    );
    assert_eq!(
        resolver().resolve_from_credential(&store.read(), "sk_test_000"),
        "viewer"
    );
}

#[test]
fn test_first_match_tie_break() {
    let store = store();
    store.register_role("role_x", RoleDefinition::limited("X", ["a"]));
    store.register_role("role_y", RoleDefinition::limited("Y", ["b"]));
    store.map_credential_prefix("ab", "role_x");
    store.map_credential_prefix("abc", "role_y");

    assert_eq!(resolver().resolve_from_credential(&store.read(), "abcdef"), "role_x");
}

#[test]
fn test_prefix_longer_than_fourteen_chars_matches_through_scan() {
    let store = store();
    store.map_credential_prefix("partner_integration_", "author");
    assert_eq!(
        resolver().resolve_from_credential(&store.read(), "partner_integration_42"),
        "author"
    );
}

#[test]
fn test_malformed_credentials_fall_back_to_default() {
    let store = store();
    store.map_credential_prefix("admin_", "admin");
    let resolver = resolver();
    assert_eq!(resolver.resolve_from_credential(&store.read(), ""), "viewer");
    assert_eq!(resolver.resolve_from_credential(&store.read(), "adm"), "viewer");
}

#[test]
fn test_mapping_to_unregistered_role_is_returned_verbatim() {
    let store = store();
    store.map_credential_prefix("ghost_", "ghost");
    assert_eq!(resolver().resolve_from_credential(&store.read(), "ghost_123"), "ghost");
}

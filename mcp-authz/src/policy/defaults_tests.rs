//! Tests for the built-in roles and tool universe

use crate::policy::defaults::*;
use crate::policy::role::{AccessLevel, PermittedOperations, RoleDefinition};
use std::collections::HashSet;

fn defaults_by_key() -> Vec<(String, RoleDefinition)> {
    default_roles()
}

fn tools_of(key: &str) -> Vec<String> {
    let (_, role) = defaults_by_key()
        .into_iter()
        .find(|(k, _)| k == key)
        .unwrap();
    match role.tools {
        PermittedOperations::Only(tools) => tools.into_iter().collect(),
        PermittedOperations::All => panic!("{key} should have an explicit tool list"),
    }
}

#[test]
fn test_known_operations_are_unique() {
    let unique: HashSet<_> = KNOWN_OPERATIONS.iter().collect();
    assert_eq!(unique.len(), KNOWN_OPERATIONS.len());
    assert_eq!(KNOWN_OPERATIONS.len(), 42);
    assert_eq!(known_operations().len(), KNOWN_OPERATIONS.len());
}

#[test]
fn test_default_role_order() {
    let keys: Vec<String> = defaults_by_key().into_iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["admin", "editor", "author", "viewer"]);
    assert_eq!(DEFAULT_ROLE, VIEWER_ROLE);
}

#[test]
fn test_admin_is_wildcard_with_full_access() {
    let (_, admin) = defaults_by_key().into_iter().next().unwrap();
    assert!(admin.is_wildcard());
    assert_eq!(admin.access_level, AccessLevel::Full);
    assert!(admin.blocked_tools.is_none());
}

#[test]
fn test_limited_role_sizes() {
    assert_eq!(tools_of(EDITOR_ROLE).len(), 26);
    assert_eq!(tools_of(AUTHOR_ROLE).len(), 12);
    assert_eq!(tools_of(VIEWER_ROLE).len(), 13);
}

#[test]
fn test_limited_roles_only_reference_known_tools() {
    let universe: HashSet<&str> = KNOWN_OPERATIONS.iter().copied().collect();
    for (key, role) in defaults_by_key() {
        if let PermittedOperations::Only(tools) = &role.tools {
            for tool in tools {
                assert!(universe.contains(tool.as_str()), "{key} grants unknown {tool}");
            }
        }
        for tool in role.blocked_tools.iter().flatten() {
            assert!(universe.contains(tool.as_str()), "{key} blocks unknown {tool}");
            assert!(!role.tools.permits(tool), "{key} both grants and blocks {tool}");
        }
    }
}

#[test]
fn test_viewer_is_subset_of_editor() {
    let editor: HashSet<String> = tools_of(EDITOR_ROLE).into_iter().collect();
    for tool in tools_of(VIEWER_ROLE) {
        assert!(editor.contains(&tool), "editor is missing viewer tool {tool}");
    }
}

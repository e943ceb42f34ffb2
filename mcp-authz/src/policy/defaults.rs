//! Built-in roles and the default tool universe
//!
//! The universe covers the content-management tool catalog the authorizer
//! ships with. Hosts exposing a different catalog override it wholesale via
//! [`AuthzConfig::known_operations`](crate::config::AuthzConfig::known_operations).

use super::role::RoleDefinition;

/// Wildcard administrator role
pub const ADMIN_ROLE: &str = "admin";
/// Content editor role
pub const EDITOR_ROLE: &str = "editor";
/// Content author role
pub const AUTHOR_ROLE: &str = "author";
/// Read-only viewer role
pub const VIEWER_ROLE: &str = "viewer";

/// Role assigned when nothing in the environment says otherwise
pub const DEFAULT_ROLE: &str = VIEWER_ROLE;

/// Every tool name the default host understands, in catalog order
pub const KNOWN_OPERATIONS: &[&str] = &[
    // Entries
    "list_entries",
    "get_entry",
    "create_entry",
    "update_entry",
    "delete_entry",
    "publish_entry",
    "unpublish_entry",
    // Collections
    "list_collections",
    "get_collection",
    "create_collection",
    "update_collection",
    "delete_collection",
    // Taxonomies
    "list_taxonomies",
    "get_taxonomy",
    "list_terms",
    "get_term",
    "create_term",
    "update_term",
    "delete_term",
    // Assets
    "list_assets",
    "get_asset",
    "upload_asset",
    "update_asset",
    "delete_asset",
    // Globals
    "list_globals",
    "get_global",
    "update_global",
    // Navigation
    "list_navigations",
    "get_navigation",
    "update_navigation",
    // Users
    "list_users",
    "get_user",
    "create_user",
    "update_user",
    "delete_user",
    // Forms
    "list_forms",
    "get_form_submissions",
    // System
    "get_system_info",
    "clear_cache",
    "list_blueprints",
    "get_blueprint",
    "update_blueprint",
];

const VIEWER_TOOLS: &[&str] = &[
    "list_entries",
    "get_entry",
    "list_collections",
    "get_collection",
    "list_taxonomies",
    "get_taxonomy",
    "list_terms",
    "get_term",
    "list_assets",
    "get_asset",
    "list_globals",
    "get_global",
    "list_navigations",
];

const EDITOR_EXTRA_TOOLS: &[&str] = &[
    "get_navigation",
    "create_entry",
    "update_entry",
    "delete_entry",
    "publish_entry",
    "unpublish_entry",
    "create_term",
    "update_term",
    "delete_term",
    "upload_asset",
    "update_asset",
    "delete_asset",
    "update_global",
];

const AUTHOR_TOOLS: &[&str] = &[
    "list_entries",
    "get_entry",
    "create_entry",
    "update_entry",
    "list_collections",
    "get_collection",
    "list_taxonomies",
    "list_terms",
    "get_term",
    "list_assets",
    "get_asset",
    "upload_asset",
];

/// The default tool universe as owned strings
pub fn known_operations() -> Vec<String> {
    KNOWN_OPERATIONS.iter().map(|s| s.to_string()).collect()
}

/// Built-in roles in seeding order
pub fn default_roles() -> Vec<(String, RoleDefinition)> {
    vec![
        (
            ADMIN_ROLE.to_string(),
            RoleDefinition::wildcard("Administrator")
                .with_description("Full access to every tool, including user and system management"),
        ),
        (
            EDITOR_ROLE.to_string(),
            RoleDefinition::limited(
                "Editor",
                VIEWER_TOOLS.iter().chain(EDITOR_EXTRA_TOOLS).copied(),
            )
            .with_description("Manage and publish content, taxonomies, assets and globals")
            .with_blocked([
                "create_collection",
                "update_collection",
                "delete_collection",
                "list_users",
                "get_user",
                "create_user",
                "update_user",
                "delete_user",
                "update_navigation",
                "clear_cache",
                "update_blueprint",
            ]),
        ),
        (
            AUTHOR_ROLE.to_string(),
            RoleDefinition::limited("Author", AUTHOR_TOOLS.iter().copied())
                .with_description("Create and edit entries and upload assets, without publishing")
                .with_blocked([
                    "delete_entry",
                    "publish_entry",
                    "unpublish_entry",
                    "create_term",
                    "delete_term",
                    "delete_asset",
                    "list_users",
                    "create_user",
                    "delete_user",
                    "clear_cache",
                ]),
        ),
        (
            VIEWER_ROLE.to_string(),
            RoleDefinition::limited("Viewer", VIEWER_TOOLS.iter().copied())
                .with_description("Read-only access to published content")
                .with_blocked([
                    "create_entry",
                    "update_entry",
                    "delete_entry",
                    "publish_entry",
                    "upload_asset",
                    "delete_asset",
                    "create_user",
                    "delete_user",
                    "clear_cache",
                ]),
        ),
    ]
}

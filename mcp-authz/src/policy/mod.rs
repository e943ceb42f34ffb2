//! Policy data: role definitions, credential mappings and the built-in defaults

pub mod defaults;
pub mod role;
pub mod store;

#[cfg(test)]
mod defaults_tests;

pub use defaults::{
    ADMIN_ROLE, AUTHOR_ROLE, DEFAULT_ROLE, EDITOR_ROLE, KNOWN_OPERATIONS, VIEWER_ROLE,
    default_roles, known_operations,
};
pub use role::{AccessLevel, CredentialMapping, PermittedOperations, RoleDefinition};
pub use store::{Policy, PolicyStore};

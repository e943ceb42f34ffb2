//! Identity inputs and effective-role resolution

pub mod ambient;
pub mod resolver;

#[cfg(test)]
mod resolver_tests;

pub use ambient::{AmbientSource, ProcessEnvironment, StaticEnvironment};
pub use resolver::{
    CREDENTIAL_PREFIX_LEN, DEFAULT_API_KEY_ENV_VAR, DEFAULT_ROLE_ENV_VAR, EffectiveIdentity,
    IdentityResolver, Resolution, ResolutionSource, credential_digest,
};

pub mod config;
pub mod identity;

pub use identity::{IdentityProvider, StaticTokenIdentityProvider};

#[cfg(test)]
pub use identity::MockIdentityProvider;

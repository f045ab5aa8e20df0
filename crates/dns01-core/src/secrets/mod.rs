// # Secret Store Implementations
//
// This module provides implementations of the SecretStore trait for
// different credential sources.

pub mod file;
pub mod memory;

pub use file::{FileSecretStore, FileSecretStoreFactory};
pub use memory::{MemorySecretStore, MemorySecretStoreFactory};

use crate::registry::ProviderRegistry;

/// Register the built-in secret stores (`file`, `memory`)
pub fn register_builtin(registry: &ProviderRegistry) {
    registry.register_secret_store("file", Box::new(FileSecretStoreFactory));
    registry.register_secret_store("memory", Box::new(MemorySecretStoreFactory::default()));
}

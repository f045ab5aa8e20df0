// # dns01-core
//
// Core library for solving ACME DNS-01 challenges against a DNS provider API.
//
// ## Architecture Overview
//
// - **DnsClient**: Trait for zone lookup and TXT record management
// - **SecretStore**: Trait for namespaced credential lookup
// - **Resolver**: Hosted zone lookup and relative record naming
// - **Dns01Solver**: Present/CleanUp lifecycle of one challenge record
// - **ProviderRegistry**: Plugin-based registry for clients and secret stores
//
// ## Design Principles
//
// 1. **Per-request clients**: Every challenge resolves its own credentials and
//    builds its own provider client; no state is shared between calls
// 2. **Plugin-Based**: Providers register themselves, the core names none
// 3. **Library-First**: The daemon is a thin host around this crate
// 4. **Value guard**: CleanUp only deletes the record carrying its own key

pub mod challenge;
pub mod config;
pub mod credential;
pub mod error;
pub mod registry;
pub mod resolver;
pub mod secrets;
pub mod solver;
pub mod traits;

// Re-export core types for convenience
pub use challenge::{ChallengeAction, ChallengeRequest};
pub use config::{HostConfig, SecretKeySelector, SecretStoreConfig, SolverConfig, SolverOptions};
pub use credential::ProviderCredential;
pub use error::{Error, Operation, Result};
pub use registry::ProviderRegistry;
pub use secrets::{FileSecretStore, MemorySecretStore};
pub use solver::{Dns01Solver, ShutdownSignal, Solver};
pub use traits::{DnsClient, DnsClientFactory, SecretStore, SearchMode, TxtRecord, Zone};

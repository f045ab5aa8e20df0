//! Core traits for the DNS-01 solver
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`DnsClient`]: Zone lookup and TXT record management via provider APIs
//! - [`SecretStore`]: Namespaced credential lookup

pub mod dns_client;
pub mod secret_store;

pub use dns_client::{DnsClient, DnsClientFactory, SearchMode, TxtRecord, Zone, RECORD_TYPE_TXT};
pub use secret_store::{Secret, SecretData, SecretStore, SecretStoreFactory};

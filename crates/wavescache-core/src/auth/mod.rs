//! Credential lookup for bound game accounts.
//!
//! This module provides:
//! - `CredentialStore`: the read seam the refresh layer depends on
//! - `KeyringCredentialStore`: OS-level storage via keyring
//!
//! Binding and unbinding belong to the caller; the refresh layer only reads.

pub mod credentials;

pub use credentials::{CredentialStore, KeyringCredentialStore};

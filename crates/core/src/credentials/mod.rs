//! OAuth credential lifecycle for manager calendar accounts
//!
//! The [`manager::CredentialManager`] is the only component that hands out
//! access tokens. It refreshes lazily, keeps a safety margin before expiry,
//! and serializes concurrent refreshes per principal.

pub mod manager;
pub mod ports;

//! Shared utilities for finchat
//!
//! This crate provides common functionality used across the finchat workspace:
//! tracing setup and loading of the model provider's API key.

pub mod credentials;
pub mod logging;

pub use credentials::{CredentialError, load_api_key, read_secret_file};
pub use logging::init_tracing;

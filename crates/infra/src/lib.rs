//! # M-Pesa Infrastructure
//!
//! Infrastructure implementations of the core ports.
//!
//! This crate contains:
//! - The reqwest-based HTTP transport for the Daraja gateway
//! - The OAuth client-credentials token fetcher
//! - Configuration loading from environment variables and files
//! - The [`Mpesa`] facade that wires everything together
//!
//! ## Architecture
//! - Implements traits defined in `mpesa-core`
//! - Depends on `mpesa-domain` and `mpesa-core`
//! - Contains all "impure" code (network and file I/O)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod sdk;

// Re-export commonly used items
pub use api::{DarajaClient, DarajaClientConfig, OAuthTokenFetcher};
pub use errors::InfraError;
pub use http::HttpClient;
pub use sdk::Mpesa;

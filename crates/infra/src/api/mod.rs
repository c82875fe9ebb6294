//! Gateway API adapters
//!
//! - [`client`]: HTTP implementation of the transport port
//! - [`auth`]: OAuth client-credentials exchange

pub mod auth;
pub mod client;

pub use auth::OAuthTokenFetcher;
pub use client::{DarajaClient, DarajaClientConfig};

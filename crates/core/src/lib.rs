//! # M-Pesa Core
//!
//! Gateway business logic - no HTTP client code.
//!
//! This crate contains:
//! - Port interfaces for the transport and the token exchange
//! - The token manager that collapses concurrent refreshes
//! - The STK push, C2B and B2C top-up services
//!
//! ## Architecture Principles
//! - Depends on `mpesa-common` and `mpesa-domain` only
//! - All network access goes through [`ApiTransport`] and [`TokenFetcher`]
//! - Services are testable with the in-memory mocks in `testing`

pub mod auth;
pub mod ports;
pub mod services;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use auth::TokenManager;
pub use ports::{
    ApiTransport, ApiTransportExt, Endpoint, Headers, HttpMethod, TokenFetcher, TokenProvider,
};
pub use services::{B2CTopUpService, C2BService, StkPushService};

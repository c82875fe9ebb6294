//! Authentication primitives
//!
//! Holds the consumer key/secret pair and derives the Basic authorization
//! value exchanged for a bearer token.

pub mod credentials;

pub use credentials::Credentials;

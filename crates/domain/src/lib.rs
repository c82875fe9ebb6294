//! # M-Pesa Domain
//!
//! Gateway data model for the M-Pesa SDK.
//!
//! This crate contains:
//! - The SDK error type and Result alias
//! - The resilient payload decoder for gateway JSON
//! - Request, response and callback models for every product
//! - Configuration structures and gateway constants
//!
//! ## Architecture
//! - Depends only on `mpesa-common` and external crates
//! - No I/O: decoding works on bytes or `serde_json::Value`

pub mod config;
pub mod constants;
pub mod decode;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use decode::{DecodeError, DecodeErrorCategory};
pub use errors::*;
pub use types::*;

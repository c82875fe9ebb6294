//! Bearer token lifecycle

pub mod token_manager;

pub use token_manager::TokenManager;

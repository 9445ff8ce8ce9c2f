//! dYdX v3 client
//!
//! - Onboarding: EIP-712 signed actions, API credential and STARK key derivation
//! - Request signing: HMAC headers for the private REST API
//! - Private REST client for accounts, positions and orders

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod signing;

pub use client::{DydxClient, PrivateClient};
pub use config::ClientOptions;
pub use error::AppError;

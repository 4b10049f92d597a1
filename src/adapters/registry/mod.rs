//! On-chain asset registry adapter

pub mod client;
pub mod types;

pub use client::{RegistryClient, RegistryConfig};

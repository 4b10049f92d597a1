#![allow(dead_code, unused_imports, unused_variables)]
//! Mintwatch - Telegram Token-Mention Watcher Library
//!
//! Watches group chats for token addresses, enriches each hit from
//! on-chain and market data sources, and posts throttled notifications.
//!
//! # Modules
//!
//! - `domain`: Core logic (AddressScanner, NotificationGate, Formatter, Roster, PostingLog)
//! - `ports`: Trait abstractions (AssetRegistry, ChatTransport, Notifier, PageRenderer)
//! - `adapters`: External implementations (Registry RPC, IPFS gateway, Telegram, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Aggregator and watch loop

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod config;
pub mod application;

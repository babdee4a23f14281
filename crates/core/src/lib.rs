//! Marketplace Core - Shared types library.
//!
//! This crate provides common types used across all Marketplace components:
//! - `storefront` - Cart store, catalog and account logic for the marketplace front end
//! - `cli` - Command-line front end driving a storefront session
//!
//! # Architecture
//!
//! The core crate contains only types and pure computations - no I/O, no
//! storage access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, emails, products, cart line items and user profiles

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

//! Marketplace storefront library.
//!
//! Client-side logic for the marketplace: a persisted shopping cart, the
//! product catalog, sign-in against the hosted auth service, form
//! validation and display models. Front ends open a
//! [`Storefront`](state::Storefront) session and drive it from user events.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod forms;
pub mod services;
pub mod state;
pub mod storage;
pub mod views;

pub use error::{AppError, Result};
pub use state::Storefront;

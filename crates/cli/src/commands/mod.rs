//! Command implementations.
//!
//! Each command drives the open [`Storefront`](marketplace_storefront::Storefront)
//! session and prints the resulting view to stdout.

pub mod account;
pub mod cart;
pub mod catalog;
pub mod listing;

use marketplace_storefront::AppError;

/// Print the user-facing message for a failed command.
#[allow(clippy::print_stderr)]
pub fn print_error(err: &AppError) {
    eprintln!("Error: {}", err.user_message());
}

//! Services that talk to external collaborators.
//!
//! - `auth` - sign-in, sign-up and sign-out against the hosted auth service

pub mod auth;

//! Auth types shared across Wishlist crates.
//!
//! Provides purpose-scoped JWT signing and decoding plus the
//! `X-Authorization` header helpers.

pub mod header;
pub mod token;

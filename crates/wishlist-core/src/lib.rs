//! Cross-cutting plumbing shared by Wishlist binaries: configuration loading,
//! tracing setup, HTTP middleware layers and serde helpers.

pub mod config;
pub mod layers;
pub mod serde;
pub mod telemetry;

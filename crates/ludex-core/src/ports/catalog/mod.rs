//! Remote catalog port definitions.
//!
//! This module defines the port trait and errors for the remote game
//! catalog. The actual implementation lives in `ludex-igdb`.

mod client;
mod error;

#[cfg(test)]
pub use client::MockCatalogPort;
pub use client::CatalogPort;
pub use error::{CatalogError, CatalogResult};

//! IGDB adapter for ludex.
//!
//! Implements `ludex_core::CatalogPort` against the IGDB v4 API: Apicalypse
//! query bodies POSTed with Twitch app credentials, retried with backoff on
//! server and network errors, and flattened into `CatalogEntry` values.
//!
//! ```no_run
//! use std::sync::Arc;
//! use ludex_core::CatalogPort;
//! use ludex_igdb::{IgdbCatalog, IgdbClientConfig};
//!
//! # fn example() -> Result<(), ludex_igdb::IgdbError> {
//! let config = IgdbClientConfig::new("client-id", "app-token");
//! let catalog: Arc<dyn CatalogPort> = Arc::new(IgdbCatalog::new(&config)?);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

mod client;
mod config;
mod error;
mod http;
mod models;
mod port;
mod query;

// ============================================================================
// Public API
// ============================================================================

// Client
pub use client::{IgdbCatalog, IgdbClient};

// Configuration
pub use config::{DEFAULT_BASE_URL, IgdbClientConfig};

// Errors surfaced by construction
pub use error::IgdbError;

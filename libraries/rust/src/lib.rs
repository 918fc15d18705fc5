//! Client for the portfolio-management and analytics REST API.
//!
//! Every request function performs one call through a [`transport::Interface`]
//! and returns either a [`table::Table`] or a result type whose tables are
//! built lazily from the response payload.

/// Connection settings
pub mod config;

pub mod error;

/// Tracing setup
pub mod logger;

pub mod params;

pub mod table;

pub mod transport;

/// Lazily materialized response views
pub mod views;

#[cfg(feature = "metadata")]
/// Reference data endpoints
pub mod metadata;

#[cfg(feature = "portfolios")]
/// Portfolio endpoints
pub mod portfolios;

#[cfg(feature = "analytics")]
/// Portfolio analytics endpoints
pub mod analytics;

pub use config::Config;
pub use error::Error;
pub use params::OneOrMany;
pub use table::Table;
pub use transport::{Client, Interface};

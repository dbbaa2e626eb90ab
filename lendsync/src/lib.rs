//! lendsync library crate.
//!
//! Client-side data and session layer for a title-lending dashboard:
//! authenticated API access with a bounded token-refresh retry, multi-source
//! profile aggregation that tolerates partial failure, background polling,
//! session expiry tracking with activity-based renewal, and throttled
//! programmatic navigation.

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod nav;
pub mod profile;
pub mod session;

pub use error::{Error, Result};

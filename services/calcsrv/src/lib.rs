//! calcsrv - formula evaluation service
//!
//! Thin HTTP transport around [`formula_calc`]: clients POST a formula
//! and variable bindings to `/calculate` and receive the numeric result
//! or a typed error description. All evaluation happens in-process; the
//! service holds no state between requests.

pub mod api;
pub mod config;
pub mod error;

pub use error::{CalcSrvError, Result};

/// Service name used in logs and the health endpoint
pub const SERVICE_NAME: &str = "calcsrv";

/// Service version reported by the health endpoint
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

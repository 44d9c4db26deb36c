//! Runscope Terraform Provider
//!
//! Resources for managing Runscope entities from Terraform. Each resource
//! implements [`resources::Resource`] against the [`client::RunscopeApi`]
//! capability; [`provider::RunscopeProvider`] dispatches host requests to
//! them by type name.

pub mod client;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod logging;
pub mod provider;
pub mod resources;
pub mod schema;
pub mod state;

#[cfg(test)]
mod testing;

pub use client::{ApiError, ApiErrorKind, Bucket, RunscopeApi, RunscopeClient, Team};
pub use config::ProviderConfig;
pub use diagnostic::{Diagnostic, Severity};
pub use error::{Error, Result};
pub use provider::RunscopeProvider;
pub use state::{DynamicValue, ResourceData};

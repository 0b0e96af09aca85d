//! Projects client and data models for the VPSie API.
//!
//! Projects group VMs and domains; the same module reads the account's
//! product limits.

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::{ProjectsClient, ProjectsClientBuilder};
pub use models::{CreateProjectRequest, Domain, Project, ProjectVm, UserLimits};

/// Convenient result alias that reuses the shared VPSie error type.
pub type Result<T> = vpsie_core::Result<T>;

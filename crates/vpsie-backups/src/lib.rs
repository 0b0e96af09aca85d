//! Backups client and data models for the VPSie API.
//!
//! Covers VM backups and the backup policies that schedule them.

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::{BackupsClient, BackupsClientBuilder};
pub use models::{
    Backup, BackupPolicy, BackupPolicySummary, CreateBackupPolicyRequest, EnableAutoBackupRequest,
};

/// Convenient result alias that reuses the shared VPSie error type.
pub type Result<T> = vpsie_core::Result<T>;

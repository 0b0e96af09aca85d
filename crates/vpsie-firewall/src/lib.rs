//! Firewall group client and data models for the VPSie API.
//!
//! Groups bundle inbound and outbound rules and are attached to VMs.

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::{FirewallClient, FirewallClientBuilder};
pub use models::{
    AttachedVm, FirewallGroup, FirewallGroupDetail, FirewallGroupSummary, FirewallRule,
    FirewallRuleRequest, RuleDirection,
};

/// Convenient result alias that reuses the shared VPSie error type.
pub type Result<T> = vpsie_core::Result<T>;

//! Project models.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use vpsie_core::ids::{ProjectId, VmId};

/// A project grouping VMs and other resources.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    /// Project identifier.
    pub identifier: ProjectId,
    /// Numeric project ID.
    #[serde(default)]
    pub id: u64,
    /// Project name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// `1` for the account's default project.
    #[serde(default)]
    pub is_default: u8,
    /// Creator's user ID.
    #[serde(default)]
    pub created_by: Option<u64>,
    /// Creation time as reported by the API.
    #[serde(default)]
    pub created_on: Option<String>,
    /// Update time as reported by the API.
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Project {
    /// Returns true for the default project.
    #[must_use]
    pub const fn is_default(&self) -> bool {
        self.is_default != 0
    }
}

/// Request payload for creating a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CreateProjectRequest {
    /// Project name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
}

/// A VM outside the project that can be moved into it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectVm {
    /// VM identifier.
    pub identifier: VmId,
    /// Hostname.
    #[serde(default)]
    pub hostname: Option<String>,
    /// Remaining fields, which vary by VM type.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A DNS domain attached to a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Domain {
    /// Domain identifier.
    pub identifier: String,
    /// Domain name.
    #[serde(default, alias = "domain_name")]
    pub domain: Option<String>,
    /// Remaining fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Per-account product limits.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct UserLimits {
    /// Maximum backups.
    #[serde(default, rename = "backups_Limit")]
    pub backups: u32,
    /// Maximum snapshots.
    #[serde(default, rename = "snapshot_Limit")]
    pub snapshots: u32,
    /// Maximum firewall groups.
    #[serde(default, rename = "firewall_Limit")]
    pub firewalls: u32,
    /// Maximum storage buckets.
    #[serde(default, rename = "buckets_Limit")]
    pub buckets: u32,
    /// Maximum certificates.
    #[serde(default, rename = "certificates_Limit")]
    pub certificates: u32,
    /// Maximum DNS domains.
    #[serde(default, rename = "dns_domains_Limit")]
    pub dns_domains: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProjectRef<'a> {
    pub project_identifier: &'a ProjectId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MoveVmsRequest<'a> {
    pub vms_identifiers: &'a [VmId],
    pub project_id: &'a ProjectId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AssignVmRequest<'a> {
    pub vm_identifier: &'a VmId,
    pub project_id: &'a ProjectId,
}

//! Backup and backup policy models.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt::Display;
use vpsie_core::ids::{BackupId, BackupPolicyId, VmId};

/// A VM backup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    /// Backup identifier; empty when a list row omits it.
    #[serde(default)]
    pub identifier: BackupId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Hostname of the source VM.
    #[serde(default, rename = "hostname")]
    pub host_name: String,
    /// Free-form note.
    #[serde(default)]
    pub note: Option<String>,
    /// Storage key.
    #[serde(default)]
    pub backup_key: Option<String>,
    /// Backup state, e.g. `completed`.
    #[serde(default)]
    pub state: Option<String>,
    /// Data center identifier.
    #[serde(default)]
    pub dc_identifier: Option<String>,
    /// Source VM identifier.
    #[serde(default)]
    pub vm_identifier: Option<VmId>,
    /// Storage box ID.
    #[serde(default)]
    pub box_id: Option<u64>,
    /// SHA-1 of the backup image.
    #[serde(default, rename = "backupsha1")]
    pub backup_sha1: Option<String>,
    /// Operating system of the source VM.
    #[serde(default)]
    pub os_full_name: Option<String>,
    /// VM category.
    #[serde(default)]
    pub vm_category: Option<String>,
    /// Creator.
    #[serde(default, rename = "created_by")]
    pub created_by: Option<String>,
    /// Creation time as reported by the API.
    #[serde(default, rename = "created_on")]
    pub created_on: Option<String>,
}

/// Payload of the single-backup endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct BackupData {
    pub backup: Backup,
}

/// Full backup policy including attached VMs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BackupPolicy {
    /// Policy identifier.
    pub identifier: BackupPolicyId,
    /// Policy name.
    pub name: String,
    /// Schedule unit, e.g. `daily`.
    #[serde(default)]
    pub backup_plan: Option<String>,
    /// Interval in plan units.
    #[serde(default)]
    pub plan_every: Option<u32>,
    /// Backups retained.
    #[serde(default)]
    pub keep: Option<u32>,
    /// `1` when the policy is disabled.
    #[serde(default)]
    pub disabled: u8,
    /// Owning user.
    #[serde(default)]
    pub user_id: Option<u64>,
    /// VMs the policy is attached to.
    #[serde(default)]
    pub vms: Vec<VmId>,
    /// Creator.
    #[serde(default, rename = "created_by")]
    pub created_by: Option<String>,
    /// Creation time as reported by the API.
    #[serde(default, rename = "created_on")]
    pub created_on: Option<String>,
}

impl BackupPolicy {
    /// Returns true when the policy is switched off.
    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.disabled != 0
    }
}

/// Backup policy as listed, with a VM count instead of the VM list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BackupPolicySummary {
    /// Policy identifier.
    pub identifier: BackupPolicyId,
    /// Policy name.
    pub name: String,
    /// Schedule unit.
    #[serde(default)]
    pub backup_plan: Option<String>,
    /// Interval in plan units.
    #[serde(default)]
    pub plan_every: Option<u32>,
    /// Backups retained.
    #[serde(default)]
    pub keep: Option<u32>,
    /// `1` when the policy is disabled.
    #[serde(default)]
    pub disabled: u8,
    /// Number of attached VMs.
    #[serde(default)]
    pub vms_count: u32,
    /// Owning user.
    #[serde(default)]
    pub user_id: Option<u64>,
    /// Creator.
    #[serde(default, rename = "created_by")]
    pub created_by: Option<String>,
    /// Creation time as reported by the API.
    #[serde(default, rename = "created_on")]
    pub created_on: Option<String>,
}

/// Request payload for enabling scheduled backups on a VM.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct EnableAutoBackupRequest {
    /// VM identifier.
    pub vm_identifier: String,
    /// Numeric VM ID.
    pub vm_id: u64,
    /// Schedule period.
    pub period: String,
    /// `1` to enable daily backups.
    pub auto_backup: u8,
    /// `1` to enable weekly backups.
    pub weekly_backup: u8,
    /// `1` to enable monthly backups.
    pub monthly_backup: u8,
    /// Tags applied to created backups.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Request payload for creating a backup policy.
///
/// The API expects `planEvery` and `keep` as strings.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateBackupPolicyRequest {
    /// Policy name.
    pub name: String,
    /// Schedule unit.
    pub backup_plan: String,
    /// Interval in plan units.
    #[serde(serialize_with = "as_string")]
    pub plan_every: u32,
    /// Backups retained.
    #[serde(serialize_with = "as_string")]
    pub keep: u32,
    /// VMs to attach right away.
    pub vms: Vec<VmId>,
    /// Tags.
    pub tags: Vec<String>,
}

fn as_string<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Display,
    S: Serializer,
{
    serializer.collect_str(value)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateBackupRequest<'a> {
    pub vm_identifier: &'a VmId,
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeleteStatistic<'a> {
    pub reason: &'a str,
    pub note: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeleteBackupRequest<'a> {
    pub backup_identifier: &'a BackupId,
    pub delete_statistic: DeleteStatistic<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BackupRef<'a> {
    pub backup_identifier: &'a BackupId,
}

#[derive(Debug, Serialize)]
pub(crate) struct RenameBackupRequest<'a> {
    pub identifier: &'a BackupId,
    pub new_name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PolicyRef<'a> {
    pub policy_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PolicyRetention<'a> {
    pub policy_id: &'a str,
    pub keep: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PolicyVms<'a> {
    pub policy_id: &'a str,
    pub vms: &'a [VmId],
}

//! Firewall group and rule models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vpsie_core::ids::{FirewallGroupId, VmId};

/// Traffic direction a rule applies to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RuleDirection {
    /// Inbound traffic.
    In,
    /// Outbound traffic.
    Out,
}

/// A firewall rule inside a group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FirewallRule {
    /// Rule identifier.
    pub identifier: String,
    /// Numeric rule ID.
    #[serde(default)]
    pub id: u64,
    /// Owning group ID.
    #[serde(default)]
    pub group_id: u64,
    /// Owning user ID.
    #[serde(default)]
    pub user_id: u64,
    /// Verdict, e.g. `ACCEPT` or `DROP`.
    pub action: String,
    /// Direction.
    #[serde(rename = "type")]
    pub direction: RuleDirection,
    /// Free-form comment.
    #[serde(default)]
    pub comment: String,
    /// Destination addresses.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dest: Vec<String>,
    /// Destination port or range.
    #[serde(default)]
    pub dport: String,
    /// Protocol.
    #[serde(default)]
    pub proto: String,
    /// Source addresses.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source: Vec<String>,
    /// Source port or range.
    #[serde(default)]
    pub sport: String,
    /// `1` when the rule is active.
    #[serde(default)]
    pub enable: u8,
    /// Interface.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iface: Option<String>,
    /// Log level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<String>,
    /// Predefined service macro.
    #[serde(default, rename = "macro", skip_serializing_if = "Option::is_none")]
    pub macro_name: Option<String>,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<DateTime<Utc>>,
    /// Last update timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_on: Option<DateTime<Utc>>,
}

impl FirewallRule {
    /// Returns true when the rule is active.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enable != 0
    }
}

/// A VM a firewall group is attached to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttachedVm {
    /// VM identifier.
    pub identifier: VmId,
    /// Hostname.
    #[serde(default)]
    pub hostname: String,
    /// Full name.
    #[serde(default)]
    pub fullname: Option<String>,
    /// VM category.
    #[serde(default)]
    pub category: Option<String>,
}

/// Firewall group header fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FirewallGroup {
    /// Group identifier.
    pub identifier: FirewallGroupId,
    /// Numeric group ID.
    #[serde(default)]
    pub id: u64,
    /// Group name.
    pub group_name: String,
    /// Owner's user name.
    #[serde(default)]
    pub user_name: Option<String>,
    /// Inbound rule count.
    #[serde(default)]
    pub inbound_count: u32,
    /// Outbound rule count.
    #[serde(default)]
    pub outbound_count: u32,
    /// Number of attached VMs.
    #[serde(default)]
    pub vms: u32,
    /// Creator's user ID.
    #[serde(default)]
    pub created_by: Option<u64>,
    /// Creation time as reported by the API.
    #[serde(default)]
    pub created_on: Option<String>,
    /// Update time as reported by the API.
    #[serde(default)]
    pub updated_on: Option<String>,
}

/// Firewall group as listed, with its rules and VMs inline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FirewallGroupSummary {
    /// Group header.
    #[serde(flatten)]
    pub group: FirewallGroup,
    /// Rules.
    #[serde(default)]
    pub rules: Vec<FirewallRule>,
    /// Attached VMs.
    #[serde(default, rename = "vmsData")]
    pub vms_data: Vec<AttachedVm>,
}

/// A single firewall group with rules and attached VMs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FirewallGroupDetail {
    /// Group header.
    pub group: FirewallGroup,
    /// Rules.
    #[serde(default)]
    pub rules: Vec<FirewallRule>,
    /// Attached VMs.
    #[serde(default)]
    pub vms: Vec<AttachedVm>,
    /// Rule count.
    #[serde(default)]
    pub count: u32,
}

impl FirewallGroupDetail {
    /// Rules for one direction.
    pub fn rules_for(&self, direction: RuleDirection) -> impl Iterator<Item = &FirewallRule> {
        self.rules
            .iter()
            .filter(move |rule| rule.direction == direction)
    }
}

/// Rule payload for creating or updating a group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FirewallRuleRequest {
    /// Verdict.
    pub action: String,
    /// Direction.
    #[serde(rename = "type")]
    pub direction: RuleDirection,
    /// Destination port or range.
    #[serde(default)]
    pub dport: String,
    /// Protocol.
    #[serde(default)]
    pub proto: String,
    /// Source addresses.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source: Vec<String>,
    /// Source port or range.
    #[serde(default)]
    pub sport: String,
    /// `1` to activate the rule.
    #[serde(default)]
    pub enable: u8,
    /// Predefined service macro.
    #[serde(default, rename = "macro")]
    pub macro_name: String,
    /// Free-form comment.
    #[serde(default)]
    pub comment: String,
    /// Destination addresses.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dest: Vec<String>,
}

impl FirewallRuleRequest {
    /// An enabled rule with the given verdict, direction and protocol.
    #[must_use]
    pub fn new(action: impl Into<String>, direction: RuleDirection, proto: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            direction,
            dport: String::new(),
            proto: proto.into(),
            source: Vec::new(),
            sport: String::new(),
            enable: 1,
            macro_name: String::new(),
            comment: String::new(),
            dest: Vec::new(),
        }
    }

    /// Set the destination port.
    #[must_use]
    pub fn with_dport(mut self, dport: impl Into<String>) -> Self {
        self.dport = dport.into();
        self
    }

    /// Add a source address.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source.push(source.into());
        self
    }

    /// Set the comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateGroupRequest<'a> {
    pub group_name: &'a str,
    #[serde(skip_serializing_if = "no_rules")]
    pub rules: &'a [FirewallRuleRequest],
}

fn no_rules(rules: &&[FirewallRuleRequest]) -> bool {
    rules.is_empty()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GroupRef<'a> {
    pub group_id: &'a FirewallGroupId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GroupVm<'a> {
    pub vm_id: &'a VmId,
    pub group_id: &'a FirewallGroupId,
}

//! Asynchronous firewall group client implementation.

use crate::models::{
    CreateGroupRequest, FirewallGroupDetail, FirewallGroupSummary, FirewallRuleRequest, GroupRef,
    GroupVm,
};
use crate::Result;
use std::sync::Arc;
use tracing::debug;
use url::Url;
use vpsie_core::client::{ClientConfig, ServiceClient, ServiceClientBuilder};
use vpsie_core::ids::{FirewallGroupId, VmId};
use vpsie_core::transport::HttpTransport;
use vpsie_core::{HttpMethod, ListOptions, Page, RequestContext, RetryPolicy, VpsieConfig};

const USER_AGENT: &str = concat!("vpsie-firewall/", env!("CARGO_PKG_VERSION"));

const BASE_PATH: &str = "/apps/v2/firewall";

/// Builder for [`FirewallClient`].
#[derive(Debug)]
pub struct FirewallClientBuilder {
    inner: ServiceClientBuilder,
}

impl FirewallClientBuilder {
    /// Create a builder for the specified base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let inner = ServiceClientBuilder::new(base_url)?.with_user_agent(USER_AGENT);
        Ok(Self { inner })
    }

    /// Create a builder from a [`VpsieConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn from_config(config: &VpsieConfig) -> Result<Self> {
        let inner = ServiceClientBuilder::from_config(config)?.with_user_agent(USER_AGENT);
        Ok(Self { inner })
    }

    /// Set the API token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.inner = self.inner.with_token(token);
        self
    }

    /// Override the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.inner = self.inner.with_retry_policy(retry);
        self
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.inner = self.inner.with_http_config(config);
        self
    }

    /// Send through a custom transport.
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.inner = self.inner.with_transport(transport);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if no token was configured or the HTTP client cannot
    /// be created.
    pub fn build(self) -> Result<FirewallClient> {
        Ok(FirewallClient::from_service(self.inner.build()?))
    }
}

/// Asynchronous firewall group client.
#[derive(Debug, Clone)]
pub struct FirewallClient {
    inner: ServiceClient,
    ctx: RequestContext,
}

impl FirewallClient {
    /// Construct a client from the base URL and API token.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL or token is invalid.
    pub fn new(base_url: impl AsRef<str>, token: impl Into<String>) -> Result<Self> {
        FirewallClientBuilder::new(base_url)?.with_token(token).build()
    }

    /// Wrap an existing [`ServiceClient`], sharing its connection pool.
    #[must_use]
    pub fn from_service(inner: ServiceClient) -> Self {
        Self {
            inner,
            ctx: RequestContext::new(),
        }
    }

    /// Return a client whose calls are bound to `ctx`.
    #[must_use]
    pub fn with_context(&self, ctx: RequestContext) -> Self {
        Self {
            inner: self.inner.clone(),
            ctx,
        }
    }

    /// Return the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        self.inner.base_url()
    }

    /// Create a group, optionally with an initial rule set.
    pub async fn create_group(&self, name: &str, rules: &[FirewallRuleRequest]) -> Result<()> {
        let path = format!("{BASE_PATH}/create/group");
        let body = CreateGroupRequest {
            group_name: name,
            rules,
        };
        self.inner
            .send_empty(&self.ctx, HttpMethod::Post, &path, Some(&body))
            .await
    }

    /// List firewall groups.
    pub async fn list_groups(&self, options: &ListOptions) -> Result<Page<FirewallGroupSummary>> {
        let path = format!("{BASE_PATH}/groups");
        self.inner.send_page(&self.ctx, &path, Some(options)).await
    }

    /// Fetch a group with its rules and attached VMs.
    pub async fn get_group(&self, id: &FirewallGroupId) -> Result<FirewallGroupDetail> {
        let path = format!("{BASE_PATH}/group/{}", id.path_segment()?);
        self.inner
            .send::<(), _>(&self.ctx, HttpMethod::Get, &path, None)
            .await
    }

    /// Delete a group.
    pub async fn delete_group(&self, id: &FirewallGroupId) -> Result<()> {
        debug!(group = %id, "Deleting firewall group");
        let path = format!("{BASE_PATH}/delete/group");
        let body = GroupRef { group_id: id };
        self.inner
            .send_empty(&self.ctx, HttpMethod::Delete, &path, Some(&body))
            .await
    }

    /// Add or change a rule in a group.
    pub async fn update_group(&self, id: &FirewallGroupId, rule: &FirewallRuleRequest) -> Result<()> {
        let path = format!("{BASE_PATH}/groups/{}", id.path_segment()?);
        self.inner
            .send_empty(&self.ctx, HttpMethod::Post, &path, Some(rule))
            .await
    }

    /// Make `group` the VM's firewall group.
    pub async fn assign_to_vm(&self, group: &FirewallGroupId, vm: &VmId) -> Result<()> {
        self.group_vm("setGroupVm", group, vm).await
    }

    /// Attach `group` to a VM.
    pub async fn attach_to_vm(&self, group: &FirewallGroupId, vm: &VmId) -> Result<()> {
        self.group_vm("attach/group", group, vm).await
    }

    /// Detach `group` from a VM.
    pub async fn detach_from_vm(&self, group: &FirewallGroupId, vm: &VmId) -> Result<()> {
        self.group_vm("detach/group", group, vm).await
    }

    /// Remove `group` from a VM entirely.
    pub async fn remove_group_from_vm(&self, group: &FirewallGroupId, vm: &VmId) -> Result<()> {
        debug!(group = %group, vm = %vm, "Removing firewall group from VM");
        let path = format!("{BASE_PATH}/firewall/removeGroupVm");
        let body = GroupVm {
            vm_id: vm,
            group_id: group,
        };
        self.inner
            .send_empty(&self.ctx, HttpMethod::Delete, &path, Some(&body))
            .await
    }

    async fn group_vm(&self, action: &str, group: &FirewallGroupId, vm: &VmId) -> Result<()> {
        let path = format!("{BASE_PATH}/{action}");
        let body = GroupVm {
            vm_id: vm,
            group_id: group,
        };
        self.inner
            .send_empty(&self.ctx, HttpMethod::Post, &path, Some(&body))
            .await
    }
}

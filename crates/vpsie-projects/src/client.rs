//! Asynchronous projects client implementation.

use crate::models::{
    AssignVmRequest, CreateProjectRequest, Domain, MoveVmsRequest, Project, ProjectRef, ProjectVm,
    UserLimits,
};
use crate::Result;
use std::sync::Arc;
use tracing::debug;
use url::form_urlencoded;
use url::Url;
use vpsie_core::client::{ClientConfig, ServiceClient, ServiceClientBuilder};
use vpsie_core::ids::{ProjectId, VmId};
use vpsie_core::query::QueryParams;
use vpsie_core::transport::HttpTransport;
use vpsie_core::{HttpMethod, ListOptions, Page, RequestContext, RetryPolicy, VpsieConfig};

const USER_AGENT: &str = concat!("vpsie-projects/", env!("CARGO_PKG_VERSION"));

const BASE_PATH: &str = "/apps/v2/projects";

/// Builder for [`ProjectsClient`].
#[derive(Debug)]
pub struct ProjectsClientBuilder {
    inner: ServiceClientBuilder,
}

impl ProjectsClientBuilder {
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
    pub fn build(self) -> Result<ProjectsClient> {
        Ok(ProjectsClient::from_service(self.inner.build()?))
    }
}

/// Asynchronous projects client.
#[derive(Debug, Clone)]
pub struct ProjectsClient {
    inner: ServiceClient,
    ctx: RequestContext,
}

impl ProjectsClient {
    /// Construct a client from the base URL and API token.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL or token is invalid.
    pub fn new(base_url: impl AsRef<str>, token: impl Into<String>) -> Result<Self> {
        ProjectsClientBuilder::new(base_url)?.with_token(token).build()
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

    /// List projects.
    pub async fn list(&self, options: &ListOptions) -> Result<Page<Project>> {
        self.inner
            .send_page(&self.ctx, BASE_PATH, Some(options))
            .await
    }

    /// Fetch a project.
    pub async fn get(&self, id: &ProjectId) -> Result<Project> {
        let path = format!("{BASE_PATH}/{}", id.path_segment()?);
        self.inner
            .send::<(), _>(&self.ctx, HttpMethod::Get, &path, None)
            .await
    }

    /// Create a project.
    pub async fn create(&self, request: &CreateProjectRequest) -> Result<()> {
        let path = format!("{BASE_PATH}/add");
        self.inner
            .send_empty(&self.ctx, HttpMethod::Post, &path, Some(request))
            .await
    }

    /// Make a project the account default.
    pub async fn set_default(&self, id: &ProjectId) -> Result<()> {
        let path = format!("{BASE_PATH}/set/default");
        let body = ProjectRef {
            project_identifier: id,
        };
        self.inner
            .send_empty(&self.ctx, HttpMethod::Post, &path, Some(&body))
            .await
    }

    /// List VMs that belong to other projects.
    pub async fn list_other_vms(&self, project: &ProjectId) -> Result<Vec<ProjectVm>> {
        let mut params = QueryParams::new();
        params.push("projectId", project);
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params.pairs())
            .finish();
        let path = format!("{BASE_PATH}/another/vms?{query}");

        let vms: Option<Vec<ProjectVm>> = self
            .inner
            .send::<(), _>(&self.ctx, HttpMethod::Get, &path, None)
            .await?;
        Ok(vms.unwrap_or_default())
    }

    /// Move VMs into a project.
    pub async fn move_vms(&self, vms: &[VmId], project: &ProjectId) -> Result<()> {
        let path = format!("{BASE_PATH}/move/vms");
        let body = MoveVmsRequest {
            vms_identifiers: vms,
            project_id: project,
        };
        self.inner
            .send_empty(&self.ctx, HttpMethod::Post, &path, Some(&body))
            .await
    }

    /// Assign a single VM to a project.
    pub async fn assign_vm(&self, vm: &VmId, project: &ProjectId) -> Result<()> {
        let path = format!("{BASE_PATH}/vm");
        let body = AssignVmRequest {
            vm_identifier: vm,
            project_id: project,
        };
        self.inner
            .send_empty(&self.ctx, HttpMethod::Post, &path, Some(&body))
            .await
    }

    /// List DNS domains attached to a project.
    pub async fn list_domains(&self, project: &ProjectId) -> Result<Vec<Domain>> {
        let path = format!("/apps/v2/domains/project/{}", project.path_segment()?);
        let domains: Option<Vec<Domain>> = self
            .inner
            .send::<(), _>(&self.ctx, HttpMethod::Get, &path, None)
            .await?;
        Ok(domains.unwrap_or_default())
    }

    /// Delete a project.
    pub async fn delete(&self, id: &ProjectId) -> Result<()> {
        debug!(project = %id, "Deleting project");
        let path = format!("{BASE_PATH}/{}", id.path_segment()?);
        self.inner
            .send_empty::<()>(&self.ctx, HttpMethod::Delete, &path, None)
            .await
    }

    /// Fetch the account's product limits.
    pub async fn user_limits(&self) -> Result<UserLimits> {
        self.inner
            .send::<(), _>(
                &self.ctx,
                HttpMethod::Get,
                "/apps/v2/profile/product/limits",
                None,
            )
            .await
    }
}

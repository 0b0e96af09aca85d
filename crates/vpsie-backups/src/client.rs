//! Asynchronous backups client implementation.

use crate::models::{
    Backup, BackupData, BackupPolicy, BackupPolicySummary, BackupRef, CreateBackupPolicyRequest,
    CreateBackupRequest, DeleteBackupRequest, DeleteStatistic, EnableAutoBackupRequest,
    PolicyRef, PolicyRetention, PolicyVms, RenameBackupRequest,
};
use crate::Result;
use std::sync::Arc;
use tracing::debug;
use url::Url;
use vpsie_core::client::{ClientConfig, ServiceClient, ServiceClientBuilder};
use vpsie_core::ids::{BackupId, BackupPolicyId, VmId};
use vpsie_core::transport::HttpTransport;
use vpsie_core::{HttpMethod, ListOptions, Page, RequestContext, RetryPolicy, VpsieConfig};

const USER_AGENT: &str = concat!("vpsie-backups/", env!("CARGO_PKG_VERSION"));

const BASE_PATH: &str = "/apps/v2";

/// Builder for [`BackupsClient`].
#[derive(Debug)]
pub struct BackupsClientBuilder {
    inner: ServiceClientBuilder,
}

impl BackupsClientBuilder {
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
    pub fn build(self) -> Result<BackupsClient> {
        Ok(BackupsClient::from_service(self.inner.build()?))
    }
}

/// Asynchronous client for backups and backup policies.
#[derive(Debug, Clone)]
pub struct BackupsClient {
    inner: ServiceClient,
    ctx: RequestContext,
}

impl BackupsClient {
    /// Construct a client from the base URL and API token.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL or token is invalid.
    pub fn new(base_url: impl AsRef<str>, token: impl Into<String>) -> Result<Self> {
        BackupsClientBuilder::new(base_url)?.with_token(token).build()
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

    /// List backups across all VMs.
    pub async fn list(&self, options: &ListOptions) -> Result<Page<Backup>> {
        let path = format!("{BASE_PATH}/backups");
        self.inner.send_page(&self.ctx, &path, Some(options)).await
    }

    /// List backups of a single VM.
    pub async fn list_by_server(&self, options: &ListOptions, vm: &VmId) -> Result<Page<Backup>> {
        let path = format!("{BASE_PATH}/vm/backups/{}", vm.path_segment()?);
        self.inner.send_page(&self.ctx, &path, Some(options)).await
    }

    /// Fetch a backup.
    pub async fn get(&self, id: &BackupId) -> Result<Backup> {
        let path = format!("{BASE_PATH}/backup/{}", id.path_segment()?);
        let data: BackupData = self
            .inner
            .send::<(), _>(&self.ctx, HttpMethod::Get, &path, None)
            .await?;
        Ok(data.backup)
    }

    /// Start a backup of `vm`.
    pub async fn create(&self, vm: &VmId, name: &str, notes: Option<&str>) -> Result<()> {
        let path = format!("{BASE_PATH}/backup/add");
        let body = CreateBackupRequest {
            vm_identifier: vm,
            name,
            note: notes.filter(|note| !note.is_empty()),
        };
        self.inner
            .send_empty(&self.ctx, HttpMethod::Post, &path, Some(&body))
            .await
    }

    /// Delete a backup, recording why.
    pub async fn delete(&self, id: &BackupId, reason: &str, note: &str) -> Result<()> {
        debug!(backup = %id, reason, "Deleting backup");
        let path = format!("{BASE_PATH}/backup");
        let body = DeleteBackupRequest {
            backup_identifier: id,
            delete_statistic: DeleteStatistic { reason, note },
        };
        self.inner
            .send_empty(&self.ctx, HttpMethod::Delete, &path, Some(&body))
            .await
    }

    /// Provision a new server from a backup.
    pub async fn create_server_from_backup(&self, id: &BackupId) -> Result<()> {
        let path = format!("{BASE_PATH}/backups/create");
        let body = BackupRef {
            backup_identifier: id,
        };
        self.inner
            .send_empty(&self.ctx, HttpMethod::Post, &path, Some(&body))
            .await
    }

    /// Enable scheduled backups on a VM.
    pub async fn enable_auto_backup(&self, request: &EnableAutoBackupRequest) -> Result<()> {
        let path = format!("{BASE_PATH}/backups/enable/auto");
        self.inner
            .send_empty(&self.ctx, HttpMethod::Post, &path, Some(request))
            .await
    }

    /// Rename a backup.
    pub async fn rename(&self, id: &BackupId, new_name: &str) -> Result<()> {
        let path = format!("{BASE_PATH}/backups/update/name");
        let body = RenameBackupRequest {
            identifier: id,
            new_name,
        };
        self.inner
            .send_empty(&self.ctx, HttpMethod::Put, &path, Some(&body))
            .await
    }

    /// List backup policies.
    pub async fn list_policies(&self, options: &ListOptions) -> Result<Page<BackupPolicySummary>> {
        let path = format!("{BASE_PATH}/backups/policy/all");
        self.inner.send_page(&self.ctx, &path, Some(options)).await
    }

    /// Fetch a backup policy with its attached VMs.
    pub async fn get_policy(&self, id: &BackupPolicyId) -> Result<BackupPolicy> {
        let path = format!("{BASE_PATH}/backups/policy/{}", id.path_segment()?);
        self.inner
            .send::<(), _>(&self.ctx, HttpMethod::Get, &path, None)
            .await
    }

    /// Create a backup policy.
    pub async fn create_policy(&self, request: &CreateBackupPolicyRequest) -> Result<()> {
        let path = format!("{BASE_PATH}/backups/policy/create");
        self.inner
            .send_empty(&self.ctx, HttpMethod::Post, &path, Some(request))
            .await
    }

    /// Delete a backup policy.
    ///
    /// The path carries the policy identifier and the body its policy ID.
    pub async fn delete_policy(&self, policy_id: &str, id: &BackupPolicyId) -> Result<()> {
        debug!(policy = %id, "Deleting backup policy");
        let path = format!("{BASE_PATH}/backup/policy/{}", id.path_segment()?);
        let body = PolicyRef { policy_id };
        self.inner
            .send_empty(&self.ctx, HttpMethod::Delete, &path, Some(&body))
            .await
    }

    /// Set how many backups a policy retains.
    pub async fn set_policy_retention(&self, policy_id: &str, keep: u32) -> Result<()> {
        let path = format!("{BASE_PATH}/backups/policy/keep");
        let body = PolicyRetention { policy_id, keep };
        self.inner
            .send_empty(&self.ctx, HttpMethod::Post, &path, Some(&body))
            .await
    }

    /// Attach VMs to a backup policy.
    pub async fn attach_policy(&self, policy_id: &str, vms: &[VmId]) -> Result<()> {
        self.policy_vms("attach", policy_id, vms).await
    }

    /// Detach VMs from a backup policy.
    pub async fn detach_policy(&self, policy_id: &str, vms: &[VmId]) -> Result<()> {
        self.policy_vms("detach", policy_id, vms).await
    }

    async fn policy_vms(&self, action: &str, policy_id: &str, vms: &[VmId]) -> Result<()> {
        let path = format!("{BASE_PATH}/backups/policy/{action}");
        let body = PolicyVms { policy_id, vms };
        self.inner
            .send_empty(&self.ctx, HttpMethod::Post, &path, Some(&body))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use vpsie_core::{CancellationToken, Error, ErrorKind};
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> BackupsClient {
        BackupsClientBuilder::new(server.uri())
            .unwrap()
            .with_token("test-token")
            .with_retry_policy(
                RetryPolicy::new()
                    .with_initial_delay(Duration::from_millis(1))
                    .with_max_delay(Duration::from_millis(5)),
            )
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn list_backups_forwards_paging() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/apps/v2/backups"))
            .and(query_param("page", "2"))
            .and(query_param("per_page", "1"))
            .and(header("vpsie-auth", "test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": false,
                "data": [{"identifier": "b-2", "name": "second", "hostname": "web-1"}],
                "total ": 2
            })))
            .expect(1)
            .mount(&server)
            .await;

        let options = ListOptions::new().with_page(2).with_per_page(1);
        let page = test_client(&server).list(&options).await.unwrap();

        assert_eq!(page.len(), 1);
        assert_eq!(page.total, Some(2));
        assert!(!page.has_more(&options));
    }

    #[tokio::test]
    async fn get_backup_unwraps_nested_object() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/apps/v2/backup/b-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": false,
                "data": {"backup": {"identifier": "b-1", "name": "nightly"}}
            })))
            .mount(&server)
            .await;

        let backup = test_client(&server)
            .get(&BackupId::new("b-1"))
            .await
            .unwrap();
        assert_eq!(backup.name, "nightly");
    }

    #[tokio::test]
    async fn get_backup_reports_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/apps/v2/backup/missing"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": true,
                "message": "Backup not found"
            })))
            .mount(&server)
            .await;

        let err = test_client(&server)
            .get(&BackupId::new("missing"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Envelope);
        assert!(err.to_string().contains("Backup not found"));
    }

    #[tokio::test]
    async fn get_backup_keeps_identifier_in_one_segment() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/apps/v2/backup/x%2F..%2F..%2Fprojects%2F1%3Fpage%3D2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": false,
                "data": {"backup": {"identifier": "x", "name": "odd"}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let backup = test_client(&server)
            .get(&BackupId::new("x/../../projects/1?page=2"))
            .await
            .unwrap();
        assert_eq!(backup.name, "odd");
    }

    #[tokio::test]
    async fn dot_identifier_is_rejected_before_sending() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": false})))
            .expect(0)
            .mount(&server)
            .await;

        let err = test_client(&server)
            .get_policy(&BackupPolicyId::new(".."))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn delete_backup_sends_statistic() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/apps/v2/backup"))
            .and(body_json(json!({
                "backupIdentifier": "b-1",
                "deleteStatistic": {"reason": "cleanup", "note": "rotated"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": false})))
            .expect(1)
            .mount(&server)
            .await;

        test_client(&server)
            .delete(&BackupId::new("b-1"), "cleanup", "rotated")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn create_backup_omits_empty_note() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/apps/v2/backup/add"))
            .and(body_json(json!({"vmIdentifier": "vm-1", "name": "before-upgrade"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": false})))
            .expect(1)
            .mount(&server)
            .await;

        test_client(&server)
            .create(&VmId::new("vm-1"), "before-upgrade", Some(""))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn rename_uses_put() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/apps/v2/backups/update/name"))
            .and(body_json(json!({"identifier": "b-1", "new_name": "renamed"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": false})))
            .expect(1)
            .mount(&server)
            .await;

        test_client(&server)
            .rename(&BackupId::new("b-1"), "renamed")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn list_policies_reads_rows() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/apps/v2/backups/policy/all"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": false,
                "data": {
                    "rows": [
                        {"identifier": "p-1", "name": "daily", "vmsCount": 3},
                        {"identifier": "p-2", "name": "weekly", "vmsCount": 0}
                    ],
                    "count": 2
                }
            })))
            .mount(&server)
            .await;

        let page = test_client(&server)
            .list_policies(&ListOptions::new())
            .await
            .unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page.total, Some(2));
        assert_eq!(page.items[0].vms_count, 3);
    }

    #[tokio::test]
    async fn delete_policy_with_empty_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/apps/v2/backup/policy/p-1"))
            .and(body_json(json!({"policyId": "17"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": false})))
            .expect(1)
            .mount(&server)
            .await;

        test_client(&server)
            .delete_policy("17", &BackupPolicyId::new("p-1"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn attach_and_detach_policy() {
        let server = MockServer::start().await;
        for action in ["attach", "detach"] {
            Mock::given(method("POST"))
                .and(path(format!("/apps/v2/backups/policy/{action}").as_str()))
                .and(body_json(json!({"policyId": "17", "vms": ["vm-1", "vm-2"]})))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": false})))
                .expect(1)
                .mount(&server)
                .await;
        }

        let client = test_client(&server);
        let vms = [VmId::new("vm-1"), VmId::new("vm-2")];
        client.attach_policy("17", &vms).await.unwrap();
        client.detach_policy("17", &vms).await.unwrap();
    }

    #[tokio::test]
    async fn server_errors_are_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/apps/v2/backups/policy/keep"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .expect(3)
            .mount(&server)
            .await;

        let err = test_client(&server)
            .set_policy_retention("17", 5)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport { attempts: 3, .. }));
    }

    #[tokio::test]
    async fn cancelled_context_skips_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": false})))
            .expect(0)
            .mount(&server)
            .await;

        let token = CancellationToken::new();
        token.cancel();
        let client = test_client(&server)
            .with_context(RequestContext::new().with_cancellation(token));

        let err = client
            .create_server_from_backup(&BackupId::new("b-1"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
    }
}

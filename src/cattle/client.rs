// HTTP implementation of the registry directory and credential store on top
// of the Cattle REST API. Requests use basic auth with the API access/secret
// key pair; collection responses are followed through `pagination.next`.

use crate::cattle::{
    CredentialRecord, CredentialStore, ListOpts, PLACEHOLDER_EMAIL, RegistryDirectory,
    RegistryRecord,
};
use crate::error::handlers::{ApiResource, HttpErrorHandler};
use crate::error::{Result, SyncError};
use crate::logging::Logger;
use crate::token::DecodedCredential;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

#[derive(Debug, Deserialize)]
struct Collection<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
struct Pagination {
    next: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateRegistryRequest<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    server_address: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateCredentialRequest<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    registry_id: &'a str,
    public_value: &'a str,
    secret_value: &'a str,
    email: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateCredentialRequest<'a> {
    public_value: &'a str,
    secret_value: &'a str,
    email: &'static str,
}

pub struct CattleClientBuilder {
    address: String,
    access_key: String,
    secret_key: String,
    timeout: Duration,
    output: Logger,
}

impl CattleClientBuilder {
    pub fn new(address: String) -> Self {
        Self {
            address,
            access_key: String::new(),
            secret_key: String::new(),
            timeout: Duration::from_secs(60),
            output: Logger::new(false),
        }
    }

    pub fn with_keys(mut self, access_key: String, secret_key: String) -> Self {
        self.access_key = access_key;
        self.secret_key = secret_key;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_logger(mut self, output: Logger) -> Self {
        self.output = output;
        self
    }

    pub fn build(self) -> Result<CattleClient> {
        let parsed = Url::parse(&self.address).map_err(|e| {
            SyncError::Configuration(format!("Invalid Cattle URL {}: {}", self.address, e))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SyncError::Configuration(format!(
                "Invalid Cattle URL {}: must start with http:// or https://",
                self.address
            )));
        }

        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| SyncError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(CattleClient {
            client,
            address: self.address.trim_end_matches('/').to_string(),
            access_key: self.access_key,
            secret_key: self.secret_key,
            output: self.output,
        })
    }
}

pub struct CattleClient {
    client: Client,
    address: String,
    access_key: String,
    secret_key: String,
    output: Logger,
}

impl CattleClient {
    pub fn builder(address: String) -> CattleClientBuilder {
        CattleClientBuilder::new(address)
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Verify the API is reachable and the keys are accepted
    pub async fn ping(&self) -> Result<()> {
        let operation = "reach the Cattle API";
        let response = self
            .authorized(self.client.get(&self.address))
            .send()
            .await
            .map_err(|e| {
                HttpErrorHandler::handle_transport_error(ApiResource::Registry, e, operation)
            })?;

        let status = response.status();
        if status.is_success() {
            self.output.detail(&format!("Cattle API at {} answered {}", self.address, status));
            Ok(())
        } else {
            let error_text = read_error_body(response).await;
            Err(HttpErrorHandler::handle_api_error(
                ApiResource::Registry,
                status,
                &error_text,
                operation,
            ))
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.address, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.access_key, Some(&self.secret_key))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        resource: ApiResource,
        request: RequestBuilder,
        operation: &str,
    ) -> Result<T> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| HttpErrorHandler::handle_transport_error(resource, e, operation))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = read_error_body(response).await;
            return Err(HttpErrorHandler::handle_api_error(
                resource,
                status,
                &error_text,
                operation,
            ));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| HttpErrorHandler::handle_transport_error(resource, e, operation))
    }

    /// Fetch every page of a collection
    async fn list_all<T: DeserializeOwned>(
        &self,
        resource: ApiResource,
        path: &str,
        opts: &ListOpts,
        operation: &str,
    ) -> Result<Vec<T>> {
        let first_url = self.url(path);
        let mut items = Vec::new();
        let mut request = self.client.get(&first_url).query(&opts.filters);
        let mut seen = vec![first_url];

        loop {
            let page: Collection<T> = self.send_json(resource, request, operation).await?;
            items.extend(page.data);

            let next = page
                .pagination
                .and_then(|p| p.next)
                .filter(|next| !next.is_empty());
            match next {
                Some(next) if !seen.contains(&next) => {
                    self.output.detail(&format!("Following pagination link {}", next));
                    request = self.client.get(&next);
                    seen.push(next);
                }
                Some(next) => {
                    self.output
                        .warning(&format!("Pagination loop detected at {}, stopping", next));
                    break;
                }
                None => break,
            }
        }

        Ok(items)
    }
}

async fn read_error_body(response: reqwest::Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read error response".to_string())
}

#[async_trait]
impl RegistryDirectory for CattleClient {
    async fn list_registries(&self, opts: &ListOpts) -> Result<Vec<RegistryRecord>> {
        self.list_all(ApiResource::Registry, "registries", opts, "list registries")
            .await
    }

    async fn create_registry(&self, server_address: &str) -> Result<RegistryRecord> {
        let body = CreateRegistryRequest {
            kind: "registry",
            server_address,
        };
        let request = self.client.post(self.url("registries")).json(&body);
        self.send_json(ApiResource::Registry, request, "create registry")
            .await
    }
}

#[async_trait]
impl CredentialStore for CattleClient {
    async fn list_credentials(&self, registry_id: &str) -> Result<Vec<CredentialRecord>> {
        let opts = ListOpts::default().filter("registryId", registry_id);
        self.list_all(
            ApiResource::Credential,
            "registrycredentials",
            &opts,
            "list registry credentials",
        )
        .await
    }

    async fn create_credential(
        &self,
        registry_id: &str,
        credential: &DecodedCredential,
    ) -> Result<CredentialRecord> {
        let body = CreateCredentialRequest {
            kind: "registryCredential",
            registry_id,
            public_value: &credential.username,
            secret_value: &credential.password,
            email: PLACEHOLDER_EMAIL,
        };
        let request = self.client.post(self.url("registrycredentials")).json(&body);
        self.send_json(ApiResource::Credential, request, "create registry credential")
            .await
    }

    async fn update_credential(
        &self,
        credential_id: &str,
        credential: &DecodedCredential,
    ) -> Result<CredentialRecord> {
        let body = UpdateCredentialRequest {
            public_value: &credential.username,
            secret_value: &credential.password,
            email: PLACEHOLDER_EMAIL,
        };
        let request = self
            .client
            .put(self.url(&format!("registrycredentials/{}", credential_id)))
            .json(&body);
        self.send_json(ApiResource::Credential, request, "update registry credential")
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use httpmock::Method::{GET, POST, PUT};
    use httpmock::MockServer;
    use serde_json::json;

    fn client_for(server: &MockServer) -> CattleClient {
        CattleClient::builder(format!("{}/v2-beta", server.base_url()))
            .with_keys("access".to_string(), "secret".to_string())
            .with_timeout(Duration::from_secs(5))
            .build()
            .unwrap()
    }

    fn basic_auth_header() -> String {
        format!("Basic {}", STANDARD.encode("access:secret"))
    }

    #[test]
    fn test_builder_rejects_bad_urls() {
        assert!(CattleClient::builder("not a url".to_string()).build().is_err());
        assert!(CattleClient::builder("ftp://cattle".to_string()).build().is_err());
        let client = CattleClient::builder("http://cattle:8080/v2-beta/".to_string())
            .build()
            .unwrap();
        assert_eq!(client.address(), "http://cattle:8080/v2-beta");
    }

    #[tokio::test]
    async fn test_list_registries_follows_pagination() {
        let server = MockServer::start_async().await;
        let next = format!("{}/v2-beta/page2/registries", server.base_url());

        let first = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v2-beta/registries")
                    .header("authorization", basic_auth_header());
                then.status(200).json_body(json!({
                    "type": "collection",
                    "data": [{"id": "1r1", "serverAddress": "quay.io"}],
                    "pagination": {"next": next}
                }));
            })
            .await;
        let second = server
            .mock_async(|when, then| {
                when.method(GET).path("/v2-beta/page2/registries");
                then.status(200).json_body(json!({
                    "type": "collection",
                    "data": [{"id": "1r2", "serverAddress": "index.docker.io"}],
                    "pagination": {"next": null}
                }));
            })
            .await;

        let registries = client_for(&server)
            .list_registries(&ListOpts::default())
            .await
            .unwrap();

        assert_eq!(
            registries.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
            vec!["1r1", "1r2"]
        );
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_credentials_filters_by_registry_id() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v2-beta/registrycredentials")
                    .query_param("registryId", "1r1");
                then.status(200).json_body(json!({
                    "data": [{"id": "1rc1", "registryId": "1r1", "publicValue": "AWS"}]
                }));
            })
            .await;

        let credentials = client_for(&server).list_credentials("1r1").await.unwrap();

        assert_eq!(credentials.len(), 1);
        assert_eq!(credentials[0].id, "1rc1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_registry_and_credential_payloads() {
        let server = MockServer::start_async().await;
        let registry_mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v2-beta/registries")
                    .json_body(json!({"type": "registry", "serverAddress": "quay.io"}));
                then.status(201)
                    .json_body(json!({"id": "1r9", "serverAddress": "quay.io"}));
            })
            .await;
        let credential_mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v2-beta/registrycredentials")
                    .json_body(json!({
                        "type": "registryCredential",
                        "registryId": "1r9",
                        "publicValue": "AWS",
                        "secretValue": "pw",
                        "email": PLACEHOLDER_EMAIL
                    }));
                then.status(201)
                    .json_body(json!({"id": "1rc9", "registryId": "1r9", "publicValue": "AWS"}));
            })
            .await;

        let client = client_for(&server);
        let registry = client.create_registry("quay.io").await.unwrap();
        let credential = client
            .create_credential(&registry.id, &DecodedCredential::new("AWS", "pw"))
            .await
            .unwrap();

        assert_eq!(registry.id, "1r9");
        assert_eq!(credential.id, "1rc9");
        registry_mock.assert_async().await;
        credential_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_credential_puts_new_values() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/v2-beta/registrycredentials/1rc1")
                    .header("authorization", basic_auth_header())
                    .json_body(json!({
                        "publicValue": "AWS",
                        "secretValue": "fresh",
                        "email": PLACEHOLDER_EMAIL
                    }));
                then.status(200)
                    .json_body(json!({"id": "1rc1", "registryId": "1r1", "publicValue": "AWS"}));
            })
            .await;

        let updated = client_for(&server)
            .update_credential("1rc1", &DecodedCredential::new("AWS", "fresh"))
            .await
            .unwrap();

        assert_eq!(updated.registry_id, "1r1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_api_errors_are_classified_by_resource() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v2-beta/registries");
                then.status(401).body("bad credentials");
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(PUT).path("/v2-beta/registrycredentials/1rc1");
                then.status(422).body("missing field");
            })
            .await;

        let client = client_for(&server);
        let list_err = client.list_registries(&ListOpts::default()).await.unwrap_err();
        assert!(matches!(
            list_err,
            SyncError::Directory(ref msg) if msg.contains("bad credentials")
        ));

        let update_err = client
            .update_credential("1rc1", &DecodedCredential::new("a", "b"))
            .await
            .unwrap_err();
        assert!(matches!(update_err, SyncError::CredentialStore(_)));
    }

    #[tokio::test]
    async fn test_ping() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v2-beta");
                then.status(200).json_body(json!({"type": "apiVersion"}));
            })
            .await;

        assert!(client_for(&server).ping().await.is_ok());

        let unreachable = CattleClient::builder("http://127.0.0.1:1/v2-beta".to_string())
            .with_timeout(Duration::from_secs(2))
            .build()
            .unwrap();
        assert!(unreachable.ping().await.is_err());
    }
}

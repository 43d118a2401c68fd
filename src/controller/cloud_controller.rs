use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::{CatalogPlan, CatalogService, ControlPlane};
use crate::broker::{BrokerRegistration, BrokerSpec};
use crate::config::{ControlPlaneTarget, UAA_CLIENT_ID};
use crate::error::ApiError;

/// Cloud Controller v2 API client authenticated with a UAA bearer token.
pub struct CloudControllerClient {
    http: Client,
    api_url: String,
    token: String,
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Info {
    #[serde(default)]
    authorization_endpoint: Option<String>,
    #[serde(default)]
    token_endpoint: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Metadata {
    guid: String,
}

#[derive(Debug, Deserialize)]
struct Resource<T> {
    metadata: Metadata,
    entity: T,
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default)]
    next_url: Option<String>,
    resources: Vec<Resource<T>>,
}

#[derive(Debug, Deserialize)]
struct BrokerEntity {
    name: String,
    broker_url: String,
    #[serde(default)]
    auth_username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ServiceEntity {
    label: String,
    #[serde(default)]
    unique_id: String,
}

#[derive(Debug, Deserialize)]
struct PlanEntity {
    name: String,
    #[serde(default)]
    public: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    description: String,
}

impl Resource<BrokerEntity> {
    fn into_registration(self, auth_password: Option<String>) -> BrokerRegistration {
        BrokerRegistration {
            guid: self.metadata.guid,
            name: self.entity.name,
            broker_url: self.entity.broker_url,
            auth_username: self.entity.auth_username.unwrap_or_default(),
            auth_password,
        }
    }
}

impl From<Resource<ServiceEntity>> for CatalogService {
    fn from(r: Resource<ServiceEntity>) -> Self {
        Self {
            guid: r.metadata.guid,
            label: r.entity.label,
            unique_id: r.entity.unique_id,
        }
    }
}

impl From<Resource<PlanEntity>> for CatalogPlan {
    fn from(r: Resource<PlanEntity>) -> Self {
        Self {
            guid: r.metadata.guid,
            name: r.entity.name,
            public: r.entity.public,
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

impl CloudControllerClient {
    pub fn with_token(http: Client, api_url: &str, token: impl Into<String>) -> Self {
        Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    /// Discover the UAA endpoint from `/v2/info` and log in with a password
    /// grant.
    pub async fn login(http: Client, target: &ControlPlaneTarget) -> Result<Self, ApiError> {
        let api_url = target.address.trim_end_matches('/');
        let resp = http.get(format!("{api_url}/v2/info")).send().await?;
        let info: Info = decode(resp).await?;

        let uaa = info
            .token_endpoint
            .or(info.authorization_endpoint)
            .ok_or_else(|| ApiError::Login("/v2/info advertises no token endpoint".into()))?;
        let token_url = format!("{}/oauth/token", uaa.trim_end_matches('/'));
        tracing::debug!("Logging in to {token_url} as {}", target.username);

        let resp = http
            .post(&token_url)
            .basic_auth(UAA_CLIENT_ID, Some(""))
            .header("Accept", "application/json")
            .form(&[
                ("grant_type", "password"),
                ("username", target.username.as_str()),
                ("password", target.password.as_str()),
            ])
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status();
            return Err(ApiError::Login(format!(
                "UAA rejected credentials for {} (HTTP {status})",
                target.username
            )));
        }
        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| ApiError::Login(format!("invalid token response: {e}")))?;

        tracing::info!("Logged in to {api_url} as {}", target.username);
        Ok(Self::with_token(http, api_url, token.access_token))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .bearer_auth(&self.token)
            .header("Accept", "application/json")
    }

    /// Collect every page of a list endpoint by following `next_url`.
    async fn list_all<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<Resource<T>>, ApiError> {
        let first = self.request(Method::GET, path).query(query).send().await?;
        let mut page: Page<T> = decode(first).await?;
        let mut resources = std::mem::take(&mut page.resources);

        while let Some(next) = page.next_url.take() {
            tracing::trace!("Following {next}");
            let resp = self.request(Method::GET, &next).send().await?;
            page = decode(resp).await?;
            resources.append(&mut page.resources);
        }
        Ok(resources)
    }
}

async fn error_from(resp: Response) -> ApiError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(err) if !err.description.is_empty() => {
            ApiError::from_response(status, err.code, err.description)
        }
        _ => ApiError::from_response(status, 0, body),
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    if !resp.status().is_success() {
        return Err(error_from(resp).await);
    }
    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
}

async fn expect_success(resp: Response) -> Result<(), ApiError> {
    if !resp.status().is_success() {
        return Err(error_from(resp).await);
    }
    Ok(())
}

fn broker_body(spec: &BrokerSpec, include_name: bool) -> serde_json::Value {
    let mut body = serde_json::json!({
        "broker_url": spec.url,
        "auth_username": spec.credentials.username,
        "auth_password": spec.credentials.password,
    });
    if include_name {
        body["name"] = serde_json::Value::String(spec.name.clone());
    }
    body
}

#[async_trait]
impl ControlPlane for CloudControllerClient {
    async fn service_broker_by_name(
        &self,
        name: &str,
    ) -> Result<Option<BrokerRegistration>, ApiError> {
        let found: Vec<Resource<BrokerEntity>> = self
            .list_all("/v2/service_brokers", &[("q", format!("name:{name}"))])
            .await?;
        Ok(found
            .into_iter()
            .find(|r| r.entity.name == name)
            .map(|r| r.into_registration(None)))
    }

    async fn create_service_broker(
        &self,
        spec: &BrokerSpec,
    ) -> Result<BrokerRegistration, ApiError> {
        let resp = self
            .request(Method::POST, "/v2/service_brokers")
            .json(&broker_body(spec, true))
            .send()
            .await?;
        let created: Resource<BrokerEntity> = decode(resp).await?;
        Ok(created.into_registration(Some(spec.credentials.password.clone())))
    }

    async fn update_service_broker(
        &self,
        guid: &str,
        spec: &BrokerSpec,
    ) -> Result<BrokerRegistration, ApiError> {
        let resp = self
            .request(Method::PUT, &format!("/v2/service_brokers/{guid}"))
            .json(&broker_body(spec, false))
            .send()
            .await?;
        let updated: Resource<BrokerEntity> = decode(resp).await?;
        Ok(updated.into_registration(Some(spec.credentials.password.clone())))
    }

    async fn delete_service_broker(&self, guid: &str) -> Result<(), ApiError> {
        let resp = self
            .request(Method::DELETE, &format!("/v2/service_brokers/{guid}"))
            .send()
            .await?;
        expect_success(resp).await
    }

    async fn services(&self) -> Result<Vec<CatalogService>, ApiError> {
        let all: Vec<Resource<ServiceEntity>> = self.list_all("/v2/services", &[]).await?;
        Ok(all.into_iter().map(CatalogService::from).collect())
    }

    async fn delete_service(&self, guid: &str, purge: bool) -> Result<(), ApiError> {
        let resp = self
            .request(Method::DELETE, &format!("/v2/services/{guid}"))
            .query(&[("purge", purge)])
            .send()
            .await?;
        expect_success(resp).await
    }

    async fn service_plans(&self, service_guid: &str) -> Result<Vec<CatalogPlan>, ApiError> {
        let all: Vec<Resource<PlanEntity>> = self
            .list_all(&format!("/v2/services/{service_guid}/service_plans"), &[])
            .await?;
        Ok(all.into_iter().map(CatalogPlan::from).collect())
    }

    async fn update_service_plan(&self, guid: &str, public: bool) -> Result<CatalogPlan, ApiError> {
        let resp = self
            .request(Method::PUT, &format!("/v2/service_plans/{guid}"))
            .json(&serde_json::json!({ "public": public }))
            .send()
            .await?;
        let updated: Resource<PlanEntity> = decode(resp).await?;
        Ok(updated.into())
    }

    async fn delete_service_plan(&self, guid: &str) -> Result<(), ApiError> {
        let resp = self
            .request(Method::DELETE, &format!("/v2/service_plans/{guid}"))
            .send()
            .await?;
        expect_success(resp).await
    }
}

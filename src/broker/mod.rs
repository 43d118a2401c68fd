pub mod catalog;

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::CatalogError;

/// Basic auth pair shared by the broker's catalog endpoint and the control
/// plane's calls to the broker.
#[derive(Clone, PartialEq, Eq)]
pub struct BrokerCredentials {
    pub username: String,
    pub password: String,
}

impl BrokerCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for BrokerCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrokerCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The registration an operator asks for.
#[derive(Debug, Clone)]
pub struct BrokerSpec {
    pub name: String,
    pub url: String,
    pub credentials: BrokerCredentials,
}

/// A broker record as stored by the control plane.
///
/// `auth_password` is `None` when the control plane does not echo the
/// stored password back, which the Cloud Controller never does.
#[derive(Clone, Serialize)]
pub struct BrokerRegistration {
    pub guid: String,
    pub name: String,
    pub broker_url: String,
    pub auth_username: String,
    #[serde(skip_serializing)]
    pub auth_password: Option<String>,
}

impl BrokerRegistration {
    /// True when URL and both credentials already equal the request.
    pub fn matches(&self, spec: &BrokerSpec) -> bool {
        self.broker_url == spec.url
            && self.auth_username == spec.credentials.username
            && self.auth_password.as_deref() == Some(spec.credentials.password.as_str())
    }
}

impl fmt::Debug for BrokerRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrokerRegistration")
            .field("guid", &self.guid)
            .field("name", &self.name)
            .field("broker_url", &self.broker_url)
            .field("auth_username", &self.auth_username)
            .finish_non_exhaustive()
    }
}

/// Source of the broker-assigned service ids advertised at `/v2/catalog`.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn service_ids(
        &self,
        broker_url: &str,
        credentials: &BrokerCredentials,
    ) -> Result<Vec<String>, CatalogError>;
}

pub mod cloud_controller;
#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::broker::{BrokerRegistration, BrokerSpec};
use crate::error::ApiError;

/// A service offering known to the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogService {
    pub guid: String,
    pub label: String,
    /// Id assigned by the broker in its catalog.
    pub unique_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogPlan {
    pub guid: String,
    pub name: String,
    pub public: bool,
}

/// The control-plane primitives the registrar relies on.
///
/// Lookups return `Ok(None)` for a missing broker; deletes of a missing
/// resource fail with [`ApiError::NotFound`].
#[async_trait]
pub trait ControlPlane: Send + Sync {
    async fn service_broker_by_name(
        &self,
        name: &str,
    ) -> Result<Option<BrokerRegistration>, ApiError>;

    async fn create_service_broker(&self, spec: &BrokerSpec)
    -> Result<BrokerRegistration, ApiError>;

    /// Sets URL, username and password together.
    async fn update_service_broker(
        &self,
        guid: &str,
        spec: &BrokerSpec,
    ) -> Result<BrokerRegistration, ApiError>;

    async fn delete_service_broker(&self, guid: &str) -> Result<(), ApiError>;

    async fn services(&self) -> Result<Vec<CatalogService>, ApiError>;

    async fn delete_service(&self, guid: &str, purge: bool) -> Result<(), ApiError>;

    async fn service_plans(&self, service_guid: &str) -> Result<Vec<CatalogPlan>, ApiError>;

    async fn update_service_plan(&self, guid: &str, public: bool)
    -> Result<CatalogPlan, ApiError>;

    async fn delete_service_plan(&self, guid: &str) -> Result<(), ApiError>;
}

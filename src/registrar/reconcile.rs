use super::Registrar;
use crate::broker::catalog::services_in_catalog;
use crate::broker::{BrokerCredentials, BrokerRegistration, BrokerSpec};
use crate::controller::CatalogService;
use crate::error::{ApiError, RegistrarError};

impl Registrar<'_> {
    /// Make the control plane's broker record equal `spec`.
    ///
    /// Creates the broker when absent, updates URL and credentials together
    /// when they differ, and writes nothing when they already match. A name
    /// or URL conflict on create is resolved by updating the broker found
    /// under `spec.name`.
    ///
    /// The Cloud Controller never returns the stored broker password, so an
    /// existing broker there cannot be proven up to date and every call
    /// issues one update. Only control planes that report the password get
    /// the write-free path.
    pub async fn register(&self, spec: &BrokerSpec) -> Result<BrokerRegistration, ApiError> {
        if let Some(existing) = self.control_plane.service_broker_by_name(&spec.name).await? {
            return self.converge(existing, spec).await;
        }

        tracing::info!("Adding service broker {}", spec.name);
        match self.control_plane.create_service_broker(spec).await {
            Ok(created) => {
                tracing::info!("Created service broker {} ({})", created.name, created.guid);
                Ok(created)
            }
            Err(err) if err.is_recoverable_conflict() => {
                tracing::info!("Service broker {} already registered: {err}", spec.name);
                match self.control_plane.service_broker_by_name(&spec.name).await? {
                    Some(existing) => self.converge(existing, spec).await,
                    // The URL belongs to a broker under another name.
                    None => Err(err),
                }
            }
            Err(err) => Err(err),
        }
    }

    async fn converge(
        &self,
        existing: BrokerRegistration,
        spec: &BrokerSpec,
    ) -> Result<BrokerRegistration, ApiError> {
        if existing.matches(spec) {
            tracing::info!("Service broker {} is already up to date", spec.name);
            return Ok(existing);
        }

        tracing::info!(
            "Updating service broker {} url and credentials",
            existing.name
        );
        self.control_plane
            .update_service_broker(&existing.guid, spec)
            .await
    }

    /// Services the control plane knows about whose broker-assigned id is
    /// advertised in the broker's live catalog.
    pub async fn fetch_services_for_broker(
        &self,
        broker_url: &str,
        credentials: &BrokerCredentials,
    ) -> Result<Vec<CatalogService>, RegistrarError> {
        let ids = self.catalog.service_ids(broker_url, credentials).await?;
        let known = self.control_plane.services().await?;
        let owned = services_in_catalog(known, &ids);
        tracing::debug!(
            "{} of {} catalog service(s) are known to the control plane",
            owned.len(),
            ids.len()
        );
        Ok(owned)
    }
}

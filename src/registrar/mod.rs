//! Reconciles a broker registration and its catalog visibility against the
//! control plane.
//!
//! A [`Registrar`] borrows the logged-in control plane and a catalog source
//! for the lifetime of one invocation. Every call re-reads control-plane
//! state; nothing is cached between operations.

pub mod reconcile;
pub mod teardown;

use serde::Serialize;

use crate::broker::{BrokerRegistration, BrokerSpec, CatalogSource};
use crate::controller::ControlPlane;
use crate::error::RegistrarError;

pub struct Registrar<'a> {
    control_plane: &'a dyn ControlPlane,
    catalog: &'a dyn CatalogSource,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanVisibility {
    pub service: String,
    pub plan: String,
    /// False when the plan was already public and nothing was written.
    pub changed: bool,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct VisibilityReport {
    pub plans: Vec<PlanVisibility>,
}

impl VisibilityReport {
    pub fn changed(&self) -> usize {
        self.plans.iter().filter(|p| p.changed).count()
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct PurgeReport {
    pub services: Vec<String>,
    pub plans_deleted: usize,
    pub broker_existed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterOutcome {
    pub registration: BrokerRegistration,
    pub visibility: VisibilityReport,
}

impl<'a> Registrar<'a> {
    pub fn new(control_plane: &'a dyn ControlPlane, catalog: &'a dyn CatalogSource) -> Self {
        Self {
            control_plane,
            catalog,
        }
    }

    /// Register the broker, then make every plan of its catalog public.
    pub async fn register_and_publish(
        &self,
        spec: &BrokerSpec,
    ) -> Result<RegisterOutcome, RegistrarError> {
        let registration = self.register(spec).await?;
        let services = self
            .fetch_services_for_broker(&registration.broker_url, &spec.credentials)
            .await?;
        let visibility = self.make_public(&services).await?;
        Ok(RegisterOutcome {
            registration,
            visibility,
        })
    }
}

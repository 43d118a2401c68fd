use super::{PlanVisibility, PurgeReport, Registrar, VisibilityReport};
use crate::broker::BrokerSpec;
use crate::controller::CatalogService;
use crate::error::{ApiError, RegistrarError};

/// Treat a delete of something already gone as done.
fn tolerate_absent(result: Result<(), ApiError>, what: &str) -> Result<bool, ApiError> {
    match result {
        Ok(()) => Ok(true),
        Err(err) if err.is_not_found() => {
            tracing::debug!("{what} was already absent");
            Ok(false)
        }
        Err(err) => Err(err),
    }
}

impl Registrar<'_> {
    /// Mark every plan of `services` public. Plans that already are public
    /// are left alone.
    pub async fn make_public(
        &self,
        services: &[CatalogService],
    ) -> Result<VisibilityReport, ApiError> {
        let mut report = VisibilityReport::default();

        for service in services {
            for plan in self.control_plane.service_plans(&service.guid).await? {
                let changed = if plan.public {
                    tracing::info!(
                        "Service plan {} of {} is already public",
                        plan.name,
                        service.label
                    );
                    false
                } else {
                    tracing::info!(
                        "Making service plan {} of {} public",
                        plan.name,
                        service.label
                    );
                    self.control_plane.update_service_plan(&plan.guid, true).await?;
                    true
                };
                report.plans.push(PlanVisibility {
                    service: service.label.clone(),
                    plan: plan.name,
                    changed,
                });
            }
        }

        Ok(report)
    }

    /// Remove the broker's services (plans first) and then the broker record.
    ///
    /// A plan the control plane refuses to delete because instances still
    /// use it is removed, with its instances, by the service delete, which
    /// always asks for a purge. Succeeds when the broker is already gone.
    pub async fn purge(&self, spec: &BrokerSpec) -> Result<PurgeReport, RegistrarError> {
        let services = self
            .fetch_services_for_broker(&spec.url, &spec.credentials)
            .await?;
        let mut report = PurgeReport::default();

        for service in services {
            for plan in self.control_plane.service_plans(&service.guid).await? {
                match self.control_plane.delete_service_plan(&plan.guid).await {
                    Ok(()) => report.plans_deleted += 1,
                    Err(err) if err.is_not_found() => {
                        tracing::debug!("Service plan {} was already absent", plan.name);
                    }
                    // Instances still hold the plan; the service purge removes both.
                    Err(err) if err.is_association_not_empty() => {
                        tracing::info!(
                            "Service plan {} still has instances, leaving it to the purge of {}",
                            plan.name,
                            service.label
                        );
                        report.plans_deleted += 1;
                    }
                    Err(err) => return Err(err.into()),
                }
            }

            let result = self.control_plane.delete_service(&service.guid, true).await;
            tolerate_absent(result, &format!("Service {}", service.label))?;
            tracing::info!("Purged service offering {}", service.label);
            report.services.push(service.label);
        }

        match self.control_plane.service_broker_by_name(&spec.name).await? {
            Some(broker) => {
                let result = self.control_plane.delete_service_broker(&broker.guid).await;
                report.broker_existed =
                    tolerate_absent(result, &format!("Service broker {}", spec.name))?;
                if report.broker_existed {
                    tracing::info!("Deleted service broker {}", spec.name);
                } else {
                    tracing::info!("Service broker {} does not exist.", spec.name);
                }
            }
            None => {
                tracing::info!("Service broker {} does not exist.", spec.name);
            }
        }

        Ok(report)
    }
}

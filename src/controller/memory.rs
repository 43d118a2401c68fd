use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;

use super::{CatalogPlan, CatalogService, ControlPlane};
use crate::broker::{BrokerRegistration, BrokerSpec};
use crate::error::ApiError;

/// An in-process control plane for exercising the registrar without a
/// Cloud Controller. Counts every write so tests can assert no-ops.
#[derive(Default)]
pub struct MemoryControlPlane {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    brokers: Vec<BrokerRegistration>,
    services: Vec<(CatalogService, Vec<CatalogPlan>)>,
    /// `(plan guid, instance guid)`
    instances: Vec<(String, String)>,
    writes: Writes,
    hidden_lookups: usize,
    create_failure: Option<ApiError>,
    delete_failure: Option<ApiError>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Writes {
    pub broker_creates: usize,
    pub broker_updates: usize,
    pub broker_deletes: usize,
    pub plan_updates: usize,
    pub plan_deletes: usize,
    pub service_deletes: usize,
}

impl Writes {
    pub fn total(&self) -> usize {
        self.broker_creates
            + self.broker_updates
            + self.broker_deletes
            + self.plan_updates
            + self.plan_deletes
            + self.service_deletes
    }
}

fn not_found(what: &str, guid: &str) -> ApiError {
    ApiError::NotFound(format!("The {what} could not be found: {guid}"))
}

impl MemoryControlPlane {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_broker(&self, spec: &BrokerSpec) -> BrokerRegistration {
        let reg = BrokerRegistration {
            guid: uuid::Uuid::new_v4().to_string(),
            name: spec.name.clone(),
            broker_url: spec.url.clone(),
            auth_username: spec.credentials.username.clone(),
            auth_password: Some(spec.credentials.password.clone()),
        };
        self.state.lock().unwrap().brokers.push(reg.clone());
        reg
    }

    /// Add a service with plans given as `(name, public)`.
    pub fn seed_service(&self, label: &str, unique_id: &str, plans: &[(&str, bool)]) -> String {
        let guid = uuid::Uuid::new_v4().to_string();
        let service = CatalogService {
            guid: guid.clone(),
            label: label.into(),
            unique_id: unique_id.into(),
        };
        let plans = plans
            .iter()
            .map(|(name, public)| CatalogPlan {
                guid: uuid::Uuid::new_v4().to_string(),
                name: (*name).into(),
                public: *public,
            })
            .collect();
        self.state.lock().unwrap().services.push((service, plans));
        guid
    }

    /// Provision an instance of the named plan. Panics if the plan is unknown.
    pub fn seed_instance(&self, label: &str, plan: &str) -> String {
        let mut state = self.state.lock().unwrap();
        let plan_guid = state
            .services
            .iter()
            .find(|(s, _)| s.label == label)
            .and_then(|(_, plans)| plans.iter().find(|p| p.name == plan))
            .map(|p| p.guid.clone())
            .expect("seed_instance: unknown service plan");
        let guid = uuid::Uuid::new_v4().to_string();
        state.instances.push((plan_guid, guid.clone()));
        guid
    }

    pub fn instance_count(&self) -> usize {
        self.state.lock().unwrap().instances.len()
    }

    /// The next `count` broker lookups report nothing, as a stale read would.
    pub fn hide_broker_lookups(&self, count: usize) {
        self.state.lock().unwrap().hidden_lookups = count;
    }

    pub fn fail_next_create(&self, err: ApiError) {
        self.state.lock().unwrap().create_failure = Some(err);
    }

    pub fn fail_next_delete(&self, err: ApiError) {
        self.state.lock().unwrap().delete_failure = Some(err);
    }

    pub fn writes(&self) -> Writes {
        self.state.lock().unwrap().writes
    }

    pub fn brokers(&self) -> Vec<BrokerRegistration> {
        self.state.lock().unwrap().brokers.clone()
    }

    pub fn plans_of(&self, label: &str) -> Option<Vec<CatalogPlan>> {
        self.state
            .lock()
            .unwrap()
            .services
            .iter()
            .find(|(s, _)| s.label == label)
            .map(|(_, plans)| plans.clone())
    }

    fn take_delete_failure(&self) -> Result<(), ApiError> {
        match self.state.lock().unwrap().delete_failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ControlPlane for MemoryControlPlane {
    async fn service_broker_by_name(
        &self,
        name: &str,
    ) -> Result<Option<BrokerRegistration>, ApiError> {
        let mut state = self.state.lock().unwrap();
        if state.hidden_lookups > 0 {
            state.hidden_lookups -= 1;
            return Ok(None);
        }
        Ok(state.brokers.iter().find(|b| b.name == name).cloned())
    }

    async fn create_service_broker(
        &self,
        spec: &BrokerSpec,
    ) -> Result<BrokerRegistration, ApiError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.create_failure.take() {
            return Err(err);
        }
        if state.brokers.iter().any(|b| b.name == spec.name) {
            return Err(ApiError::from_response(
                StatusCode::BAD_REQUEST,
                crate::error::CODE_BROKER_NAME_TAKEN,
                format!("The service broker name is taken: {}", spec.name),
            ));
        }
        if state.brokers.iter().any(|b| b.broker_url == spec.url) {
            return Err(ApiError::from_response(
                StatusCode::BAD_REQUEST,
                crate::error::CODE_BROKER_URL_TAKEN,
                format!("The service broker url is taken: {}", spec.url),
            ));
        }
        let reg = BrokerRegistration {
            guid: uuid::Uuid::new_v4().to_string(),
            name: spec.name.clone(),
            broker_url: spec.url.clone(),
            auth_username: spec.credentials.username.clone(),
            auth_password: Some(spec.credentials.password.clone()),
        };
        state.brokers.push(reg.clone());
        state.writes.broker_creates += 1;
        Ok(reg)
    }

    async fn update_service_broker(
        &self,
        guid: &str,
        spec: &BrokerSpec,
    ) -> Result<BrokerRegistration, ApiError> {
        let mut state = self.state.lock().unwrap();
        let broker = state
            .brokers
            .iter_mut()
            .find(|b| b.guid == guid)
            .ok_or_else(|| not_found("service broker", guid))?;
        broker.broker_url = spec.url.clone();
        broker.auth_username = spec.credentials.username.clone();
        broker.auth_password = Some(spec.credentials.password.clone());
        let updated = broker.clone();
        state.writes.broker_updates += 1;
        Ok(updated)
    }

    async fn delete_service_broker(&self, guid: &str) -> Result<(), ApiError> {
        self.take_delete_failure()?;
        let mut state = self.state.lock().unwrap();
        let before = state.brokers.len();
        state.brokers.retain(|b| b.guid != guid);
        if state.brokers.len() == before {
            return Err(not_found("service broker", guid));
        }
        state.writes.broker_deletes += 1;
        Ok(())
    }

    async fn services(&self) -> Result<Vec<CatalogService>, ApiError> {
        let state = self.state.lock().unwrap();
        Ok(state.services.iter().map(|(s, _)| s.clone()).collect())
    }

    async fn delete_service(&self, guid: &str, purge: bool) -> Result<(), ApiError> {
        self.take_delete_failure()?;
        let mut state = self.state.lock().unwrap();
        let idx = state
            .services
            .iter()
            .position(|(s, _)| s.guid == guid)
            .ok_or_else(|| not_found("service", guid))?;
        if !purge && !state.services[idx].1.is_empty() {
            return Err(ApiError::from_response(
                StatusCode::BAD_REQUEST,
                crate::error::CODE_ASSOCIATION_NOT_EMPTY,
                "Please delete the service_plans associations for your services.".into(),
            ));
        }
        let (_, plans) = state.services.remove(idx);
        state
            .instances
            .retain(|(plan, _)| !plans.iter().any(|p| &p.guid == plan));
        state.writes.service_deletes += 1;
        Ok(())
    }

    async fn service_plans(&self, service_guid: &str) -> Result<Vec<CatalogPlan>, ApiError> {
        let state = self.state.lock().unwrap();
        state
            .services
            .iter()
            .find(|(s, _)| s.guid == service_guid)
            .map(|(_, plans)| plans.clone())
            .ok_or_else(|| not_found("service", service_guid))
    }

    async fn update_service_plan(&self, guid: &str, public: bool) -> Result<CatalogPlan, ApiError> {
        let mut state = self.state.lock().unwrap();
        let plan = state
            .services
            .iter_mut()
            .flat_map(|(_, plans)| plans.iter_mut())
            .find(|p| p.guid == guid)
            .ok_or_else(|| not_found("service plan", guid))?;
        plan.public = public;
        let updated = plan.clone();
        state.writes.plan_updates += 1;
        Ok(updated)
    }

    async fn delete_service_plan(&self, guid: &str) -> Result<(), ApiError> {
        self.take_delete_failure()?;
        let mut state = self.state.lock().unwrap();
        if state.instances.iter().any(|(plan, _)| plan == guid) {
            return Err(ApiError::from_response(
                StatusCode::BAD_REQUEST,
                crate::error::CODE_ASSOCIATION_NOT_EMPTY,
                "Please delete the service_instances associations for your service_plans.".into(),
            ));
        }
        let mut removed = false;
        for (_, plans) in state.services.iter_mut() {
            let before = plans.len();
            plans.retain(|p| p.guid != guid);
            removed |= plans.len() != before;
        }
        if !removed {
            return Err(not_found("service plan", guid));
        }
        state.writes.plan_deletes += 1;
        Ok(())
    }
}

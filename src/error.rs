use reqwest::StatusCode;
use thiserror::Error;

/// Cloud Controller error code for `ServiceBrokerNameTaken`.
pub const CODE_BROKER_NAME_TAKEN: i64 = 270002;
/// Cloud Controller error code for `ServiceBrokerUrlTaken`.
pub const CODE_BROKER_URL_TAKEN: i64 = 270003;
/// Cloud Controller error code for `AssociationNotEmpty`.
pub const CODE_ASSOCIATION_NOT_EMPTY: i64 = 10006;

/// Failures reported by the control plane.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Service broker name is taken: {0}")]
    NameConflict(String),

    #[error("Service broker url is taken: {0}")]
    UrlConflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Resource still has dependents: {0}")]
    AssociationNotEmpty(String),

    #[error("Control plane rejected request (HTTP {status}, code {code}): {description}")]
    Rejected {
        status: StatusCode,
        code: i64,
        description: String,
    },

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response from control plane: {0}")]
    Decode(String),

    #[error("Login failed: {0}")]
    Login(String),
}

impl ApiError {
    /// Map a Cloud Controller error body onto the closed error set.
    pub fn from_response(status: StatusCode, code: i64, description: String) -> Self {
        match (status, code) {
            (_, CODE_BROKER_NAME_TAKEN) => Self::NameConflict(description),
            (_, CODE_BROKER_URL_TAKEN) => Self::UrlConflict(description),
            (_, CODE_ASSOCIATION_NOT_EMPTY) => Self::AssociationNotEmpty(description),
            (StatusCode::NOT_FOUND, _) => Self::NotFound(description),
            _ => Self::Rejected {
                status,
                code,
                description,
            },
        }
    }

    /// Conflicts on create that are converged by updating the existing broker.
    pub fn is_recoverable_conflict(&self) -> bool {
        matches!(self, Self::NameConflict(_) | Self::UrlConflict(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_association_not_empty(&self) -> bool {
        matches!(self, Self::AssociationNotEmpty(_))
    }
}

/// Failures fetching `/v2/catalog` from the broker itself.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Catalog request returned HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Malformed catalog: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum RegistrarError {
    #[error(transparent)]
    ControlPlane(#[from] ApiError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

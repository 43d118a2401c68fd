use std::time::Duration;

pub const USER_AGENT: &str = concat!("broker-registrar/", env!("CARGO_PKG_VERSION"));

/// UAA client used by the cf CLI for password grants. It has no secret.
pub const UAA_CLIENT_ID: &str = "cf";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where and as whom to talk to the control plane.
#[derive(Clone)]
pub struct ControlPlaneTarget {
    pub address: String,
    pub username: String,
    pub password: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for ControlPlaneTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlPlaneTarget")
            .field("address", &self.address)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

pub fn http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}

pub mod delete;
pub mod register;

use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::broker::catalog::HttpCatalog;
use crate::broker::{BrokerCredentials, BrokerSpec};
use crate::config::{self, ControlPlaneTarget, DEFAULT_TIMEOUT_SECS};
use crate::controller::cloud_controller::CloudControllerClient;

#[derive(Parser)]
#[command(
    name = "broker-registrar",
    version,
    about = "Register a service broker with Cloud Foundry and make its plans public"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// Register or update the broker and make its catalog plans public
    Register(BrokerArgs),
    /// Purge the broker's services and plans, then remove the broker
    Delete(BrokerArgs),
}

#[derive(Args)]
pub struct BrokerArgs {
    /// Cloud Controller API address, e.g. https://api.example.com
    #[arg(long, env = "CF_ADDRESS", value_name = "URL")]
    pub cf_address: String,
    /// Cloud Foundry admin username
    #[arg(long, env = "CF_USERNAME", value_name = "CF username")]
    pub cf_username: String,
    /// Cloud Foundry admin password
    #[arg(long, env = "CF_PASSWORD", value_name = "CF password", hide_env_values = true)]
    pub cf_password: String,
    /// Name the broker is registered under
    #[arg(long, env = "BROKER_NAME", value_name = "broker name")]
    pub broker_name: String,
    /// Base URL of the broker
    #[arg(long, env = "BROKER_URL", value_name = "broker URL")]
    pub broker_url: String,
    /// Basic auth username for the broker
    #[arg(long, env = "BROKER_USERNAME", value_name = "broker username")]
    pub broker_username: String,
    /// Basic auth password for the broker
    #[arg(
        long,
        env = "BROKER_PASSWORD",
        value_name = "broker password",
        hide_env_values = true
    )]
    pub broker_password: String,
    /// Per-request HTTP timeout in seconds
    #[arg(long, env = "BROKER_REGISTRAR_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
    /// Summary output format
    #[arg(long, default_value = "terminal", value_parser = ["terminal", "json"])]
    pub format: String,
}

impl BrokerArgs {
    pub fn control_plane(&self) -> ControlPlaneTarget {
        ControlPlaneTarget {
            address: self.cf_address.clone(),
            username: self.cf_username.clone(),
            password: self.cf_password.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    pub fn broker_spec(&self) -> BrokerSpec {
        BrokerSpec {
            name: self.broker_name.clone(),
            url: self.broker_url.clone(),
            credentials: BrokerCredentials::new(&self.broker_username, &self.broker_password),
        }
    }
}

/// Log in to the control plane and build the catalog client sharing its
/// HTTP connection pool.
pub async fn connect(args: &BrokerArgs) -> anyhow::Result<(CloudControllerClient, HttpCatalog)> {
    let target = args.control_plane();
    let http = config::http_client(target.timeout)?;
    let cc = CloudControllerClient::login(http.clone(), &target).await?;
    Ok((cc, HttpCatalog::new(http)))
}

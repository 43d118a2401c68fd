pub mod terminal;

use serde::Serialize;

use crate::registrar::{PurgeReport, RegisterOutcome};

pub enum ReportFormat {
    Terminal,
    Json,
}

impl ReportFormat {
    pub fn parse(format: &str) -> Self {
        match format {
            "json" => Self::Json,
            _ => Self::Terminal,
        }
    }
}

/// What a single `register` or `delete` run did.
#[derive(Debug, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Report {
    Register {
        broker: String,
        #[serde(flatten)]
        outcome: RegisterOutcome,
    },
    Delete {
        broker: String,
        #[serde(flatten)]
        purge: PurgeReport,
    },
}

impl Report {
    pub fn render(&self, format: ReportFormat) -> anyhow::Result<String> {
        match format {
            ReportFormat::Terminal => terminal::render(self),
            ReportFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(self)?)),
        }
    }
}

use comfy_table::{Cell, Table};

use super::Report;

pub fn render(report: &Report) -> anyhow::Result<String> {
    let mut output = String::new();

    match report {
        Report::Register { broker, outcome } => {
            output.push_str(&format!(
                "Service broker {broker} registered at {} (guid {})\n",
                outcome.registration.broker_url, outcome.registration.guid
            ));

            let plans = &outcome.visibility.plans;
            if plans.is_empty() {
                output.push_str("No catalog services found for this broker.\n");
                return Ok(output);
            }

            let mut table = Table::new();
            table.set_header(vec!["Service", "Plan", "Visibility"]);
            for p in plans {
                table.add_row(vec![
                    Cell::new(&p.service),
                    Cell::new(&p.plan),
                    Cell::new(if p.changed {
                        "made public"
                    } else {
                        "already public"
                    }),
                ]);
            }
            output.push_str(&table.to_string());
            output.push('\n');
            output.push_str(&format!(
                "{} plan(s) made public, {} already public\n",
                outcome.visibility.changed(),
                plans.len() - outcome.visibility.changed()
            ));
        }
        Report::Delete { broker, purge } => {
            if !purge.services.is_empty() {
                let mut table = Table::new();
                table.set_header(vec!["Purged service"]);
                for s in &purge.services {
                    table.add_row(vec![Cell::new(s)]);
                }
                output.push_str(&table.to_string());
                output.push('\n');
                output.push_str(&format!(
                    "{} service(s) and {} plan(s) removed\n",
                    purge.services.len(),
                    purge.plans_deleted
                ));
            }

            if purge.broker_existed {
                output.push_str(&format!("Deleted service broker {broker}\n"));
            } else {
                output.push_str(&format!("Service broker {broker} does not exist.\n"));
            }
        }
    }

    Ok(output)
}

use super::{BrokerArgs, connect};
use crate::registrar::Registrar;
use crate::report::{Report, ReportFormat};

pub async fn register(args: &BrokerArgs) -> anyhow::Result<()> {
    let (control_plane, catalog) = connect(args).await?;
    let registrar = Registrar::new(&control_plane, &catalog);
    let spec = args.broker_spec();

    let outcome = registrar.register_and_publish(&spec).await?;

    let report = Report::Register {
        broker: spec.name,
        outcome,
    };
    print!("{}", report.render(ReportFormat::parse(&args.format))?);
    Ok(())
}

use super::{BrokerArgs, connect};
use crate::registrar::Registrar;
use crate::report::{Report, ReportFormat};

pub async fn delete(args: &BrokerArgs) -> anyhow::Result<()> {
    let (control_plane, catalog) = connect(args).await?;
    let registrar = Registrar::new(&control_plane, &catalog);
    let spec = args.broker_spec();

    let purge = registrar.purge(&spec).await?;

    let report = Report::Delete {
        broker: spec.name,
        purge,
    };
    print!("{}", report.render(ReportFormat::parse(&args.format))?);
    Ok(())
}

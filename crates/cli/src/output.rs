use crate::error::CliError;
use engine_config::report::summary::SummaryReport;
use std::path::Path;

pub async fn write_report(report: &SummaryReport, path: &Path) -> Result<(), CliError> {
    let report_json = report.to_json()?;
    tokio::fs::write(path, report_json).await?;
    Ok(())
}

pub async fn print_report(report: &SummaryReport) -> Result<(), CliError> {
    let report_json = report.to_json()?;
    println!("{report_json}");
    Ok(())
}

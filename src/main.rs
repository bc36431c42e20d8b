use wacfolio::{config::Config, AppError, CsvDataSource, PortfolioReporter};

fn main() {
    // Initialize tracing; stdout carries the report.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    if let Err(e) = run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let config = Config::from_env()?;

    let source = CsvDataSource::new(config.data_dir.clone());
    let reporter = PortfolioReporter::new(config.oversell_policy);
    tracing::info!(
        data_dir = %config.data_dir.display(),
        oversell_policy = ?config.oversell_policy,
        "Loading portfolio"
    );
    let report = reporter.build_report(&source)?;

    let json = if config.report_pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", json);
    Ok(())
}

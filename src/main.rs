mod cli;

use ed5decode::batch::{Batch, ExportRequest};
use ed5decode::config;
use ed5decode::export::{EdlDialect, EdlOptions, OutputTarget};

use anyhow::Result;
use clap::Parser;
use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load_config_or_default(cli.config.as_deref())?;

    // RUST_LOG wins, then --debug, then the config file
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.debug && config.decode.trace_bytes {
            "ed5decode=trace,ed5_format=trace,ed5_common=debug".to_string()
        } else if cli.debug {
            "ed5decode=debug,ed5_format=debug,ed5_common=debug".to_string()
        } else {
            config.logging.filter.clone()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    let request = ExportRequest {
        edl: cli.edl.as_deref().map(OutputTarget::parse),
        mlt: cli.mlt.as_deref().map(OutputTarget::parse),
        fcpxml: cli.fcpxml.as_deref().map(OutputTarget::parse),
        edl_options: EdlOptions {
            dialect: if cli.gvg_edl {
                EdlDialect::Gvg
            } else {
                EdlDialect::Cmx3600
            },
            clipnames: cli.clipnames,
            skip_black: cli.skip_black,
        },
        dump: cli.dump,
    };

    let mut batch = Batch::from_config(request, &config);
    let report = batch.run(&cli.files);
    batch.finish()?;

    tracing::debug!(
        processed = report.processed,
        failed = report.failed,
        "batch finished"
    );
    if report.failed > 0 {
        anyhow::bail!("{} of {} inputs failed", report.failed, report.processed + report.failed);
    }

    Ok(())
}

use {
    crate::{
        config::Configuration,
        dump::format_user_logins,
        error::LoginEtlError,
        pipeline::{Pipeline, PipelineOptions, RunReport},
        sink::PostgresSink,
        source::SqsMessageSource,
    },
    tracing::{error, info},
};

pub mod config;
pub mod dump;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod sink;
pub mod source;
pub mod transform;

pub type Result<T> = std::result::Result<T, LoginEtlError>;

/// Exit code for runs that never reached the queue.
pub const STARTUP_FAILURE_EXIT_CODE: u8 = 3;

/// Runs the schema precondition, one fetch-and-drain pass and the table dump.
/// The store pool is closed before returning on every path.
pub async fn bootstrap(config: Configuration) -> Result<RunReport> {
    info!("Starting application");
    let sink = PostgresSink::connect(&config).await?;
    let result = run(&config, &sink).await;
    sink.close().await;
    info!("Application finished");
    result
}

async fn run(config: &Configuration, sink: &PostgresSink) -> Result<RunReport> {
    sink.ensure_schema().await?;

    let mut report = match SqsMessageSource::new(config).await {
        Ok(source) => {
            Pipeline::new(source, sink, PipelineOptions::from(config))
                .run_once()
                .await
        }
        Err(e) => {
            error!("Failed to set up queue client: {e}");
            RunReport {
                fetch_error: Some(e),
                ..Default::default()
            }
        }
    };

    if config.dump_table {
        match sink.user_logins().await {
            Ok(logins) => print!("{}", format_user_logins(&logins)),
            Err(e) => {
                error!("Failed to read user_logins: {e}");
                report.dump_failed = true;
            }
        }
    }

    info!(
        fetched = report.fetched,
        inserted = report.inserted,
        rejected = report.rejected,
        failed = report.failed(),
        skipped = report.skipped,
        ack_failed = report.ack_failed,
        fetch_failed = report.fetch_error.is_some(),
        aborted = report.aborted,
        "Run finished"
    );
    Ok(report)
}

use {
    login_etl::{config::get_configuration, STARTUP_FAILURE_EXIT_CODE},
    std::process::ExitCode,
    tracing::error,
    tracing_subscriber::fmt::format::FmtSpan,
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match get_configuration().await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::from(STARTUP_FAILURE_EXIT_CODE);
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(std::env::var("ANSI_LOGS").is_ok())
        .init();

    match login_etl::bootstrap(config).await {
        Ok(report) => ExitCode::from(report.exit_code()),
        Err(e) => {
            error!("Run aborted: {e}");
            ExitCode::from(STARTUP_FAILURE_EXIT_CODE)
        }
    }
}

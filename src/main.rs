use std::process::ExitCode;

use sheet_reader::{
    cli::{cli_adapter::CliError, service_factory::ServiceFactory},
    config::app_config::AppConfig,
};
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Registry};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(report) => {
            eprintln!("{:?}", report);
            return ExitCode::FAILURE;
        }
    };

    setup_tracing(&config);
    setup_panic_hook();
    debug!("Using configuration directory {}", config.conf_dir.display());

    let args: Vec<String> = std::env::args().collect();
    let cli_adapter = ServiceFactory::create(config);
    let mut stdout = std::io::stdout();

    match cli_adapter.run(&args, &mut stdout).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => {
            // usage text has already been printed
            if !matches!(report.current_context(), CliError::Usage) {
                error!("{:?}", report);
            }
            ExitCode::FAILURE
        }
    }
}

fn setup_tracing(config: &AppConfig) {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    Registry::default()
        .with(
            tracing_subscriber::filter::Targets::new()
                .with_target("sheet_reader", config.tracing_level()),
        )
        .with(stderr_layer)
        .init();
}

fn setup_panic_hook() {
    tracing::trace!("Setting panic hook");
    std::panic::set_hook(Box::new(|info| {
        tracing::error!("panic: {info}");
    }));
}

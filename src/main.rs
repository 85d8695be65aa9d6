//! Casemind - terminal client for high-risk claims review

use anyhow::Result;
use casemind::cli::commands;
use casemind::cli::output::Output;
use casemind::cli::Cli;
use casemind::{App, AppError, CasemindConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();
    let out = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    if let Err(e) = run(cli, &out).await {
        out.error(&e.to_string());
        if let Some(hint) = e.downcast_ref::<AppError>().and_then(AppError::hint) {
            out.error_hint(hint);
        }
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool, log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { log_level };
        EnvFilter::try_new(format!("casemind={level},casemind_core={level}"))
            .unwrap_or_else(|_| EnvFilter::new("warn"))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli, out: &Output) -> Result<()> {
    let mut config = CasemindConfig::load(cli.config.as_deref()).map_err(AppError::from)?;

    // Apply CLI overrides
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
        config.validate().map_err(AppError::from)?;
    }

    init_tracing(cli.verbose, &config.log_level);

    let Some(command) = cli.command else {
        out.banner();
        out.hint("Run `casemind --help` to see the available commands.");
        return Ok(());
    };

    let app = App::from_config(config)?;
    commands::execute(&app, out, command).await?;
    Ok(())
}

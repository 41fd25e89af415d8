use bloom_translate_spreadsheet::{AppConfig, BackendCredentials, Dispatcher, RunOptions, RunStatus};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Fills the machine-translation columns of a spreadsheet exported from Bloom.
///
/// Without --target, every column headed like [fr-x-ai-google] that still
/// has empty cells is translated from the source language column.
#[derive(Parser, Debug)]
#[command(name = "bloom-translate-spreadsheet", version, about)]
struct Cli {
    /// Spreadsheet to translate (.xlsx or .csv)
    input: PathBuf,

    /// Where to save the result
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Language and model to add or fill, e.g. fr-x-ai-google
    #[arg(long)]
    target: Option<String>,

    /// Language of the column to translate from
    #[arg(long, default_value = "en")]
    source: String,

    /// Translate columns again even when they have no empty cells
    #[arg(long)]
    retranslate: bool,

    #[arg(short, long)]
    verbose: bool,

    /// TOML file with sheet and backend settings
    #[arg(long)]
    config: Option<PathBuf>,
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            EnvFilter::from_default_env()
                .add_directive(format!("bloom_translate_spreadsheet={level}").parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;
    Ok(())
}

async fn execute(cli: Cli) -> anyhow::Result<RunStatus> {
    let config = AppConfig::load_or_default(cli.config.as_deref())?;
    tracing::debug!(sheet = %config.sheet.name, "Loaded configuration");

    let dispatcher = Dispatcher::new(&config, BackendCredentials::from_env())?;
    let options = RunOptions {
        input: cli.input,
        output: cli.output,
        target: cli.target,
        source_lang: cli.source,
        retranslate: cli.retranslate,
    };

    let report = bloom_translate_spreadsheet::run(&options, &config, &dispatcher).await?;
    for (column, reason) in &report.failed {
        tracing::error!("{column} was not translated: {reason}");
    }
    Ok(report.status())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("Failed to initialise logging: {e}");
        return ExitCode::FAILURE;
    }

    match execute(cli).await {
        Ok(RunStatus::NothingTranslated) => {
            tracing::error!("No columns were translated");
            ExitCode::from(RunStatus::NothingTranslated.exit_code())
        }
        Ok(status) => ExitCode::from(status.exit_code()),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

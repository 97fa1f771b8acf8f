use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pagesnap_engine::LoggingStageSink;
use pagesnap_logging::{snap_info, LogDestination};
use pagesnap_server::{
    build_app, build_archiver, capture_all, parse_url_list, AppState, ServerConfig,
};

/// Snapshot web pages into a browsable on-disk archive.
#[derive(Debug, Parser)]
#[command(name = "pagesnap", version)]
struct Cli {
    /// RON configuration file; built-in defaults apply when omitted.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Archive root directory (overrides the config file).
    #[arg(long, global = true, value_name = "DIR")]
    archive_root: Option<PathBuf>,

    /// Also write logs to ./pagesnap.log.
    #[arg(long, global = true)]
    log_file: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP service.
    Serve {
        /// Listen address, e.g. 127.0.0.1:3000.
        #[arg(long)]
        bind: Option<String>,
    },
    /// Capture one or more URLs and exit.
    Capture {
        /// Pages to snapshot.
        #[arg(required_unless_present = "file")]
        urls: Vec<String>,

        /// File listing one URL per line; blank lines and `#` comments are skipped.
        #[arg(long, short = 'f', value_name = "PATH")]
        file: Option<PathBuf>,

        /// Write per-URL results and the summary to this file.
        #[arg(long, short = 'o', value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = ServerConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(root) = cli.archive_root {
        config.archive_root = root;
    }
    if let Command::Serve { bind: Some(bind) } = &cli.command {
        config.bind = bind.clone();
    }
    config.validate().context("Invalid configuration")?;

    let destination = if cli.log_file {
        LogDestination::Both
    } else {
        LogDestination::Terminal
    };
    pagesnap_logging::initialize(destination, config.level_filter());

    match cli.command {
        Command::Serve { .. } => serve(config).await,
        Command::Capture { urls, file, output } => {
            capture(config, urls, file.as_deref(), output.as_deref()).await
        }
    }
}

async fn serve(config: ServerConfig) -> Result<ExitCode> {
    let bind = config.bind.clone();
    snap_info!("archive root: {}", config.archive_root.display());
    let app = build_app(AppState::from_config(config));

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind to {bind}"))?;
    snap_info!("pagesnap listening on http://{}", bind);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(ExitCode::SUCCESS)
}

async fn capture(
    config: ServerConfig,
    mut urls: Vec<String>,
    list: Option<&Path>,
    output: Option<&Path>,
) -> Result<ExitCode> {
    if let Some(list) = list {
        let text = std::fs::read_to_string(list)
            .with_context(|| format!("Failed to read URL list {}", list.display()))?;
        urls.extend(parse_url_list(&text));
    }
    if urls.is_empty() {
        eprintln!("No URLs to capture");
        return Ok(ExitCode::FAILURE);
    }

    let archiver = build_archiver(&config);
    let report = capture_all(&archiver, &urls, &LoggingStageSink).await;

    for item in &report.items {
        match &item.outcome {
            Ok(stored) => {
                println!("Captured: {} ({})", stored.title, item.url);
                println!("  key:    {}", stored.key);
                println!("  full:   {}", stored.paths.full.display());
                println!("  simple: {}", stored.paths.simple.display());
                println!("  info:   {}", stored.paths.info.display());
            }
            Err(err) => eprintln!("Capture of {} failed: {err}", item.url),
        }
    }
    if report.items.len() > 1 {
        print!("{}", report.summary());
    }
    if let Some(output) = output {
        report
            .write_to(output)
            .with_context(|| format!("Failed to write results to {}", output.display()))?;
        println!("Results written to {}", output.display());
    }

    Ok(if report.any_succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use fogbugz::config::URL_ENV;
use fogbugz::{Attachment, ClientConfig, ConfigError, FogBugz, FogBugzError};
use thiserror::Error;
use tracing::{debug, warn};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Run a FogBugz API command and print the XML response.
///
/// Unset options fall back to FOGBUGZ_URL, FOGBUGZ_TOKEN and
/// FOGBUGZ_TIMEOUT_SECS.
///
/// Examples:
///   fogbugz --url https://example.fogbugz.com --email me@example.com --password pw listProjects
///   fogbugz --token abc123 search q=assignedto:me cols=sTitle,ixBug
///   fogbugz --token abc123 --file crash.log new sTitle="Crash on save" ixProject=2
#[derive(Debug, Parser)]
#[command(name = "fogbugz")]
#[command(version)]
#[command(about = "Run a FogBugz API command and print the XML response")]
struct Cli {
    /// Base URL of the FogBugz installation [env: FOGBUGZ_URL].
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Token from an earlier logon [env: FOGBUGZ_TOKEN].
    #[arg(long, value_name = "TOKEN")]
    token: Option<String>,

    /// Email to log on with (requires --password).
    #[arg(long, requires = "password")]
    email: Option<String>,

    /// Password to log on with.
    #[arg(long, requires = "email")]
    password: Option<String>,

    /// Attach a file; may be repeated.
    #[arg(long = "file", value_name = "PATH")]
    files: Vec<PathBuf>,

    /// Whole-request timeout in seconds [env: FOGBUGZ_TIMEOUT_SECS].
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Log off after the command.
    #[arg(long)]
    logoff: bool,

    /// Log requests at debug level (ignored when RUST_LOG is set).
    #[arg(short, long)]
    verbose: bool,

    /// Command name, e.g. `search` or `listProjects`.
    #[arg(value_name = "COMMAND")]
    command: String,

    /// Command fields as NAME=VALUE.
    #[arg(value_name = "NAME=VALUE", value_parser = parse_field)]
    fields: Vec<(String, String)>,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    FogBugz(#[from] FogBugzError),

    #[error("no FogBugz URL: pass --url or set {}", URL_ENV)]
    MissingUrl,

    #[error(transparent)]
    Config(ConfigError),

    #[error("failed to read attachment {path}: {source}")]
    Attachment {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::MissingVar { name } if name == URL_ENV => Self::MissingUrl,
            other => Self::Config(other),
        }
    }
}

/// Parses a `NAME=VALUE` argument; the value may itself contain `=`.
fn parse_field(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    if name.is_empty() {
        return Err(format!("missing field name in '{raw}'"));
    }
    Ok((name.to_string(), value.to_string()))
}

/// Layers the command-line options over the `FOGBUGZ_*` environment.
fn resolve_config(
    url: Option<String>,
    token: Option<String>,
    timeout: Option<u64>,
) -> Result<ClientConfig, ConfigError> {
    let mut config = ClientConfig::from_env_with_base(url)?;
    if let Some(token) = token {
        config.token = Some(token.into());
    }
    if let Some(secs) = timeout {
        config.timeout = Some(Duration::from_secs(secs));
    }
    Ok(config)
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "warn,fogbugz=debug" } else { "warn" })
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = resolve_config(cli.url, cli.token, cli.timeout)?;

    let mut files = Vec::with_capacity(cli.files.len());
    for path in &cli.files {
        let attachment = Attachment::from_path(path)
            .await
            .map_err(|source| CliError::Attachment {
                path: path.clone(),
                source,
            })?;
        files.push(attachment);
    }

    let mut client = FogBugz::from_config(config).connect().await?;
    debug!(endpoint = %client.endpoint(), "connected");

    if let (Some(email), Some(password)) = (&cli.email, &cli.password) {
        client.logon(email, password).await?;
    }

    let outcome = client.invoke(&cli.command, cli.fields, files).await;
    if let Ok(response) = &outcome {
        println!("{response}");
    }

    let logoff = if cli.logoff {
        client.logoff().await
    } else {
        Ok(())
    };
    if let (Err(_), Err(err)) = (&outcome, &logoff) {
        warn!(error = %err, "logoff after failed command also failed");
    }

    outcome?;
    logoff?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

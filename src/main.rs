use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, info};
use verbind::config::{CliOverrides, Config};
use verbind::logging::init_logging;
use verbind::{ProbeError, VersionProbe};

const RST: &str = "\x1b[0m";
const GB: &str = "\x1b[1;32m";
const RB: &str = "\x1b[1;31m";

#[derive(Parser)]
#[command(name = "verbind")]
#[command(about = "Retrieve the version of a name server through version.bind")]
#[command(version)]
struct Cli {
    /// Name servers to query (hostname or address)
    #[arg(required = true)]
    hosts: Vec<String>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<String>,

    /// Seconds to wait for a reply
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Destination port
    #[arg(short, long)]
    port: Option<u16>,

    /// Randomize the transaction ID
    #[arg(long)]
    random_id: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Log level
    #[arg(long)]
    log_level: Option<String>,

    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<String>,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            timeout_secs: self.timeout,
            port: self.port,
            random_id: self.random_id.then_some(true),
            color: self.no_color.then_some(false),
            log_level: self.log_level.clone(),
            log_file: self.log_file.clone(),
        }
    }
}

struct Painter {
    color: bool,
}

impl Painter {
    fn good(&self, text: &str) -> String {
        self.paint(GB, text)
    }

    fn bad(&self, text: &str) -> String {
        self.paint(RB, text)
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("{}{}{}", code, text, RST)
        } else {
            text.to_string()
        }
    }
}

fn describe(err: &ProbeError) -> String {
    match err {
        ProbeError::ConnectionRefused(_) => "connection refused (bad address?).".to_string(),
        ProbeError::TimedOut(_) => "connection timed out.".to_string(),
        ProbeError::Transport(e) => format!("{}.", e),
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(config_file) => Config::load_from_file(config_file)?,
        None => Config::try_load_default()?,
    };
    config.apply_cli_overrides(&cli.overrides());
    config.validate()?;

    let _log_guard = init_logging(&config.log_level, config.log_file.as_deref())?;
    info!("verbind {}", env!("CARGO_PKG_VERSION"));
    config.display();

    let painter = Painter {
        color: config.color,
    };
    let probe = VersionProbe::from_config(&config);
    let mut failures = 0usize;

    for host in &cli.hosts {
        println!(
            "{} Requesting for version.bind to address: {}",
            painter.good(">"),
            painter.good(host)
        );

        match probe.query(host).await {
            Ok(version) => {
                println!(
                    "{} Bind version found: {}",
                    painter.good("+"),
                    painter.good(&version)
                );
            }
            Err(e) => {
                debug!("{}: {:?}", host, e);
                failures += 1;
                println!("{} {}", painter.bad("- error:"), describe(&e));
            }
        }
    }

    Ok(if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

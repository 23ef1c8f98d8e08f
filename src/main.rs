use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use site_staff_diff::config::{Config, ConfigOverrides};
use site_staff_diff::output::{Language, ReportStyle};
use site_staff_diff::prompt::run_interactive;
use site_staff_diff::scanner::scan_sheet;
use site_staff_diff::server::run_server;
use site_staff_diff::workbook::Workbook;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "site-staff-diff",
    about = "Who joined or left the study team since the last monitoring visit"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, clap::Args, Clone, Default)]
struct HeaderArgs {
    #[arg(long = "start-header")]
    start: Option<String>,
    #[arg(long = "end-header")]
    end: Option<String>,
    #[arg(long = "participant-header")]
    participant: Option<String>,
    #[arg(long = "function-header")]
    function: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print joiners and leavers after the given visit date
    Report {
        file: PathBuf,
        /// Date of the last monitoring visit or initiation, DD.MM.YYYY
        #[arg(long)]
        since: String,
        #[arg(long)]
        sheet: Option<String>,
        #[command(flatten)]
        headers: HeaderArgs,
        #[arg(long)]
        style: Option<ReportStyle>,
        #[arg(long)]
        language: Option<Language>,
    },
    /// List the sheets of a workbook
    Sheets { file: PathBuf },
    /// Ask for file, sheet, columns and date on the terminal
    Interactive,
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;

    match cli.command {
        Commands::Report {
            file,
            since,
            sheet,
            headers,
            style,
            language,
        } => {
            config.apply_overrides(ConfigOverrides {
                start_header: headers.start,
                end_header: headers.end,
                participant_header: headers.participant,
                function_header: headers.function,
                style,
                language,
            });
            let mut workbook = Workbook::open(&file)?;
            let sheet = workbook.sheet(sheet.as_deref())?;
            info!("scanning sheet '{}' of {}", sheet.name, file.display());
            let outcome = scan_sheet(
                &sheet,
                since.trim(),
                &config.header_spec(),
                &config.report_options(),
            )?;
            println!("{}", outcome.report);
        }
        Commands::Sheets { file } => {
            let workbook = Workbook::open(&file)?;
            for (idx, name) in workbook.sheet_names().iter().enumerate() {
                println!("{}: {name}", idx + 1);
            }
        }
        Commands::Interactive => run_interactive(&config)?,
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let bind = format!("{host}:{port}");
            let addr: SocketAddr = bind
                .parse()
                .map_err(|e| anyhow!("invalid bind address {bind}: {e}"))?;
            run_server(config, addr).await?;
        }
        Commands::Config { init, show } => {
            if init {
                Config::write_template(&config_path)?;
                println!("Wrote config template to {}", config_path.display());
                config = Config::load(Some(&config_path))?;
            }
            if show || !init {
                print!("{}", toml::to_string_pretty(&config)?);
            }
        }
    }

    Ok(())
}

//! # Content Deployer CLI (`cdeploy`)
//!
//! ## Usage
//!
//! ```bash
//! cdeploy --config ./config/deploy.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `cdeploy run` | Run the mode named in the config (`deploy` or `fetch_details`) |
//! | `cdeploy deploy` | Export the source folder and import every requested item |
//! | `cdeploy fetch-details` | Write folder, dashboard and look tables per environment |
//! | `cdeploy check` | Validate the config and authorize against both environments |
//! | `cdeploy ini` | Write the credentials file for the content tool |
//!
//! ## Exit codes
//!
//! `0` on success, `1` when a precondition of the run is not met (invalid
//! config, failed authorization, unknown source folder, failed export), `2`
//! on any other error.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use content_deployer::api::HttpContentApi;
use content_deployer::config::{self, Config, Mode};
use content_deployer::content_tool::LdeployTool;
use content_deployer::credentials;
use content_deployer::deploy;
use content_deployer::deploy_log::DeployLog;
use content_deployer::error::{exit_code_for, DeployError};
use content_deployer::fetch;
use content_deployer::models::DeployStatus;
use content_deployer::preconditions;
use content_deployer::progress::{DeployProgressReporter, ProgressMode};

/// Content Deployer: migrate folders, dashboards and looks between two
/// reporting environments.
#[derive(Parser)]
#[command(
    name = "cdeploy",
    about = "Migrate BI folders, dashboards and looks between two reporting environments",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/deploy.toml")]
    config: PathBuf,

    /// Enable debug logging.
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Progress output on stderr. Defaults to `human` on a TTY, `off` otherwise.
    #[arg(long, global = true, value_enum)]
    progress: Option<ProgressMode>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the mode configured in the config file.
    Run,

    /// Export the source folder and import each requested item.
    ///
    /// Writes `deploy_log.csv` with one row per requested value.
    Deploy,

    /// Resolve hierarchy and content of every configured environment.
    ///
    /// Writes `<env>_folders.csv`, `<env>_dashboards.csv` and `<env>_looks.csv`.
    FetchDetails,

    /// Validate the configuration and authorize without exporting anything.
    Check,

    /// Write the credentials file used by the content tool.
    Ini,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let cfg = match config::load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            init_logging(cli.verbose);
            let err = anyhow::Error::from(DeployError::Config(format!("{:#}", e)));
            return report_failure(&err);
        }
    };
    init_logging(cli.verbose || cfg.debug);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting cdeploy");

    let progress = cli
        .progress
        .unwrap_or_else(ProgressMode::default_for_tty)
        .reporter();

    match run(cli.command, &cfg, progress.as_ref()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report_failure(&e),
    }
}

fn init_logging(debug: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if debug {
            "content_deployer=debug,cdeploy=debug"
        } else {
            "content_deployer=info,cdeploy=info"
        })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn report_failure(err: &anyhow::Error) -> ExitCode {
    eprintln!("Error: {:#}", err);
    ExitCode::from(exit_code_for(err))
}

async fn run(
    command: Commands,
    cfg: &Config,
    progress: &dyn DeployProgressReporter,
) -> anyhow::Result<()> {
    let mode = match command {
        Commands::Run => cfg.mode,
        Commands::Deploy => Mode::Deploy,
        Commands::FetchDetails => Mode::FetchDetails,
        Commands::Check => return check(cfg, progress).await,
        Commands::Ini => {
            credentials::write_ini(cfg)?;
            println!("Wrote {}", cfg.paths.ini_file.display());
            return Ok(());
        }
    };

    let api = HttpContentApi::new(cfg.http.timeout_secs)?;
    match mode {
        Mode::Deploy => {
            let tool = LdeployTool::new(cfg.tool.program.clone());
            let log = deploy::run_deploy(cfg, &api, &tool, progress).await?;
            print_log(&log);
        }
        Mode::FetchDetails => {
            let environments = fetch::run_fetch_details(cfg, &api, progress).await?;
            for env in &environments {
                println!(
                    "{:<6} {:>6} folders {:>6} dashboards {:>6} looks",
                    env.env,
                    env.folders.len(),
                    env.dashboards.len(),
                    env.looks.len()
                );
            }
            println!("Tables written to {}", cfg.paths.output_dir.display());
        }
    }
    Ok(())
}

async fn check(cfg: &Config, progress: &dyn DeployProgressReporter) -> anyhow::Result<()> {
    let api = HttpContentApi::new(cfg.http.timeout_secs)?;
    match cfg.mode {
        Mode::Deploy => {
            let tool = LdeployTool::new(cfg.tool.program.clone());
            let plan = deploy::run_check(cfg, &api, &tool, progress).await?;
            println!(
                "ok: {} {} item(s) from folder {} to folder {}",
                plan.values.len(),
                plan.kind,
                plan.source_folder_id,
                plan.target_folder
            );
        }
        Mode::FetchDetails => {
            preconditions::validate(cfg, Mode::FetchDetails)?;
            for env in cfg.configured_environments() {
                fetch::authorize(&api, cfg, env).await?;
                println!("ok: {}", env);
            }
        }
    }
    Ok(())
}

fn print_log(log: &DeployLog) {
    println!("{:<10} {:<11} {:<40} ISSUE", "STATUS", "TYPE", "VALUE");
    for o in log.outcomes() {
        println!(
            "{:<10} {:<11} {:<40} {}",
            o.status, o.kind, o.requested_value, o.issue
        );
    }
    println!(
        "deployed: {}  failed: {}",
        log.count(DeployStatus::Deployed),
        log.count(DeployStatus::Failed)
    );
}

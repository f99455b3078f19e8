use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tokio::signal::unix::{signal, SignalKind};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use notification_agent::app::{agent, Config};
use notification_agent::control::{self, Command, Response};
use notification_agent::ingest;
use notification_agent::render::{Palette, StatusBarFormatter, Xrdb};
use notification_agent::store::NotificationStore;

/// Notification Agent - relays desktop notifications to a status bar
#[derive(Parser)]
#[command(name = "notification-agent")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short, long)]
    log_level: Option<String>,

    /// Config file (defaults to ~/.config/notification-agent/config.toml)
    #[arg(short, long, env = "NOTIFICATION_AGENT_CONFIG")]
    config: Option<PathBuf>,

    /// Control socket path; overrides the config file
    #[arg(short, long)]
    socket: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the agent (default)
    Daemon,
    /// Remove one notification
    Pop,
    /// Remove all notifications
    Clear,
    /// Print the notification list as JSON
    List,
    /// Stop the running agent
    Exit,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_default(),
    };
    if let Some(socket) = cli.socket {
        config.socket_path = socket;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    match cli.command {
        Some(Commands::Pop) => run_client(&config, Command::Pop),
        Some(Commands::Clear) => run_client(&config, Command::Clear),
        Some(Commands::List) => run_client(&config, Command::GetList),
        Some(Commands::Exit) => run_client(&config, Command::Exit),
        Some(Commands::Daemon) | None => {
            init_logging(&config.log_level)?;
            run_daemon(config)
        }
    }
}

fn run_client(config: &Config, command: Command) -> Result<()> {
    let response = control::send_command(&config.socket_path, command)?;
    println!("{}", response);
    if Response::is_error(&response) {
        anyhow::bail!("Agent rejected {}", command.as_str());
    }
    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let log_dir = directories::ProjectDirs::from("", "", "notification-agent")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join("notification-agent"));

    std::fs::create_dir_all(&log_dir)?;
    let log_file = std::fs::File::create(log_dir.join("notification-agent.log"))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries the status line, so logs go to a file
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(log_file),
        )
        .init();

    info!("Notification agent starting");
    Ok(())
}

fn run_daemon(config: Config) -> Result<()> {
    let palette = Palette::resolve(&config.render.theme, &Xrdb);
    let formatter = StatusBarFormatter::new(
        palette,
        config.render.separator_glyph.clone(),
        config.render.max_entry_chars,
    );

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(run_agent(&config, formatter));

    if let Err(e) = &result {
        tracing::error!("Fatal: {:#}", e);
    }

    // Don't wait on a stalled stdout
    runtime.shutdown_timeout(Duration::from_millis(200));
    result
}

async fn run_agent(config: &Config, formatter: StatusBarFormatter) -> Result<()> {
    let listener = control::bind(&config.socket_path)?;
    info!("Control server listening at: {}", config.socket_path.display());

    let bus = match ingest::connect_monitor().await {
        Ok(bus) => bus,
        Err(e) => {
            remove_socket(config);
            return Err(e);
        }
    };

    let result = agent::run(
        NotificationStore::new(),
        listener,
        bus,
        config.server_options(),
        formatter,
        tokio::io::stdout(),
        wait_for_signal(),
    )
    .await;

    remove_socket(config);
    result.map(|reason| info!("Stopped: {:?}", reason))
}

async fn wait_for_signal() -> Result<()> {
    let mut terminate =
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;

    tokio::select! {
        res = tokio::signal::ctrl_c() => res.context("Failed to listen for SIGINT")?,
        _ = terminate.recv() => {}
    }
    Ok(())
}

fn remove_socket(config: &Config) {
    if let Err(e) = std::fs::remove_file(&config.socket_path) {
        tracing::debug!("Failed to remove socket: {}", e);
    }
}

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use model_config::cli::{
    handle_changelog, handle_import, handle_row, handle_token_command, handle_update,
    TokenCommands, UpdateArgs,
};
use model_config::config::{ConfigPaths, Settings};
use model_config::server::{self, AppState};
use model_config::storage::open_store;

#[derive(Parser)]
#[command(
    name = "model-config",
    version,
    about = "Configuration editor for tactic/vertical/segment parameters",
    long_about = "Serves an authenticated HTTP API over a spreadsheet-backed parameter \
                  table and records every changed cell in an append-only change log. \
                  The same operations are available from the command line."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Listen address (overrides PORT / BIND_ADDR)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Bearer token commands
    #[command(subcommand)]
    Token(TokenCommands),

    /// Show the row for a tactic, vertical and segment
    Row {
        #[arg(short, long)]
        tactic: String,
        #[arg(short, long)]
        vertical: String,
        /// Segment; ALL reads the MCH row
        #[arg(short, long)]
        segment: Option<String>,
    },

    /// Update parameter values and record the changes
    Update(UpdateArgs),

    /// Show recent change log entries
    #[command(alias = "log")]
    Changelog {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Load a CSV file into a sheet
    Import {
        /// Path to CSV file (header row first)
        file: PathBuf,
        /// Target sheet (defaults to the data sheet)
        #[arg(long)]
        sheet: Option<String>,
    },

    /// Show resolved configuration and paths
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,model_config=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let paths = ConfigPaths::new()?;
    let settings = Settings::load(&paths)?;

    match cli.command {
        Some(Commands::Serve { bind }) => {
            settings.validate()?;
            let bind_addr = bind.unwrap_or_else(|| settings.bind_addr.clone());
            let store = open_store(&settings)?;
            tracing::info!(backend = %settings.backend(), "starting model-config");
            server::serve(AppState::new(settings, store), &bind_addr).await?;
        }
        Some(Commands::Token(cmd)) => {
            handle_token_command(&settings, cmd)?;
        }
        Some(Commands::Row {
            tactic,
            vertical,
            segment,
        }) => {
            let store = open_store(&settings)?;
            handle_row(
                store.as_ref(),
                &settings,
                &tactic,
                &vertical,
                segment.as_deref(),
            )
            .await?;
        }
        Some(Commands::Update(args)) => {
            let store = open_store(&settings)?;
            handle_update(store.as_ref(), &settings, args).await?;
        }
        Some(Commands::Changelog { limit }) => {
            let store = open_store(&settings)?;
            handle_changelog(store.as_ref(), &settings, limit).await?;
        }
        Some(Commands::Import { file, sheet }) => {
            let store = open_store(&settings)?;
            handle_import(store.as_ref(), &settings, &file, sheet.as_deref()).await?;
        }
        Some(Commands::Config) => {
            let set = |present: bool| if present { "(set)" } else { "(not set)" };
            println!("model-config Configuration");
            println!("==========================");
            println!("Config directory: {}", paths.base_dir().display());
            println!("Settings file:    {}", paths.settings_file().display());
            println!();
            println!("Settings:");
            println!("  Store backend:  {}", settings.backend());
            if let Some(file) = &settings.store_file {
                println!("  Store file:     {}", file.display());
            }
            println!(
                "  Spreadsheet:    {}",
                settings.spreadsheet_id.as_deref().unwrap_or("(not set)")
            );
            println!("  Data sheet:     {}", settings.sheets.data);
            println!("  Legend sheet:   {}", settings.sheets.legend);
            println!("  Log sheet:      {}", settings.sheets.log);
            println!("  Bind address:   {}", settings.bind_addr);
            println!("  Token TTL:      {}s", settings.token_ttl_secs);
            println!("  Strict count:   {}", settings.strict_row_count);
            println!("  APP_PASSWORD:   {}", set(!settings.app_password.is_empty()));
            println!("  SESSION_SECRET: {}", set(!settings.session_secret.is_empty()));
            println!(
                "  Access token:   {}",
                set(settings.google_access_token.is_some()
                    || settings.google_access_token_command.is_some())
            );
        }
        None => {
            println!("model-config - tactic/vertical/segment parameter editor");
            println!();
            println!("Run 'model-config --help' for usage information.");
            println!("Run 'model-config serve' to start the HTTP API.");
        }
    }

    Ok(())
}

//! CLI entry point for the cursochat client.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;

mod client;
mod config;
mod core;
mod links;
mod logging;
mod models;
mod notify;
mod render;
mod settings;
mod tui;

use crate::config::Config;
use crate::settings::Settings;
use crate::tui::TuiOptions;

#[derive(Parser, Debug)]
#[command(
    name = "cursochat",
    author,
    version,
    about = "Chat de recomendación de cursos — UdeA",
    long_about = "Terminal client for the UdeA course recommendation assistant.\n\nJust run 'cursochat' to start chatting."
)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Option<Commands>,

    /// Backend base URL (overrides config file and CURSOCHAT_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Path to an alternate config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Disable the terminal bell on bot messages
    #[arg(long)]
    no_sound: bool,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show or change persistent settings
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    /// Show current settings
    Show,
    /// Change one setting
    Set { key: String, value: String },
    /// List available setting keys
    Keys,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Settings { action }) => run_settings(action),
        None => {
            logging::init(cli.verbose)?;

            let mut config = Config::load(cli.config)?;
            if let Some(base_url) = cli.base_url {
                config.base_url = Some(base_url);
            }

            let settings = Settings::load().unwrap_or_else(|error| {
                tracing::warn!("falling back to default settings: {error}");
                Settings::default()
            });

            tui::run_tui(&config, &settings, TuiOptions { sound: !cli.no_sound }).await
        }
    }
}

fn run_settings(action: Option<SettingsAction>) -> Result<()> {
    match action.unwrap_or(SettingsAction::Show) {
        SettingsAction::Show => {
            println!("{}", Settings::load()?.display());
        }
        SettingsAction::Set { key, value } => {
            let mut settings = Settings::load()?;
            settings.set(&key, &value)?;
            settings.save()?;
            println!("Updated {key}.");
        }
        SettingsAction::Keys => {
            for (key, description) in Settings::available_settings() {
                println!("{key:<14} {description}");
            }
        }
    }
    Ok(())
}

//! workerctl - manage worker manifests and their encrypted secrets
//!
//! Usage:
//!   workerctl add-secret <name>     - Encrypt a secret into the manifest
//!   workerctl remove-secret <name>  - Remove a secret from the manifest
//!   workerctl list-secrets          - List secret names
//!   workerctl check-secrets         - Check all secrets open with one password
//!   workerctl plan                  - Print the secrets update for a deploy

use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;
use workerctl::{
    commands::{self, PlanOptions},
    config::{Config, MANIFEST_FILE_ENV},
    console::Console,
    credentials::{ConsoleCredentials, TerminalPrompter},
    secrets::{ReconcileOptions, SecretStore},
    Result,
};

#[derive(Parser)]
#[command(name = "workerctl")]
#[command(author = "workerctl Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Manage worker manifests and their encrypted secrets")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "~/.config/workerctl/config.json")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Worker project directory
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a secret to the worker
    #[command(alias = "as")]
    AddSecret {
        /// The secret name
        name: String,

        /// Whether to update an existing secret
        #[arg(long)]
        edit: bool,
    },

    /// Remove a secret from the worker
    RemoveSecret {
        /// The secret name
        name: String,
    },

    /// List the worker's secret names
    ListSecrets,

    /// Check that every secret decrypts with the same password
    CheckSecrets,

    /// Print the secrets update a deploy would send
    Plan {
        /// Remote worker details as JSON (`-` for stdin); omit for a new worker
        #[arg(long)]
        remote: Option<PathBuf>,

        /// Leave remote secrets untouched
        #[arg(long)]
        no_secrets: bool,

        /// Print cleartext values
        #[arg(long)]
        reveal_values: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");

    let config_path = expand_tilde(&cli.config);

    if let Err(e) = run(cli.command, &config_path, &cli.dir) {
        if e.is_user_error() {
            error!("{}", e);
        } else {
            error!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

fn run(command: Commands, config_path: &Path, dir: &Path) -> Result<()> {
    let config = Config::resolve(config_path, &env_snapshot(&[MANIFEST_FILE_ENV]))?;
    let store = SecretStore::default();
    let mut console = Console::stdio();
    let secrets_env = env_snapshot(&[
        config.secrets.password_env.as_str(),
        config.secrets.secret_value_env.as_str(),
    ]);
    let mut credentials =
        ConsoleCredentials::new(secrets_env, config.secrets.clone(), TerminalPrompter);

    match command {
        Commands::AddSecret { name, edit } => {
            commands::add_secret(&config, &store, dir, &name, edit, &mut credentials)
        }

        Commands::RemoveSecret { name } => commands::remove_secret(&config, dir, &name),

        Commands::ListSecrets => commands::list_secrets(&config, dir, &mut console),

        Commands::CheckSecrets => {
            commands::check_secrets(&config, &store, dir, &mut credentials, &mut console)
        }

        Commands::Plan {
            remote,
            no_secrets,
            reveal_values,
        } => {
            let remote = remote
                .map(|source| commands::load_remote(&source, &mut console))
                .transpose()?;
            let options = PlanOptions {
                reconcile: ReconcileOptions {
                    propagate_secrets: !no_secrets,
                },
                reveal_values,
            };
            commands::plan(
                &config,
                &store,
                dir,
                remote.as_ref(),
                options,
                &mut credentials,
                &mut console,
            )
            .map(|_| ())
        }
    }
}

/// Read the named environment variables that are set
fn env_snapshot(names: &[&str]) -> HashMap<String, String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok().map(|value| (name.to_string(), value)))
        .collect()
}

/// Expand ~ to home directory
fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}

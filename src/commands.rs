//! Secret related commands
//!
//! Each command loads the manifest of one project directory, does its work
//! and persists the result only when everything succeeded.

use crate::config::Config;
use crate::console::Console;
use crate::credentials::CredentialsProvider;
use crate::error::Result;
use crate::manifest::Manifest;
use crate::secrets::{self, ReconcileOptions, Secret, SecretStore};
use crate::worker::WorkerDetails;
use std::io::{BufRead, Write};
use std::path::Path;
use tracing::info;

const PASSWORD_PROMPT: &str = "Secrets Password: ";
const VALUE_PROMPT: &str = "Value: ";

/// Options of the `plan` command
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanOptions {
    pub reconcile: ReconcileOptions,

    /// Print cleartext values instead of a mask
    pub reveal_values: bool,
}

fn load_valid_manifest(config: &Config, project_dir: &Path) -> Result<Manifest> {
    let manifest = Manifest::load(&config.manifest_path(project_dir))?;
    manifest.validate()?;
    Ok(manifest)
}

/// Encrypt a new secret into the manifest
pub fn add_secret<C: CredentialsProvider>(
    config: &Config,
    store: &SecretStore,
    project_dir: &Path,
    name: &str,
    allow_overwrite: bool,
    credentials: &mut C,
) -> Result<()> {
    let path = config.manifest_path(project_dir);
    let mut manifest = load_valid_manifest(config, project_dir)?;

    secrets::check_can_add(&manifest, name, allow_overwrite)?;

    let password = credentials.secrets_password(PASSWORD_PROMPT)?;
    let value = credentials.secret_value(VALUE_PROMPT)?;

    store.add_secret(&mut manifest, name, &value, &password, allow_overwrite)?;
    manifest.save(&path)?;

    info!("Secret '{}' saved", name);
    Ok(())
}

/// Remove a secret from the manifest
pub fn remove_secret(config: &Config, project_dir: &Path, name: &str) -> Result<()> {
    let path = config.manifest_path(project_dir);
    let mut manifest = load_valid_manifest(config, project_dir)?;

    secrets::remove_secret(&mut manifest, name)?;
    manifest.save(&path)?;

    info!("Secret '{}' removed", name);
    Ok(())
}

/// Print secret names, one per line
pub fn list_secrets<R: BufRead, W: Write>(
    config: &Config,
    project_dir: &Path,
    console: &mut Console<R, W>,
) -> Result<()> {
    let manifest = load_valid_manifest(config, project_dir)?;
    for name in secrets::secret_names(&manifest) {
        console.println(&name)?;
    }
    Ok(())
}

/// Check that every secret opens with the same password
pub fn check_secrets<C: CredentialsProvider, R: BufRead, W: Write>(
    config: &Config,
    store: &SecretStore,
    project_dir: &Path,
    credentials: &mut C,
    console: &mut Console<R, W>,
) -> Result<()> {
    let mut manifest = load_valid_manifest(config, project_dir)?;
    let count = manifest.secrets.len();

    if count > 0 {
        let password = credentials.secrets_password(PASSWORD_PROMPT)?;
        store.decrypt_all(&mut manifest, &password)?;
    }

    console.println(&format!("{} secret(s) decrypted successfully", count))?;
    Ok(())
}

/// Read remote worker details from a file, or from console input for `-`
pub fn load_remote<R: BufRead, W: Write>(
    source: &Path,
    console: &mut Console<R, W>,
) -> Result<WorkerDetails> {
    let content = if source == Path::new("-") {
        console.read_all()?
    } else {
        std::fs::read_to_string(source)?
    };
    WorkerDetails::from_json(&content)
}

/// Print the secrets update for a deploy of the project's worker
pub fn plan<C: CredentialsProvider, R: BufRead, W: Write>(
    config: &Config,
    store: &SecretStore,
    project_dir: &Path,
    remote: Option<&WorkerDetails>,
    options: PlanOptions,
    credentials: &mut C,
    console: &mut Console<R, W>,
) -> Result<Vec<Secret>> {
    let mut manifest = load_valid_manifest(config, project_dir)?;

    if options.reconcile.propagate_secrets && !manifest.secrets.is_empty() {
        let password = credentials.secrets_password(PASSWORD_PROMPT)?;
        store.decrypt_all(&mut manifest, &password)?;
    }

    match remote {
        Some(worker) => info!("Planning update of worker '{}'", worker.key_with_project()),
        None => info!("Planning deploy of new worker '{}'", manifest.name),
    }

    let updates = secrets::plan_for_worker(&manifest.secrets, remote, options.reconcile);

    if options.reveal_values {
        console.print_json(&updates)?;
    } else {
        let masked: Vec<Secret> = updates.iter().map(Secret::redacted).collect();
        console.print_json(&masked)?;
    }

    Ok(updates)
}

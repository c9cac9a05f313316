//! Secret reconciliation
//!
//! Computes the update list that brings the remote secrets of a worker in
//! line with the local manifest. The service only reports secret names, so
//! every local secret it already knows is sent as a removal followed by a
//! fresh value; there is no way to tell whether the value changed.

use crate::manifest::Secrets;
use crate::secrets::Secret;
use crate::worker::WorkerDetails;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy)]
pub struct ReconcileOptions {
    /// When false, remote secrets are left untouched
    pub propagate_secrets: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        ReconcileOptions {
            propagate_secrets: true,
        }
    }
}

/// Diff decrypted local secrets against the names known remotely.
///
/// Per key the output is one of: an upsert (new key), a tombstone then an
/// upsert (known key), or a tombstone (key gone locally). Order across keys
/// follows map iteration and is unspecified.
pub fn reconcile(
    local: &Secrets,
    remote_names: Option<&HashSet<String>>,
    options: ReconcileOptions,
) -> Vec<Secret> {
    if !options.propagate_secrets {
        return Vec::new();
    }

    let mut pending: HashSet<&str> = remote_names
        .map(|names| names.iter().map(String::as_str).collect())
        .unwrap_or_default();

    let mut updates = Vec::with_capacity(local.len() + pending.len());

    for (name, value) in local {
        if pending.remove(name.as_str()) {
            updates.push(Secret::tombstone(name.as_str()));
        }
        updates.push(Secret::upsert(name.as_str(), value.as_str()));
    }

    updates.extend(pending.into_iter().map(Secret::tombstone));

    tracing::debug!("Prepared {} secret updates", updates.len());
    updates
}

/// Reconcile against a worker fetched from the service, or none when the
/// worker has not been deployed yet.
pub fn plan_for_worker(
    local: &Secrets,
    worker: Option<&WorkerDetails>,
    options: ReconcileOptions,
) -> Vec<Secret> {
    let remote_names = worker.map(WorkerDetails::secret_names);
    reconcile(local, remote_names.as_ref(), options)
}

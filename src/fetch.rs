use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

use crate::app::FetchOptions;
use crate::domain::{ArtifactKind, NistId, SpectrumType};
use crate::error::ScrapeError;
use crate::nist::NistClient;
use crate::store::Store;

/// Body the WebBook serves for `Str2File` when it has no structure.
pub const STRUCTURE_NOT_FOUND: &str = concat!(
    "NIST    12121112142D 1   1.00000     0.00000\n",
    "Copyright by the U.S. Sec. Commerce on behalf of U.S.A. All rights reserved.\n",
    "0  0  0     0  0              1 V2000\n",
    "M  END\n",
);

/// Body the WebBook serves for `JCAMP` when it has no spectrum.
pub const SPECTRUM_NOT_FOUND: &str = "##TITLE=Spectrum not found.\n##END=\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchAction {
    /// File already on disk; nothing requested.
    Present,
    Saved,
    /// Remote answered with the "not available" body; nothing written.
    NotFound,
    /// Dry run: would have been requested.
    Planned,
    /// Remote refused the request with a client error; nothing written.
    Rejected,
}

impl FetchAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchAction::Present => "present",
            FetchAction::Saved => "saved",
            FetchAction::NotFound => "not-found",
            FetchAction::Planned => "planned",
            FetchAction::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub kind: ArtifactKind,
    pub action: FetchAction,
    pub path: Utf8PathBuf,
}

pub fn fetch_structure<C: NistClient + ?Sized>(
    client: &C,
    store: &Store,
    id: &NistId,
    options: &FetchOptions,
) -> Result<FetchOutcome, ScrapeError> {
    let path = store.structure_path(id);
    let action = fetch_artifact(store, &path, STRUCTURE_NOT_FOUND, options, || {
        tracing::info!(%id, "downloading structure");
        client.fetch_structure(id)
    })?;
    log_action(id, ArtifactKind::Structure, None, action, &path);
    Ok(FetchOutcome {
        kind: ArtifactKind::Structure,
        action,
        path,
    })
}

pub fn fetch_spectrum<C: NistClient + ?Sized>(
    client: &C,
    store: &Store,
    id: &NistId,
    spectrum_type: SpectrumType,
    options: &FetchOptions,
) -> Result<FetchOutcome, ScrapeError> {
    let path = store.spectrum_path(id, spectrum_type);
    let action = fetch_artifact(store, &path, SPECTRUM_NOT_FOUND, options, || {
        tracing::info!(%id, %spectrum_type, "downloading spectrum");
        client.fetch_spectrum(id, spectrum_type)
    })?;
    log_action(id, ArtifactKind::Spectrum, Some(spectrum_type), action, &path);
    Ok(FetchOutcome {
        kind: ArtifactKind::Spectrum,
        action,
        path,
    })
}

/// The existence check is the only freshness test: a file on disk is never
/// re-validated unless `force` is set. A 4xx answer (other than 429) skips
/// this artifact only; every other failure is returned to the caller.
fn fetch_artifact<F>(
    store: &Store,
    path: &Utf8Path,
    sentinel: &str,
    options: &FetchOptions,
    download: F,
) -> Result<FetchAction, ScrapeError>
where
    F: FnOnce() -> Result<Vec<u8>, ScrapeError>,
{
    if !options.force && store.exists(path) {
        return Ok(FetchAction::Present);
    }
    if options.dry_run {
        return Ok(FetchAction::Planned);
    }

    let body = match download() {
        Ok(body) => body,
        Err(err) if err.is_rejection() => {
            tracing::warn!(%path, error = %err, "request rejected, skipping");
            return Ok(FetchAction::Rejected);
        }
        Err(err) => return Err(err),
    };
    if body == sentinel.as_bytes() {
        return Ok(FetchAction::NotFound);
    }
    Store::write_bytes_atomic(path, &body)?;
    Ok(FetchAction::Saved)
}

fn log_action(
    id: &NistId,
    kind: ArtifactKind,
    spectrum_type: Option<SpectrumType>,
    action: FetchAction,
    path: &Utf8Path,
) {
    let spectrum_type = spectrum_type.map(|value| value.to_string()).unwrap_or_default();
    match action {
        FetchAction::Present => {
            tracing::info!(%id, %kind, %spectrum_type, %path, "already exists")
        }
        FetchAction::Saved => tracing::info!(%id, %kind, %spectrum_type, %path, "saved"),
        FetchAction::NotFound => tracing::info!(%id, %kind, %spectrum_type, "not found"),
        FetchAction::Planned => tracing::info!(%id, %kind, %spectrum_type, %path, "would download"),
        FetchAction::Rejected => tracing::info!(%id, %kind, %spectrum_type, "skipped"),
    }
}

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::domain::{ArtifactKind, Formula, NistId, SpectrumType};
use crate::error::ScrapeError;
use crate::fetch::{FetchAction, FetchOutcome, fetch_spectrum, fetch_structure};
use crate::nist::NistClient;
use crate::search::SearchFlags;
use crate::species::SpeciesList;
use crate::store::Store;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Re-download even when the target file exists.
    pub force: bool,
    pub dry_run: bool,
    pub spectrum_types: Vec<SpectrumType>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            force: false,
            dry_run: false,
            spectrum_types: vec![SpectrumType::Ir],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScrapeResult {
    pub started_at: String,
    pub finished_at: String,
    pub searches: Vec<SearchResult>,
    pub items: Vec<FetchItemResult>,
}

impl ScrapeResult {
    pub fn count(&self, action: FetchAction) -> usize {
        self.items
            .iter()
            .filter(|item| item.action == action)
            .count()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub formula: String,
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchItemResult {
    pub artifact: ArtifactKind,
    pub id: String,
    pub spectrum_type: Option<SpectrumType>,
    /// `formula:<query>` for search hits, `direct` for listed identifiers.
    pub origin: String,
    pub action: FetchAction,
    pub path: String,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

/// Sequential driver: searches formulas, then fetches artifacts for every
/// hit and every directly listed identifier over one shared client.
pub struct App<C: NistClient> {
    store: Store,
    client: C,
    search_flags: SearchFlags,
}

impl<C: NistClient> App<C> {
    pub fn new(store: Store, client: C) -> Self {
        Self {
            store,
            client,
            search_flags: SearchFlags::driver_defaults(),
        }
    }

    pub fn with_search_flags(mut self, flags: SearchFlags) -> Self {
        self.search_flags = flags;
        self
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// A transport error anywhere aborts the remaining work; files already
    /// written stay on disk and are skipped by the next run. A formula or
    /// artifact the server rejects with a client error is skipped instead.
    pub fn run(
        &self,
        species: &SpeciesList,
        options: FetchOptions,
        sink: &dyn ProgressSink,
    ) -> Result<ScrapeResult, ScrapeError> {
        let started_at = iso_timestamp();
        let mut searches = Vec::new();
        let mut items = Vec::new();

        if species.is_empty() {
            tracing::warn!("species list is empty, nothing to do");
        }
        sink.event(ProgressEvent {
            message: format!(
                "phase=Resolve; {} formulas, {} identifiers",
                species.formulas.len(),
                species.ids.len()
            ),
            elapsed: None,
        });

        for formula in &species.formulas {
            let ids = match self.search(formula, sink) {
                Ok(ids) => ids,
                Err(err) if err.is_rejection() => {
                    tracing::warn!(%formula, error = %err, "search rejected, skipping formula");
                    Vec::new()
                }
                Err(err) => return Err(err),
            };
            let origin = format!("formula:{formula}");
            for id in &ids {
                self.fetch_id(id, &origin, &options, sink, &mut items)?;
            }
            searches.push(SearchResult {
                formula: formula.to_string(),
                ids: ids.iter().map(|id| id.to_string()).collect(),
            });
        }
        sink.event(ProgressEvent {
            message: "phase=Formulas; done with formulas".to_string(),
            elapsed: None,
        });

        for id in &species.ids {
            self.fetch_id(id, "direct", &options, sink, &mut items)?;
        }
        sink.event(ProgressEvent {
            message: "phase=Done; done scraping data".to_string(),
            elapsed: None,
        });

        Ok(ScrapeResult {
            started_at,
            finished_at: iso_timestamp(),
            searches,
            items,
        })
    }

    pub fn search(
        &self,
        formula: &Formula,
        sink: &dyn ProgressSink,
    ) -> Result<Vec<NistId>, ScrapeError> {
        sink.event(ProgressEvent {
            message: format!("phase=Search; searching {formula}"),
            elapsed: None,
        });
        tracing::info!(%formula, "searching");
        let start = Instant::now();
        let ids = self.client.search_formula(formula, &self.search_flags)?;
        let elapsed = start.elapsed();
        tracing::info!(
            %formula,
            hits = ids.len(),
            ids = ?ids.iter().map(NistId::as_str).collect::<Vec<_>>(),
            "search result"
        );
        sink.event(ProgressEvent {
            message: format!("search.response hits={}", ids.len()),
            elapsed: Some(elapsed),
        });
        Ok(ids)
    }

    pub fn fetch_ids(
        &self,
        ids: &[NistId],
        options: FetchOptions,
        sink: &dyn ProgressSink,
    ) -> Result<ScrapeResult, ScrapeError> {
        let started_at = iso_timestamp();
        let mut items = Vec::new();
        for id in ids {
            self.fetch_id(id, "direct", &options, sink, &mut items)?;
        }
        Ok(ScrapeResult {
            started_at,
            finished_at: iso_timestamp(),
            searches: Vec::new(),
            items,
        })
    }

    fn fetch_id(
        &self,
        id: &NistId,
        origin: &str,
        options: &FetchOptions,
        sink: &dyn ProgressSink,
        items: &mut Vec<FetchItemResult>,
    ) -> Result<(), ScrapeError> {
        let start = Instant::now();
        let outcome = fetch_structure(&self.client, &self.store, id, options)?;
        items.push(item_result(id, None, origin, &outcome));
        sink.event(ProgressEvent {
            message: format!("phase=Store; {id} structure {}", outcome.action.as_str()),
            elapsed: Some(start.elapsed()),
        });

        for spectrum_type in &options.spectrum_types {
            let start = Instant::now();
            let outcome = fetch_spectrum(&self.client, &self.store, id, *spectrum_type, options)?;
            items.push(item_result(id, Some(*spectrum_type), origin, &outcome));
            sink.event(ProgressEvent {
                message: format!(
                    "phase=Store; {id} {spectrum_type} spectrum {}",
                    outcome.action.as_str()
                ),
                elapsed: Some(start.elapsed()),
            });
        }
        Ok(())
    }
}

fn item_result(
    id: &NistId,
    spectrum_type: Option<SpectrumType>,
    origin: &str,
    outcome: &FetchOutcome,
) -> FetchItemResult {
    FetchItemResult {
        artifact: outcome.kind,
        id: id.to_string(),
        spectrum_type,
        origin: origin.to_string(),
        action: outcome.action,
        path: outcome.path.to_string(),
    }
}

fn iso_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

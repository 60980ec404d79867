//! Per-dandiset incremental reconciliation.
//!
//! Produces an up-to-date [`DandisetDocument`] for one dandiset under a
//! wall-clock budget, minimizing redundant extraction: assets present in the
//! previously persisted document are copied forward verbatim (identity is
//! the stable `asset_id`, never the path), and only assets the harvester has
//! never seen are run through the structural extractor.
//!
//! The pass is monotonic and resumable. Every run either reuses or
//! recomputes each asset; a run cut short by the budget simply omits the
//! assets it never reached, and they are picked up — as genuinely new — on
//! the next run. Budgets are polled between entries, not enforced
//! preemptively, so a single slow remote read can overrun the budget by the
//! duration of that one call.
//!
//! Persistence is deliberately *not* decided here: the outcome carries a
//! `changed` flag and the caller makes the save/skip call.

use crate::error::{ErrorKind, Result};
use crate::models::{AssetRecord, DandisetDocument};
use crate::store::ResultStore;
use dandimeta_archive::{ArchiveDirectory, DandisetRef};
use dandimeta_extract::{ExtractOptions, StructuralExtractor};
use futures::TryStreamExt;
use std::time::{Duration, Instant};
use tracing::instrument;

/// Path suffix of the files this harvester tracks. Everything else in a
/// dandiset (sidecar JSON, videos, tabular exports) is neither copied
/// forward nor extracted.
pub const NWB_SUFFIX: &str = ".nwb";

/// The result of one reconciliation pass.
#[derive(Debug)]
pub struct ReconcileOutcome {
    /// The rebuilt document, in listing encounter order.
    pub document: DandisetDocument,
    /// Whether the document differs from the persisted prior in a way that
    /// warrants a save: a missing prior always counts (so a first-ever scan
    /// is persisted even when empty), as does any fresh extraction.
    pub changed: bool,
    /// Records copied forward from the prior document without extraction.
    pub forwarded: usize,
    /// Records produced by fresh extraction during this pass.
    pub extracted: usize,
    /// Whether the pass stopped early because the budget ran out.
    pub hit_budget: bool,
}

/// Reconcile one dandiset against its persisted document.
///
/// Loads the prior document (absent is fine), walks the current asset
/// listing in order, and rebuilds the document by copying forward known
/// records and extracting new ones, stopping early once `budget` elapses.
///
/// # Errors
///
/// - [`ErrorKind::StoreUnavailable`] when the prior document cannot be
///   loaded for any reason other than not existing;
/// - [`ErrorKind::Listing`] when the listing session fails mid-scan;
/// - [`ErrorKind::Extraction`] when any single extraction fails.
///
/// All three abandon the pass: no partial document escapes through the
/// error path, so the caller can never persist a half-scanned dandiset.
#[instrument(skip_all, fields(dandiset_id = %dandiset.dandiset_id, version = %dandiset.version))]
pub async fn reconcile(
    store: &ResultStore,
    directory: &dyn ArchiveDirectory,
    extractor: &dyn StructuralExtractor,
    dandiset: &DandisetRef,
    budget: Duration,
) -> Result<ReconcileOutcome> {
    let timer = Instant::now();

    let prior = store.load(&dandiset.dandiset_id).await?;
    match &prior {
        Some(existing) => tracing::info!(assets = existing.nwb_assets.len(), "found existing document"),
        None => tracing::info!("no existing document found"),
    }
    // An absent prior forces a save even if the listing turns out to be
    // empty, so the next run starts from a committed (empty) document.
    let mut changed = prior.is_none();

    let mut document = DandisetDocument::new(&dandiset.dandiset_id, &dandiset.version);
    let mut forwarded = 0usize;
    let mut extracted = 0usize;
    let mut hit_budget = false;

    let mut entries = directory.list_assets(dandiset);
    let mut position = 0usize;
    loop {
        // Cooperative budget check, polled between entries: it bounds how
        // many iterations begin, not the duration of an in-flight call.
        if timer.elapsed() >= budget {
            tracing::info!(position, "time limit reached for this dandiset");
            hit_budget = true;
            break;
        }
        let Some(entry) = entries
            .try_next()
            .await
            .map_err(|err| err.raise(ErrorKind::Listing(dandiset.dandiset_id.clone())))?
        else {
            break;
        };
        position += 1;
        if !entry.path.ends_with(NWB_SUFFIX) {
            continue;
        }
        if document.contains_asset(&entry.identifier) {
            // Listings should never repeat an identifier; keep the first
            // record so the unique-key invariant holds regardless.
            tracing::warn!(asset_id = %entry.identifier, "duplicate asset identifier in listing");
            continue;
        }
        if let Some(record) = prior.as_ref().and_then(|existing| existing.find_asset(&entry.identifier)) {
            tracing::info!(position, path = %entry.path, "already processed");
            document.nwb_assets.push(record.clone());
            forwarded += 1;
            continue;
        }
        tracing::info!(position, path = %entry.path, "extracting");
        let tree = extractor
            .extract(&entry.download_url, &ExtractOptions::layout_only())
            .await
            .map_err(|err| {
                err.raise(ErrorKind::Extraction {
                    asset_id: entry.identifier.clone(),
                    asset_path: entry.path.clone(),
                })
            })?;
        document.nwb_assets.push(AssetRecord {
            asset_id: entry.identifier,
            asset_path: entry.path,
            nwb_metadata: tree,
        });
        extracted += 1;
        changed = true;
    }
    // Release the listing session before reporting; error paths above
    // released it implicitly by dropping the stream.
    drop(entries);

    tracing::info!(forwarded, extracted, elapsed = ?timer.elapsed(), "reconciliation pass finished");
    Ok(ReconcileOutcome { document, changed, forwarded, extracted, hit_budget })
}

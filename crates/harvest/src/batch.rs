//! Whole-archive batch driver.
//!
//! Sequences [`reconcile`](crate::reconcile) across every dandiset the
//! directory knows about, commits changed documents, and stops once a global
//! wall-clock ceiling is reached. The directory snapshot is fetched exactly
//! once at the start and never refreshed mid-run; dandisets the budget never
//! reaches are deferred wholesale to the next invocation.
//!
//! No retries happen at this layer. The first failing dandiset terminates
//! the run: skipping it silently could mask a systematic extractor
//! regression across the whole archive, and every previously committed
//! document is already safe on its own.

use crate::error::{ErrorKind, Result};
use crate::reconcile::reconcile;
use crate::store::ResultStore;
use dandimeta_archive::ArchiveDirectory;
use dandimeta_extract::StructuralExtractor;
use std::time::{Duration, Instant};
use tracing::instrument;

/// Counters describing one batch run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// Dandisets fully reconciled (saved or skipped).
    pub reconciled: usize,
    /// Dandisets whose document changed and was persisted.
    pub saved: usize,
    /// Dandisets left untouched because nothing changed.
    pub skipped: usize,
    /// Dandisets never reached before the global budget ran out.
    pub deferred: usize,
}

/// Run one harvesting pass over the whole archive.
///
/// Each dandiset costs one store read and — only when its document changed —
/// one store write. The global budget is checked after every dandiset, so
/// the run always finishes the dandiset it is on before stopping.
#[instrument(skip(store, directory, extractor))]
pub async fn run_batch(
    store: &ResultStore,
    directory: &dyn ArchiveDirectory,
    extractor: &dyn StructuralExtractor,
    global_budget: Duration,
    per_dandiset_budget: Duration,
) -> Result<BatchReport> {
    let timer = Instant::now();
    let dandisets =
        directory.list_dandisets().await.map_err(|err| err.raise(ErrorKind::Directory))?;
    tracing::info!(count = dandisets.len(), "fetched directory snapshot");

    let mut report = BatchReport::default();
    for (position, dandiset) in dandisets.iter().enumerate() {
        tracing::info!(
            dandiset_id = %dandiset.dandiset_id,
            version = %dandiset.version,
            "processing dandiset"
        );
        let outcome = reconcile(store, directory, extractor, dandiset, per_dandiset_budget).await?;
        report.reconciled += 1;
        if outcome.changed {
            store.save(&outcome.document).await?;
            report.saved += 1;
        } else {
            tracing::info!(dandiset_id = %dandiset.dandiset_id, "nothing changed; skipping save");
            report.skipped += 1;
        }
        let elapsed = timer.elapsed();
        tracing::info!(?elapsed, "dandiset finished");
        if elapsed > global_budget {
            report.deferred = dandisets.len() - (position + 1);
            if report.deferred > 0 {
                tracing::info!(deferred = report.deferred, "global time limit reached");
            }
            break;
        }
    }
    Ok(report)
}

//! Incremental harvesting of structural metadata from the DANDI archive.
//!
//! One merged JSON document is maintained per dandiset, listing the
//! structural layout of each of its NWB files. Every run rebuilds each
//! document from a fresh archive listing, copying forward records for assets
//! that were already processed (no re-extraction) and extracting only what
//! is new, under cooperative wall-clock budgets:
//!
//! - [`reconcile`] merges cached and freshly-extracted per-asset records for
//!   one dandiset and reports whether anything changed;
//! - [`run_batch`] sequences reconciliation across the whole archive
//!   directory and persists only the documents that changed;
//! - [`ResultStore`] owns key derivation, serialization normalization and
//!   the compressed/plain storage forms.
//!
//! Everything is strictly sequential; an interrupted run never loses
//! previously committed records, only delays newly-added ones by one run.

pub mod batch;
pub mod config;
pub mod error;
mod models;
mod reconcile;
mod store;

pub use crate::batch::{BatchReport, run_batch};
pub use crate::config::{ArchiveConfig, HarvestConfig, StorageConfig};
pub use crate::models::{AssetRecord, DandisetDocument};
pub use crate::reconcile::{NWB_SUFFIX, ReconcileOutcome, reconcile};
pub use crate::store::{KEY_NAMESPACE, ResultStore};

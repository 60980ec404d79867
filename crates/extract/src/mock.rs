//! In-memory extractor for testing.

use crate::error::{ErrorKind, Result};
use crate::models::{AttrValue, GroupMeta, StructuralTree};
use crate::{ExtractOptions, StructuralExtractor};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

/// In-memory [`StructuralExtractor`] for testing.
///
/// Every call is recorded, so tests can assert that cached records were
/// copied forward *without* re-extraction. URLs without an explicitly
/// configured tree get a deterministic synthetic tree derived from the URL,
/// so two different assets never extract to equal trees by accident.
///
/// # Examples
///
/// ```
/// use dandimeta_extract::{ExtractOptions, MockExtractor, StructuralExtractor};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let extractor = MockExtractor::default().fail_on("https://example.org/bad");
/// let tree = extractor.extract("https://example.org/good", &ExtractOptions::layout_only()).await?;
/// assert!(!tree.groups.is_empty());
/// assert!(extractor.extract("https://example.org/bad", &ExtractOptions::layout_only()).await.is_err());
/// assert_eq!(extractor.calls().len(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct MockExtractor {
    trees: HashMap<String, StructuralTree>,
    failures: HashSet<String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
}

impl MockExtractor {
    /// Create a mock extractor with explicit trees for specific URLs.
    pub fn with_trees(trees: impl IntoIterator<Item = (impl Into<String>, StructuralTree)>) -> Self {
        Self {
            trees: trees.into_iter().map(|(url, tree)| (url.into(), tree)).collect(),
            ..Self::default()
        }
    }

    /// Make extraction of `download_url` fail with a malformed-file error.
    pub fn fail_on(mut self, download_url: impl Into<String>) -> Self {
        self.failures.insert(download_url.into());
        self
    }

    /// Sleep for `delay` before each extraction, simulating a slow remote
    /// walk for budget tests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every download URL passed to [`extract`](StructuralExtractor::extract)
    /// so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("mock call log poisoned").clone()
    }

    fn synthetic_tree(download_url: &str) -> StructuralTree {
        StructuralTree {
            groups: vec![GroupMeta {
                path: "/".to_string(),
                attrs: BTreeMap::from([("source".to_string(), AttrValue::from(download_url))]),
            }],
            datasets: Vec::new(),
        }
    }
}

#[async_trait]
impl StructuralExtractor for MockExtractor {
    async fn extract(&self, download_url: &str, _options: &ExtractOptions) -> Result<StructuralTree> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.calls.lock().expect("mock call log poisoned").push(download_url.to_string());
        if self.failures.contains(download_url) {
            exn::bail!(ErrorKind::Malformed(format!("mock failure for {download_url}")));
        }
        Ok(self.trees.get(download_url).cloned().unwrap_or_else(|| Self::synthetic_tree(download_url)))
    }
}

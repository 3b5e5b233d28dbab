//! Catalog search by topic.
//!
//! Walks the portal's paginated topic listing, then expands every listed
//! dataset through the [`MetadataResolver`], one at a time.

use std::collections::HashSet;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use tracing::{debug, info, warn};

use super::page::{SearchItem, next_page_href, parse_search_results};
use super::reference::{absolutize, normalize_reference};
use super::{MetadataResolver, Resolution};
use crate::categories::Category;
use crate::record::{DatasetRecord, RecordBuilder};
use crate::report::emit;

/// Default pause between dataset expansions.
pub const DEFAULT_EXPANSION_DELAY: Duration = Duration::from_secs(1);

/// Options for [`CatalogSearch`].
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Stop after this many listed datasets; `None` walks every page.
    pub limit: Option<usize>,
    /// Pause between consecutive expansions.
    pub expansion_delay: Duration,
    /// Draw a progress bar while expanding.
    pub show_progress: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: None,
            expansion_delay: DEFAULT_EXPANSION_DELAY,
            show_progress: false,
        }
    }
}

/// Relative listing path for a topic, newest changes first.
#[must_use]
pub fn search_path(category: &Category) -> String {
    format!(
        "/search/field_topic/{}/type/dataset?sort_by=changed",
        category.slug()
    )
}

/// Topic search over the portal.
#[derive(Debug, Clone)]
pub struct CatalogSearch {
    resolver: MetadataResolver,
    options: SearchOptions,
}

impl CatalogSearch {
    #[must_use]
    pub fn new(resolver: MetadataResolver, options: SearchOptions) -> Self {
        Self { resolver, options }
    }

    /// Lists and expands every dataset under `category`.
    ///
    /// A dataset whose expansion fails is returned as listed, tagged with the
    /// searched category.
    #[tracing::instrument(skip(self), fields(category = %category))]
    pub async fn search(&self, category: &Category) -> Vec<DatasetRecord> {
        let listed = self.list(category).await;
        info!(count = listed.len(), "expanding listed datasets");

        let progress = self.progress_bar(listed.len());
        let mut records = Vec::with_capacity(listed.len());
        for (index, listing) in listed.iter().enumerate() {
            if index > 0 && !self.options.expansion_delay.is_zero() {
                tokio::time::sleep(self.options.expansion_delay).await;
            }
            progress.set_message(listing.title.clone());
            let Resolution { record, failure } = self.resolver.resolve_record(listing).await;
            if let Some(failure) = failure {
                debug!(url = %listing.url, error = %failure, "keeping listing record");
                records.push(listing.clone());
            } else {
                records.push(record);
            }
            progress.inc(1);
        }
        progress.finish_and_clear();
        records
    }

    /// Walks the listing pages without expanding anything.
    ///
    /// A page that cannot be fetched ends the walk with what was gathered.
    pub async fn list(&self, category: &Category) -> Vec<DatasetRecord> {
        let base_url = &self.resolver.options().base_url;
        let mut next = Some(absolutize(&search_path(category), base_url));
        let mut visited = HashSet::new();
        let mut records = Vec::new();

        while let Some(page_url) = next.take() {
            if self.limit_reached(records.len()) || !visited.insert(page_url.clone()) {
                break;
            }
            let html = match self.resolver.fetch_ok(&page_url).await {
                Ok(response) => response.text_lossy(),
                Err(reason) => {
                    emit(
                        self.resolver.reporter().as_ref(),
                        self.resolver.options().report_errors,
                        &format!("could not fetch search page {page_url}: {reason}"),
                    );
                    break;
                }
            };

            let items = parse_search_results(&html);
            debug!(page_url = %page_url, items = items.len(), "parsed search page");
            for item in &items {
                if self.limit_reached(records.len()) {
                    break;
                }
                records.push(listing_record(item, category, base_url));
            }
            next = next_page_href(&html).map(|href| absolutize(&href, base_url));
        }

        if records.is_empty() {
            warn!(category = %category, "no datasets listed");
        }
        records
    }

    fn limit_reached(&self, count: usize) -> bool {
        self.options.limit.is_some_and(|limit| count >= limit)
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.options.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(len as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:30} {pos}/{len} {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar
    }
}

/// Record built from a listing card alone.
///
/// The card's resources are kept under `raw_metadata.result[0].resources` so
/// the record can be downloaded even if expansion fails.
fn listing_record(item: &SearchItem, category: &Category, base_url: &str) -> DatasetRecord {
    RecordBuilder::new()
        .title(item.title.clone())
        .description(item.description.clone())
        .publisher(item.publisher.clone())
        .url(normalize_reference(&item.url, base_url))
        .categories(vec![category.slug().to_string()])
        .raw_metadata(json!({
            "result": [{
                "title": item.title,
                "notes": item.description,
                "resources": item.resources,
            }]
        }))
        .build()
}

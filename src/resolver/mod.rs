//! Metadata resolution: catalog reference to structured [`DatasetRecord`].
//!
//! Resolution runs three sequential steps against the portal:
//!
//! 1. fetch the dataset detail page,
//! 2. follow its "json view of content" anchor to the structured endpoint,
//! 3. map the endpoint's `result[0]` onto a fresh record.
//!
//! Topic links found on the detail page override the categories derived from
//! the metadata groups. None of the steps raise: a failure is reported and
//! returned next to the unchanged input record in a [`Resolution`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use datos_core::fetch::HttpFetcher;
//! use datos_core::report::TracingReporter;
//! use datos_core::resolver::{MetadataResolver, ResolverOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = MetadataResolver::new(
//!     Arc::new(HttpFetcher::new()?),
//!     Arc::new(TracingReporter),
//!     ResolverOptions::default(),
//! );
//! let resolution = resolver.resolve("padron-nominal").await;
//! println!("{} -> {}", resolution.record.url, resolution.record.title);
//! # Ok(())
//! # }
//! ```

mod error;
mod metadata;
mod page;
mod reference;
mod search;

pub use error::ResolveFailure;
pub use metadata::{Group, MetadataEnvelope, MetadataResult, apply_metadata, parse_metadata};
pub use page::{
    DetailPage, JSON_VIEW_TITLE, SearchItem, inspect_detail_page, next_page_href,
    parse_search_results, trailing_segment,
};
pub use reference::{DATASET_PATH_PREFIX, absolutize, normalize_reference};
pub use search::{CatalogSearch, SearchOptions, search_path};

use std::sync::Arc;

use tracing::{debug, info};

use crate::fetch::{FetchOptions, FetchResponse, PageFetcher};
use crate::record::{DatasetRecord, RecordBuilder};
use crate::report::{Reporter, emit};

/// Origin used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://datosabiertos.gob.pe";

/// Options shared by resolution and search.
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    /// Portal origin, e.g. `https://datosabiertos.gob.pe`.
    pub base_url: String,
    /// Transport options for every request.
    pub fetch: FetchOptions,
    /// Send failures to the reporter instead of only logging them.
    pub report_errors: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            fetch: FetchOptions::default(),
            report_errors: true,
        }
    }
}

/// Outcome of one resolution.
///
/// On failure `record` is the input record, untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub record: DatasetRecord,
    pub failure: Option<ResolveFailure>,
}

impl Resolution {
    /// Returns true when every step succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Discards the failure descriptor.
    #[must_use]
    pub fn into_record(self) -> DatasetRecord {
        self.record
    }
}

/// Turns catalog references into structured records.
#[derive(Clone)]
pub struct MetadataResolver {
    fetcher: Arc<dyn PageFetcher>,
    reporter: Arc<dyn Reporter>,
    options: ResolverOptions,
}

impl std::fmt::Debug for MetadataResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataResolver")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl MetadataResolver {
    /// Creates a resolver over an explicitly constructed fetcher and reporter.
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        reporter: Arc<dyn Reporter>,
        options: ResolverOptions,
    ) -> Self {
        Self {
            fetcher,
            reporter,
            options,
        }
    }

    #[must_use]
    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    pub(crate) fn reporter(&self) -> &Arc<dyn Reporter> {
        &self.reporter
    }

    /// Absolute detail-page URL for a reference or record path.
    #[must_use]
    pub fn page_url(&self, reference: &str) -> String {
        let path = normalize_reference(reference, &self.options.base_url);
        absolutize(&path, &self.options.base_url)
    }

    /// Resolves a slug or portal URL.
    pub async fn resolve(&self, reference: &str) -> Resolution {
        let record =
            DatasetRecord::from_url(normalize_reference(reference, &self.options.base_url));
        self.resolve_record(&record).await
    }

    /// Resolves an existing record from its `url`.
    ///
    /// The returned record is a fresh snapshot; `record` itself is never
    /// modified.
    #[tracing::instrument(skip(self, record), fields(url = %record.url))]
    pub async fn resolve_record(&self, record: &DatasetRecord) -> Resolution {
        let page_url = self.page_url(&record.url);
        debug!(page_url = %page_url, "fetching dataset page");

        let page = match self.fetch_ok(&page_url).await {
            Ok(response) => response,
            Err(reason) => {
                return self.fail(record, ResolveFailure::page_unavailable(&page_url, reason));
            }
        };
        let detail = page::inspect_detail_page(&page.text_lossy());

        let Some(href) = detail.json_view_href else {
            return self.fail(record, ResolveFailure::no_machine_readable_view(&page_url));
        };
        let metadata_url = absolutize(&href, &self.options.base_url);
        debug!(metadata_url = %metadata_url, "fetching structured metadata");

        let body = match self.fetch_ok(&metadata_url).await {
            Ok(response) => response.body,
            Err(reason) => {
                return self.fail(
                    record,
                    ResolveFailure::metadata_unavailable(&metadata_url, reason),
                );
            }
        };
        let (envelope, raw) = match parse_metadata(&body) {
            Ok(parsed) => parsed,
            Err(e) => {
                return self.fail(record, ResolveFailure::metadata_malformed(&metadata_url, e));
            }
        };

        let mut resolved = apply_metadata(record, &envelope, raw);
        if !detail.topic_categories.is_empty() {
            resolved = RecordBuilder::from_record(&resolved)
                .categories(detail.topic_categories)
                .build();
        }

        info!(id = %resolved.id, title = %resolved.title, "dataset resolved");
        Resolution {
            record: resolved,
            failure: None,
        }
    }

    /// Fetches `url`, folding transport errors and error statuses into a reason.
    pub(crate) async fn fetch_ok(&self, url: &str) -> Result<FetchResponse, String> {
        match self.fetcher.fetch(url, &self.options.fetch).await {
            Ok(response) if response.is_success() => Ok(response),
            Ok(response) => Err(format!("HTTP {}", response.status)),
            Err(e) => Err(e.to_string()),
        }
    }

    fn fail(&self, record: &DatasetRecord, failure: ResolveFailure) -> Resolution {
        emit(
            self.reporter.as_ref(),
            self.options.report_errors,
            &failure.to_string(),
        );
        Resolution {
            record: record.clone(),
            failure: Some(failure),
        }
    }
}

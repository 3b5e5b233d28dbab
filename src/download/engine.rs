//! Per-dataset download loop.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use super::DownloadError;
use super::filename::resource_filename;
use crate::fetch::{DEFAULT_REQUEST_TIMEOUT_SECS, FetchOptions, PageFetcher};
use crate::record::{DatasetRecord, Resource};
use crate::report::{Reporter, emit};
use crate::store;

/// Default pause after each successful download.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(1);

/// Options for [`Downloader::download`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOptions {
    /// Root under which `{dir}/` is created.
    pub destination: PathBuf,
    /// Send failures to the reporter instead of only logging them.
    pub report_errors: bool,
    /// Leave existing target files alone without touching the network.
    pub skip_existing: bool,
    pub verify_ssl: bool,
    /// Size ceiling in bytes; `None` means unlimited.
    pub max_size: Option<u64>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Pause after each successful download.
    pub request_delay: Duration,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            destination: PathBuf::from(store::DEFAULT_ROOT),
            report_errors: true,
            skip_existing: true,
            verify_ssl: true,
            max_size: None,
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            request_delay: DEFAULT_REQUEST_DELAY,
        }
    }
}

impl DownloadOptions {
    fn fetch_options(&self) -> FetchOptions {
        FetchOptions::default()
            .with_verify_ssl(self.verify_ssl)
            .with_timeout(self.timeout)
    }
}

/// What happened to one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceOutcome {
    Downloaded { path: PathBuf, bytes: u64 },
    SkippedExisting { path: PathBuf },
    /// Declared (or received) size above the ceiling; nothing written.
    SkippedTooLarge { size: u64, max_size: u64 },
    Failed { error: String },
}

/// One resource and its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceReport {
    pub resource: Resource,
    pub outcome: ResourceOutcome,
}

/// Informational summary of a dataset download.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadReport {
    pub dataset_dir: PathBuf,
    /// Side-car path, `None` if it could not be written.
    pub sidecar: Option<PathBuf>,
    pub resources: Vec<ResourceReport>,
}

impl DownloadReport {
    #[must_use]
    pub fn downloaded_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, ResourceOutcome::Downloaded { .. }))
    }

    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count(|outcome| {
            matches!(
                outcome,
                ResourceOutcome::SkippedExisting { .. } | ResourceOutcome::SkippedTooLarge { .. }
            )
        })
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, ResourceOutcome::Failed { .. }))
    }

    fn count(&self, predicate: impl Fn(&ResourceOutcome) -> bool) -> usize {
        self.resources
            .iter()
            .filter(|report| predicate(&report.outcome))
            .count()
    }
}

/// Persists a record's resources to disk.
#[derive(Clone)]
pub struct Downloader {
    fetcher: Arc<dyn PageFetcher>,
    reporter: Arc<dyn Reporter>,
}

impl std::fmt::Debug for Downloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Downloader").finish_non_exhaustive()
    }
}

impl Downloader {
    #[must_use]
    pub fn new(fetcher: Arc<dyn PageFetcher>, reporter: Arc<dyn Reporter>) -> Self {
        Self { fetcher, reporter }
    }

    /// Downloads every resource of `record` into `{destination}/{dir}/` and
    /// writes the record side-car.
    ///
    /// Failures are reported per resource and never abort the batch.
    #[instrument(skip(self, record, options), fields(dataset = %record.id, destination = %options.destination.display()))]
    pub async fn download(&self, record: &DatasetRecord, options: &DownloadOptions) -> DownloadReport {
        let dataset_dir = store::dataset_dir(&options.destination, record);
        if let Err(e) = fs::create_dir_all(&dataset_dir) {
            let error = DownloadError::io(&dataset_dir, e);
            emit(self.reporter.as_ref(), options.report_errors, &error.to_string());
        }

        let resources = record.resources();
        info!(count = resources.len(), dir = %dataset_dir.display(), "downloading resources");

        let fetch_options = options.fetch_options();
        let mut reports = Vec::with_capacity(resources.len());
        for resource in resources {
            let outcome = self
                .download_resource(&resource, &dataset_dir, options, &fetch_options)
                .await;
            if matches!(outcome, ResourceOutcome::Downloaded { .. })
                && !options.request_delay.is_zero()
            {
                tokio::time::sleep(options.request_delay).await;
            }
            reports.push(ResourceReport { resource, outcome });
        }

        let sidecar = match store::save_record(&options.destination, record) {
            Ok(path) => Some(path),
            Err(e) => {
                emit(
                    self.reporter.as_ref(),
                    options.report_errors,
                    &format!("could not write record side-car: {e}"),
                );
                None
            }
        };

        let report = DownloadReport {
            dataset_dir,
            sidecar,
            resources: reports,
        };
        info!(
            downloaded = report.downloaded_count(),
            skipped = report.skipped_count(),
            failed = report.failed_count(),
            "dataset download finished"
        );
        report
    }

    async fn download_resource(
        &self,
        resource: &Resource,
        dataset_dir: &Path,
        options: &DownloadOptions,
        fetch_options: &FetchOptions,
    ) -> ResourceOutcome {
        let target = dataset_dir.join(resource_filename(resource));

        if options.skip_existing && target.exists() {
            debug!(path = %target.display(), "target exists, skipping");
            return ResourceOutcome::SkippedExisting { path: target };
        }

        let url = resource.url.trim();
        if url.is_empty() {
            return self.failed(options, DownloadError::missing_url(&resource.name));
        }

        if let Some(max_size) = options.max_size {
            match self.fetcher.probe(url, fetch_options).await {
                Ok(probe) => {
                    if let Some(size) = probe.content_length
                        && size > max_size
                    {
                        emit(
                            self.reporter.as_ref(),
                            options.report_errors,
                            &format!("skipping {url}: {size} bytes exceeds the {max_size} byte limit"),
                        );
                        return ResourceOutcome::SkippedTooLarge { size, max_size };
                    }
                }
                Err(e) => debug!(url, error = %e, "size probe failed, downloading anyway"),
            }
        }

        let response = match self.fetcher.fetch(url, fetch_options).await {
            Ok(response) => response,
            Err(e) => return self.failed(options, DownloadError::network(url, e)),
        };
        if !response.is_success() {
            return self.failed(options, DownloadError::http_status(url, response.status));
        }

        let bytes = response.body.len() as u64;
        if let Some(max_size) = options.max_size
            && bytes > max_size
        {
            let error = DownloadError::too_large(url, max_size, bytes);
            emit(self.reporter.as_ref(), options.report_errors, &error.to_string());
            return ResourceOutcome::SkippedTooLarge {
                size: bytes,
                max_size,
            };
        }

        if let Err(e) = fs::write(&target, &response.body) {
            return self.failed(options, DownloadError::io(&target, e));
        }
        debug!(path = %target.display(), bytes, "resource written");
        ResourceOutcome::Downloaded {
            path: target,
            bytes,
        }
    }

    fn failed(&self, options: &DownloadOptions, error: DownloadError) -> ResourceOutcome {
        warn!(error = %error, "resource download failed");
        emit(self.reporter.as_ref(), options.report_errors, &error.to_string());
        ResourceOutcome::Failed {
            error: error.to_string(),
        }
    }
}

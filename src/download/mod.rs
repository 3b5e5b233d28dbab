//! Resource acquisition: saving a record's files to disk.
//!
//! Each resource is written to `{destination}/{dir}/{filename}` where
//! `{dir}` comes from [`crate::store::dataset_dir_name`] and `{filename}` from
//! [`resource_filename`]. Every resource is handled independently; a failed
//! one is reported and the loop moves on. The record side-car is written last,
//! whatever happened to the resources.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use datos_core::download::{DownloadOptions, Downloader};
//! use datos_core::fetch::HttpFetcher;
//! use datos_core::record::DatasetRecord;
//! use datos_core::report::TracingReporter;
//!
//! # async fn example(record: DatasetRecord) -> Result<(), Box<dyn std::error::Error>> {
//! let downloader = Downloader::new(Arc::new(HttpFetcher::new()?), Arc::new(TracingReporter));
//! let report = downloader.download(&record, &DownloadOptions::default()).await;
//! println!("{} files written to {}", report.downloaded_count(), report.dataset_dir.display());
//! # Ok(())
//! # }
//! ```

mod engine;
mod error;
pub mod filename;

pub use engine::{
    DEFAULT_REQUEST_DELAY, DownloadOptions, DownloadReport, Downloader, ResourceOutcome,
    ResourceReport,
};
pub use error::DownloadError;
pub use filename::resource_filename;

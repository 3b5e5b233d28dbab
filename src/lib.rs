//! Datos Core Library
//!
//! Resolves dataset references on an open-data portal into structured
//! records, classifies their resources, downloads them to disk and loads
//! tabular resources into memory.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`fetch`] - HTTP transport behind the [`PageFetcher`] trait
//! - [`resolver`] - Detail-page scraping, structured metadata and topic search
//! - [`catalog`] - Resource classification (data, dictionary, other)
//! - [`dictionary`] - Data-dictionary retrieval and caching
//! - [`download`] - Per-dataset resource download loop
//! - [`tabular`] - Delimited, spreadsheet, JSON and Parquet loading
//! - [`store`] - Record side-car persistence
//! - [`report`] - Failure reporting sinks
//! - [`config`] - TOML configuration for the CLI

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod categories;
pub mod config;
pub mod dictionary;
pub mod download;
pub mod fetch;
pub mod record;
pub mod report;
pub mod resolver;
pub mod store;
pub mod tabular;
pub(crate) mod user_agent;

#[cfg(test)]
pub mod test_support;

// Re-export commonly used types
pub use catalog::{Classification, ResourceKind, classify, classify_record};
pub use categories::Category;
pub use config::{ConfigError, DatosConfig, LoadedConfig};
pub use dictionary::{DictionaryOptions, DictionaryResolver};
pub use download::{
    DownloadError, DownloadOptions, DownloadReport, Downloader, ResourceOutcome, ResourceReport,
};
pub use fetch::{FetchError, FetchOptions, FetchResponse, HttpFetcher, PageFetcher, ProbeResult};
pub use record::{DataDictionary, DatasetRecord, RecordBuilder, Resource};
pub use report::{LogFileReporter, Reporter, TracingReporter};
pub use resolver::{
    CatalogSearch, MetadataResolver, Resolution, ResolveFailure, ResolverOptions, SearchOptions,
};
pub use store::StoreError;
pub use tabular::{LoadError, LoadOptions, Table, TabularSource};

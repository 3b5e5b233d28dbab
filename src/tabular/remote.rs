//! Loading a record's data resource, locally if already downloaded.

use std::path::PathBuf;

use tracing::{debug, instrument, warn};

use super::error::LoadError;
use super::{LoadOptions, Table, TabularSource, load};
use crate::catalog::classify_record;
use crate::download::resource_filename;
use crate::fetch::{FetchOptions, PageFetcher};
use crate::record::{DatasetRecord, Resource};
use crate::store;

/// Which data resource of a record to load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResourceSelector {
    /// The first data resource.
    #[default]
    First,
    /// Position among the record's data resources.
    Index(usize),
    /// Target filename, resource name or URL suffix.
    FileName(String),
}

/// Options for [`load_resource`].
#[derive(Debug, Clone)]
pub struct RemoteLoadOptions {
    /// Root holding downloaded datasets; checked before fetching.
    pub root: PathBuf,
    pub fetch: FetchOptions,
    /// Write the lossy-decoded text next to the resource when delimited
    /// loading reaches its last resort.
    pub materialize_decoded: bool,
}

impl Default for RemoteLoadOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from(store::DEFAULT_ROOT),
            fetch: FetchOptions::default(),
            materialize_decoded: false,
        }
    }
}

/// Loads one data resource of `record` as a table.
///
/// Resources are picked among the data-classified ones (all resources when
/// none classify as data). A copy under `{root}/{dir}/` is preferred over a
/// network fetch.
///
/// # Errors
///
/// Returns [`LoadError::NoResources`] for a record without resources,
/// [`LoadError::Fetch`] when the remote copy cannot be retrieved, or any
/// error of [`load`].
#[instrument(skip(fetcher, record, options), fields(dataset = %record.id))]
pub async fn load_resource(
    fetcher: &dyn PageFetcher,
    record: &DatasetRecord,
    selector: &ResourceSelector,
    options: &RemoteLoadOptions,
) -> Result<Table, LoadError> {
    let classification = classify_record(record);
    let candidates = if classification.data.is_empty() {
        record.resources()
    } else {
        classification.data
    };
    let resource = select(&candidates, selector).ok_or_else(|| LoadError::NoResources {
        dataset: store::dataset_dir_name(record),
    })?;

    let filename = resource_filename(resource);
    let dataset_dir = store::dataset_dir(&options.root, record);
    let local = dataset_dir.join(&filename);
    let load_options = LoadOptions {
        declared_format: resource.declared_format(),
        materialize_to: options
            .materialize_decoded
            .then(|| dataset_dir.join(format!("decoded_{filename}"))),
    };

    if local.is_file() {
        debug!(path = %local.display(), "loading local copy");
        return load(&TabularSource::Path(local), &load_options);
    }

    let url = resource.url.trim();
    if url.is_empty() {
        return Err(LoadError::fetch(url, "resource has no URL"));
    }
    debug!(url, "fetching resource");
    let response = fetcher
        .fetch(url, &options.fetch)
        .await
        .map_err(|e| LoadError::fetch(url, e))?;
    if !response.is_success() {
        return Err(LoadError::fetch(url, format!("HTTP {}", response.status)));
    }
    load(&TabularSource::bytes(response.body, filename), &load_options)
}

fn select<'a>(candidates: &'a [Resource], selector: &ResourceSelector) -> Option<&'a Resource> {
    match selector {
        ResourceSelector::First => candidates.first(),
        ResourceSelector::Index(index) => candidates.get(*index).or_else(|| {
            warn!(index, available = candidates.len(), "resource index out of range, using 0");
            candidates.first()
        }),
        ResourceSelector::FileName(name) => candidates
            .iter()
            .find(|resource| {
                resource_filename(resource) == *name
                    || resource.name == *name
                    || resource.url.ends_with(name.as_str())
            })
            .or_else(|| {
                warn!(name = %name, "no resource matches, using the first one");
                candidates.first()
            }),
    }
}

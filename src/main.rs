//! CLI entry point for the datos tool.

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use datos_core::{
    CatalogSearch, DatosConfig, DictionaryOptions, DictionaryResolver, DownloadOptions,
    Downloader, HttpFetcher, LoadOptions, LogFileReporter, MetadataResolver, PageFetcher,
    Reporter, ResolverOptions, ResourceOutcome, SearchOptions, Table, TabularSource,
    TracingReporter, config, store, tabular,
};
use datos_core::categories::Category;
use datos_core::fetch::{DEFAULT_REQUEST_TIMEOUT_SECS, FetchOptions};
use datos_core::resolver::DEFAULT_BASE_URL;
use tracing::{debug, info, warn};

mod cli;

use cli::{Args, Command, DictionaryArgs, DownloadArgs, LoadArgs, ResolveArgs, SearchArgs};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let file_config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => {
            let loaded = config::load_default_config()?;
            if let Some(path) = loaded.path.as_ref().filter(|_| loaded.config.is_some()) {
                debug!(path = %path.display(), "loaded config file");
            }
            loaded.config_or_default()
        }
    };
    let context = RunContext::new(&args, file_config)?;

    match args.command {
        Command::Resolve(resolve) => run_resolve(&context, resolve).await,
        Command::Download(download) => run_download(&context, download).await,
        Command::Dictionary(dictionary) => run_dictionary(&context, dictionary).await,
        Command::Load(load) => run_load(&load),
        Command::Search(search) => run_search(&context, search, args.quiet).await,
    }
}

/// Shared collaborators for one invocation.
struct RunContext {
    config: DatosConfig,
    base_url: String,
    fetcher: Arc<dyn PageFetcher>,
    reporter: Arc<dyn Reporter>,
}

impl RunContext {
    fn new(args: &Args, config: DatosConfig) -> Result<Self> {
        let base_url = args
            .base_url
            .clone()
            .or_else(|| config.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if url::Url::parse(&base_url).is_err() {
            bail!("Invalid base URL: {base_url}");
        }

        let fetcher: Arc<dyn PageFetcher> =
            Arc::new(HttpFetcher::new().context("failed to build HTTP client")?);
        let reporter: Arc<dyn Reporter> = match &config.log_dir {
            Some(dir) => {
                debug!(dir = %dir.display(), "reporting failures to log files");
                Arc::new(LogFileReporter::new(dir))
            }
            None => Arc::new(TracingReporter),
        };

        Ok(Self {
            config,
            base_url,
            fetcher,
            reporter,
        })
    }

    fn report_errors(&self) -> bool {
        self.config.report_errors.unwrap_or(true)
    }

    fn destination(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.or_else(|| self.config.destination.clone())
            .unwrap_or_else(|| PathBuf::from(store::DEFAULT_ROOT))
    }

    fn timeout(&self, flag: Option<u64>) -> Duration {
        Duration::from_secs(
            flag.or(self.config.timeout_secs)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    fn fetch_options(&self, insecure: bool, timeout: Duration) -> FetchOptions {
        FetchOptions::default()
            .with_verify_ssl(!insecure && self.config.verify_ssl.unwrap_or(true))
            .with_timeout(timeout)
    }

    fn resolver(&self, fetch: FetchOptions) -> MetadataResolver {
        MetadataResolver::new(
            Arc::clone(&self.fetcher),
            Arc::clone(&self.reporter),
            ResolverOptions {
                base_url: self.base_url.clone(),
                fetch,
                report_errors: self.report_errors(),
            },
        )
    }

    fn default_resolver(&self) -> MetadataResolver {
        self.resolver(self.fetch_options(false, self.timeout(None)))
    }
}

async fn run_resolve(context: &RunContext, args: ResolveArgs) -> Result<()> {
    let resolution = context.default_resolver().resolve(&args.reference).await;
    if let Some(failure) = &resolution.failure {
        bail!("Could not resolve {}: {failure}", args.reference);
    }
    let record = resolution.into_record();
    if args.save {
        let root = context.destination(args.dest);
        let path = store::save_record(&root, &record)?;
        info!(path = %path.display(), "record saved");
    }
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

async fn run_download(context: &RunContext, args: DownloadArgs) -> Result<()> {
    let timeout = context.timeout(args.timeout);
    let fetch = context.fetch_options(args.insecure, timeout);
    let resolution = context.resolver(fetch).resolve(&args.reference).await;
    if let Some(failure) = &resolution.failure {
        warn!(reference = %args.reference, %failure, "continuing with unresolved record");
    }
    let record = resolution.into_record();

    let max_size = args
        .max_size
        .or(context.config.max_size)
        .and_then(config::size_limit);
    let options = DownloadOptions {
        destination: context.destination(args.dest),
        report_errors: context.report_errors(),
        skip_existing: !args.no_skip_existing && context.config.skip_existing.unwrap_or(true),
        verify_ssl: !args.insecure && context.config.verify_ssl.unwrap_or(true),
        max_size,
        timeout,
        request_delay: request_delay(args.delay_ms.or(context.config.request_delay_ms)),
    };

    let downloader = Downloader::new(Arc::clone(&context.fetcher), Arc::clone(&context.reporter));
    let report = downloader.download(&record, &options).await;
    for resource in &report.resources {
        match &resource.outcome {
            ResourceOutcome::Downloaded { path, bytes } => {
                info!(path = %path.display(), bytes, "downloaded");
            }
            ResourceOutcome::SkippedExisting { path } => {
                info!(path = %path.display(), "already present, skipped");
            }
            ResourceOutcome::SkippedTooLarge { size, max_size } => {
                info!(name = %resource.resource.name, size, max_size, "too large, skipped");
            }
            ResourceOutcome::Failed { error } => {
                warn!(name = %resource.resource.name, %error, "failed");
            }
        }
    }
    info!(
        dir = %report.dataset_dir.display(),
        downloaded = report.downloaded_count(),
        skipped = report.skipped_count(),
        failed = report.failed_count(),
        "Download complete"
    );
    Ok(())
}

async fn run_dictionary(context: &RunContext, args: DictionaryArgs) -> Result<()> {
    let resolution = context.default_resolver().resolve(&args.reference).await;
    if let Some(failure) = &resolution.failure {
        bail!("Could not resolve {}: {failure}", args.reference);
    }
    let mut record = resolution.into_record();

    let dictionaries = DictionaryResolver::new(
        Arc::clone(&context.fetcher),
        Arc::clone(&context.reporter),
        DictionaryOptions {
            fetch: context.fetch_options(false, context.timeout(None)),
            report_errors: context.report_errors(),
        },
    );
    match dictionaries.resolve_dictionary(&mut record).await {
        Some(text) => println!("{text}"),
        None if record.data_dictionary.is_resolved() => {
            info!(reference = %args.reference, "dataset has no data dictionary");
        }
        None => bail!("Could not retrieve the data dictionary of {}", args.reference),
    }
    Ok(())
}

fn run_load(args: &LoadArgs) -> Result<()> {
    let options = LoadOptions {
        declared_format: args.format.clone(),
        materialize_to: None,
    };
    let table = tabular::load(&TabularSource::path(&args.path), &options)?;
    print_table(&table, args.rows);
    info!(
        columns = table.column_count(),
        rows = table.row_count(),
        "Loaded {}",
        args.path.display()
    );
    Ok(())
}

async fn run_search(context: &RunContext, args: SearchArgs, quiet: bool) -> Result<()> {
    let category: Category = args.category.parse()?;
    let options = SearchOptions {
        limit: args.limit,
        expansion_delay: request_delay(context.config.request_delay_ms),
        show_progress: !quiet && io::stderr().is_terminal(),
    };
    let records = CatalogSearch::new(context.default_resolver(), options)
        .search(&category)
        .await;

    if args.save {
        let root = context.destination(args.dest);
        store::save_records(&root, &records)?;
        info!(root = %root.display(), count = records.len(), "records saved");
    }
    for record in &records {
        println!("{}\t{}", store::dataset_dir_name(record), record.title);
    }
    info!(category = %category, count = records.len(), "Search complete");
    Ok(())
}

fn request_delay(millis: Option<u64>) -> Duration {
    millis.map_or(datos_core::download::DEFAULT_REQUEST_DELAY, Duration::from_millis)
}

fn print_table(table: &Table, rows: usize) {
    println!("{}", table.columns.join("\t"));
    for row in table.rows.iter().take(rows) {
        println!("{}", row.join("\t"));
    }
}

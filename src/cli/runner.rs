//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::PagerConfig;
use crate::error::{Error, Result, ResultExt};
use crate::pager::{Pager, Snapshot};
use crate::query::{parse_filters, parse_sort_key, Filter};
use crate::source::{DataSource, DuckDbSource, MemorySource};
use crate::triggers::Trigger;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Kind of data file behind `browse --source`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceKind {
    /// JSON array of records, loaded into memory
    Json,
    /// DuckDB database file
    DuckDb,
}

impl SourceKind {
    fn detect(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "json" => Ok(Self::Json),
            "duckdb" | "ddb" | "db" => Ok(Self::DuckDb),
            _ => Err(Error::config(format!(
                "Unsupported source file '{}' (expected .json, .duckdb, .ddb or .db)",
                path.display()
            ))),
        }
    }
}

/// Arguments of `browse`, borrowed from the parsed command line
struct BrowseArgs<'a> {
    source: &'a Path,
    table: Option<&'a str>,
    page_size: Option<usize>,
    sort: &'a [String],
    filter: &'a [String],
    threshold: usize,
    limit: Option<usize>,
}

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Browse {
                source,
                table,
                page_size,
                sort,
                filter,
                threshold,
                limit,
            } => {
                self.browse(BrowseArgs {
                    source,
                    table: table.as_deref(),
                    page_size: *page_size,
                    sort,
                    filter,
                    threshold: *threshold,
                    limit: *limit,
                })
                .await
            }
            Commands::Validate => self.validate(),
        }
    }

    /// Load the config file, or defaults when none was given
    fn load_config(&self) -> Result<PagerConfig> {
        match &self.cli.config {
            Some(path) => PagerConfig::from_file(path),
            None => Ok(PagerConfig::default()),
        }
    }

    /// Validate a pager configuration file
    fn validate(&self) -> Result<()> {
        let path = self
            .cli
            .config
            .as_ref()
            .ok_or_else(|| Error::config("Config file not specified (use -C flag)"))?;
        let config = PagerConfig::from_file(path)?;

        let filter_fields = config
            .filter
            .as_ref()
            .map(|f| f.fields().join(", "))
            .unwrap_or_else(|| "none".to_string());

        self.output_message(&json!({
            "type": "LOG",
            "log": {
                "level": "INFO",
                "message": format!(
                    "Pager config '{}' is valid: page_size {}, {} sort keys, filter fields: {}",
                    path.display(),
                    config.page_size,
                    config.sort.len(),
                    filter_fields
                )
            }
        }));

        Ok(())
    }

    /// Simulate a scrolling list over a data file
    async fn browse(&self, args: BrowseArgs<'_>) -> Result<()> {
        let started = Instant::now();
        let config = merge_config(self.load_config()?, &args)?;
        let source = open_source(args.source, args.table)?;

        tracing::info!(
            source = %args.source.display(),
            page_size = config.page_size,
            threshold = args.threshold,
            "Browsing"
        );

        let pager = Pager::from_shared(source, &config, config.log.into())?;
        let trigger = Trigger::threshold(args.threshold);

        pager.attach()?;
        let mut snapshot = pager.settled().await?;
        let mut shown = 0;

        loop {
            if args.limit.is_some_and(|limit| shown >= limit) {
                break;
            }

            if let Some(item) = snapshot.items.get(shown) {
                self.output_record(shown, item);
                shown += 1;
                if pager.on_appear(item, &trigger)? {
                    snapshot = pager.settled().await?;
                }
                continue;
            }

            if !snapshot.is_loadable() {
                break;
            }

            // Duplicate records can hide the threshold item; ask directly
            pager.load_more()?;
            snapshot = pager.settled().await?;
            if snapshot.len() <= shown && snapshot.is_loadable() {
                tracing::warn!(shown, "Source returned no new items; stopping");
                break;
            }
        }

        let status = if snapshot.error().is_some() {
            "FAILED"
        } else {
            "SUCCESS"
        };
        self.output_summary(&snapshot, shown, status, started);

        match snapshot.error() {
            Some(e) => Err(Error::data_source(e.to_string()))
                .with_context(|| format!("Browsing {} failed", args.source.display())),
            None => Ok(()),
        }
    }

    /// Output one shown item
    fn output_record(&self, index: usize, item: &Value) {
        self.output_message(&json!({
            "type": "RECORD",
            "record": {
                "index": index,
                "data": item
            }
        }));
    }

    /// Output the closing summary
    fn output_summary(&self, snapshot: &Snapshot<Value>, shown: usize, status: &str, started: Instant) {
        let mut summary = json!({
            "status": status,
            "state": snapshot.state.name(),
            "items_shown": shown,
            "items_loaded": snapshot.len(),
            "total": snapshot.total,
            "fetches": snapshot.stats.fetches_started,
            "pages": snapshot.stats.pages_applied,
            "failures": snapshot.stats.failures,
            "duration_ms": started.elapsed().as_millis() as u64
        });
        if let Some(e) = snapshot.error() {
            summary["error"] = json!(e.to_string());
        }

        self.output_message(&json!({
            "type": "SUMMARY",
            "summary": summary
        }));
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Apply command line overrides to the loaded config
fn merge_config(mut config: PagerConfig, args: &BrowseArgs<'_>) -> Result<PagerConfig> {
    if let Some(page_size) = args.page_size {
        config.page_size = page_size;
    }

    if !args.sort.is_empty() {
        config.sort = args
            .sort
            .iter()
            .map(|expr| parse_sort_key(expr))
            .collect::<Result<Vec<_>>>()?;
    }

    if let Some(extra) = parse_filters(args.filter)? {
        config.filter = Some(match config.filter.take() {
            Some(existing) => Filter::and(vec![existing, extra]),
            None => extra,
        });
    }

    config.validate()?;
    Ok(config)
}

/// Open the data file as a record source
fn open_source(path: &Path, table: Option<&str>) -> Result<Arc<dyn DataSource<Value>>> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.display().to_string(),
        });
    }

    match SourceKind::detect(path)? {
        SourceKind::Json => {
            let contents = fs::read_to_string(path)?;
            let records: Vec<Value> = serde_json::from_str(&contents)
                .with_context(|| format!("{} must hold a JSON array", path.display()))?;
            tracing::debug!(records = records.len(), "Loaded JSON records");
            Ok(Arc::new(MemorySource::new(records)))
        }
        SourceKind::DuckDb => {
            let table =
                table.ok_or_else(|| Error::config("DuckDB sources need a table (use --table)"))?;
            Ok(Arc::new(DuckDbSource::<Value>::open(path, table)?))
        }
    }
}

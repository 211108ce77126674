//! Directory ingestion pipeline
//!
//! One walker thread finds `.table` files, a pool of parse workers turns
//! each into a [`Table`], and a single aggregator thread records results
//! into the [`Catalog`]. Only the aggregator touches the catalog.
//!
//! ```text
//! walker --paths--> workers (N) --IngestMessage--> aggregator --> Catalog
//! ```
//!
//! The first error (walk, read, parse or record) ends the whole ingestion.
//! Dropping the aggregator's receiver makes every upstream send fail, so
//! the other threads wind down on their own.

use crate::catalog::Catalog;
use crate::extract;
use crate::syntax::SourceParser;
use crate::table::Table;
use crate::{Error, IngestMessage, Result};
use crossbeam::channel::{self, Receiver, Sender};
use std::path::{Path, PathBuf};
use std::thread;

/// Tuning for [`Ingestor`].
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Spec file extension, without the dot
    pub extension: String,
    /// Parse worker threads
    pub workers: usize,
    /// Capacity of each hand-off channel
    pub channel_capacity: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            extension: "table".to_string(),
            workers: thread::available_parallelism().map(|n| n.get()).unwrap_or(4),
            channel_capacity: 1000,
        }
    }
}

/// A table and the file it came from.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub table: Table,
}

pub struct Ingestor {
    options: IngestOptions,
}

impl Ingestor {
    pub fn new(options: IngestOptions) -> Self {
        Self { options }
    }

    /// Walk `root` and extract every spec file beneath it.
    pub fn parse_directory(&self, root: &Path) -> Result<Catalog> {
        let capacity = self.options.channel_capacity.max(1);
        let (path_tx, path_rx) = channel::bounded::<PathBuf>(capacity);
        let (msg_tx, msg_rx) = channel::bounded::<IngestMessage>(capacity);

        tracing::debug!(root = %root.display(), workers = self.options.workers, "Walking base directory");

        thread::scope(|scope| {
            let walk_tx = msg_tx.clone();
            let extension = self.options.extension.as_str();
            scope.spawn(move || walk(root, extension, path_tx, walk_tx));

            for _ in 0..self.options.workers.max(1) {
                let paths = path_rx.clone();
                let results = msg_tx.clone();
                scope.spawn(move || parse_worker(paths, results));
            }
            drop(path_rx);
            drop(msg_tx);

            let aggregator = scope.spawn(move || aggregate(msg_rx));
            aggregator
                .join()
                .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
        })
    }

    /// Extract the table declared in one spec file.
    pub fn parse_table_file(path: &Path) -> Result<Table> {
        let mut parser = SourceParser::new()?;
        parse_file(&mut parser, path)
    }
}

impl Default for Ingestor {
    fn default() -> Self {
        Self::new(IngestOptions::default())
    }
}

/// Extract a table from source text; `name` is the provisional table name.
pub fn parse_table_source(parser: &mut SourceParser, name: &str, origin: &str, content: &str) -> Result<Table> {
    let module = parser.parse(origin, content)?;
    extract::extract_table(name, &module)
}

fn parse_file(parser: &mut SourceParser, path: &Path) -> Result<Table> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        tracing::debug!(file = %path.display(), error = %e, "Error opening spec file");
        Error::from(e).in_file(path)
    })?;
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let origin = path.display().to_string();

    parse_table_source(parser, &stem, &origin, &content).map_err(|e| e.in_file(path))
}

fn walk(root: &Path, extension: &str, paths: Sender<PathBuf>, errors: Sender<IngestMessage>) {
    let walker = ignore::WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(true)
        .build();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let _ = errors.send(IngestMessage::Failed(Error::Walk(e)));
                return;
            }
        };
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        let matches = entry.path().extension().and_then(|e| e.to_str()) == Some(extension);
        if !is_file || !matches {
            continue;
        }
        if paths.send(entry.into_path()).is_err() {
            // Aggregator has stopped; nothing left to do.
            return;
        }
    }
    tracing::debug!("Directory walk finished");
}

fn parse_worker(paths: Receiver<PathBuf>, results: Sender<IngestMessage>) {
    let mut parser = match SourceParser::new() {
        Ok(parser) => parser,
        Err(e) => {
            let _ = results.send(IngestMessage::Failed(e));
            return;
        }
    };

    for path in paths {
        let message = match parse_file(&mut parser, &path) {
            Ok(table) => IngestMessage::Parsed(SourceFile { path, table }),
            Err(e) => {
                tracing::warn!(error = %e, "Error parsing spec file");
                IngestMessage::Failed(e)
            }
        };
        if results.send(message).is_err() {
            return;
        }
    }
}

fn aggregate(messages: Receiver<IngestMessage>) -> Result<Catalog> {
    tracing::debug!("Starting record keeping worker");
    let mut catalog = Catalog::new();
    for message in messages {
        match message {
            IngestMessage::Parsed(source) => catalog.record(source)?,
            IngestMessage::Failed(e) => return Err(e),
        }
    }
    tracing::debug!(
        namespaces = catalog.namespaces().count(),
        tables = catalog.table_count(),
        "Shutting down record keeping worker"
    );
    Ok(catalog)
}

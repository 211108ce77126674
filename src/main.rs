//! osqt CLI - extract, export and serve osquery table specifications

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use osqt::config::{self, OsqtConfig};
use osqt::{platform, ui, Catalog, Database, IngestOptions, Ingestor};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "osqt")]
#[command(version)]
#[command(about = "osquery table toolkit - structured schema extraction from .table specs")]
#[command(long_about = r#"
osqt reads the osquery `.table` specification tree and turns it into:
  • A JSON or YAML document of every namespace, table and column
  • An in-memory relational database with one empty table per spec
  • A small HTTP front for listing tables and running queries

Example usage:
  osqt export --specs-dir ./osquery/specs --output-format yaml
  osqt tables --specs-dir ./osquery/specs --namespace linux
  osqt serve --schema schema.json --target-os linux
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ./osqt.toml when present)
    #[arg(short, long, global = true, env = "OSQT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

impl OutputFormat {
    fn parse_config(value: &str) -> anyhow::Result<Self> {
        <Self as ValueEnum>::from_str(value, true)
            .map_err(|_| anyhow::anyhow!("unsupported output format {:?} (json, yaml)", value))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Extract every spec and write the schema document
    Export {
        /// Root of the `.table` spec tree
        #[arg(short, long, env = "OSQT_SPECS_DIR")]
        specs_dir: Option<PathBuf>,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output_file: Option<PathBuf>,

        /// Document format
        #[arg(short = 'f', long, value_enum, env = "OSQT_OUTPUT_FORMAT")]
        output_format: Option<OutputFormat>,

        /// Parse worker threads
        #[arg(short, long, env = "OSQT_WORKERS")]
        workers: Option<usize>,
    },

    /// Serve the tables of one OS over HTTP
    Serve {
        /// Address to listen on
        #[arg(short, long, env = "OSQT_LISTEN_ADDR")]
        listen_addr: Option<String>,

        /// Previously exported schema document (json/yaml)
        #[arg(long, env = "OSQT_SCHEMA", conflicts_with = "specs_dir")]
        schema: Option<PathBuf>,

        /// Root of the `.table` spec tree
        #[arg(short, long, env = "OSQT_SPECS_DIR")]
        specs_dir: Option<PathBuf>,

        /// Target OS (defaults to the host OS)
        #[arg(short, long, env = "OSQT_TARGET_OS")]
        target_os: Option<String>,
    },

    /// List extracted tables
    Tables {
        /// Previously exported schema document (json/yaml)
        #[arg(long, env = "OSQT_SCHEMA", conflicts_with = "specs_dir")]
        schema: Option<PathBuf>,

        /// Root of the `.table` spec tree
        #[arg(short, long, env = "OSQT_SPECS_DIR")]
        specs_dir: Option<PathBuf>,

        /// Only tables from this namespace
        #[arg(short, long, conflicts_with = "target_os")]
        namespace: Option<String>,

        /// Only tables that apply to this OS
        #[arg(short, long)]
        target_os: Option<String>,

        /// Show the columns of one table
        #[arg(long)]
        table: Option<String>,
    },

    /// Write a starter osqt.toml
    Init {
        /// Spec tree to record in the config
        #[arg(short, long)]
        specs_dir: Option<PathBuf>,

        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },

    /// Print version information
    Version,
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if let Err(e) = run(cli) {
        ui::error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.clone();
    let settings = config::load_config(config_path.as_deref())?.unwrap_or_default();

    match cli.command {
        Commands::Export { specs_dir, output_file, output_format, workers } => {
            let format = match (output_format, settings.output_format.as_deref()) {
                (Some(format), _) => format,
                (None, Some(value)) => OutputFormat::parse_config(value)?,
                (None, None) => OutputFormat::Json,
            };
            let specs_dir = require_specs_dir(specs_dir, &settings)?;
            let catalog = ingest(&specs_dir, workers.or(settings.workers))?;

            let document = match format {
                OutputFormat::Json => catalog.to_json()?,
                OutputFormat::Yaml => catalog.to_yaml()?,
            };
            let format_name = match format {
                OutputFormat::Json => "json",
                OutputFormat::Yaml => "yaml",
            };

            match output_file {
                Some(path) => {
                    std::fs::write(&path, document)
                        .with_context(|| format!("writing {}", path.display()))?;
                    ui::written(&path, format_name);
                }
                None => println!("{}", document),
            }
        }

        Commands::Serve { listen_addr, schema, specs_dir, target_os } => {
            let listen_addr = listen_addr
                .or(settings.listen_addr.clone())
                .unwrap_or_else(|| "127.0.0.1:13306".to_string());
            let addr: SocketAddr = listen_addr
                .parse()
                .with_context(|| format!("invalid listen address {:?}", listen_addr))?;
            let target_os = target_os
                .or(settings.target_os.clone())
                .unwrap_or_else(|| platform::host_os().to_string());

            let catalog = load_catalog(schema, specs_dir, &settings)?;
            let db = Database::from_catalog(&catalog, &target_os)?;
            ui::info("Target OS", &ui::accent(&target_os));

            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(osqt::server::start_server(addr, db))?;
        }

        Commands::Tables { schema, specs_dir, namespace, target_os, table } => {
            let catalog = load_catalog(schema, specs_dir, &settings)?;

            let tables: Vec<_> = match (&namespace, &target_os) {
                (Some(ns), _) => {
                    let ns = catalog
                        .namespace(ns)
                        .ok_or_else(|| anyhow::anyhow!("namespace {:?} not found", ns))?;
                    catalog.tables().filter(|t| t.namespace.key == ns.key).collect()
                }
                (None, Some(os)) => catalog.tables_for_os(os)?,
                (None, None) => catalog.tables().collect(),
            };

            match table {
                Some(name) => {
                    let found = tables
                        .iter()
                        .find(|t| t.name == name)
                        .ok_or_else(|| anyhow::anyhow!("table {:?} not found", name))?;
                    ui::header(&format!("{} ({})", found.name, found.namespace.key));
                    if !found.description.is_empty() {
                        println!("{}", found.description);
                    }
                    for (slot, schema) in found.schemas() {
                        let filtered_out = target_os.as_deref().is_some_and(|os| !schema.applies_to(os));
                        if matches!(slot, osqt::table::SchemaSlot::Extended(_)) && filtered_out {
                            continue;
                        }
                        match slot {
                            osqt::table::SchemaSlot::Base => println!("{}", ui::dim("schema")),
                            osqt::table::SchemaSlot::Extended(platform) => {
                                println!("{}", ui::dim(&format!("extended_schema({})", platform)))
                            }
                        }
                        println!("{}", ui::table::columns_table(&schema.columns));
                    }
                }
                None if tables.is_empty() => ui::warn("No tables found"),
                None => println!("{}", ui::catalog_table(tables)),
            }
        }

        Commands::Init { specs_dir, force } => {
            let path = config_path.unwrap_or_else(config::default_config_path);
            let config = config::starter_config(specs_dir);
            config::write_config(&path, &config, force)?;
            ui::success(&format!("Wrote {}", path.display()));
        }

        Commands::Version => {
            println!("osqt {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn require_specs_dir(flag: Option<PathBuf>, settings: &OsqtConfig) -> anyhow::Result<PathBuf> {
    flag.or(settings.specs_dir.clone())
        .ok_or_else(|| anyhow::anyhow!("no spec directory given (use --specs-dir or set specs_dir in osqt.toml)"))
}

/// Catalog from an exported document when one is given, else from the spec tree.
fn load_catalog(schema: Option<PathBuf>, specs_dir: Option<PathBuf>, settings: &OsqtConfig) -> anyhow::Result<Catalog> {
    if specs_dir.is_none() {
        if let Some(schema) = schema.or(settings.schema.clone()) {
            let catalog = Catalog::load_schema_file(&schema)?;
            ui::info("Schema", &schema.display().to_string());
            return Ok(catalog);
        }
    }
    let specs_dir = require_specs_dir(specs_dir, settings)?;
    ingest(&specs_dir, settings.workers)
}

fn ingest(specs_dir: &Path, workers: Option<usize>) -> anyhow::Result<Catalog> {
    let mut options = IngestOptions::default();
    if let Some(workers) = workers {
        options.workers = workers;
    }

    ui::specs_dir(specs_dir);
    let started = Instant::now();
    let spinner = ui::Spinner::new("Extracting table specs");
    let catalog = match Ingestor::new(options).parse_directory(specs_dir) {
        Ok(catalog) => catalog,
        Err(e) => {
            spinner.clear();
            return Err(e.into());
        }
    };
    spinner.clear();

    ui::ingest_summary(catalog.namespaces().count(), catalog.table_count(), started.elapsed());
    Ok(catalog)
}

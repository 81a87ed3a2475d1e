use crate::config::{Config, load_config};
use crate::dump::{RecordsDump, TopologyDump, write_json};
use crate::ir::EntitySet;
use crate::pipeline::{RecomputeScheduler, TopologyEngine, TopologySnapshot};
use crate::sink::MemoryStore;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(
    name = "ntopo",
    version,
    about = "Derive the causal graph and layout of a signal network"
)]
pub struct Args {
    /// Entity snapshot (.json) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value = "snapshot")]
    pub format: OutputFormat,

    /// Config file (.json or .json5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Only derive the topology of this application
    #[arg(short = 'a', long = "app")]
    pub app: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Nodes, edges, components, routes and warnings per application
    Snapshot,
    /// Layout and edge records as the sink stores them
    Records,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(args.config.as_deref())?;
    let entities = read_entities(args.input.as_deref())?;
    let apps = match &args.app {
        Some(app) => vec![app.clone()],
        None => entities.app_ids(),
    };

    match args.format {
        OutputFormat::Snapshot => {
            let snapshots = compute_snapshots(&entities, &apps, config);
            let dumps: Vec<TopologyDump<'_>> = snapshots
                .iter()
                .map(|(app, snapshot)| TopologyDump::from_snapshot(app, snapshot))
                .collect();
            if dumps.len() == 1 {
                write_json(&dumps[0], args.output.as_deref())?;
            } else {
                write_json(&dumps, args.output.as_deref())?;
            }
        }
        OutputFormat::Records => {
            let store = write_records(&entities, &apps, config);
            write_json(&RecordsDump::from_store(&store), args.output.as_deref())?;
        }
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn read_entities(path: Option<&Path>) -> Result<EntitySet> {
    let content = match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("reading entities {}", path.display()))?,
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    parse_entities(&content)
}

fn parse_entities(content: &str) -> Result<EntitySet> {
    serde_json::from_str(content).context("entity snapshot is not valid JSON")
}

fn compute_snapshots(
    entities: &EntitySet,
    apps: &[String],
    config: Config,
) -> Vec<(String, Rc<TopologySnapshot>)> {
    let mut engine = TopologyEngine::new(config);
    apps.iter()
        .map(|app| (app.clone(), engine.compute(&entities.for_app(app))))
        .collect()
}

fn write_records(entities: &EntitySet, apps: &[String], config: Config) -> MemoryStore {
    let mut engine = TopologyEngine::new(config);
    let mut store = MemoryStore::new();
    for app in apps {
        let mut scheduler = RecomputeScheduler::new(app.as_str());
        scheduler.notify(entities.for_app(app));
        scheduler.flush(&mut engine, &mut store);
    }
    store
}

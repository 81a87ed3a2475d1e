use crate::layout::{Band, Bounds, NodeLayout};
use crate::pipeline::TopologySnapshot;
use crate::routing::EdgeRoute;
use crate::sink::{EdgeRecord, LayoutRecord, MemoryStore};
use crate::topology::Edge;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Serializable view of a snapshot for presentation layers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyDump<'a> {
    pub app_id: &'a str,
    pub fingerprint: String,
    pub nodes: &'a [NodeLayout],
    pub edges: &'a [Edge],
    pub components: Vec<ComponentDump>,
    pub routes: &'a [EdgeRoute],
    pub bounds: Bounds,
    pub converged: bool,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDump {
    pub index: usize,
    pub nodes: Vec<String>,
    pub edge_count: usize,
    pub band: Option<Band>,
}

impl<'a> TopologyDump<'a> {
    pub fn from_snapshot(app_id: &'a str, snapshot: &'a TopologySnapshot) -> Self {
        let components = snapshot
            .components
            .iter()
            .enumerate()
            .map(|(index, component)| ComponentDump {
                index,
                nodes: component.nodes.iter().map(|n| n.id.clone()).collect(),
                edge_count: component.edges.len(),
                band: snapshot.layout.bands.get(index).copied(),
            })
            .collect();
        Self {
            app_id,
            fingerprint: format!("{:016x}", snapshot.fingerprint),
            nodes: &snapshot.layout.nodes,
            edges: &snapshot.graph.edges,
            components,
            routes: &snapshot.routes,
            bounds: snapshot.layout.bounds,
            converged: snapshot.layout.converged,
            warnings: snapshot.warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Every record held by a store, grouped by kind.
#[derive(Debug, Serialize)]
pub struct RecordsDump<'a> {
    pub layouts: Vec<&'a LayoutRecord>,
    pub edges: Vec<&'a EdgeRecord>,
}

impl<'a> RecordsDump<'a> {
    pub fn from_store(store: &'a MemoryStore) -> Self {
        Self {
            layouts: store.layouts().collect(),
            edges: store.edges().collect(),
        }
    }
}

/// Writes pretty JSON to `path`, or to stdout when no path is given.
pub fn write_json<T: Serialize + ?Sized>(value: &T, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            let file = File::create(path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            serde_json::to_writer_pretty(&mut lock, value)?;
            lock.write_all(b"\n")?;
        }
    }
    Ok(())
}

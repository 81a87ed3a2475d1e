use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::pipeline::TopologySnapshot;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutRecord {
    pub app_id: String,
    pub node_id: String,
    pub x: f32,
    pub y: f32,
    pub activity_count: usize,
}

impl LayoutRecord {
    pub fn key(&self) -> String {
        layout_key(&self.app_id, &self.node_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeRecord {
    pub app_id: String,
    pub from: String,
    pub to: String,
    pub label: String,
    pub count: u32,
}

impl EdgeRecord {
    pub fn key(&self) -> String {
        edge_key(&self.app_id, &self.from, &self.to, &self.label)
    }
}

pub fn layout_key(app_id: &str, node_id: &str) -> String {
    format!("{app_id}::{node_id}")
}

pub fn edge_key(app_id: &str, from: &str, to: &str, label: &str) -> String {
    format!("{app_id}::{from}->{to}::{label}")
}

/// Indexed storage for derived state. Every write replaces one whole record.
pub trait DerivedStore {
    fn upsert_layout(&mut self, record: LayoutRecord);
    fn upsert_edge(&mut self, record: EdgeRecord);
    fn remove_layout(&mut self, key: &str) -> bool;
    fn remove_edge(&mut self, key: &str) -> bool;
    fn layout_keys(&self, app_id: &str) -> Vec<String>;
    fn edge_keys(&self, app_id: &str) -> Vec<String>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    layouts: BTreeMap<String, LayoutRecord>,
    edges: BTreeMap<String, EdgeRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layout(&self, app_id: &str, node_id: &str) -> Option<&LayoutRecord> {
        self.layouts.get(&layout_key(app_id, node_id))
    }

    pub fn edge(&self, app_id: &str, from: &str, to: &str, label: &str) -> Option<&EdgeRecord> {
        self.edges.get(&edge_key(app_id, from, to, label))
    }

    pub fn layouts_for_app(&self, app_id: &str) -> Vec<&LayoutRecord> {
        self.layouts
            .values()
            .filter(|record| record.app_id == app_id)
            .collect()
    }

    pub fn edges_for_app(&self, app_id: &str) -> Vec<&EdgeRecord> {
        self.edges
            .values()
            .filter(|record| record.app_id == app_id)
            .collect()
    }

    pub fn layouts(&self) -> impl Iterator<Item = &LayoutRecord> {
        self.layouts.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &EdgeRecord> {
        self.edges.values()
    }

    pub fn len(&self) -> usize {
        self.layouts.len() + self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DerivedStore for MemoryStore {
    fn upsert_layout(&mut self, record: LayoutRecord) {
        self.layouts.insert(record.key(), record);
    }

    fn upsert_edge(&mut self, record: EdgeRecord) {
        self.edges.insert(record.key(), record);
    }

    fn remove_layout(&mut self, key: &str) -> bool {
        self.layouts.remove(key).is_some()
    }

    fn remove_edge(&mut self, key: &str) -> bool {
        self.edges.remove(key).is_some()
    }

    fn layout_keys(&self, app_id: &str) -> Vec<String> {
        self.layouts
            .iter()
            .filter(|(_, record)| record.app_id == app_id)
            .map(|(key, _)| key.clone())
            .collect()
    }

    fn edge_keys(&self, app_id: &str) -> Vec<String> {
        self.edges
            .iter()
            .filter(|(_, record)| record.app_id == app_id)
            .map(|(key, _)| key.clone())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub layouts_written: usize,
    pub edges_written: usize,
    pub removed: usize,
}

pub fn layout_records(app_id: &str, snapshot: &TopologySnapshot) -> Vec<LayoutRecord> {
    snapshot
        .layout
        .nodes
        .iter()
        .map(|node| LayoutRecord {
            app_id: app_id.to_string(),
            node_id: node.id.clone(),
            x: node.x,
            y: node.y,
            activity_count: node.activity_count,
        })
        .collect()
}

pub fn edge_records(app_id: &str, snapshot: &TopologySnapshot) -> Vec<EdgeRecord> {
    snapshot
        .graph
        .edges
        .iter()
        .map(|edge| EdgeRecord {
            app_id: app_id.to_string(),
            from: edge.from.clone(),
            to: edge.to.clone(),
            label: edge.label.clone(),
            count: edge.count,
        })
        .collect()
}

/// Upserts one record per node and per edge. With `prune`, records of `app_id` that
/// this snapshot no longer contains are removed after the upserts.
pub fn write_snapshot<S: DerivedStore + ?Sized>(
    store: &mut S,
    app_id: &str,
    snapshot: &TopologySnapshot,
    prune: bool,
) -> WriteSummary {
    let mut summary = WriteSummary::default();
    let mut written_layouts = BTreeSet::new();
    let mut written_edges = BTreeSet::new();

    for record in layout_records(app_id, snapshot) {
        written_layouts.insert(record.key());
        store.upsert_layout(record);
        summary.layouts_written += 1;
    }
    for record in edge_records(app_id, snapshot) {
        written_edges.insert(record.key());
        store.upsert_edge(record);
        summary.edges_written += 1;
    }

    if prune {
        for key in store.layout_keys(app_id) {
            if !written_layouts.contains(&key) && store.remove_layout(&key) {
                summary.removed += 1;
            }
        }
        for key in store.edge_keys(app_id) {
            if !written_edges.contains(&key) && store.remove_edge(&key) {
                summary.removed += 1;
            }
        }
    }

    debug!(
        app_id,
        layouts = summary.layouts_written,
        edges = summary.edges_written,
        removed = summary.removed,
        "sink: snapshot written"
    );
    summary
}

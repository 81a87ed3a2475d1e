use std::rc::Rc;
use tracing::debug;

use crate::components::{Component, partition};
use crate::config::Config;
use crate::error::TopologyWarning;
use crate::ir::EntitySet;
use crate::layout::{Layout, compute_layout};
use crate::routing::{EdgeRoute, route_edges};
use crate::sink::{DerivedStore, WriteSummary, write_snapshot};
use crate::topology::{Graph, build_topology, classifier_for};

/// Everything derived from one entity set.
#[derive(Debug, Clone, Default)]
pub struct TopologySnapshot {
    pub fingerprint: u64,
    pub graph: Graph,
    pub components: Vec<Component>,
    pub layout: Layout,
    pub routes: Vec<EdgeRoute>,
    pub warnings: Vec<TopologyWarning>,
}

impl TopologySnapshot {
    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }
}

/// Builder → partitioner → layout → router, run to completion.
///
/// `entities` should already be scoped to one application (see [`EntitySet::for_app`]).
pub fn compute_topology(entities: &EntitySet, config: &Config) -> TopologySnapshot {
    let classifier = classifier_for(config.topology.roles);
    let built = build_topology(entities, classifier.as_ref());
    let components = partition(&built.graph);
    let layout = compute_layout(&components, &config.layout);
    let (routes, route_warnings) = route_edges(&built.graph.edges, &layout, &config.routing);

    let mut warnings = built.warnings;
    warnings.extend(layout.warnings.iter().cloned());
    warnings.extend(route_warnings);

    debug!(
        nodes = built.graph.nodes.len(),
        edges = built.graph.edges.len(),
        components = components.len(),
        warnings = warnings.len(),
        "pipeline: topology computed"
    );

    TopologySnapshot {
        fingerprint: entities.fingerprint(),
        graph: built.graph,
        components,
        layout,
        routes,
        warnings,
    }
}

/// Memoizes [`compute_topology`] by the fingerprint of the last entity set seen.
#[derive(Debug, Clone, Default)]
pub struct TopologyEngine {
    config: Config,
    cached: Option<Rc<TopologySnapshot>>,
    runs: usize,
    hits: usize,
}

impl TopologyEngine {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replaces the configuration and drops the cached snapshot.
    pub fn set_config(&mut self, config: Config) {
        self.config = config;
        self.cached = None;
    }

    pub fn compute(&mut self, entities: &EntitySet) -> Rc<TopologySnapshot> {
        let fingerprint = entities.fingerprint();
        if let Some(cached) = &self.cached
            && cached.fingerprint == fingerprint
        {
            self.hits += 1;
            debug!(fingerprint, "pipeline: cache hit");
            return Rc::clone(cached);
        }
        let snapshot = Rc::new(compute_topology(entities, &self.config));
        self.runs += 1;
        self.cached = Some(Rc::clone(&snapshot));
        snapshot
    }

    /// Pipeline runs actually executed.
    pub fn runs(&self) -> usize {
        self.runs
    }

    pub fn cache_hits(&self) -> usize {
        self.hits
    }
}

#[derive(Debug, Clone)]
pub struct RunReport {
    /// Entity-change notifications folded into this run.
    pub coalesced: usize,
    pub snapshot: Rc<TopologySnapshot>,
    pub write: WriteSummary,
}

/// Folds bursts of entity-change notifications into a single recomputation.
///
/// The host calls [`RecomputeScheduler::notify`] for every change and
/// [`RecomputeScheduler::flush`] once its current turn of work is done; only the latest
/// entity set is computed and written.
#[derive(Debug, Clone)]
pub struct RecomputeScheduler {
    app_id: String,
    pending: Option<EntitySet>,
    coalesced: usize,
}

impl RecomputeScheduler {
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            pending: None,
            coalesced: 0,
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Queues `entities` for the next flush, keeping only this scheduler's application.
    pub fn notify(&mut self, entities: EntitySet) {
        self.pending = Some(entities.for_app(&self.app_id));
        self.coalesced += 1;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn flush<S: DerivedStore + ?Sized>(
        &mut self,
        engine: &mut TopologyEngine,
        store: &mut S,
    ) -> Option<RunReport> {
        let entities = self.pending.take()?;
        let coalesced = std::mem::take(&mut self.coalesced);
        let snapshot = engine.compute(&entities);
        let prune = engine.config().sink.prune_stale;
        let write = write_snapshot(store, &self.app_id, &snapshot, prune);
        debug!(app_id = %self.app_id, coalesced, "pipeline: flushed");
        Some(RunReport {
            coalesced,
            snapshot,
            write,
        })
    }
}

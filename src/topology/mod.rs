mod names;
mod roles;

pub use names::{canonical_optional, canonical_signal_name, is_valid_owner};
pub use roles::{PositionalRoles, RoleClassifier, TopologicalRoles, classifier_for};

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::warn;

use crate::error::TopologyWarning;
use crate::ir::EntitySet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Input,
    Processing,
    Output,
}

impl Role {
    /// Layout column, left to right.
    pub fn column(self) -> usize {
        match self {
            Role::Input => 0,
            Role::Processing => 1,
            Role::Output => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub activity_count: usize,
}

/// Inferred connection from a signal's owner to one of its listeners.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub label: String,
    /// `count` relative to the busiest edge of the graph.
    pub weight: f32,
    pub count: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn edge(&self, from: &str, to: &str, label: &str) -> Option<&Edge> {
        self.edges
            .iter()
            .find(|edge| edge.from == from && edge.to == to && edge.label == label)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TopologyBuild {
    pub graph: Graph,
    pub warnings: Vec<TopologyWarning>,
}

/// Edges keyed by `(from, to, label)` in first-derivation order.
#[derive(Default)]
struct EdgeAccumulator {
    edges: Vec<Edge>,
    index: HashMap<(String, String, String), usize>,
}

impl EdgeAccumulator {
    fn upsert(&mut self, from: &str, to: &str, label: &str) {
        let key = (from.to_string(), to.to_string(), label.to_string());
        if let Some(&idx) = self.index.get(&key) {
            self.edges[idx].count += 1;
            return;
        }
        self.index.insert(key, self.edges.len());
        self.edges.push(Edge {
            from: from.to_string(),
            to: to.to_string(),
            label: label.to_string(),
            weight: 0.0,
            count: 1,
        });
    }

    fn finish(mut self) -> Vec<Edge> {
        let max_count = self.edges.iter().map(|edge| edge.count).max().unwrap_or(1);
        for edge in &mut self.edges {
            edge.weight = edge.count as f32 / max_count as f32;
        }
        self.edges
    }
}

struct Builder<'a> {
    known: HashSet<&'a str>,
    edges: EdgeAccumulator,
    warnings: Vec<TopologyWarning>,
}

impl Builder<'_> {
    fn warn(&mut self, warning: TopologyWarning) {
        warn!(%warning, "topology: record dropped");
        self.warnings.push(warning);
    }

    /// Upserts `from -> to` when both endpoints exist and differ.
    fn connect(&mut self, from: &str, to: &str, signal: &str, report_self_loop: bool) {
        if from == to {
            if report_self_loop {
                self.warn(TopologyWarning::SelfLoop {
                    id: from.to_string(),
                    signal: signal.to_string(),
                });
            }
            return;
        }
        for id in [from, to] {
            if !self.known.contains(id) {
                self.warn(TopologyWarning::UnknownNeuron {
                    id: id.to_string(),
                    signal: signal.to_string(),
                });
                return;
            }
        }
        self.edges.upsert(from, to, signal);
    }
}

/// Derives the causal connection graph from one application's entity records.
///
/// Never fails: dangling references, unattributed signals and self-loops are dropped
/// and reported through [`TopologyBuild::warnings`].
pub fn build_topology(entities: &EntitySet, classifier: &dyn RoleClassifier) -> TopologyBuild {
    let mut warnings = Vec::new();

    let mut node_ids: Vec<String> = Vec::new();
    let mut names: Vec<String> = Vec::new();
    let mut known: HashSet<&str> = HashSet::new();
    for neuron in &entities.neurons {
        if !known.insert(neuron.id.as_str()) {
            let warning = TopologyWarning::DuplicateNeuron {
                id: neuron.id.clone(),
            };
            warn!(%warning, "topology: record dropped");
            warnings.push(warning);
            continue;
        }
        node_ids.push(neuron.id.clone());
        names.push(if neuron.name.trim().is_empty() {
            neuron.id.clone()
        } else {
            neuron.name.clone()
        });
    }

    if node_ids.is_empty() {
        return TopologyBuild {
            graph: Graph::default(),
            warnings,
        };
    }

    let mut builder = Builder {
        known,
        edges: EdgeAccumulator::default(),
        warnings,
    };

    let mut owners: BTreeMap<String, String> = BTreeMap::new();
    for collateral in &entities.collaterals {
        let signal = canonical_signal_name(&collateral.name);
        if !is_valid_owner(&collateral.neuron_id) {
            builder.warn(TopologyWarning::UnresolvedOwner {
                signal,
                owner: collateral.neuron_id.clone(),
            });
            continue;
        }
        let owner = collateral.neuron_id.trim().to_string();
        if let Some(previous) = owners.insert(signal.clone(), owner.clone())
            && previous != owner
        {
            builder.warn(TopologyWarning::ConflictingOwner {
                signal,
                previous,
                owner,
            });
        }
    }

    let mut listeners: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for dendrite in &entities.dendrites {
        let signal = canonical_signal_name(&dendrite.watched_signal_name);
        if signal.is_empty() {
            continue;
        }
        let entry = listeners.entry(signal).or_default();
        if !entry.contains(&dendrite.neuron_id) {
            entry.push(dendrite.neuron_id.clone());
        }
    }

    // Static pass: owner -> every listener of the owned signal.
    for (signal, owner) in &owners {
        let Some(bound) = listeners.get(signal) else {
            continue;
        };
        for listener in bound {
            builder.connect(owner, listener, signal, true);
        }
    }

    // Causal pass: responses confirm static edges and surface dynamically bound signals.
    let mut activity: HashMap<&str, HashSet<&str>> = HashMap::new();
    for response in &entities.responses {
        if let Some(output) = canonical_optional(response.output_signal_name.as_deref()) {
            match owners.get(&output) {
                Some(owner) => {
                    activity
                        .entry(owner.as_str())
                        .or_default()
                        .insert(response.id.as_str());
                    if let Some(bound) = listeners.get(&output) {
                        for listener in bound {
                            builder.connect(owner, listener, &output, false);
                        }
                    }
                }
                None => builder.warn(TopologyWarning::UnresolvedResponseSignal {
                    response: response.id.clone(),
                    signal: output,
                }),
            }
        }

        if let Some(input) = canonical_optional(response.input_signal_name.as_deref())
            && let Some(bound) = listeners.get(&input)
        {
            let source = response.producing_neuron_id.as_str();
            for listener in bound {
                activity
                    .entry(listener.as_str())
                    .or_default()
                    .insert(response.id.as_str());
                builder.connect(source, listener, &input, false);
            }
        }
    }

    let edges = builder.edges.finish();
    let roles = classifier.classify(&node_ids, &edges);
    let nodes = node_ids
        .into_iter()
        .zip(names)
        .zip(roles)
        .map(|((id, name), role)| {
            let activity_count = activity.get(id.as_str()).map_or(0, HashSet::len);
            Node {
                id,
                name,
                role,
                activity_count,
            }
        })
        .collect();

    TopologyBuild {
        graph: Graph { nodes, edges },
        warnings: builder.warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(entities: &EntitySet) -> TopologyBuild {
        build_topology(entities, &PositionalRoles)
    }

    fn chain() -> EntitySet {
        let mut set = EntitySet::new();
        set.ensure_neuron("a", Some("Alpha"));
        set.ensure_neuron("b", Some("Beta"));
        set.ensure_neuron("c", Some("Gamma"));
        set.own("x", "a");
        set.own("y", "b");
        set.bind("b", "x");
        set.bind("c", "y");
        set
    }

    #[test]
    fn empty_input_builds_empty_graph() {
        let built = build(&EntitySet::new());
        assert!(built.graph.is_empty());
        assert!(built.graph.edges.is_empty());
        assert!(built.warnings.is_empty());
    }

    #[test]
    fn static_pass_links_owner_to_listeners() {
        let built = build(&chain());
        let graph = &built.graph;
        assert_eq!(graph.edges.len(), 2);
        assert_eq!(graph.edge("a", "b", "x").map(|e| e.count), Some(1));
        assert_eq!(graph.edge("b", "c", "y").map(|e| e.count), Some(1));
        assert!(built.warnings.is_empty());
        assert_eq!(graph.nodes[0].role, Role::Input);
        assert_eq!(graph.nodes[1].role, Role::Processing);
        assert_eq!(graph.nodes[2].role, Role::Output);
        assert_eq!(graph.nodes[2].name, "Gamma");
    }

    #[test]
    fn namespaced_names_match_bare_names() {
        let mut set = EntitySet::new();
        set.ensure_neuron("a", None);
        set.ensure_neuron("b", None);
        set.own("app:collateral:x", "a");
        set.bind("b", "x");
        let built = build(&set);
        assert_eq!(built.graph.edges.len(), 1);
        assert_eq!(built.graph.edges[0].label, "x");
    }

    #[test]
    fn substring_names_do_not_match() {
        let mut set = EntitySet::new();
        set.ensure_neuron("a", None);
        set.ensure_neuron("b", None);
        set.own("tick", "a");
        set.bind("b", "ticker");
        assert!(build(&set).graph.edges.is_empty());
    }

    #[test]
    fn self_listening_is_dropped_with_warning() {
        let mut set = EntitySet::new();
        set.ensure_neuron("a", None);
        set.own("x", "a");
        set.bind("a", "x");
        let built = build(&set);
        assert!(built.graph.edges.is_empty());
        assert_eq!(
            built.warnings,
            vec![TopologyWarning::SelfLoop {
                id: "a".to_string(),
                signal: "x".to_string()
            }]
        );
    }

    #[test]
    fn unknown_owner_contributes_nothing() {
        let mut set = chain();
        set.own("z", "unknown");
        set.own("w", "");
        set.bind("c", "z");
        set.bind("c", "w");
        let built = build(&set);
        assert_eq!(built.graph.edges.len(), 2);
        assert_eq!(built.warnings.len(), 2);
        assert!(
            built
                .warnings
                .iter()
                .all(|w| matches!(w, TopologyWarning::UnresolvedOwner { .. }))
        );
    }

    #[test]
    fn dangling_listener_is_dropped() {
        let mut set = chain();
        set.bind("ghost", "x");
        let built = build(&set);
        assert_eq!(built.graph.edges.len(), 2);
        assert!(matches!(
            &built.warnings[..],
            [TopologyWarning::UnknownNeuron { id, .. }] if id == "ghost"
        ));
    }

    #[test]
    fn responses_increment_existing_edges() {
        let mut set = chain();
        set.respond("r1", "a", None, Some("x"));
        set.respond("r2", "a", None, Some("a:collateral:x"));
        let built = build(&set);
        assert_eq!(built.graph.edge("a", "b", "x").map(|e| e.count), Some(3));
        assert_eq!(built.graph.edge("a", "b", "x").map(|e| e.weight), Some(1.0));
        let by = built.graph.edge("b", "c", "y").unwrap();
        assert!((by.weight - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn input_signal_links_producer_to_other_listeners() {
        let mut set = EntitySet::new();
        for id in ["a", "b", "c"] {
            set.ensure_neuron(id, None);
        }
        set.bind("b", "pulse");
        set.bind("c", "pulse");
        // `pulse` has no registered owner; only the response reveals the flow.
        set.respond("r1", "b", Some("pulse"), None);
        let built = build(&set);
        assert_eq!(built.graph.edges.len(), 1);
        assert_eq!(built.graph.edge("b", "c", "pulse").map(|e| e.count), Some(1));
        assert!(built.warnings.is_empty());
    }

    #[test]
    fn response_with_unowned_output_warns() {
        let mut set = chain();
        set.respond("r1", "a", None, Some("mystery"));
        let built = build(&set);
        assert_eq!(built.graph.edges.len(), 2);
        assert_eq!(
            built.warnings,
            vec![TopologyWarning::UnresolvedResponseSignal {
                response: "r1".to_string(),
                signal: "mystery".to_string()
            }]
        );
    }

    #[test]
    fn activity_counts_distinct_responses() {
        let mut set = chain();
        set.respond("r1", "a", None, Some("x"));
        set.respond("r1", "a", None, Some("x"));
        set.respond("r2", "b", Some("x"), Some("y"));
        let built = build(&set);
        let activity: Vec<usize> = built
            .graph
            .nodes
            .iter()
            .map(|node| node.activity_count)
            .collect();
        // a owns x (r1); b listens to x and owns y (r2); c only listens to y, which no
        // response consumed.
        assert_eq!(activity, vec![1, 1, 0]);
    }

    #[test]
    fn duplicate_neurons_keep_first() {
        let mut set = chain();
        set.neurons.push(crate::ir::NeuronRecord {
            id: "a".to_string(),
            name: "Again".to_string(),
            app_id: String::new(),
        });
        let built = build(&set);
        assert_eq!(built.graph.nodes.len(), 3);
        assert_eq!(built.graph.nodes[0].name, "Alpha");
        assert!(matches!(
            &built.warnings[..],
            [TopologyWarning::DuplicateNeuron { .. }]
        ));
    }

    #[test]
    fn conflicting_owner_keeps_latest() {
        let mut set = chain();
        set.own("x", "c");
        let built = build(&set);
        assert!(built.graph.edge("c", "b", "x").is_some());
        assert!(built.graph.edge("a", "b", "x").is_none());
        assert!(matches!(
            &built.warnings[..],
            [TopologyWarning::ConflictingOwner { previous, .. }] if previous == "a"
        ));
    }
}

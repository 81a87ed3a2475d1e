use std::collections::HashSet;

use crate::config::RoleStrategy;

use super::{Edge, Role};

/// Assigns a layout role to every node. Roles only pick a layout column; they are
/// not a structural property of the network.
pub trait RoleClassifier {
    /// Returns one role per entry of `node_ids`, in the same order.
    fn classify(&self, node_ids: &[String], edges: &[Edge]) -> Vec<Role>;
}

/// First node is the input, last is the output, everything else processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionalRoles;

impl RoleClassifier for PositionalRoles {
    fn classify(&self, node_ids: &[String], _edges: &[Edge]) -> Vec<Role> {
        let last = node_ids.len().saturating_sub(1);
        (0..node_ids.len())
            .map(|idx| {
                if idx == 0 {
                    Role::Input
                } else if idx == last {
                    Role::Output
                } else {
                    Role::Processing
                }
            })
            .collect()
    }
}

/// Sources become inputs and sinks become outputs. Isolated nodes, and nodes with
/// traffic in both directions, process.
#[derive(Debug, Clone, Copy, Default)]
pub struct TopologicalRoles;

impl RoleClassifier for TopologicalRoles {
    fn classify(&self, node_ids: &[String], edges: &[Edge]) -> Vec<Role> {
        let mut has_incoming: HashSet<&str> = HashSet::new();
        let mut has_outgoing: HashSet<&str> = HashSet::new();
        for edge in edges {
            has_outgoing.insert(edge.from.as_str());
            has_incoming.insert(edge.to.as_str());
        }
        node_ids
            .iter()
            .map(|id| {
                match (
                    has_incoming.contains(id.as_str()),
                    has_outgoing.contains(id.as_str()),
                ) {
                    (false, true) => Role::Input,
                    (true, false) => Role::Output,
                    _ => Role::Processing,
                }
            })
            .collect()
    }
}

pub fn classifier_for(strategy: RoleStrategy) -> Box<dyn RoleClassifier> {
    match strategy {
        RoleStrategy::Positional => Box::new(PositionalRoles),
        RoleStrategy::Topological => Box::new(TopologicalRoles),
    }
}

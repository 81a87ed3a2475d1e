use std::collections::HashMap;

use crate::topology::{Edge, Graph, Node};

/// Maximal set of nodes connected through edges in either direction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Component {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Component {
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.iter().any(|node| node.id == id)
    }
}

/// Splits a graph into weakly-connected components.
///
/// Components come out in the order their first node appears in `graph.nodes`, and
/// nodes inside a component keep that order too.
pub fn partition(graph: &Graph) -> Vec<Component> {
    let index: HashMap<&str, usize> = graph
        .nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| (node.id.as_str(), idx))
        .collect();

    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); graph.nodes.len()];
    for edge in &graph.edges {
        let (Some(&from), Some(&to)) = (index.get(edge.from.as_str()), index.get(edge.to.as_str()))
        else {
            continue;
        };
        adjacency[from].push(to);
        adjacency[to].push(from);
    }

    let mut component_of: Vec<Option<usize>> = vec![None; graph.nodes.len()];
    let mut members: Vec<Vec<usize>> = Vec::new();
    for start in 0..graph.nodes.len() {
        if component_of[start].is_some() {
            continue;
        }
        let comp_idx = members.len();
        let mut comp = Vec::new();
        let mut stack = vec![start];
        component_of[start] = Some(comp_idx);
        while let Some(cur) = stack.pop() {
            comp.push(cur);
            for &next in &adjacency[cur] {
                if component_of[next].is_none() {
                    component_of[next] = Some(comp_idx);
                    stack.push(next);
                }
            }
        }
        comp.sort_unstable();
        members.push(comp);
    }

    let mut components: Vec<Component> = members
        .iter()
        .map(|comp| Component {
            nodes: comp.iter().map(|&idx| graph.nodes[idx].clone()).collect(),
            edges: Vec::new(),
        })
        .collect();

    for edge in &graph.edges {
        let (Some(&from), Some(&to)) = (index.get(edge.from.as_str()), index.get(edge.to.as_str()))
        else {
            continue;
        };
        if let (Some(a), Some(b)) = (component_of[from], component_of[to])
            && a == b
        {
            components[a].edges.push(edge.clone());
        }
    }

    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::Role;

    fn node(id: &str) -> Node {
        Node {
            id: id.to_string(),
            name: id.to_string(),
            role: Role::Processing,
            activity_count: 0,
        }
    }

    fn edge(from: &str, to: &str) -> Edge {
        Edge {
            from: from.to_string(),
            to: to.to_string(),
            label: format!("{from}{to}"),
            weight: 1.0,
            count: 1,
        }
    }

    fn ids(component: &Component) -> Vec<&str> {
        component.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn empty_graph_has_no_components() {
        assert!(partition(&Graph::default()).is_empty());
    }

    #[test]
    fn isolated_nodes_are_singletons() {
        let graph = Graph {
            nodes: vec![node("a"), node("b")],
            edges: Vec::new(),
        };
        let comps = partition(&graph);
        assert_eq!(comps.len(), 2);
        assert_eq!(ids(&comps[0]), vec!["a"]);
        assert_eq!(ids(&comps[1]), vec!["b"]);
    }

    #[test]
    fn edge_direction_is_ignored() {
        // d -> a links the last node back to the first component.
        let graph = Graph {
            nodes: vec![node("a"), node("b"), node("c"), node("d")],
            edges: vec![edge("a", "b"), edge("d", "a")],
        };
        let comps = partition(&graph);
        assert_eq!(comps.len(), 2);
        assert_eq!(ids(&comps[0]), vec!["a", "b", "d"]);
        assert_eq!(ids(&comps[1]), vec!["c"]);
        assert_eq!(comps[0].edges.len(), 2);
        assert!(comps[1].edges.is_empty());
    }

    #[test]
    fn long_chains_do_not_recurse() {
        let count = 50_000;
        let nodes: Vec<Node> = (0..count).map(|i| node(&format!("n{i}"))).collect();
        let edges: Vec<Edge> = (1..count)
            .map(|i| edge(&format!("n{}", i - 1), &format!("n{i}")))
            .collect();
        let comps = partition(&Graph { nodes, edges });
        assert_eq!(comps.len(), 1);
        assert_eq!(comps[0].nodes.len(), count);
        assert_eq!(comps[0].edges.len(), count - 1);
    }
}

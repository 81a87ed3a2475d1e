use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::TopologyWarning;
use crate::topology::Role;

/// A placed node. `x`/`y` are the center of the block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeLayout {
    pub id: String,
    pub label: String,
    pub role: Role,
    pub component: usize,
    pub activity_count: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl NodeLayout {
    /// Half extents of the collision box (block plus `padding` on every side).
    pub fn half_extents(&self, padding: f32) -> (f32, f32) {
        (self.width / 2.0 + padding, self.height / 2.0 + padding)
    }

    pub fn padded_overlaps(&self, other: &NodeLayout, padding: f32) -> bool {
        let (aw, ah) = self.half_extents(padding);
        let (bw, bh) = other.half_extents(padding);
        (self.x - other.x).abs() < aw + bw && (self.y - other.y).abs() < ah + bh
    }
}

/// Vertical slice of the canvas reserved for one component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Band {
    pub top: f32,
    pub bottom: f32,
}

impl Band {
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }
}

#[derive(Debug, Clone, Default)]
pub struct Layout {
    /// Nodes in component order, then node order within each component.
    pub nodes: Vec<NodeLayout>,
    pub index: BTreeMap<String, usize>,
    /// One band per component, in component order.
    pub bands: Vec<Band>,
    pub bounds: Bounds,
    pub converged: bool,
    /// Collision passes run across all components.
    pub iterations: usize,
    pub warnings: Vec<TopologyWarning>,
}

impl Layout {
    pub fn node(&self, id: &str) -> Option<&NodeLayout> {
        self.index.get(id).map(|&idx| &self.nodes[idx])
    }

    pub fn position(&self, id: &str) -> Option<(f32, f32)> {
        self.node(id).map(|node| (node.x, node.y))
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

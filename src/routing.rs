use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

use crate::config::RoutingConfig;
use crate::error::TopologyWarning;
use crate::layout::Layout;
use crate::topology::Edge;

/// Position of an edge among its siblings: edges leaving the same source and edges
/// arriving at the same destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FanSlot {
    pub out_index: usize,
    pub out_count: usize,
    pub in_index: usize,
    pub in_count: usize,
}

impl FanSlot {
    fn out_median(&self) -> f32 {
        self.out_count.saturating_sub(1) as f32 / 2.0
    }

    fn in_median(&self) -> f32 {
        self.in_count.saturating_sub(1) as f32 / 2.0
    }
}

/// Fan slots for every edge, in edge order.
pub fn sibling_slots(edges: &[Edge]) -> Vec<FanSlot> {
    let mut out_counts: HashMap<&str, usize> = HashMap::new();
    let mut in_counts: HashMap<&str, usize> = HashMap::new();
    let mut slots = Vec::with_capacity(edges.len());
    for edge in edges {
        let out_index = out_counts.entry(edge.from.as_str()).or_insert(0);
        let in_index = in_counts.entry(edge.to.as_str()).or_insert(0);
        slots.push(FanSlot {
            out_index: *out_index,
            out_count: 0,
            in_index: *in_index,
            in_count: 0,
        });
        *out_index += 1;
        *in_index += 1;
    }
    for (slot, edge) in slots.iter_mut().zip(edges) {
        slot.out_count = out_counts[edge.from.as_str()];
        slot.in_count = in_counts[edge.to.as_str()];
    }
    slots
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Arrowhead {
    pub tip: (f32, f32),
    pub left: (f32, f32),
    pub right: (f32, f32),
}

/// Animated activity indicator travelling along an edge. Presentation state only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorMarker {
    pub t: f32,
}

impl IndicatorMarker {
    /// Moves the marker forward, wrapping back to the start of the curve.
    pub fn advance(&mut self, dt: f32) {
        let t = (self.t + dt).rem_euclid(1.0);
        // rem_euclid rounds tiny negative values up to exactly 1.0.
        self.t = if t >= 1.0 { 0.0 } else { t };
    }
}

/// Quadratic curve for one edge, plus its decorations.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeRoute {
    pub from: String,
    pub to: String,
    pub label: String,
    pub count: u32,
    pub start: (f32, f32),
    pub control: (f32, f32),
    pub end: (f32, f32),
    pub offset: f32,
    pub fan: FanSlot,
    pub arrow: Arrowhead,
    pub markers: Vec<IndicatorMarker>,
}

impl EdgeRoute {
    pub fn point_at(&self, t: f32) -> (f32, f32) {
        quad_point(self.start, self.control, self.end, t)
    }

    pub fn tangent_at(&self, t: f32) -> (f32, f32) {
        quad_tangent(self.start, self.control, self.end, t)
    }

    pub fn marker_positions(&self) -> Vec<(f32, f32)> {
        self.markers.iter().map(|m| self.point_at(m.t)).collect()
    }

    pub fn advance_markers(&mut self, dt: f32) {
        for marker in &mut self.markers {
            marker.advance(dt);
        }
    }
}

fn quad_point(p0: (f32, f32), c: (f32, f32), p2: (f32, f32), t: f32) -> (f32, f32) {
    let mt = 1.0 - t;
    (
        mt * mt * p0.0 + 2.0 * mt * t * c.0 + t * t * p2.0,
        mt * mt * p0.1 + 2.0 * mt * t * c.1 + t * t * p2.1,
    )
}

fn quad_tangent(p0: (f32, f32), c: (f32, f32), p2: (f32, f32), t: f32) -> (f32, f32) {
    let mt = 1.0 - t;
    (
        2.0 * mt * (c.0 - p0.0) + 2.0 * t * (p2.0 - c.0),
        2.0 * mt * (c.1 - p0.1) + 2.0 * t * (p2.1 - c.1),
    )
}

fn normalize(v: (f32, f32), fallback: (f32, f32)) -> (f32, f32) {
    let len = (v.0 * v.0 + v.1 * v.1).sqrt();
    if len <= f32::EPSILON {
        fallback
    } else {
        (v.0 / len, v.1 / len)
    }
}

pub(crate) fn marker_count(count: u32, config: &RoutingConfig) -> usize {
    let extra = (count.saturating_sub(1) / config.counts_per_marker.max(1)) as usize;
    let max = config.max_markers.max(config.min_markers);
    (config.min_markers + extra).clamp(config.min_markers, max)
}

/// Geometry for a single edge between two resolved endpoints.
pub fn route_edge(
    edge: &Edge,
    from: (f32, f32),
    to: (f32, f32),
    slot: FanSlot,
    config: &RoutingConfig,
) -> EdgeRoute {
    let offset = config.base_offset
        + (slot.out_index as f32 - slot.out_median()) * config.fan_spacing
        + (slot.in_index as f32 - slot.in_median()) * config.fan_spacing;

    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let normal = normalize((-dy, dx), (0.0, -1.0));
    let mid = ((from.0 + to.0) / 2.0, (from.1 + to.1) / 2.0);
    let control = (mid.0 + normal.0 * offset, mid.1 + normal.1 * offset);

    let tip = quad_point(from, control, to, config.arrow_t);
    let dir = normalize(quad_tangent(from, control, to, config.arrow_t), (1.0, 0.0));
    let back = (
        tip.0 - dir.0 * config.arrow_length,
        tip.1 - dir.1 * config.arrow_length,
    );
    let side = (-dir.1 * config.arrow_half_width, dir.0 * config.arrow_half_width);
    let arrow = Arrowhead {
        tip,
        left: (back.0 + side.0, back.1 + side.1),
        right: (back.0 - side.0, back.1 - side.1),
    };

    let markers_len = marker_count(edge.count, config);
    let markers = (0..markers_len)
        .map(|i| IndicatorMarker {
            t: i as f32 / markers_len as f32,
        })
        .collect();

    EdgeRoute {
        from: edge.from.clone(),
        to: edge.to.clone(),
        label: edge.label.clone(),
        count: edge.count,
        start: from,
        control,
        end: to,
        offset,
        fan: slot,
        arrow,
        markers,
    }
}

/// Routes every edge whose endpoints were placed. Edges with a missing endpoint are
/// skipped and reported.
pub fn route_edges(
    edges: &[Edge],
    layout: &Layout,
    config: &RoutingConfig,
) -> (Vec<EdgeRoute>, Vec<TopologyWarning>) {
    let slots = sibling_slots(edges);
    let mut routes = Vec::with_capacity(edges.len());
    let mut warnings = Vec::new();
    for (edge, slot) in edges.iter().zip(slots) {
        match (layout.position(&edge.from), layout.position(&edge.to)) {
            (Some(from), Some(to)) => routes.push(route_edge(edge, from, to, slot, config)),
            (from, _) => {
                let missing = if from.is_none() { &edge.from } else { &edge.to };
                let warning = TopologyWarning::MissingEndpoint {
                    from: edge.from.clone(),
                    to: edge.to.clone(),
                    missing: missing.clone(),
                };
                warn!(%warning, "routing: edge skipped");
                warnings.push(warning);
            }
        }
    }
    (routes, warnings)
}

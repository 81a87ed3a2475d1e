mod collision;
mod text;
pub(crate) mod types;
pub use collision::{Area, CollisionOutcome, count_overlaps, resolve_collisions};
pub use types::*;
use text::block_size;

use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::components::Component;
use crate::config::LayoutConfig;
use crate::error::TopologyWarning;
use crate::topology::Node;

/// Places every component in its own horizontal band, nodes in per-role columns,
/// then pushes overlapping blocks apart.
///
/// Bands are stacked top to bottom in component order. Non-convergence is not an
/// error: the best positions found are kept and a warning is attached.
pub fn compute_layout(components: &[Component], config: &LayoutConfig) -> Layout {
    let mut layout = Layout {
        converged: true,
        ..Layout::default()
    };
    let mut current_y = 0.0f32;

    for (comp_idx, component) in components.iter().enumerate() {
        let (mut placed, band) = place_component(comp_idx, &component.nodes, current_y, config);
        let area = Area {
            min_x: config.canvas_margin,
            max_x: config.canvas_width - config.canvas_margin,
            min_y: band.top,
            max_y: band.bottom,
        };
        for node in &mut placed {
            area.clamp(node);
        }

        let outcome = resolve_collisions(&mut placed, area, config);
        layout.iterations += outcome.iterations;
        if !outcome.converged {
            layout.converged = false;
            let warning = TopologyWarning::LayoutNotConverged {
                iterations: outcome.iterations,
                remaining: outcome.remaining,
            };
            warn!(component = comp_idx, %warning, "layout: keeping best-effort positions");
            layout.warnings.push(warning);
        }

        for mut node in placed {
            area.clamp(&mut node);
            layout.index.insert(node.id.clone(), layout.nodes.len());
            layout.nodes.push(node);
        }
        layout.bands.push(band);
        current_y = band.bottom + config.component_padding;
    }

    layout.bounds = content_bounds(&layout.nodes, config.bounds_margin);
    debug!(
        nodes = layout.nodes.len(),
        components = layout.bands.len(),
        iterations = layout.iterations,
        converged = layout.converged,
        "layout: computed"
    );
    layout
}

fn spacing_for(count: usize, config: &LayoutConfig) -> f32 {
    if count > config.dense_threshold {
        config.dense_per_node_height
    } else {
        config.per_node_height
    }
}

pub(crate) fn column_height(count: usize, config: &LayoutConfig) -> f32 {
    (count as f32 * spacing_for(count, config) + config.band_margin).max(config.base_height)
}

fn column_x(column: usize, config: &LayoutConfig) -> f32 {
    config.column_fractions[column.min(2)] * config.canvas_width
}

/// Initial column placement for one component, before collision resolution.
fn place_component(
    comp_idx: usize,
    nodes: &[Node],
    top: f32,
    config: &LayoutConfig,
) -> (Vec<NodeLayout>, Band) {
    let mut columns: [Vec<&Node>; 3] = [Vec::new(), Vec::new(), Vec::new()];
    for node in nodes {
        columns[node.role.column()].push(node);
    }

    let band_height = columns
        .iter()
        .map(|column| column_height(column.len(), config))
        .fold(config.base_height, f32::max);
    let band = Band {
        top,
        bottom: top + band_height,
    };

    let mut positions: BTreeMap<&str, (f32, f32)> = BTreeMap::new();
    for (col_idx, column) in columns.iter().enumerate() {
        let count = column.len();
        if count == 0 {
            continue;
        }
        let spacing = spacing_for(count, config);
        let start_y = top + (band_height - count as f32 * spacing) / 2.0;
        let center_idx = (count - 1) as f32 / 2.0;
        let base_x = column_x(col_idx, config);
        for (idx, node) in column.iter().enumerate() {
            let fan = if count > 1 {
                (idx as f32 - center_idx) * config.fan_spread
            } else {
                0.0
            };
            let y = start_y + spacing * (idx as f32 + 0.5);
            positions.insert(node.id.as_str(), (base_x + fan, y));
        }
    }

    let placed = nodes
        .iter()
        .map(|node| {
            let (x, y) = positions.get(node.id.as_str()).copied().unwrap_or((0.0, top));
            let (width, height) = block_size(&node.name, config);
            NodeLayout {
                id: node.id.clone(),
                label: node.name.clone(),
                role: node.role,
                component: comp_idx,
                activity_count: node.activity_count,
                x,
                y,
                width,
                height,
            }
        })
        .collect();
    (placed, band)
}

/// Extent of every block plus `margin`, for viewport and scroll indicators.
pub fn content_bounds(nodes: &[NodeLayout], margin: f32) -> Bounds {
    if nodes.is_empty() {
        return Bounds::default();
    }
    let mut bounds = Bounds {
        min_x: f32::MAX,
        min_y: f32::MAX,
        max_x: f32::MIN,
        max_y: f32::MIN,
    };
    for node in nodes {
        bounds.min_x = bounds.min_x.min(node.x - node.width / 2.0);
        bounds.min_y = bounds.min_y.min(node.y - node.height / 2.0);
        bounds.max_x = bounds.max_x.max(node.x + node.width / 2.0);
        bounds.max_y = bounds.max_y.max(node.y + node.height / 2.0);
    }
    bounds.min_x -= margin;
    bounds.min_y -= margin;
    bounds.max_x += margin;
    bounds.max_y += margin;
    bounds
}

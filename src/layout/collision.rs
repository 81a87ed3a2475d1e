use crate::config::LayoutConfig;

use super::NodeLayout;

/// Region node centers are clamped into, before accounting for block size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Area {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl Area {
    /// Keeps the whole block inside the area; a block larger than the area is centered.
    pub fn clamp(&self, node: &mut NodeLayout) {
        node.x = clamp_axis(node.x, self.min_x, self.max_x, node.width / 2.0);
        node.y = clamp_axis(node.y, self.min_y, self.max_y, node.height / 2.0);
    }
}

fn clamp_axis(value: f32, min: f32, max: f32, half: f32) -> f32 {
    let lo = min + half;
    let hi = max - half;
    if lo > hi {
        return (min + max) / 2.0;
    }
    value.clamp(lo, hi)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionOutcome {
    pub iterations: usize,
    /// Overlapping pairs left after the last pass.
    pub remaining: usize,
    pub converged: bool,
}

/// Pushes overlapping nodes apart until a full pass finds nothing to fix or the
/// configured pass limit is reached. Positions stay inside `area` throughout.
pub fn resolve_collisions(
    nodes: &mut [NodeLayout],
    area: Area,
    config: &LayoutConfig,
) -> CollisionOutcome {
    let padding = config.collision_padding;
    let mut iterations = 0;

    for _ in 0..config.max_collision_iterations {
        iterations += 1;
        let mut collisions = 0usize;
        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                if !nodes[i].padded_overlaps(&nodes[j], padding) {
                    continue;
                }
                let dx = nodes[j].x - nodes[i].x;
                let dy = nodes[j].y - nodes[i].y;
                let dist = (dx * dx + dy * dy).sqrt();
                // Coincident centers: split sideways, first node to the left.
                let (ux, uy) = if dist > f32::EPSILON {
                    (dx / dist, dy / dist)
                } else {
                    (1.0, 0.0)
                };
                let (aw, _) = nodes[i].half_extents(padding);
                let (bw, _) = nodes[j].half_extents(padding);
                let required = aw + bw + config.separation_buffer;
                collisions += 1;
                // Still overlapping past the threshold: keep nudging by the buffer alone.
                let push = (required - dist).max(0.0) / 2.0 + config.push_buffer;
                nodes[i].x -= ux * push;
                nodes[i].y -= uy * push;
                nodes[j].x += ux * push;
                nodes[j].y += uy * push;
                area.clamp(&mut nodes[i]);
                area.clamp(&mut nodes[j]);
            }
        }
        if collisions == 0 {
            return CollisionOutcome {
                iterations,
                remaining: 0,
                converged: true,
            };
        }
    }

    let remaining = count_overlaps(nodes, padding);
    CollisionOutcome {
        iterations,
        remaining,
        converged: remaining == 0,
    }
}

pub fn count_overlaps(nodes: &[NodeLayout], padding: f32) -> usize {
    let mut count = 0;
    for i in 0..nodes.len() {
        for other in &nodes[i + 1..] {
            if nodes[i].padded_overlaps(other, padding) {
                count += 1;
            }
        }
    }
    count
}

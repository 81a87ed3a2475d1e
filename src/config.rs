use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How node roles (and therefore layout columns) are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleStrategy {
    /// First node is the input, last node is the output, the rest process.
    #[default]
    Positional,
    /// Nodes without incoming edges are inputs, nodes without outgoing edges are outputs.
    Topological,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopologyConfig {
    pub roles: RoleStrategy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub canvas_width: f32,
    pub canvas_margin: f32,
    /// Column centers for input / processing / output nodes, as fractions of the canvas width.
    pub column_fractions: [f32; 3],
    pub base_height: f32,
    pub per_node_height: f32,
    pub dense_per_node_height: f32,
    /// Columns holding more nodes than this use `dense_per_node_height`.
    pub dense_threshold: usize,
    pub band_margin: f32,
    pub fan_spread: f32,
    pub component_padding: f32,
    pub font_size: f32,
    pub min_block_width: f32,
    pub block_padding_x: f32,
    pub block_height: f32,
    pub collision_padding: f32,
    pub separation_buffer: f32,
    pub push_buffer: f32,
    pub max_collision_iterations: usize,
    pub bounds_margin: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1200.0,
            canvas_margin: 40.0,
            column_fractions: [0.2, 0.5, 0.8],
            base_height: 200.0,
            per_node_height: 80.0,
            dense_per_node_height: 60.0,
            dense_threshold: 3,
            band_margin: 40.0,
            fan_spread: 24.0,
            component_padding: 60.0,
            font_size: 14.0,
            min_block_width: 96.0,
            block_padding_x: 24.0,
            block_height: 36.0,
            collision_padding: 8.0,
            separation_buffer: 4.0,
            push_buffer: 1.0,
            max_collision_iterations: 50,
            bounds_margin: 40.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    pub base_offset: f32,
    /// Offset contributed per sibling index away from the fan median.
    pub fan_spacing: f32,
    pub arrow_t: f32,
    pub arrow_length: f32,
    pub arrow_half_width: f32,
    pub min_markers: usize,
    pub max_markers: usize,
    pub counts_per_marker: u32,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_offset: 18.0,
            fan_spacing: 14.0,
            arrow_t: 0.92,
            arrow_length: 10.0,
            arrow_half_width: 5.0,
            min_markers: 1,
            max_markers: 6,
            counts_per_marker: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Remove records of an app that the latest run did not write.
    pub prune_stale: bool,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self { prune_stale: true }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub topology: TopologyConfig,
    pub layout: LayoutConfig,
    pub routing: RoutingConfig,
    pub sink: SinkConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    canvas_width: Option<f32>,
    canvas_margin: Option<f32>,
    column_fractions: Option<[f32; 3]>,
    base_height: Option<f32>,
    per_node_height: Option<f32>,
    dense_per_node_height: Option<f32>,
    dense_threshold: Option<usize>,
    band_margin: Option<f32>,
    fan_spread: Option<f32>,
    component_padding: Option<f32>,
    font_size: Option<f32>,
    min_block_width: Option<f32>,
    block_padding_x: Option<f32>,
    block_height: Option<f32>,
    collision_padding: Option<f32>,
    separation_buffer: Option<f32>,
    push_buffer: Option<f32>,
    max_collision_iterations: Option<usize>,
    bounds_margin: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RoutingConfigFile {
    base_offset: Option<f32>,
    fan_spacing: Option<f32>,
    arrow_t: Option<f32>,
    arrow_length: Option<f32>,
    arrow_half_width: Option<f32>,
    min_markers: Option<usize>,
    max_markers: Option<usize>,
    counts_per_marker: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct SinkConfigFile {
    prune_stale: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    roles: Option<RoleStrategy>,
    layout: Option<LayoutConfigFile>,
    routing: Option<RoutingConfigFile>,
    sink: Option<SinkConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let is_json5 = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json5"))
        .unwrap_or(false);
    parse_config(&contents, is_json5).with_context(|| format!("parsing config {}", path.display()))
}

/// Parses a config document and overlays it on the defaults.
pub fn parse_config(contents: &str, json5_syntax: bool) -> anyhow::Result<Config> {
    let parsed: ConfigFile = if json5_syntax {
        json5::from_str(contents)?
    } else {
        serde_json::from_str(contents)?
    };
    let mut config = Config::default();

    if let Some(roles) = parsed.roles {
        config.topology.roles = roles;
    }

    if let Some(layout) = parsed.layout {
        let target = &mut config.layout;
        if let Some(v) = layout.canvas_width {
            target.canvas_width = v;
        }
        if let Some(v) = layout.canvas_margin {
            target.canvas_margin = v;
        }
        if let Some(v) = layout.column_fractions {
            target.column_fractions = v;
        }
        if let Some(v) = layout.base_height {
            target.base_height = v;
        }
        if let Some(v) = layout.per_node_height {
            target.per_node_height = v;
        }
        if let Some(v) = layout.dense_per_node_height {
            target.dense_per_node_height = v;
        }
        if let Some(v) = layout.dense_threshold {
            target.dense_threshold = v;
        }
        if let Some(v) = layout.band_margin {
            target.band_margin = v;
        }
        if let Some(v) = layout.fan_spread {
            target.fan_spread = v;
        }
        if let Some(v) = layout.component_padding {
            target.component_padding = v;
        }
        if let Some(v) = layout.font_size {
            target.font_size = v;
        }
        if let Some(v) = layout.min_block_width {
            target.min_block_width = v;
        }
        if let Some(v) = layout.block_padding_x {
            target.block_padding_x = v;
        }
        if let Some(v) = layout.block_height {
            target.block_height = v;
        }
        if let Some(v) = layout.collision_padding {
            target.collision_padding = v;
        }
        if let Some(v) = layout.separation_buffer {
            target.separation_buffer = v;
        }
        if let Some(v) = layout.push_buffer {
            target.push_buffer = v;
        }
        if let Some(v) = layout.max_collision_iterations {
            target.max_collision_iterations = v;
        }
        if let Some(v) = layout.bounds_margin {
            target.bounds_margin = v;
        }
    }

    if let Some(routing) = parsed.routing {
        let target = &mut config.routing;
        if let Some(v) = routing.base_offset {
            target.base_offset = v;
        }
        if let Some(v) = routing.fan_spacing {
            target.fan_spacing = v;
        }
        if let Some(v) = routing.arrow_t {
            target.arrow_t = v.clamp(0.0, 1.0);
        }
        if let Some(v) = routing.arrow_length {
            target.arrow_length = v;
        }
        if let Some(v) = routing.arrow_half_width {
            target.arrow_half_width = v;
        }
        if let Some(v) = routing.min_markers {
            target.min_markers = v;
        }
        if let Some(v) = routing.max_markers {
            target.max_markers = v;
        }
        if let Some(v) = routing.counts_per_marker {
            target.counts_per_marker = v.max(1);
        }
        if target.max_markers < target.min_markers {
            target.max_markers = target.min_markers;
        }
    }

    if let Some(sink) = parsed.sink {
        if let Some(v) = sink.prune_stale {
            config.sink.prune_stale = v;
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_yields_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.layout.max_collision_iterations, 50);
        assert_eq!(config.topology.roles, RoleStrategy::Positional);
        assert!(config.sink.prune_stale);
    }

    #[test]
    fn overlays_partial_json() {
        let config = parse_config(
            r#"{"roles": "topological", "layout": {"canvasWidth": 800, "maxCollisionIterations": 5}}"#,
            false,
        )
        .unwrap();
        assert_eq!(config.topology.roles, RoleStrategy::Topological);
        assert_eq!(config.layout.canvas_width, 800.0);
        assert_eq!(config.layout.max_collision_iterations, 5);
        assert_eq!(config.layout.per_node_height, 80.0);
    }

    #[test]
    fn accepts_json5_with_comments() {
        let config = parse_config(
            "{\n  // tighter arrows\n  routing: { arrowT: 0.9, minMarkers: 4, maxMarkers: 2 },\n  sink: { pruneStale: false },\n}",
            true,
        )
        .unwrap();
        assert_eq!(config.routing.arrow_t, 0.9);
        assert_eq!(config.routing.min_markers, 4);
        assert_eq!(config.routing.max_markers, 4);
        assert!(!config.sink.prune_stale);
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(parse_config("{ not json", false).is_err());
    }
}

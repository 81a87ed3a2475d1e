use neuron_topology::config::{Config, parse_config};
use neuron_topology::dump::TopologyDump;
use neuron_topology::{EntitySet, compute_topology};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TopologyOptions {
    app_id: Option<String>,
    /// Same document shape as the CLI config file.
    config: Option<serde_json::Value>,
}

fn build_config(options: &TopologyOptions) -> Result<Config, String> {
    match &options.config {
        Some(value) => parse_config(&value.to_string(), false).map_err(|error| error.to_string()),
        None => Ok(Config::default()),
    }
}

fn compute_json(entities_json: &str, options: TopologyOptions) -> Result<String, String> {
    let entities: EntitySet =
        serde_json::from_str(entities_json).map_err(|error| error.to_string())?;
    let config = build_config(&options)?;
    let app_id = options.app_id.unwrap_or_default();
    let scoped = if app_id.is_empty() {
        entities
    } else {
        entities.for_app(&app_id)
    };
    let snapshot = compute_topology(&scoped, &config);
    serde_json::to_string(&TopologyDump::from_snapshot(&app_id, &snapshot))
        .map_err(|error| error.to_string())
}

#[wasm_bindgen]
pub fn compute_topology_json(
    entities_json: &str,
    options_json: Option<String>,
) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<TopologyOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        TopologyOptions::default()
    };

    compute_json(entities_json, options).map_err(|error| JsValue::from_str(&error))
}

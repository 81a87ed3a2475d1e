use serde::{Deserialize, Serialize};
use std::hash::{DefaultHasher, Hash, Hasher};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeuronRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub app_id: String,
}

/// A declaration that a neuron reacts to a named signal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DendriteRecord {
    #[serde(default)]
    pub id: String,
    pub neuron_id: String,
    #[serde(default)]
    pub app_id: String,
    pub watched_signal_name: String,
}

/// Ownership of a signal. `neuron_id` is the emitting neuron; the runtime reports
/// `"unknown"` (or nothing) when it could not attribute the signal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollateralRecord {
    pub name: String,
    #[serde(default)]
    pub neuron_id: String,
    #[serde(default)]
    pub app_id: String,
}

/// One neuron's reaction to an input signal, optionally emitting an output signal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRecord {
    pub id: String,
    pub producing_neuron_id: String,
    #[serde(default)]
    pub app_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_signal_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_signal_name: Option<String>,
}

/// Snapshot of the entity collections the topology is derived from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySet {
    #[serde(default)]
    pub neurons: Vec<NeuronRecord>,
    #[serde(default)]
    pub dendrites: Vec<DendriteRecord>,
    #[serde(default)]
    pub collaterals: Vec<CollateralRecord>,
    #[serde(default)]
    pub responses: Vec<ResponseRecord>,
}

impl EntitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.neurons.is_empty()
            && self.dendrites.is_empty()
            && self.collaterals.is_empty()
            && self.responses.is_empty()
    }

    /// Adds a neuron unless one with the same id already exists.
    pub fn ensure_neuron(&mut self, id: &str, name: Option<&str>) {
        if self.neurons.iter().any(|neuron| neuron.id == id) {
            return;
        }
        self.neurons.push(NeuronRecord {
            id: id.to_string(),
            name: name.unwrap_or(id).to_string(),
            app_id: String::new(),
        });
    }

    pub fn bind(&mut self, neuron_id: &str, signal: &str) {
        let id = format!("{neuron_id}:{signal}:{}", self.dendrites.len());
        self.dendrites.push(DendriteRecord {
            id,
            neuron_id: neuron_id.to_string(),
            app_id: String::new(),
            watched_signal_name: signal.to_string(),
        });
    }

    pub fn own(&mut self, signal: &str, owner_id: &str) {
        self.collaterals.push(CollateralRecord {
            name: signal.to_string(),
            neuron_id: owner_id.to_string(),
            app_id: String::new(),
        });
    }

    pub fn respond(
        &mut self,
        id: &str,
        producing_neuron_id: &str,
        input: Option<&str>,
        output: Option<&str>,
    ) {
        self.responses.push(ResponseRecord {
            id: id.to_string(),
            producing_neuron_id: producing_neuron_id.to_string(),
            app_id: String::new(),
            input_signal_name: input.map(str::to_string),
            output_signal_name: output.map(str::to_string),
        });
    }

    /// Stamps every record with `app_id`.
    pub fn with_app_id(mut self, app_id: &str) -> Self {
        for neuron in &mut self.neurons {
            neuron.app_id = app_id.to_string();
        }
        for dendrite in &mut self.dendrites {
            dendrite.app_id = app_id.to_string();
        }
        for collateral in &mut self.collaterals {
            collateral.app_id = app_id.to_string();
        }
        for response in &mut self.responses {
            response.app_id = app_id.to_string();
        }
        self
    }

    /// Records owned by one application, in their original order.
    pub fn for_app(&self, app_id: &str) -> EntitySet {
        EntitySet {
            neurons: self
                .neurons
                .iter()
                .filter(|r| r.app_id == app_id)
                .cloned()
                .collect(),
            dendrites: self
                .dendrites
                .iter()
                .filter(|r| r.app_id == app_id)
                .cloned()
                .collect(),
            collaterals: self
                .collaterals
                .iter()
                .filter(|r| r.app_id == app_id)
                .cloned()
                .collect(),
            responses: self
                .responses
                .iter()
                .filter(|r| r.app_id == app_id)
                .cloned()
                .collect(),
        }
    }

    /// Distinct application ids in first-seen neuron order.
    pub fn app_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for neuron in &self.neurons {
            if !ids.contains(&neuron.app_id) {
                ids.push(neuron.app_id.clone());
            }
        }
        ids
    }

    /// Stable hash of the full record set, used to skip redundant recomputation.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_neuron_ignores_duplicates() {
        let mut set = EntitySet::new();
        set.ensure_neuron("a", Some("Alpha"));
        set.ensure_neuron("a", Some("Other"));
        assert_eq!(set.neurons.len(), 1);
        assert_eq!(set.neurons[0].name, "Alpha");
    }

    #[test]
    fn for_app_filters_every_collection() {
        let mut one = EntitySet::new();
        one.ensure_neuron("a", None);
        one.bind("a", "x");
        one.own("x", "a");
        one.respond("r1", "a", None, Some("x"));
        let mut two = EntitySet::new();
        two.ensure_neuron("b", None);

        let mut merged = one.with_app_id("one");
        let two = two.with_app_id("two");
        merged.neurons.extend(two.neurons);

        let filtered = merged.for_app("one");
        assert_eq!(filtered.neurons.len(), 1);
        assert_eq!(filtered.dendrites.len(), 1);
        assert_eq!(filtered.collaterals.len(), 1);
        assert_eq!(filtered.responses.len(), 1);
        assert_eq!(merged.app_ids(), vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn fingerprint_tracks_content() {
        let mut set = EntitySet::new();
        set.ensure_neuron("a", None);
        let before = set.fingerprint();
        assert_eq!(before, set.clone().fingerprint());
        set.bind("a", "x");
        assert_ne!(before, set.fingerprint());
    }

    #[test]
    fn deserializes_camel_case_records() {
        let json = r#"{
            "neurons": [{"id": "n1", "name": "First", "appId": "app"}],
            "dendrites": [{"id": "d1", "neuronId": "n1", "appId": "app", "watchedSignalName": "x"}],
            "collaterals": [{"name": "x", "neuronId": "n1", "appId": "app"}],
            "responses": [{"id": "r1", "producingNeuronId": "n1", "appId": "app", "outputSignalName": "x"}]
        }"#;
        let set: EntitySet = serde_json::from_str(json).unwrap();
        assert_eq!(set.neurons[0].app_id, "app");
        assert_eq!(set.dendrites[0].watched_signal_name, "x");
        assert_eq!(set.responses[0].input_signal_name, None);
        assert_eq!(set.responses[0].output_signal_name.as_deref(), Some("x"));
    }
}

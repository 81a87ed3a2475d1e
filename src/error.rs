use thiserror::Error;

/// Anomalies found while deriving a topology. None of these abort a run: the offending
/// record is dropped (or the layout kept as-is) and the warning travels with the snapshot.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TopologyWarning {
    #[error("signal `{signal}` has no resolvable owner (reported owner: {owner:?})")]
    UnresolvedOwner { signal: String, owner: String },

    #[error("signal `{signal}` re-registered from owner `{previous}` to `{owner}`")]
    ConflictingOwner {
        signal: String,
        previous: String,
        owner: String,
    },

    #[error("neuron `{id}` appears more than once; keeping the first record")]
    DuplicateNeuron { id: String },

    #[error("neuron `{id}` referenced through signal `{signal}` is not part of the network")]
    UnknownNeuron { id: String, signal: String },

    #[error("neuron `{id}` listens to its own signal `{signal}`; self-loop dropped")]
    SelfLoop { id: String, signal: String },

    #[error("response `{response}` emits signal `{signal}` which has no resolvable owner")]
    UnresolvedResponseSignal { response: String, signal: String },

    #[error("edge {from} -> {to} skipped by the router: endpoint `{missing}` has no position")]
    MissingEndpoint {
        from: String,
        to: String,
        missing: String,
    },

    #[error(
        "collision resolution stopped after {iterations} passes with {remaining} overlapping pairs"
    )]
    LayoutNotConverged { iterations: usize, remaining: usize },
}

impl TopologyWarning {
    pub fn is_layout(&self) -> bool {
        matches!(self, TopologyWarning::LayoutNotConverged { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_render_readable_messages() {
        let warning = TopologyWarning::UnresolvedOwner {
            signal: "tick".to_string(),
            owner: "unknown".to_string(),
        };
        assert_eq!(
            warning.to_string(),
            "signal `tick` has no resolvable owner (reported owner: \"unknown\")"
        );
        assert!(!warning.is_layout());
        assert!(
            TopologyWarning::LayoutNotConverged {
                iterations: 50,
                remaining: 1
            }
            .is_layout()
        );
    }
}

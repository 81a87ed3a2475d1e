#[cfg(feature = "cli")]
pub mod cli;
pub mod components;
pub mod config;
pub mod dump;
pub mod error;
pub mod ir;
pub mod layout;
pub mod pipeline;
pub mod routing;
pub mod sink;
pub mod topology;

#[cfg(feature = "cli")]
pub use cli::run;
pub use components::{Component, partition};
pub use config::{Config, LayoutConfig, RoleStrategy, RoutingConfig, load_config};
pub use error::TopologyWarning;
pub use ir::EntitySet;
pub use layout::{Layout, NodeLayout, compute_layout};
pub use pipeline::{RecomputeScheduler, TopologyEngine, TopologySnapshot, compute_topology};
pub use routing::{EdgeRoute, route_edge, route_edges};
pub use sink::{DerivedStore, EdgeRecord, LayoutRecord, MemoryStore, write_snapshot};
pub use topology::{Edge, Graph, Node, Role, build_topology};

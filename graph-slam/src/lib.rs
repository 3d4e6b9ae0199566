//! Grid-based pose-graph mapping core.
//!
//! Turns a stream of `(pose, scan)` observations into local occupancy grids
//! stored as nodes of a pose graph, and fuses all of them on demand into one
//! global occupancy grid by per-cell voting. Scan matching is a pluggable
//! collaborator behind the [`ScanMatcher`] trait.

pub mod config;
pub mod error;
pub mod graph;
pub mod grid;
pub mod matcher;
pub mod pipeline;

pub use config::MappingConfig;
pub use error::{MapError, Result};
pub use graph::{Edge, Graph, Node, NodeId};
pub use grid::{Cell, CellState, GlobalMap, GridData, ScanGrid};
pub use matcher::{KeyframePolicy, NoopMatcher, ScanMatcher};
pub use pipeline::MappingPipeline;

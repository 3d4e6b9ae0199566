use common::robot::{LaserScan, Pose};
use tracing::debug;

use crate::config::MappingConfig;
use crate::error::Result;
use crate::grid::{GlobalMap, ScanGrid};

/// Index of a node in the graph; ids are dense and assigned in insertion order.
pub type NodeId = usize;

/// One observation in the pose graph: the pose it was taken at, the raw scan
/// and the local occupancy grid built from it. Immutable after insertion.
#[derive(Debug, Clone)]
pub struct Node {
    pose: Pose,
    scan: LaserScan,
    grid: ScanGrid,
}

impl Node {
    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn scan(&self) -> &LaserScan {
        &self.scan
    }

    pub fn grid(&self) -> &ScanGrid {
        &self.grid
    }
}

/// A directed link between two nodes, optionally carrying the relative motion
/// estimated by the scan matcher.
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    parent: NodeId,
    child: NodeId,
    relative_motion: Option<Pose>,
}

impl Edge {
    pub fn parent(&self) -> NodeId {
        self.parent
    }

    pub fn child(&self) -> NodeId {
        self.child
    }

    pub fn relative_motion(&self) -> Option<Pose> {
        self.relative_motion
    }
}

/// Append-only store of observation nodes chained by motion edges.
///
/// Every inserted node is linked to the previously inserted one, so the edges
/// form a chain in insertion order. Nodes and edges are never removed or
/// mutated afterwards.
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    config: MappingConfig,
    last_node: Option<NodeId>,
}

impl Graph {
    pub fn new(config: MappingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            config,
            last_node: None,
        })
    }

    /// Builds the local grid for the observation and appends it as a new node,
    /// chained to the previous node. If grid construction fails the graph is
    /// left unchanged.
    pub fn add_node(&mut self, pose: Pose, scan: LaserScan) -> Result<NodeId> {
        self.add_node_with_motion(pose, scan, None)
    }

    /// Like [`Graph::add_node`], but annotates the chain edge with the
    /// relative motion reported by the scan matcher. Since edges are never
    /// mutated, the motion has to be supplied at insertion time.
    pub fn add_node_with_motion(
        &mut self,
        pose: Pose,
        scan: LaserScan,
        relative_motion: Option<Pose>,
    ) -> Result<NodeId> {
        let grid = ScanGrid::from_scan(
            pose,
            &scan,
            self.config.resolution,
            self.config.range_threshold,
        )?;

        let id = self.nodes.len();
        self.nodes.push(Node { pose, scan, grid });

        // TODO: also link the node to spatially close earlier nodes once the
        // scan matcher produces loop-closure candidates
        if let Some(parent) = self.last_node {
            self.edges.push(Edge {
                parent,
                child: id,
                relative_motion,
            });
        }
        self.last_node = Some(id);

        debug!(node = id, edges = self.edges.len(), "node added to graph");
        Ok(id)
    }

    /// Fuses all local grids into the global occupancy map.
    pub fn generate_map(&self) -> Result<GlobalMap> {
        GlobalMap::fuse(&self.nodes, self.config.resolution)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    /// The number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn config(&self) -> &MappingConfig {
        &self.config
    }
}

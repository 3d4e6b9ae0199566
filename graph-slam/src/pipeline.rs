use std::time::{Duration, Instant};

use common::robot::{LaserScan, Pose};
use common::PerfStats;
use tracing::debug;

use crate::config::MappingConfig;
use crate::error::Result;
use crate::graph::{Graph, NodeId};
use crate::grid::GlobalMap;
use crate::matcher::{NoopMatcher, ScanMatcher};

/// Feeds `(pose, scan)` observations through the scan matcher into the pose
/// graph, and produces the fused occupancy map on demand.
///
/// The pipeline is driven by an outer event pump: one observation or one map
/// request at a time, nothing runs in the background.
pub struct MappingPipeline {
    graph: Graph,
    matcher: Box<dyn ScanMatcher>,
    stats: PerfStats,
}

impl MappingPipeline {
    /// Creates a pipeline without a scan-matching backend; edges carry
    /// odometry-only motion.
    pub fn new(config: MappingConfig) -> Result<Self> {
        Self::with_matcher(config, Box::new(NoopMatcher))
    }

    pub fn with_matcher(config: MappingConfig, matcher: Box<dyn ScanMatcher>) -> Result<Self> {
        Ok(Self {
            graph: Graph::new(config)?,
            matcher,
            stats: PerfStats::new(),
        })
    }

    /// Integrates one observation: the matcher may refine the motion since
    /// the last keyframe, then the observation is appended to the graph.
    pub fn handle_observation(
        &mut self,
        pose: Pose,
        scan: LaserScan,
        stamp: Duration,
    ) -> Result<NodeId> {
        let start = Instant::now();

        let motion = self.matcher.submit_scan(&scan, stamp);
        let id = self.graph.add_node_with_motion(pose, scan, motion)?;

        self.stats.update(start.elapsed());
        debug!(node = id, matched = motion.is_some(), "observation integrated");
        Ok(id)
    }

    /// Fuses everything observed so far into the global occupancy map.
    pub fn generate_map(&self) -> Result<GlobalMap> {
        self.graph.generate_map()
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn stats(&mut self) -> &mut PerfStats {
        &mut self.stats
    }
}

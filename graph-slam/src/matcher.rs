use std::time::Duration;

use common::math::angle_diff;
use common::robot::{LaserScan, Pose};

use crate::config::MappingConfig;

/// The scan-matching collaborator refining the odometry between observations.
///
/// The mapping core itself does not align scans; it hands every incoming scan
/// to the matcher and stores whatever relative motion comes back on the chain
/// edge of the new node.
pub trait ScanMatcher {
    /// Hands a new scan to the matcher. Returns the refined motion relative
    /// to the last keyframe, or `None` when no keyframe update happened.
    fn submit_scan(&mut self, scan: &LaserScan, stamp: Duration) -> Option<Pose>;
}

/// Matcher used when no scan-matching backend is available; every edge keeps
/// its odometry-only motion.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMatcher;

impl ScanMatcher for NoopMatcher {
    fn submit_scan(&mut self, _scan: &LaserScan, _stamp: Duration) -> Option<Pose> {
        None
    }
}

/// Decides when the displacement since the last keyframe warrants retaining a
/// new reference scan.
#[derive(Debug, Clone, Copy)]
pub struct KeyframePolicy {
    /// Linear displacement threshold in meters.
    pub linear: f64,

    /// Angular displacement threshold in radians.
    pub angular: f64,
}

impl KeyframePolicy {
    pub fn new(linear: f64, angular: f64) -> Self {
        Self { linear, angular }
    }

    pub fn from_config(config: &MappingConfig) -> Self {
        Self {
            linear: config.keyframe_distance_linear,
            angular: config.keyframe_distance_angular,
        }
    }

    /// Whether `motion`, the pose delta since the last keyframe, is large
    /// enough to start a new keyframe.
    pub fn is_due(&self, motion: Pose) -> bool {
        motion.x.hypot(motion.y) >= self.linear
            || angle_diff(0.0, motion.theta).abs() >= self.angular
    }
}

#[cfg(test)]
mod test {

    use std::f64::consts::PI;

    use super::*;

    #[test]
    fn noop_matcher_never_updates() {
        let scan = LaserScan {
            angle_min: 0.0,
            angle_increment: 0.01,
            range_max: 10.0,
            ranges: vec![1.0; 8],
        };
        assert_eq!(
            NoopMatcher.submit_scan(&scan, Duration::from_secs(1)),
            None
        );
    }

    #[test]
    fn keyframe_on_linear_displacement() {
        let policy = KeyframePolicy::new(0.5, PI / 6.0);

        assert!(!policy.is_due(Pose::new(0.2, 0.1, 0.0)));
        assert!(policy.is_due(Pose::new(0.4, 0.4, 0.0)));
        assert!(policy.is_due(Pose::new(-0.5, 0.0, 0.0)));
    }

    #[test]
    fn keyframe_on_angular_displacement() {
        let policy = KeyframePolicy::new(0.5, PI / 6.0);

        assert!(!policy.is_due(Pose::new(0.0, 0.0, 0.1)));
        assert!(policy.is_due(Pose::new(0.0, 0.0, -PI / 4.0)));

        // a full turn is no displacement at all
        assert!(!policy.is_due(Pose::new(0.0, 0.0, 2.0 * PI + 0.01)));
    }

    #[test]
    fn policy_follows_the_config() {
        let config = MappingConfig {
            keyframe_distance_linear: 1.0,
            keyframe_distance_angular: 0.2,
            ..Default::default()
        };
        let policy = KeyframePolicy::from_config(&config);

        assert_eq!(policy.linear, 1.0);
        assert_eq!(policy.angular, 0.2);
    }
}

use nalgebra::Point2;

/// The pose of a robot in the 2D plane.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Pose {
    /// The x position of the robot in meters
    pub x: f64,

    /// The y position of the robot in meters
    pub y: f64,

    /// The rotation of the robot, measured in radians counter-clockwise from the positive x-axis.
    pub theta: f64,
}

impl Pose {
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Self { x, y, theta }
    }

    /// The world-frame position of the pose.
    pub fn position(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }
}

/// Contains all data for a single lidar scan (a complete revolution).
#[derive(Debug, Clone)]
pub struct LaserScan {
    /// The angle of the first beam relative to the sensor zero, in radians.
    pub angle_min: f64,

    /// The angular step between consecutive beams, in radians.
    pub angle_increment: f64,

    /// The largest distance the sensor measures reliably, in meters.
    pub range_max: f64,

    /// The measured distances in meters, one per beam.
    pub ranges: Vec<f64>,
}

impl LaserScan {
    /// The number of beams in the scan.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// The bearing of beam `i` in the sensor frame.
    pub fn beam_angle(&self, i: usize) -> f64 {
        self.angle_min + i as f64 * self.angle_increment
    }

    /// The world-frame end points of all beams as seen from `origin`.
    pub fn to_points(&self, origin: Pose) -> Vec<Point2<f64>> {
        self.ranges
            .iter()
            .enumerate()
            .map(|(i, &range)| {
                let angle = origin.theta + self.beam_angle(i);
                Point2::new(
                    origin.x + angle.cos() * range,
                    origin.y + angle.sin() * range,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod test {

    use std::f64::consts::{FRAC_PI_2, PI};

    use approx::assert_relative_eq;

    use super::*;

    fn cardinal_scan() -> LaserScan {
        LaserScan {
            angle_min: 0.0,
            angle_increment: FRAC_PI_2,
            range_max: 10.0,
            ranges: vec![1.0, 1.0, 1.0, 1.0],
        }
    }

    #[test]
    fn beam_angles() {
        let scan = cardinal_scan();
        assert_relative_eq!(scan.beam_angle(0), 0.0);
        assert_relative_eq!(scan.beam_angle(2), PI);
    }

    #[test]
    fn endpoints_in_world_frame() {
        let scan = cardinal_scan();
        let points = scan.to_points(Pose::new(2.0, 3.0, 0.0));

        assert_eq!(points.len(), 4);
        assert_relative_eq!(points[0].x, 3.0);
        assert_relative_eq!(points[0].y, 3.0);
        assert_relative_eq!(points[1].x, 2.0, epsilon = 1e-12);
        assert_relative_eq!(points[1].y, 4.0);
    }

    #[test]
    fn rotating_the_origin_rotates_the_endpoints() {
        let scan = cardinal_scan();
        let points = scan.to_points(Pose::new(0.0, 0.0, FRAC_PI_2));

        // beam 0 now points along +y
        assert_relative_eq!(points[0].x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(points[0].y, 1.0);
    }
}

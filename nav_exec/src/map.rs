//! # Obstacle Map
//!
//! Storage for the obstacle points found by perception, along with the known
//! extent of the operating area used by calibration.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;
use serde::{Deserialize, Serialize};

use crate::pose::Point;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A shared map into which obstacle detections are registered.
pub trait ObstacleMap {
    /// Record an obstacle at the given map frame point.
    ///
    /// Deduplication and bounds handling are up to the map.
    fn register_obstacle(&mut self, point: Point);

    /// The known size of the operating area.
    fn extent(&self) -> MapExtent;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Physical size of the rectangular operating area.
///
/// Units: inches
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapExtent {
    /// Distance between the left and right walls
    pub x_max: i32,

    /// Distance between the back and front walls
    pub y_max: i32,
}

/// A map which keeps every registered point in the order it was registered.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PointMap {
    extent: MapExtent,
    points: Vec<Point>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MapExtent {
    /// Whether the point lies within the operating area, walls included.
    pub fn contains(&self, point: &Point) -> bool {
        (0..=self.x_max).contains(&point.x) && (0..=self.y_max).contains(&point.y)
    }
}

impl PointMap {
    pub fn new(extent: MapExtent) -> Self {
        Self {
            extent,
            points: Vec::new(),
        }
    }

    /// All registered points, oldest first.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of registrations which fell outside the operating area.
    pub fn num_outside(&self) -> usize {
        self.points
            .iter()
            .filter(|p| !self.extent.contains(p))
            .count()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

impl ObstacleMap for PointMap {
    fn register_obstacle(&mut self, point: Point) {
        trace!("Obstacle registered at {}", point);
        self.points.push(point);
    }

    fn extent(&self) -> MapExtent {
        self.extent
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_point_map() {
        let extent = MapExtent { x_max: 20, y_max: 30 };
        let mut map = PointMap::new(extent);

        assert_eq!(map.extent(), extent);
        assert!(map.points().is_empty());

        map.register_obstacle(Point::new(3, 4));
        map.register_obstacle(Point::new(3, 4));
        map.register_obstacle(Point::new(-1, 4));
        map.register_obstacle(Point::new(20, 30));

        assert_eq!(
            map.points(),
            &[
                Point::new(3, 4),
                Point::new(3, 4),
                Point::new(-1, 4),
                Point::new(20, 30)
            ]
        );
        assert_eq!(map.num_outside(), 1);

        map.clear();
        assert!(map.points().is_empty());
    }

    #[test]
    fn test_serialize() {
        let mut map = PointMap::new(MapExtent { x_max: 10, y_max: 10 });
        map.register_obstacle(Point::new(1, 2));

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(
            json,
            r#"{"extent":{"x_max":10,"y_max":10},"points":[{"x":1,"y":2}]}"#
        );
    }
}

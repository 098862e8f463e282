use crate::error::IndexError;
use crate::spatial_index::rectangle::Rectangle;
use crate::spatial_index::spatial_index::{IndexedPoint, SpatialIndex};
use crate::AgentId;

/// Flat list of points answering every query with a full scan.
///
/// Same containment rules as the quadtree, O(n) per query. Useful for small
/// flocks and as a reference when checking the tree.
pub struct LinearIndex {
    bounds: Rectangle,
    points: Vec<IndexedPoint>,
}

impl LinearIndex {
    pub fn new(bounds: Rectangle) -> Self {
        Self {
            bounds,
            points: vec![],
        }
    }
}

impl SpatialIndex for LinearIndex {
    fn insert(&mut self, point: IndexedPoint) -> Result<(), IndexError> {
        if self.bounds.contains(&point.position) {
            self.points.push(point);
        }
        Ok(())
    }

    fn query(&self, range: &Rectangle) -> Vec<AgentId> {
        self.points
            .iter()
            .filter(|point| range.contains(&point.position))
            .map(|point| point.agent_id)
            .collect()
    }

    fn len(&self) -> usize {
        self.points.len()
    }

    fn bounds(&self) -> Rectangle {
        self.bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point;

    #[test]
    fn test_linear_index_applies_open_containment() {
        let bounds = Rectangle::new(0f64, 0f64, 10f64, 10f64).unwrap();
        let mut index = LinearIndex::new(bounds);
        index.insert(IndexedPoint::new(Point::new(0f64, 5f64), 0)).unwrap();
        index.insert(IndexedPoint::new(Point::new(5f64, 5f64), 1)).unwrap();
        index.insert(IndexedPoint::new(Point::new(5f64, 5f64), 1)).unwrap();
        assert_eq!(index.len(), 2);

        let mut divisions = 0;
        index.visit_divisions(&mut |_| divisions += 1);
        assert_eq!(divisions, 0);

        let range = Rectangle::new(5f64, 0f64, 5f64, 10f64).unwrap();
        assert!(index.query(&range).is_empty());
        assert_eq!(index.query(&bounds), vec![1, 1]);
    }
}

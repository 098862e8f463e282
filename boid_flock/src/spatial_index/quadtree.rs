use crate::error::IndexError;
use crate::spatial_index::rectangle::Rectangle;
use crate::spatial_index::spatial_index::{IndexedPoint, SpatialIndex};
use crate::AgentId;

/// Depth limit used by [`QuadTree::new`].
///
/// Cells at this depth are around 1e-12 wide in a world a few hundred units
/// across, so only truly coincident points run into it.
pub const DEFAULT_MAX_DEPTH: usize = 48;

enum Node {
    Leaf(Vec<IndexedPoint>),
    /// Children in NW, NE, SW, SE order.
    Internal(Box<[QuadTree; 4]>),
}

/// A point quadtree over a fixed rectangle.
///
/// A leaf holds up to `capacity` points. Inserting one more splits it into
/// four equal quadrants and pushes every point down; a split node never holds
/// points of its own and never turns back into a leaf. The tree is meant to
/// be thrown away and rebuilt whenever the points move.
///
/// Containment is the open test of [`Rectangle::contains`], so a point on the
/// outer edge of the root is ignored. A point that is inside a node but sits
/// exactly on its split line is contained by none of the quadrants; it is
/// handed to the quadrant picked by comparing against the node centre so it
/// is never lost.
pub struct QuadTree {
    boundary: Rectangle,
    capacity: usize,
    depth: usize,
    max_depth: usize,
    node: Node,
}

impl QuadTree {
    /// Creates an empty tree with [`DEFAULT_MAX_DEPTH`].
    pub fn new(boundary: Rectangle, capacity: usize) -> Result<Self, IndexError> {
        Self::with_max_depth(boundary, capacity, DEFAULT_MAX_DEPTH)
    }

    /// Creates an empty tree that refuses to split below `max_depth` levels.
    /// # Arguments
    /// * `boundary` - Region covered by the root.
    /// * `capacity` - Points a leaf holds before it splits. Must be at least 1.
    /// * `max_depth` - Depth of the deepest allowed leaf, the root being 0.
    pub fn with_max_depth(
        boundary: Rectangle,
        capacity: usize,
        max_depth: usize,
    ) -> Result<Self, IndexError> {
        if capacity == 0 {
            return Err(IndexError::InvalidCapacity);
        }
        // Re-validate in case the caller built the rectangle by hand
        let boundary = Rectangle::new(boundary.x, boundary.y, boundary.width, boundary.height)?;
        Ok(Self {
            boundary,
            capacity,
            depth: 0,
            max_depth,
            node: Node::Leaf(Vec::with_capacity(capacity)),
        })
    }

    pub fn boundary(&self) -> &Rectangle {
        &self.boundary
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.node, Node::Leaf(_))
    }

    /// Depth of the deepest leaf below this node, counting this node as 0.
    pub fn height(&self) -> usize {
        match &self.node {
            Node::Leaf(_) => 0,
            Node::Internal(children) => {
                1 + children.iter().map(QuadTree::height).max().unwrap_or(0)
            }
        }
    }

    /// Inserts `point` if the root contains it.
    pub fn insert(&mut self, point: IndexedPoint) -> Result<(), IndexError> {
        if !self.boundary.contains(&point.position) {
            return Ok(());
        }
        self.place(point)
    }

    /// Collects the agents of all points inside `range`.
    pub fn query(&self, range: &Rectangle) -> Vec<AgentId> {
        let mut found = vec![];
        self.query_into(range, &mut found);
        found
    }

    /// Number of points stored in this subtree.
    pub fn len(&self) -> usize {
        match &self.node {
            Node::Leaf(points) => points.len(),
            Node::Internal(children) => children.iter().map(QuadTree::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Walks subdivided nodes top down, passing each one's region.
    pub fn visit_divisions(&self, visitor: &mut dyn FnMut(&Rectangle)) {
        if let Node::Internal(children) = &self.node {
            visitor(&self.boundary);
            for child in children.iter() {
                child.visit_divisions(visitor);
            }
        }
    }

    /// Stores a point already known to belong to this node.
    fn place(&mut self, point: IndexedPoint) -> Result<(), IndexError> {
        let needs_split = match &mut self.node {
            Node::Leaf(points) if points.len() < self.capacity => {
                points.push(point);
                return Ok(());
            }
            Node::Leaf(_) => true,
            Node::Internal(_) => false,
        };
        if needs_split {
            self.subdivide()?;
        }
        self.place_in_children(point)
    }

    fn subdivide(&mut self) -> Result<(), IndexError> {
        if self.depth >= self.max_depth {
            return Err(IndexError::MaxDepthExceeded {
                max_depth: self.max_depth,
            });
        }

        let children = self.boundary.quadrants().map(|quadrant| QuadTree {
            boundary: quadrant,
            capacity: self.capacity,
            depth: self.depth + 1,
            max_depth: self.max_depth,
            node: Node::Leaf(Vec::with_capacity(self.capacity)),
        });

        let previous = std::mem::replace(&mut self.node, Node::Internal(Box::new(children)));
        if let Node::Leaf(points) = previous {
            for point in points {
                self.place_in_children(point)?;
            }
        }
        Ok(())
    }

    fn place_in_children(&mut self, point: IndexedPoint) -> Result<(), IndexError> {
        let center = self.boundary.center();
        let Node::Internal(children) = &mut self.node else {
            return Ok(());
        };

        // Quadrants are disjoint under the open test, at most one matches
        if let Some(child) = children
            .iter_mut()
            .find(|child| child.boundary.contains(&point.position))
        {
            return child.place(point);
        }

        // On a split line
        let east = (point.position.x >= center.x) as usize;
        let south = (point.position.y >= center.y) as usize;
        children[east + 2 * south].place(point)
    }

    fn query_into(&self, range: &Rectangle, found: &mut Vec<AgentId>) {
        if !self.boundary.intersects(range) {
            return;
        }
        match &self.node {
            Node::Leaf(points) => found.extend(
                points
                    .iter()
                    .filter(|point| range.contains(&point.position))
                    .map(|point| point.agent_id),
            ),
            Node::Internal(children) => {
                for child in children.iter() {
                    child.query_into(range, found);
                }
            }
        }
    }
}

impl SpatialIndex for QuadTree {
    fn insert(&mut self, point: IndexedPoint) -> Result<(), IndexError> {
        QuadTree::insert(self, point)
    }

    fn query(&self, range: &Rectangle) -> Vec<AgentId> {
        QuadTree::query(self, range)
    }

    fn len(&self) -> usize {
        QuadTree::len(self)
    }

    fn bounds(&self) -> Rectangle {
        self.boundary
    }

    fn visit_divisions(&self, visitor: &mut dyn FnMut(&Rectangle)) {
        QuadTree::visit_divisions(self, visitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::HashSet;

    fn world() -> Rectangle {
        Rectangle::new(0f64, 0f64, 100f64, 100f64).unwrap()
    }

    fn point(x: f64, y: f64, id: AgentId) -> IndexedPoint {
        IndexedPoint::new(Point::new(x, y), id)
    }

    fn naive_range_search(range: &Rectangle, points: &[IndexedPoint]) -> Vec<AgentId> {
        let mut result: Vec<AgentId> = points
            .iter()
            .filter(|p| range.contains(&p.position))
            .map(|p| p.agent_id)
            .collect();
        result.sort();
        result
    }

    #[test]
    fn test_rejects_zero_capacity() {
        assert_eq!(
            QuadTree::new(world(), 0).err(),
            Some(IndexError::InvalidCapacity)
        );
    }

    #[test]
    fn test_rejects_hand_built_empty_boundary() {
        let flat = Rectangle {
            x: 0f64,
            y: 0f64,
            width: 0f64,
            height: 10f64,
        };
        assert!(matches!(
            QuadTree::new(flat, 4),
            Err(IndexError::InvalidBounds { .. })
        ));
    }

    // Four corners with capacity 1, only the north west one is in the first quadrant.
    #[test]
    fn test_quadrant_query_scenario() {
        let mut tree = QuadTree::new(world(), 1).unwrap();
        tree.insert(point(10f64, 10f64, 0)).unwrap();
        tree.insert(point(90f64, 90f64, 1)).unwrap();
        tree.insert(point(10f64, 90f64, 2)).unwrap();
        tree.insert(point(90f64, 10f64, 3)).unwrap();

        assert!(!tree.is_leaf());
        assert_eq!(tree.len(), 4);
        let range = Rectangle::new(0f64, 0f64, 50f64, 50f64).unwrap();
        assert_eq!(tree.query(&range), vec![0]);
    }

    #[test]
    fn test_points_outside_root_are_ignored() {
        let mut tree = QuadTree::new(world(), 4).unwrap();
        assert_eq!(tree.insert(point(-1f64, 50f64, 0)), Ok(()));
        assert_eq!(tree.insert(point(0f64, 50f64, 1)), Ok(()));
        assert_eq!(tree.insert(point(50f64, 100f64, 2)), Ok(()));
        assert_eq!(tree.insert(point(f64::NAN, 50f64, 3)), Ok(()));
        assert!(tree.is_empty());
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut tree = QuadTree::new(world(), 4).unwrap();
        tree.insert(point(20f64, 20f64, 7)).unwrap();
        tree.insert(point(20f64, 20f64, 7)).unwrap();
        assert_eq!(tree.query(&world()), vec![7, 7]);
    }

    #[test]
    fn test_coincident_points_hit_depth_limit() {
        let mut tree = QuadTree::with_max_depth(world(), 1, 6).unwrap();
        tree.insert(point(33f64, 33f64, 0)).unwrap();
        assert_eq!(
            tree.insert(point(33f64, 33f64, 1)),
            Err(IndexError::MaxDepthExceeded { max_depth: 6 })
        );
    }

    #[test]
    fn test_close_distinct_points_fit_under_default_depth() {
        // Packed against the x = 37.5 split line, 1e-9 apart
        let points: Vec<IndexedPoint> = (1..=21)
            .map(|i| {
                let offset = 37.5f64 + i as f64 * 1e-9;
                point(offset, offset, i)
            })
            .collect();

        let mut shallow = QuadTree::with_max_depth(world(), 20, 32).unwrap();
        let result: Result<(), IndexError> =
            points.iter().try_for_each(|point| shallow.insert(*point));
        assert_eq!(result, Err(IndexError::MaxDepthExceeded { max_depth: 32 }));

        let mut tree = QuadTree::new(world(), 20).unwrap();
        for point in &points {
            tree.insert(*point).unwrap();
        }
        assert_eq!(tree.len(), 21);
        assert_eq!(tree.height(), 33);
        assert_eq!(tree.query(tree.boundary()).len(), 21);
    }

    #[test]
    fn test_split_line_points_are_not_lost() {
        let mut tree = QuadTree::new(world(), 1).unwrap();
        tree.insert(point(50f64, 50f64, 0)).unwrap();
        tree.insert(point(50f64, 20f64, 1)).unwrap();
        tree.insert(point(20f64, 50f64, 2)).unwrap();
        tree.insert(point(75f64, 75f64, 3)).unwrap();

        let mut all = tree.query(&world());
        all.sort();
        assert_eq!(all, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_division_visitor_reports_internal_nodes() {
        let mut tree = QuadTree::new(world(), 1).unwrap();
        tree.insert(point(10f64, 10f64, 0)).unwrap();
        tree.insert(point(20f64, 20f64, 1)).unwrap();

        let mut divisions = vec![];
        tree.visit_divisions(&mut |rect| divisions.push(*rect));
        assert_eq!(divisions[0], world());
        assert_eq!(divisions.len(), tree.height());
        // (10,10) and (20,20) only separate once cells are 12.5 wide
        assert_eq!(tree.height(), 3);
    }

    #[test]
    fn test_root_query_returns_each_payload_once() {
        let mut rng = StdRng::seed_from_u64(0xB01D);
        for capacity in [1usize, 3, 20] {
            let mut tree = QuadTree::new(world(), capacity).unwrap();
            for id in 0..500 {
                let p = point(rng.gen_range(0.01..99.99), rng.gen_range(0.01..99.99), id);
                tree.insert(p).unwrap();
            }
            let ids: Vec<AgentId> = tree.query(&world());
            let unique: HashSet<AgentId> = ids.iter().copied().collect();
            assert_eq!(ids.len(), 500);
            assert_eq!(unique.len(), 500);
        }
    }

    #[test]
    fn test_range_search_matches_naive_scan() {
        let mut rng = StdRng::seed_from_u64(42);
        for round in 0..20 {
            let capacity = 1 + round % 5;
            let mut tree = QuadTree::new(world(), capacity).unwrap();
            let mut points = vec![];
            for id in 0..300 {
                let p = point(rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0), id);
                if world().contains(&p.position) {
                    points.push(p);
                }
                tree.insert(p).unwrap();
            }

            for _ in 0..25 {
                let range = Rectangle::new(
                    rng.gen_range(-20.0..100.0),
                    rng.gen_range(-20.0..100.0),
                    rng.gen_range(0.5..60.0),
                    rng.gen_range(0.5..60.0),
                )
                .unwrap();
                let mut found = tree.query(&range);
                found.sort();
                assert_eq!(found, naive_range_search(&range, &points));
            }
        }
    }
}

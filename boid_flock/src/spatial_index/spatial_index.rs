use crate::config::{IndexConfig, IndexKind};
use crate::error::IndexError;
use crate::spatial_index::linear_index::LinearIndex;
use crate::spatial_index::quadtree::QuadTree;
use crate::spatial_index::rectangle::Rectangle;
use crate::{AgentId, Point};

/// A position tagged with the agent it was taken from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IndexedPoint {
    pub position: Point,
    pub agent_id: AgentId,
}

impl IndexedPoint {
    pub fn new(position: Point, agent_id: AgentId) -> Self {
        Self { position, agent_id }
    }
}

/// Range-query index rebuilt from scratch every frame.
pub trait SpatialIndex: Send + Sync {
    /// Adds a point. Points outside the index bounds are dropped without error.
    fn insert(&mut self, point: IndexedPoint) -> Result<(), IndexError>;

    /// Returns the agent of every point strictly inside `range`, in no particular order.
    fn query(&self, range: &Rectangle) -> Vec<AgentId>;

    /// Number of points held.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The region this index covers.
    fn bounds(&self) -> Rectangle;

    /// Calls `visitor` with the region of every subdivided cell.
    fn visit_divisions(&self, _visitor: &mut dyn FnMut(&Rectangle)) {
        // Flat indices have no divisions
    }
}

/// Creates an empty index of the configured kind over `bounds`.
pub fn build_index(
    bounds: Rectangle,
    config: &IndexConfig,
) -> Result<Box<dyn SpatialIndex>, IndexError> {
    match config.kind {
        IndexKind::QuadTree => Ok(Box::new(QuadTree::with_max_depth(
            bounds,
            config.capacity,
            config.max_depth,
        )?)),
        IndexKind::Linear => Ok(Box::new(LinearIndex::new(bounds))),
    }
}

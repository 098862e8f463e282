pub mod linear_index;
pub mod quadtree;
pub mod rectangle;
pub mod spatial_index;

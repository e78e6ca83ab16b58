//! 2D spatial partitioning for proximity queries over the galaxy plane.
//!
//! [`QuadTree`] stores payload-carrying points inside a bounded rectangle and
//! answers "everything inside this region" queries without scanning every
//! point. Regions implement [`Region`]; [`Circle`] and [`Rect`] are provided.
//! All containment tests are inclusive of the region boundary.

mod quadtree;
mod region;

pub use quadtree::{Point, QuadTree, QuadTreeOptions, SpatialError};
pub use region::{Circle, Rect, Region};

pub use glam::DVec2;

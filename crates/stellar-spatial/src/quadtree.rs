//! Point quadtree with capacity-driven subdivision.

use glam::DVec2;

use crate::region::{Rect, Region};

/// Depth cap applied when [`QuadTreeOptions::max_depth`] is `None`.
///
/// Beyond this the cells are far smaller than any meaningful coordinate
/// difference, and coincident points would otherwise split forever.
pub const DEPTH_LIMIT: u32 = 32;

/// Errors returned by [`QuadTree`] mutation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpatialError {
    /// The point lies outside the tree's root bounds.
    #[error("point ({x}, {y}) lies outside the quadtree bounds")]
    OutOfBounds {
        /// X coordinate of the rejected point.
        x: f64,
        /// Y coordinate of the rejected point.
        y: f64,
    },
}

/// Tuning knobs for a [`QuadTree`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadTreeOptions {
    /// Points a leaf holds before it subdivides.
    pub capacity: usize,
    /// Maximum depth below the root (`None` = [`DEPTH_LIMIT`]).
    pub max_depth: Option<u32>,
    /// Collapse branches whose children are all empty after a removal.
    pub remove_empty_nodes: bool,
}

impl Default for QuadTreeOptions {
    fn default() -> Self {
        Self {
            capacity: 10,
            max_depth: None,
            remove_empty_nodes: true,
        }
    }
}

impl QuadTreeOptions {
    fn depth_limit(&self) -> u32 {
        self.max_depth.unwrap_or(DEPTH_LIMIT).min(DEPTH_LIMIT)
    }
}

/// A stored point and its payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Point<T> {
    /// Location in tree space.
    pub position: DVec2,
    /// Caller data (typically an entity id).
    pub data: T,
}

#[derive(Debug, Clone)]
enum QuadNode<T> {
    Leaf {
        bounds: Rect,
        points: Vec<Point<T>>,
    },
    /// Children are ordered like [`Rect::quadrants`].
    Branch {
        bounds: Rect,
        children: Box<[QuadNode<T>; 4]>,
    },
}

impl<T> QuadNode<T> {
    fn empty(bounds: Rect) -> Self {
        QuadNode::Leaf {
            bounds,
            points: Vec::new(),
        }
    }

    fn bounds(&self) -> &Rect {
        match self {
            QuadNode::Leaf { bounds, .. } | QuadNode::Branch { bounds, .. } => bounds,
        }
    }

    fn insert(&mut self, point: Point<T>, depth: u32, options: &QuadTreeOptions) {
        let overflowing = match self {
            QuadNode::Leaf { points, .. } => {
                points.push(point);
                points.len() > options.capacity.max(1)
            }
            QuadNode::Branch { bounds, children } => {
                let idx = bounds.quadrant_of(point.position);
                children[idx].insert(point, depth + 1, options);
                false
            }
        };

        if overflowing && depth < options.depth_limit() {
            self.subdivide(depth, options);
        }
    }

    fn subdivide(&mut self, depth: u32, options: &QuadTreeOptions) {
        let (bounds, points) = match self {
            QuadNode::Leaf { bounds, points } => (*bounds, std::mem::take(points)),
            QuadNode::Branch { .. } => return,
        };

        let mut children = Box::new(bounds.quadrants().map(QuadNode::empty));
        for point in points {
            let idx = bounds.quadrant_of(point.position);
            children[idx].insert(point, depth + 1, options);
        }

        *self = QuadNode::Branch { bounds, children };
    }

    fn query<'a, R: Region>(&'a self, region: &R, out: &mut Vec<&'a Point<T>>) {
        if !region.intersects(self.bounds()) {
            return;
        }
        match self {
            QuadNode::Leaf { points, .. } => {
                out.extend(points.iter().filter(|p| region.contains(p.position)));
            }
            QuadNode::Branch { children, .. } => {
                for child in children.iter() {
                    child.query(region, out);
                }
            }
        }
    }

    fn remove(
        &mut self,
        position: DVec2,
        matches: &impl Fn(&T) -> bool,
        prune: bool,
    ) -> Option<Point<T>> {
        let removed = match self {
            QuadNode::Leaf { points, .. } => {
                let idx = points
                    .iter()
                    .position(|p| p.position == position && matches(&p.data))?;
                Some(points.swap_remove(idx))
            }
            QuadNode::Branch { bounds, children } => {
                let idx = bounds.quadrant_of(position);
                children[idx].remove(position, matches, prune)
            }
        };

        if prune && removed.is_some() {
            self.collapse_if_empty();
        }
        removed
    }

    fn collapse_if_empty(&mut self) {
        if let QuadNode::Branch { bounds, children } = self
            && children.iter().all(QuadNode::is_empty_leaf)
        {
            *self = QuadNode::empty(*bounds);
        }
    }

    fn is_empty_leaf(&self) -> bool {
        matches!(self, QuadNode::Leaf { points, .. } if points.is_empty())
    }

    fn node_count(&self) -> usize {
        match self {
            QuadNode::Leaf { .. } => 1,
            QuadNode::Branch { children, .. } => {
                1 + children.iter().map(QuadNode::node_count).sum::<usize>()
            }
        }
    }

    fn depth(&self) -> u32 {
        match self {
            QuadNode::Leaf { .. } => 0,
            QuadNode::Branch { children, .. } => {
                1 + children.iter().map(QuadNode::depth).max().unwrap_or(0)
            }
        }
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a Point<T>>) {
        match self {
            QuadNode::Leaf { points, .. } => out.extend(points.iter()),
            QuadNode::Branch { children, .. } => {
                for child in children.iter() {
                    child.collect(out);
                }
            }
        }
    }
}

/// A bounded 2D point index.
///
/// Leaves split into four quadrants once they exceed
/// [`QuadTreeOptions::capacity`]; queries only descend into nodes whose
/// bounds touch the query region.
#[derive(Debug, Clone)]
pub struct QuadTree<T> {
    root: QuadNode<T>,
    options: QuadTreeOptions,
    len: usize,
}

impl<T> QuadTree<T> {
    /// Create an empty tree over `bounds`.
    pub fn new(bounds: Rect, options: QuadTreeOptions) -> Self {
        Self {
            root: QuadNode::empty(bounds),
            options,
            len: 0,
        }
    }

    /// Root bounds.
    pub fn bounds(&self) -> &Rect {
        self.root.bounds()
    }

    /// Options the tree was built with.
    pub fn options(&self) -> &QuadTreeOptions {
        &self.options
    }

    /// Number of stored points.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no points are stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert a point. Fails if `position` is outside the root bounds.
    pub fn insert(&mut self, position: DVec2, data: T) -> Result<(), SpatialError> {
        if !self.root.bounds().contains(position) {
            return Err(SpatialError::OutOfBounds {
                x: position.x,
                y: position.y,
            });
        }
        self.root
            .insert(Point { position, data }, 0, &self.options);
        self.len += 1;
        Ok(())
    }

    /// All points inside `region`, in no particular order.
    pub fn query<R: Region>(&self, region: &R) -> Vec<&Point<T>> {
        let mut out = Vec::new();
        self.root.query(region, &mut out);
        out
    }

    /// Remove the first point at exactly `position` whose payload satisfies
    /// `matches`, pruning emptied branches when enabled.
    pub fn remove(&mut self, position: DVec2, matches: impl Fn(&T) -> bool) -> Option<T> {
        let removed = self
            .root
            .remove(position, &matches, self.options.remove_empty_nodes)?;
        self.len -= 1;
        Some(removed.data)
    }

    /// Every stored point.
    pub fn points(&self) -> Vec<&Point<T>> {
        let mut out = Vec::with_capacity(self.len);
        self.root.collect(&mut out);
        out
    }

    /// Total node count, leaves and branches.
    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }

    /// Deepest level below the root.
    pub fn depth(&self) -> u32 {
        self.root.depth()
    }
}

//! Barnes-Hut quadtree for O(n log n) force approximation.
//!
//! The quadtree recursively subdivides space and computes the center of mass
//! (barycenter) of each cell. Distant cells can be approximated as single
//! points, reducing the O(n²) pairwise force calculation to O(n log n).
//!
//! A tree is built from an immutable snapshot of points for one simulation
//! step and thrown away afterwards. Nodes live in a flat array; children are
//! referenced by index with [`NO_CHILDREN`] marking an empty quadrant, and a
//! parallel array holds one [`Barycenter`] per node.

use std::ops::Range;

use crate::{BoundingBox, Point, Vector2D};

/// Child index of an empty quadrant.
pub const NO_CHILDREN: i32 = -1;

/// Subdivision stops at this depth even if points are still not separated.
pub const MAX_DEPTH: usize = 64;

/// Quadrant slots in [`QuadtreeNode::children`]. "Bottom" is the larger Y.
pub const BOTTOM_LEFT: usize = 0;
pub const BOTTOM_RIGHT: usize = 1;
pub const TOP_LEFT: usize = 2;
pub const TOP_RIGHT: usize = 3;

/// One cell of the tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadtreeNode {
    /// Child node indices, [`NO_CHILDREN`] when the quadrant is empty.
    pub children: [i32; 4],
    /// Area covered by this cell.
    pub bounds: BoundingBox,
    /// Distance from the root.
    pub depth: usize,
    start: usize,
    end: usize,
}

impl QuadtreeNode {
    pub fn is_leaf(&self) -> bool {
        self.children.iter().all(|&c| c == NO_CHILDREN)
    }

    /// Side length used by the opening-angle criterion.
    pub fn size(&self) -> f64 {
        self.bounds.width().max(self.bounds.height())
    }

    /// Number of input points under this cell.
    pub fn point_count(&self) -> usize {
        self.end - self.start
    }

    /// Non-empty children.
    pub fn child_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.children
            .iter()
            .filter(|&&c| c != NO_CHILDREN)
            .map(|&c| c as usize)
    }

    fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Aggregated position and mass of everything below a node.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Barycenter {
    pub position: Vector2D,
    pub mass: f64,
}

/// A Barnes-Hut quadtree over a point snapshot.
#[derive(Debug, Clone, Default)]
pub struct Quadtree {
    nodes: Vec<QuadtreeNode>,
    barycenters: Vec<Barycenter>,
    /// Input point indices, permuted so every node covers a contiguous range.
    order: Vec<usize>,
    /// Inverse of `order`: slot of each input point.
    slots: Vec<usize>,
}

impl Quadtree {
    /// Build a quadtree over `points`, weighting each with `mass_of`.
    ///
    /// `mass_of` lets the force model choose between the physical mass and
    /// a derived one such as `degree + 1`.
    pub fn build<F>(points: &[Point], mass_of: F) -> Self
    where
        F: Fn(&Point) -> f64,
    {
        let Some(root_bounds) = BoundingBox::from_points(points) else {
            return Self::default();
        };

        let mut order: Vec<usize> = (0..points.len()).collect();
        let mut scratch = Vec::with_capacity(points.len());
        let mut nodes = Vec::with_capacity(points.len() * 2);
        nodes.push(QuadtreeNode {
            children: [NO_CHILDREN; 4],
            bounds: root_bounds,
            depth: 0,
            start: 0,
            end: points.len(),
        });

        // Explicit work stack instead of recursion; depth is capped per node.
        let mut stack = vec![0usize];
        while let Some(idx) = stack.pop() {
            let node = nodes[idx];
            if node.point_count() <= 1
                || node.depth >= MAX_DEPTH
                || all_coincident(points, &order[node.range()])
            {
                continue;
            }

            let center = node.bounds.center();
            let slice = &mut order[node.range()];

            let is_bottom = |i: usize| points[i].position().y >= center.y;
            let is_left = |i: usize| points[i].position().x < center.x;

            let bottom_len = stable_partition(slice, &mut scratch, is_bottom);
            let (bottom, top) = slice.split_at_mut(bottom_len);
            let bottom_left_len = stable_partition(bottom, &mut scratch, is_left);
            let top_left_len = stable_partition(top, &mut scratch, is_left);

            let b = node.bounds;
            let quadrants = [
                (
                    BOTTOM_LEFT,
                    node.start,
                    node.start + bottom_left_len,
                    BoundingBox::new(b.left, center.y, center.x, b.bottom),
                ),
                (
                    BOTTOM_RIGHT,
                    node.start + bottom_left_len,
                    node.start + bottom_len,
                    BoundingBox::new(center.x, center.y, b.right, b.bottom),
                ),
                (
                    TOP_LEFT,
                    node.start + bottom_len,
                    node.start + bottom_len + top_left_len,
                    BoundingBox::new(b.left, b.top, center.x, center.y),
                ),
                (
                    TOP_RIGHT,
                    node.start + bottom_len + top_left_len,
                    node.end,
                    BoundingBox::new(center.x, b.top, b.right, center.y),
                ),
            ];

            for (slot, start, end, bounds) in quadrants {
                if start == end {
                    continue;
                }
                let child = nodes.len();
                nodes.push(QuadtreeNode {
                    children: [NO_CHILDREN; 4],
                    bounds,
                    depth: node.depth + 1,
                    start,
                    end,
                });
                nodes[idx].children[slot] = child as i32;
                stack.push(child);
            }
        }

        let mut slots = vec![0; points.len()];
        for (slot, &point) in order.iter().enumerate() {
            slots[point] = slot;
        }

        let barycenters = compute_barycenters(&nodes, &order, points, &mass_of);

        Self {
            nodes,
            barycenters,
            order,
            slots,
        }
    }

    /// Index of the root node, `None` for a tree over no points.
    pub fn root(&self) -> Option<usize> {
        (!self.nodes.is_empty()).then_some(0)
    }

    pub fn nodes(&self) -> &[QuadtreeNode] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> &QuadtreeNode {
        &self.nodes[index]
    }

    pub fn barycenters(&self) -> &[Barycenter] {
        &self.barycenters
    }

    pub fn barycenter(&self, index: usize) -> &Barycenter {
        &self.barycenters[index]
    }

    /// Input point indices covered by a node.
    pub fn points_in(&self, index: usize) -> &[usize] {
        &self.order[self.nodes[index].range()]
    }

    /// Whether input point `point` lies below node `index`.
    pub fn contains_point(&self, index: usize, point: usize) -> bool {
        self.slots
            .get(point)
            .is_some_and(|slot| self.nodes[index].range().contains(slot))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn max_depth(&self) -> usize {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }
}

/// Stable in-place partition: elements matching `pred` first, original
/// order kept on both sides. Returns the length of the matching prefix.
fn stable_partition<P>(slice: &mut [usize], scratch: &mut Vec<usize>, pred: P) -> usize
where
    P: Fn(usize) -> bool,
{
    scratch.clear();
    let mut write = 0;
    for read in 0..slice.len() {
        let value = slice[read];
        if pred(value) {
            slice[write] = value;
            write += 1;
        } else {
            scratch.push(value);
        }
    }
    slice[write..].copy_from_slice(scratch);
    write
}

fn all_coincident(points: &[Point], indices: &[usize]) -> bool {
    let Some((&first, rest)) = indices.split_first() else {
        return true;
    };
    let p = points[first].position();
    rest.iter().all(|&i| points[i].position() == p)
}

/// Children are always pushed after their parent, so a reverse sweep
/// visits every child before the node that owns it.
fn compute_barycenters<F>(
    nodes: &[QuadtreeNode],
    order: &[usize],
    points: &[Point],
    mass_of: &F,
) -> Vec<Barycenter>
where
    F: Fn(&Point) -> f64,
{
    let mut barycenters = vec![Barycenter::default(); nodes.len()];
    for idx in (0..nodes.len()).rev() {
        let node = &nodes[idx];
        let barycenter = if node.is_leaf() {
            aggregate(
                order[node.range()]
                    .iter()
                    .map(|&i| (points[i].position(), mass_of(&points[i]))),
            )
        } else {
            aggregate(node.child_indices().map(|c| {
                let child = &barycenters[c];
                (child.position, child.mass)
            }))
        };
        barycenters[idx] = barycenter;
    }
    barycenters
}

/// Mass-weighted mean; falls back to the plain mean when all masses are 0.
fn aggregate<I>(bodies: I) -> Barycenter
where
    I: Iterator<Item = (Vector2D, f64)>,
{
    let mut weighted = Vector2D::ZERO;
    let mut plain = Vector2D::ZERO;
    let mut mass = 0.0;
    let mut count = 0usize;
    for (position, m) in bodies {
        weighted += position * m;
        plain += position;
        mass += m;
        count += 1;
    }

    let position = if mass > 0.0 {
        weighted / mass
    } else if count > 0 {
        plain / count as f64
    } else {
        Vector2D::ZERO
    };
    Barycenter { position, mass }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_mass(p: &Point) -> f64 {
        p.mass()
    }

    fn points(coords: &[(f64, f64)]) -> Vec<Point> {
        coords.iter().map(|&(x, y)| Point::at(x, y)).collect()
    }

    /// Every leaf holds one point or a cluster of identical positions.
    fn assert_leaf_invariant(tree: &Quadtree, pts: &[Point]) {
        for (idx, node) in tree.nodes().iter().enumerate() {
            if node.is_leaf() && node.depth < MAX_DEPTH {
                let members = tree.points_in(idx);
                assert!(!members.is_empty());
                let first = pts[members[0]].position();
                assert!(members.iter().all(|&i| pts[i].position() == first));
            }
        }
    }

    #[test]
    fn test_empty_tree() {
        let tree = Quadtree::build(&[], unit_mass);
        assert!(tree.is_empty());
        assert_eq!(tree.root(), None);
    }

    #[test]
    fn test_single_node() {
        let pts = points(&[(3.0, 4.0)]);
        let tree = Quadtree::build(&pts, unit_mass);
        assert_eq!(tree.len(), 1);
        assert!(tree.node(0).is_leaf());
        assert_eq!(tree.barycenter(0).mass, 1.0);
        assert_eq!(tree.barycenter(0).position, Vector2D::new(3.0, 4.0));
    }

    #[test]
    fn test_four_corners_split_into_quadrants() {
        let pts = points(&[(0.0, 0.0), (100.0, 0.0), (0.0, 100.0), (100.0, 100.0)]);
        let tree = Quadtree::build(&pts, unit_mass);
        assert_eq!(tree.len(), 5);

        let root = tree.node(0);
        assert!(!root.is_leaf());
        let expect = [
            (BOTTOM_LEFT, 2usize),
            (BOTTOM_RIGHT, 3),
            (TOP_LEFT, 0),
            (TOP_RIGHT, 1),
        ];
        for (slot, point) in expect {
            let child = root.children[slot];
            assert_ne!(child, NO_CHILDREN);
            assert_eq!(tree.points_in(child as usize), &[point]);
        }
        assert_eq!(tree.barycenter(0).position, Vector2D::new(50.0, 50.0));
        assert_eq!(tree.barycenters().len(), tree.nodes().len());
        for &child in &root.children {
            assert_eq!(tree.barycenters()[child as usize].mass, 1.0);
        }
    }

    #[test]
    fn test_root_mass_is_sum_of_selected_masses() {
        let mut pts = points(&[
            (0.0, 0.0),
            (10.0, 3.0),
            (-4.0, 7.0),
            (2.5, -8.0),
            (9.0, 9.0),
            (-3.0, -3.0),
        ]);
        for (i, p) in pts.iter_mut().enumerate() {
            p.set_degree(i);
        }
        let tree = Quadtree::build(&pts, |p| p.degree() as f64 + 1.0);
        let expected: f64 = (0..pts.len()).map(|i| i as f64 + 1.0).sum();
        assert!((tree.barycenter(0).mass - expected).abs() < 1e-9);

        let weighted = pts
            .iter()
            .fold(Vector2D::ZERO, |acc, p| acc + p.position() * (p.degree() as f64 + 1.0))
            / expected;
        let root = tree.barycenter(0).position;
        assert!((root.x - weighted.x).abs() < 1e-9);
        assert!((root.y - weighted.y).abs() < 1e-9);
        assert_leaf_invariant(&tree, &pts);
    }

    #[test]
    fn test_coincident_points_collapse_into_one_leaf() {
        let pts = points(&[(1.0, 1.0), (1.0, 1.0), (1.0, 1.0)]);
        let tree = Quadtree::build(&pts, unit_mass);
        assert_eq!(tree.len(), 1);
        assert!(tree.node(0).is_leaf());
        assert_eq!(tree.points_in(0).len(), 3);
        assert_eq!(tree.barycenter(0).mass, 3.0);
    }

    #[test]
    fn test_coincident_cluster_next_to_other_points() {
        let pts = points(&[(5.0, 5.0), (0.0, 0.0), (5.0, 5.0), (-5.0, 2.0)]);
        let tree = Quadtree::build(&pts, unit_mass);
        assert_leaf_invariant(&tree, &pts);
        assert_eq!(tree.barycenter(0).mass, 4.0);
    }

    #[test]
    fn test_depth_stays_capped_for_nearly_equal_points() {
        let a: f64 = 1.0e10;
        let b = f64::from_bits(a.to_bits() + 1);
        let pts = points(&[(0.0, 0.0), (a, a), (b, b), (b, a)]);
        let tree = Quadtree::build(&pts, unit_mass);
        assert!(tree.max_depth() <= MAX_DEPTH);
        assert!((tree.barycenter(0).mass - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_contains_point() {
        let pts = points(&[(0.0, 0.0), (100.0, 100.0)]);
        let tree = Quadtree::build(&pts, unit_mass);
        assert!(tree.contains_point(0, 0));
        assert!(tree.contains_point(0, 1));
        for child in tree.node(0).child_indices() {
            let members = tree.points_in(child);
            assert_eq!(members.len(), 1);
            assert!(tree.contains_point(child, members[0]));
            assert!(!tree.contains_point(child, 1 - members[0]));
        }
    }

    #[test]
    fn test_zero_mass_barycenter_falls_back_to_mean() {
        let pts = vec![
            Point::new(Vector2D::new(0.0, 0.0), 0.0).unwrap(),
            Point::new(Vector2D::new(2.0, 4.0), 0.0).unwrap(),
        ];
        let tree = Quadtree::build(&pts, unit_mass);
        let root = tree.barycenter(0);
        assert_eq!(root.mass, 0.0);
        assert_eq!(root.position, Vector2D::new(1.0, 2.0));
    }

    #[test]
    fn test_stable_partition_keeps_order() {
        let mut values = vec![5, 2, 8, 1, 6, 3];
        let mut scratch = Vec::new();
        let split = stable_partition(&mut values, &mut scratch, |v| v % 2 == 0);
        assert_eq!(split, 3);
        assert_eq!(values, vec![2, 8, 6, 5, 1, 3]);
    }
}

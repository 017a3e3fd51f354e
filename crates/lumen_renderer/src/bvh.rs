//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! The tree lives in a flat arena in pre-order: the root is node 0 and a
//! branch always precedes both of its subtrees. Every leaf holds exactly
//! one object, referenced by its index in the slice the BVH was built
//! from. Traversal is iterative over a fixed-size stack, and the build
//! refuses trees too deep for that stack.
//!
//! [`Bvh::flatten`] produces the 9-float-per-node encoding used to upload
//! the tree to a texture or storage buffer.

use bytemuck::{Pod, Zeroable};
use lumen_math::{Aabb, Interval, Ray};
use thiserror::Error;

use crate::hittable::{HitRecord, Hittable};

/// Capacity of the traversal stack.
pub const TRAVERSAL_STACK_SIZE: usize = 64;

/// Largest object count whose indices survive the trip through an `f32`.
pub const MAX_OBJECTS: usize = 1 << 24;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BvhError {
    /// The tree is deeper than the fixed traversal stack can walk.
    ///
    /// Median splits stay at `ceil(log2(n))` levels, so `TooManyObjects`
    /// always fires first today. This guards split policies that can
    /// produce unbalanced trees.
    #[error("BVH depth {depth} needs a traversal stack of {needed}, capacity is {capacity}")]
    TooDeep {
        depth: usize,
        needed: usize,
        capacity: usize,
    },

    #[error("Cannot index {0} objects in a BVH (limit {limit})", limit = MAX_OBJECTS)]
    TooManyObjects(usize),
}

/// BVH node - either a branch with two children or a leaf with one object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BvhNode {
    Branch {
        bbox: Aabb,
        /// Arena index of the left child (always this node's index + 1)
        left: u32,
        /// Arena index of the right child
        right: u32,
        /// Axis the children were split along (0=X, 1=Y, 2=Z)
        axis: u8,
    },
    Leaf {
        bbox: Aabb,
        /// Index into the object slice
        object: u32,
    },
}

impl BvhNode {
    #[inline]
    pub fn bounding_box(&self) -> &Aabb {
        match self {
            BvhNode::Branch { bbox, .. } | BvhNode::Leaf { bbox, .. } => bbox,
        }
    }
}

/// Median-split BVH over a slice of objects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    object_count: usize,
    /// Edges on the longest root-to-leaf path
    depth: usize,
}

impl Bvh {
    /// Build a BVH over `objects`.
    ///
    /// Each split takes the union box of the current range, picks its
    /// longest axis, stable-sorts the range by object centroid along it and
    /// cuts at the median. The same input always yields the same tree.
    pub fn build<H: Hittable>(objects: &[H]) -> Result<Self, BvhError> {
        let n = objects.len();
        if n > MAX_OBJECTS {
            return Err(BvhError::TooManyObjects(n));
        }

        let mut bvh = Self {
            nodes: Vec::with_capacity(n.saturating_mul(2).saturating_sub(1)),
            object_count: n,
            depth: 0,
        };
        if n == 0 {
            return Ok(bvh);
        }

        let mut indices: Vec<u32> = (0..n as u32).collect();
        bvh.build_recursive(objects, &mut indices, 0);

        // Pushing both children of each visited branch leaves at most
        // depth + 1 entries on the stack.
        let needed = bvh.depth + 1;
        if needed > TRAVERSAL_STACK_SIZE {
            return Err(BvhError::TooDeep {
                depth: bvh.depth,
                needed,
                capacity: TRAVERSAL_STACK_SIZE,
            });
        }

        log::debug!(
            "Built BVH: {} objects, {} nodes, depth {}",
            n,
            bvh.nodes.len(),
            bvh.depth
        );
        Ok(bvh)
    }

    fn build_recursive<H: Hittable>(&mut self, objects: &[H], indices: &mut [u32], depth: usize) -> u32 {
        self.depth = self.depth.max(depth);
        let node_index = self.nodes.len() as u32;

        if indices.len() == 1 {
            let object = indices[0];
            self.nodes.push(BvhNode::Leaf {
                bbox: objects[object as usize].bounding_box(),
                object,
            });
            return node_index;
        }

        let bbox = indices.iter().fold(Aabb::EMPTY, |acc, &i| {
            Aabb::surrounding(&acc, &objects[i as usize].bounding_box())
        });
        let axis = bbox.longest_axis();

        // Stable, so ties keep input order.
        indices.sort_by(|&a, &b| {
            let ka = objects[a as usize].centroid()[axis];
            let kb = objects[b as usize].centroid()[axis];
            ka.total_cmp(&kb)
        });

        // Reserve this node's slot so children land after it (pre-order).
        self.nodes.push(BvhNode::Leaf { bbox, object: 0 });

        let mid = indices.len() / 2;
        let (left_indices, right_indices) = indices.split_at_mut(mid);
        let left = self.build_recursive(objects, left_indices, depth + 1);
        let right = self.build_recursive(objects, right_indices, depth + 1);

        self.nodes[node_index as usize] = BvhNode::Branch {
            bbox,
            left,
            right,
            axis: axis as u8,
        };
        node_index
    }

    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn object_count(&self) -> usize {
        self.object_count
    }

    /// Bounds of the whole tree (empty for an empty BVH).
    pub fn bounding_box(&self) -> Aabb {
        self.nodes
            .first()
            .map(|root| *root.bounding_box())
            .unwrap_or(Aabb::EMPTY)
    }

    /// Closest hit among `objects`, which must be the slice the BVH was
    /// built from. A slice of a different length never hits.
    ///
    /// Returns the object index with its record. Subtrees whose boxes the
    /// ray misses within the current search interval are skipped, and the
    /// interval's upper bound shrinks to each accepted hit.
    pub fn closest_hit<'a, H: Hittable>(
        &self,
        objects: &'a [H],
        ray: &Ray,
        ray_t: Interval,
    ) -> Option<(usize, HitRecord<'a>)> {
        if self.nodes.is_empty() || objects.len() != self.object_count {
            return None;
        }

        let mut stack = [0u32; TRAVERSAL_STACK_SIZE];
        let mut top = 1;
        let mut search = ray_t;
        let mut closest = None;

        while top > 0 {
            top -= 1;
            let node = &self.nodes[stack[top] as usize];
            if !node.bounding_box().hit(ray, search) {
                continue;
            }

            match *node {
                BvhNode::Leaf { object, .. } => {
                    let index = object as usize;
                    if let Some(rec) = objects[index].hit(ray, search) {
                        search = search.with_max(rec.t);
                        closest = Some((index, rec));
                    }
                }
                BvhNode::Branch { left, right, .. } => {
                    // Left on top so it is visited first.
                    stack[top] = right;
                    stack[top + 1] = left;
                    top += 2;
                }
            }
        }

        closest
    }

    /// Encode the tree as [`FlatBvhNode`]s in arena order.
    pub fn flatten(&self) -> FlatBvh {
        let nodes = self
            .nodes
            .iter()
            .map(|node| match *node {
                BvhNode::Branch {
                    bbox, left, right, ..
                } => FlatBvhNode::new(&bbox, left as f32, right as f32, FlatBvhNode::NONE),
                BvhNode::Leaf { bbox, object } => {
                    FlatBvhNode::new(&bbox, FlatBvhNode::NONE, FlatBvhNode::NONE, object as f32)
                }
            })
            .collect();

        FlatBvh { nodes }
    }
}

/// One BVH node as nine floats:
/// `x.min, x.max, y.min, y.max, z.min, z.max, left, right, object`.
///
/// Absent children or objects are encoded as -1.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct FlatBvhNode {
    pub bounds: [f32; 6],
    pub left: f32,
    pub right: f32,
    pub object: f32,
}

impl FlatBvhNode {
    pub const NONE: f32 = -1.0;
    pub const FLOATS: usize = 9;

    fn new(bbox: &Aabb, left: f32, right: f32, object: f32) -> Self {
        Self {
            bounds: [
                bbox.x.min, bbox.x.max, bbox.y.min, bbox.y.max, bbox.z.min, bbox.z.max,
            ],
            left,
            right,
            object,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.object >= 0.0
    }
}

/// Flat, GPU-friendly copy of a [`Bvh`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatBvh {
    nodes: Vec<FlatBvhNode>,
}

impl FlatBvh {
    pub fn nodes(&self) -> &[FlatBvhNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.nodes)
    }

    /// Native-endian bytes, ready for upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.nodes)
    }

    /// The floats padded with zeros to whole rows of `row_width` floats,
    /// for packing into a 2-D float texture.
    pub fn padded(&self, row_width: usize) -> Vec<f32> {
        let mut floats = self.as_floats().to_vec();
        if row_width > 0 {
            let rows = floats.len().div_ceil(row_width);
            floats.resize(rows * row_width, 0.0);
        }
        floats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hittable::closest_hit_linear;
    use crate::{Material, Primitive, Quad, Sphere};
    use lumen_math::Vec3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::sync::Arc;

    fn random_scene(rng: &mut StdRng, count: usize) -> Vec<Primitive> {
        let material = Arc::new(Material::lambertian(Vec3::splat(0.5)));
        let random_point = |rng: &mut StdRng| {
            Vec3::new(
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
            )
        };

        (0..count)
            .map(|i| {
                let p = random_point(rng);
                if i % 4 == 3 {
                    Quad::new(p, random_point(rng) * 0.2, random_point(rng) * 0.2, material.clone())
                        .into()
                } else if i % 4 == 2 {
                    let to = p + Vec3::new(0.0, rng.gen_range(0.0..1.0), 0.0);
                    Sphere::moving(p, to, rng.gen_range(0.1..1.5), material.clone()).into()
                } else {
                    Sphere::new(p, rng.gen_range(0.1..1.5), material.clone()).into()
                }
            })
            .collect()
    }

    #[test]
    fn test_empty_bvh_never_hits() {
        let objects: Vec<Primitive> = Vec::new();
        let bvh = Bvh::build(&objects).unwrap();
        assert!(bvh.is_empty());
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::X);
        assert!(bvh.closest_hit(&objects, &ray, Interval::new(0.001, f32::INFINITY)).is_none());
    }

    #[test]
    fn test_mismatched_objects_never_hit() {
        let material = Arc::new(Material::lambertian(Vec3::splat(0.5)));
        let objects: Vec<Primitive> = (0..8)
            .map(|i| Sphere::new(Vec3::new(i as f32 * 3.0, 0.0, 0.0), 1.0, material.clone()).into())
            .collect();
        let bvh = Bvh::build(&objects).unwrap();
        let ray_t = Interval::new(0.001, f32::INFINITY);

        let ray = Ray::new_simple(Vec3::new(21.0, 0.0, 10.0), Vec3::NEG_Z);
        assert!(bvh.closest_hit(&objects, &ray, ray_t).is_some());
        assert!(bvh.closest_hit(&objects[..5], &ray, ray_t).is_none());
    }

    #[test]
    fn test_structure_is_preorder_with_single_object_leaves() {
        let mut rng = StdRng::seed_from_u64(1);
        let objects = random_scene(&mut rng, 37);
        let bvh = Bvh::build(&objects).unwrap();

        assert_eq!(bvh.len(), 2 * objects.len() - 1);
        // Median split keeps the tree balanced.
        assert_eq!(bvh.depth(), 6);

        let mut seen = vec![false; objects.len()];
        for (index, node) in bvh.nodes().iter().enumerate() {
            match *node {
                BvhNode::Branch {
                    bbox, left, right, ..
                } => {
                    assert_eq!(left as usize, index + 1);
                    assert!(right > left);
                    for child in [left, right] {
                        let child_box = bvh.nodes()[child as usize].bounding_box();
                        assert_eq!(Aabb::surrounding(&bbox, child_box), bbox);
                    }
                }
                BvhNode::Leaf { bbox, object } => {
                    assert!(!seen[object as usize], "object {object} in two leaves");
                    seen[object as usize] = true;
                    assert_eq!(bbox, objects[object as usize].bounding_box());
                }
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_matches_linear_scan() {
        let mut rng = StdRng::seed_from_u64(0xb0b);

        for &count in &[1usize, 2, 3, 17, 200] {
            let objects = random_scene(&mut rng, count);
            let bvh = Bvh::build(&objects).unwrap();

            for _ in 0..500 {
                let origin = Vec3::new(
                    rng.gen_range(-15.0..15.0),
                    rng.gen_range(-15.0..15.0),
                    rng.gen_range(-15.0..15.0),
                );
                // Aim near the cluster so most rays hit something.
                let target = Vec3::new(
                    rng.gen_range(-8.0..8.0),
                    rng.gen_range(-8.0..8.0),
                    rng.gen_range(-8.0..8.0),
                );
                let ray = Ray::new(origin, target - origin, rng.gen_range(0.0..1.0));
                let ray_t = Interval::new(0.001, f32::INFINITY);

                let fast = bvh.closest_hit(&objects, &ray, ray_t);
                let slow = closest_hit_linear(&objects, &ray, ray_t);

                match (fast, slow) {
                    (None, None) => {}
                    (Some((i, a)), Some((j, b))) => {
                        assert_eq!(a.t, b.t, "objects {i} vs {j}");
                        assert_eq!(i, j);
                    }
                    (fast, slow) => panic!(
                        "BVH and linear scan disagree: {:?} vs {:?}",
                        fast.map(|h| h.0),
                        slow.map(|h| h.0)
                    ),
                }
            }
        }
    }

    #[test]
    fn test_build_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(77);
        let objects = random_scene(&mut rng, 128);

        let first = Bvh::build(&objects).unwrap();
        let second = Bvh::build(&objects).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_identical_centroids_keep_input_order() {
        let material = Arc::new(Material::lambertian(Vec3::ONE));
        let objects: Vec<Primitive> = (0..4)
            .map(|_| Sphere::new(Vec3::ZERO, 1.0, material.clone()).into())
            .collect();
        let bvh = Bvh::build(&objects).unwrap();

        let leaves: Vec<u32> = bvh
            .nodes()
            .iter()
            .filter_map(|node| match node {
                BvhNode::Leaf { object, .. } => Some(*object),
                _ => None,
            })
            .collect();
        assert_eq!(leaves, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_flat_encoding() {
        let material = Arc::new(Material::lambertian(Vec3::ONE));
        let objects: Vec<Primitive> = vec![
            Sphere::new(Vec3::new(-3.0, 0.0, 0.0), 1.0, material.clone()).into(),
            Sphere::new(Vec3::new(3.0, 0.0, 0.0), 1.0, material).into(),
        ];
        let bvh = Bvh::build(&objects).unwrap();
        let flat = bvh.flatten();

        assert_eq!(flat.len(), 3);
        assert_eq!(flat.as_floats().len(), 3 * FlatBvhNode::FLOATS);
        assert_eq!(flat.as_bytes().len(), 3 * FlatBvhNode::FLOATS * 4);

        let root = flat.nodes()[0];
        assert!(!root.is_leaf());
        assert_eq!((root.left, root.right, root.object), (1.0, 2.0, -1.0));
        assert_eq!(&root.bounds[..2], &[-4.0, 4.0]);

        let left = flat.nodes()[1];
        assert!(left.is_leaf());
        assert_eq!((left.left, left.right, left.object), (-1.0, -1.0, 0.0));

        // 27 floats packed into rows of 4 -> 7 rows.
        let padded = flat.padded(4);
        assert_eq!(padded.len(), 28);
        assert_eq!(padded[27], 0.0);
    }
}

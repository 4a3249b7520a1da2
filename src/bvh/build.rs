use tracing::debug;

use crate::{
    bvh::{FlattenedBvh, aabb::Aabb, flatten, morton::morton_code_3d},
    error::Result,
    scene::Scene,
};

#[derive(Clone, Debug)]
pub struct BvhLeaf {
    pub aabb: Aabb,
    // which source mesh the triangle belongs to
    pub mesh_index: u32,
    // starting vertex offset of the triangle within that mesh's flat buffer
    pub face_index: u32,
}

#[derive(Clone, Debug)]
pub struct BvhInternalNode {
    pub aabb: Aabb,
    pub left: Box<BvhNode>,
    pub right: Box<BvhNode>,
}

/// One node of the in-memory tree. Internal nodes exclusively own their two
/// children; there is no sharing between subtrees.
#[derive(Clone, Debug)]
pub enum BvhNode {
    Leaf(BvhLeaf),
    InternalNode(BvhInternalNode),
}

impl BvhNode {
    pub fn aabb(&self) -> &Aabb {
        match self {
            BvhNode::Leaf(leaf) => &leaf.aabb,
            BvhNode::InternalNode(node) => &node.aabb,
        }
    }

    pub fn node_count(&self) -> usize {
        match self {
            BvhNode::Leaf(_) => 1,
            BvhNode::InternalNode(node) => 1 + node.left.node_count() + node.right.node_count(),
        }
    }
}

/// A bounding volume hierarchy over a scene's triangles. Built once per
/// scene load and torn down wholesale when the scene is replaced.
pub struct Bvh {
    root: Option<BvhNode>,
}

impl Bvh {
    /// Builds the tree: collect per-triangle bounds, sort by Morton code of
    /// each box's minimum corner, then pair adjacent nodes bottom-up until
    /// a single root remains. A scene with zero triangles yields an empty
    /// tree, which is a valid state rather than an error.
    pub fn build(scene: &Scene) -> Result<Bvh> {
        let (leaves, scene_aabb) = collect_leaves(scene)?;
        let Some(scene_aabb) = scene_aabb else {
            debug!("scene has no triangles, leaving the tree empty");
            return Ok(Bvh { root: None });
        };
        debug!("building bvh over {} triangles", leaves.len());
        let sorted = sort_by_morton_code(leaves, &scene_aabb);
        Ok(Bvh {
            root: reduce_pairwise(sorted),
        })
    }

    pub fn root(&self) -> Option<&BvhNode> {
        self.root.as_ref()
    }

    pub fn flatten(&self) -> FlattenedBvh {
        flatten::flatten(self.root.as_ref())
    }
}

// one pass over the scene: every group of 3 consecutive vertices is a
// triangle; produces the leaf list and the scene-wide bound together
fn collect_leaves(scene: &Scene) -> Result<(Vec<BvhLeaf>, Option<Aabb>)> {
    let mut leaves = Vec::new();
    let mut scene_aabb: Option<Aabb> = None;
    for (mesh_index, mesh) in scene.meshes().iter().enumerate() {
        for triangle in 0..mesh.triangle_count() {
            let face_index = triangle * 3;
            let vertices = [
                mesh.vertex(face_index),
                mesh.vertex(face_index + 1),
                mesh.vertex(face_index + 2),
            ];
            let aabb = Aabb::from_points(&vertices)?;
            scene_aabb = Some(match scene_aabb {
                Some(scene_aabb) => scene_aabb.merge(&aabb),
                None => aabb,
            });
            leaves.push(BvhLeaf {
                aabb,
                mesh_index: mesh_index as u32,
                face_index: face_index as u32,
            });
        }
    }
    Ok((leaves, scene_aabb))
}

// keys come from each box's minimum corner; the sort is stable, so equal
// codes keep collection order
fn sort_by_morton_code(leaves: Vec<BvhLeaf>, scene_aabb: &Aabb) -> Vec<BvhNode> {
    let mut keyed = leaves
        .into_iter()
        .map(|leaf| {
            let code = morton_code_3d(&leaf.aabb.min, &scene_aabb.min, &scene_aabb.max);
            (code, leaf)
        })
        .collect::<Vec<_>>();
    keyed.sort_by_key(|(code, _)| *code);
    keyed
        .into_iter()
        .map(|(_, leaf)| BvhNode::Leaf(leaf))
        .collect()
}

// halve the list until one node remains; pairing is purely positional, so
// tree shape is deterministic given the sorted order. An odd trailing node
// is carried into the next level unchanged, never wrapped.
fn reduce_pairwise(mut nodes: Vec<BvhNode>) -> Option<BvhNode> {
    while nodes.len() > 1 {
        let mut next_level = Vec::with_capacity(nodes.len().div_ceil(2));
        let mut remaining = nodes.into_iter();
        while let Some(left) = remaining.next() {
            match remaining.next() {
                Some(right) => {
                    let aabb = left.aabb().merge(right.aabb());
                    next_level.push(BvhNode::InternalNode(BvhInternalNode {
                        aabb,
                        left: Box::new(left),
                        right: Box::new(right),
                    }));
                }
                None => next_level.push(left),
            }
        }
        nodes = next_level;
    }
    nodes.pop()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Mesh;

    // a thin triangle whose bounding box minimum sits at (x, y, z)
    fn triangle_at(x: f32, y: f32, z: f32) -> Vec<f32> {
        vec![x, y, z, x + 0.1, y, z, x, y + 0.1, z]
    }

    fn scene_of(triangles: &[[f32; 3]]) -> Scene {
        let positions = triangles
            .iter()
            .flat_map(|&[x, y, z]| triangle_at(x, y, z))
            .collect();
        Scene::new(vec![Mesh::new(positions)])
    }

    fn check_internal_boxes(node: &BvhNode) {
        if let BvhNode::InternalNode(internal) = node {
            let merged = internal.left.aabb().merge(internal.right.aabb());
            assert_eq!(internal.aabb, merged, "internal box must equal the merge of its children");
            check_internal_boxes(&internal.left);
            check_internal_boxes(&internal.right);
        }
    }

    #[test]
    fn empty_scene_builds_an_empty_tree() {
        let bvh = Bvh::build(&Scene::empty()).unwrap();
        assert!(bvh.root().is_none());
    }

    #[test]
    fn node_count_is_two_n_minus_one() {
        for n in 1usize..12 {
            let triangles: Vec<[f32; 3]> = (0..n).map(|i| [i as f32 * 2.0, 0.0, 0.0]).collect();
            let bvh = Bvh::build(&scene_of(&triangles)).unwrap();
            assert_eq!(bvh.root().unwrap().node_count(), 2 * n - 1);
        }
    }

    #[test]
    fn internal_boxes_are_merges_of_children() {
        let triangles: Vec<[f32; 3]> = (0..7)
            .map(|i| [i as f32, (i % 3) as f32, (i % 2) as f32 * 4.0])
            .collect();
        let bvh = Bvh::build(&scene_of(&triangles)).unwrap();
        check_internal_boxes(bvh.root().unwrap());
    }

    #[test]
    fn odd_trailing_leaf_is_carried_not_wrapped() {
        // five leaves reduce 5 -> 3 -> 2 -> 1; the last leaf is paired only
        // at the final level, so the root's right child must still be a leaf
        let triangles: Vec<[f32; 3]> = (0..5).map(|i| [i as f32 * 3.0, 0.0, 0.0]).collect();
        let bvh = Bvh::build(&scene_of(&triangles)).unwrap();
        let root = bvh.root().unwrap();
        assert_eq!(root.node_count(), 9);
        let BvhNode::InternalNode(root) = root else {
            panic!("root of a five-leaf tree is internal");
        };
        assert!(matches!(*root.right, BvhNode::Leaf(_)));
    }

    #[test]
    fn leaves_follow_spatial_order_for_collinear_triangles() {
        // collection order deliberately scrambled; the morton sort must
        // restore ascending x before pairing
        let bvh = Bvh::build(&scene_of(&[
            [40.0, 0.0, 0.0],
            [0.0, 0.0, 0.0],
            [30.0, 0.0, 0.0],
            [20.0, 0.0, 0.0],
        ]))
        .unwrap();
        let mut face_indices = Vec::new();
        fn walk(node: &BvhNode, out: &mut Vec<u32>) {
            match node {
                BvhNode::Leaf(leaf) => out.push(leaf.face_index),
                BvhNode::InternalNode(internal) => {
                    walk(&internal.left, out);
                    walk(&internal.right, out);
                }
            }
        }
        walk(bvh.root().unwrap(), &mut face_indices);
        // triangles sit at x = 40, 0, 30, 20 in collection order, so the
        // spatially sorted left-to-right leaf order is faces 3, 9, 6, 0
        assert_eq!(face_indices, vec![3, 9, 6, 0]);
    }

    #[test]
    fn single_degenerate_triangle_builds() {
        let scene = Scene::new(vec![Mesh::new(vec![1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0])]);
        let bvh = Bvh::build(&scene).unwrap();
        let root = bvh.root().unwrap();
        assert_eq!(root.node_count(), 1);
        assert_eq!(root.aabb().min, root.aabb().max);
    }
}

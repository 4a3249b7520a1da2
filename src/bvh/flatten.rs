use tracing::debug;

use crate::bvh::{FlattenedBvh, NO_INDEX, build::BvhNode};

/// Serializes a tree into the parallel-array form. The walk is post-order
/// (left, right, self), so every child id is numerically below its parent's
/// and the root takes the highest id, `count - 1`.
pub fn flatten(root: Option<&BvhNode>) -> FlattenedBvh {
    let Some(root) = root else {
        return FlattenedBvh::empty();
    };
    // arrays are sized up front; the walk only writes, never grows
    let count = root.node_count();
    let mut flat = FlattenedBvh {
        child_indices: vec![NO_INDEX; 2 * count],
        mesh_indices: vec![NO_INDEX; 2 * count],
        bounding_boxes: vec![0.0; 6 * count],
        root_index: NO_INDEX,
        count: count as u32,
    };
    let mut next_id = 0;
    flat.root_index = assign_post_order(root, &mut next_id, &mut flat);
    debug!("flattened {} bvh nodes", count);
    flat
}

// a node takes the next id only after both children are finalized
fn assign_post_order(node: &BvhNode, next_id: &mut u32, flat: &mut FlattenedBvh) -> u32 {
    let id = match node {
        BvhNode::Leaf(leaf) => {
            let id = take_id(next_id);
            flat.mesh_indices[2 * id as usize] = leaf.mesh_index;
            flat.mesh_indices[2 * id as usize + 1] = leaf.face_index;
            id
        }
        BvhNode::InternalNode(internal) => {
            let left = assign_post_order(&internal.left, next_id, flat);
            let right = assign_post_order(&internal.right, next_id, flat);
            let id = take_id(next_id);
            flat.child_indices[2 * id as usize] = left;
            flat.child_indices[2 * id as usize + 1] = right;
            id
        }
    };
    let aabb = node.aabb();
    let base = 6 * id as usize;
    flat.bounding_boxes[base..base + 3].copy_from_slice(aabb.min.coords.as_slice());
    flat.bounding_boxes[base + 3..base + 6].copy_from_slice(aabb.max.coords.as_slice());
    id
}

fn take_id(next_id: &mut u32) -> u32 {
    let id = *next_id;
    *next_id += 1;
    id
}

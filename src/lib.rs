//! Morton-code BVH construction and GPU-friendly flattening.
//!
//! The crate builds a bounding volume hierarchy over a scene's triangles by
//! sorting them along a Z-order curve and pairing adjacent nodes bottom-up,
//! then serializes the tree into fixed-width parallel arrays sized for
//! upload into textures.
//!
//! ## Modules
//!
//! - [`bvh`] - bounding boxes, Morton encoding, tree construction, flattening
//! - [`scene`] - the mesh/scene input model and the manager owning the
//!   current flattened arrays
//! - [`error`] - error and result types
//!
//! ## Example
//!
//! ```
//! use morton_bvh::{Bvh, Mesh, Scene};
//!
//! let scene = Scene::new(vec![Mesh::new(vec![
//!     0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0,
//! ])]);
//! let flattened = Bvh::build(&scene)?.flatten();
//! assert_eq!(flattened.count, 1);
//! # Ok::<(), morton_bvh::Error>(())
//! ```

pub mod bvh;
pub mod error;
pub mod scene;

// Re-export commonly used types
pub use bvh::build::{Bvh, BvhInternalNode, BvhLeaf, BvhNode};
pub use bvh::{FlattenedBvh, NO_INDEX};
pub use error::{Error, Result};
pub use scene::{Mesh, Scene, SceneManager};

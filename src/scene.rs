use nalgebra::Point3;
use tracing::trace;

use crate::{
    bvh::{FlattenedBvh, build::Bvh},
    error::Result,
};

/// A mesh as handed over by the external model loader: a flat, tightly
/// packed position buffer with three floats per vertex and three
/// consecutive vertices per triangle, no separate index buffer.
pub struct Mesh {
    positions: Vec<f32>,
}

impl Mesh {
    pub fn new(positions: Vec<f32>) -> Mesh {
        Mesh { positions }
    }

    pub fn vertex(&self, index: usize) -> Point3<f32> {
        Point3::new(
            self.positions[index * 3],
            self.positions[index * 3 + 1],
            self.positions[index * 3 + 2],
        )
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    // triangle j spans vertex offsets 3j, 3j + 1, 3j + 2; a trailing
    // incomplete group is ignored
    pub fn triangle_count(&self) -> usize {
        self.vertex_count() / 3
    }
}

/// The scene representation the builder consumes.
pub struct Scene {
    meshes: Vec<Mesh>,
}

impl Scene {
    pub fn new(meshes: Vec<Mesh>) -> Scene {
        Scene { meshes }
    }

    pub fn empty() -> Scene {
        Scene { meshes: vec![] }
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(Mesh::triangle_count).sum()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FlattenedBvhState {
    UpToDate,
    NeedsRebuild,
}

/// Owns the currently loaded scene together with its flattened BVH and
/// rebuilds the structure when the scene is replaced. The previous arrays
/// stay readable until a replacement build has fully completed, so a reader
/// never observes a partially updated structure.
pub struct SceneManager {
    scene: Scene,
    flattened: FlattenedBvh,
    state: FlattenedBvhState,
}

impl SceneManager {
    pub fn new(scene: Scene) -> Result<SceneManager> {
        let flattened = Bvh::build(&scene)?.flatten();
        Ok(SceneManager {
            scene,
            flattened,
            state: FlattenedBvhState::UpToDate,
        })
    }

    /// Replaces the scene and schedules a rebuild on the next
    /// [`flattened_bvh`](Self::flattened_bvh) call.
    pub fn set_scene(&mut self, scene: Scene) {
        self.scene = scene;
        self.state = FlattenedBvhState::NeedsRebuild;
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The flattened arrays for the current scene, rebuilding first if the
    /// scene was replaced. A failed rebuild leaves the previous arrays
    /// untouched and the rebuild still pending.
    pub fn flattened_bvh(&mut self) -> Result<&FlattenedBvh> {
        if self.state == FlattenedBvhState::NeedsRebuild {
            trace!("rebuilding bvh for replaced scene");
            let flattened = Bvh::build(&self.scene)?.flatten();
            self.flattened = flattened;
            self.state = FlattenedBvhState::UpToDate;
        }
        Ok(&self.flattened)
    }
}

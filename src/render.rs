//! Instructions for the presentation layer.
//!
//! The engine never owns graphics objects. It describes what should be shown
//! as a stream of [`RenderCommand`]s, and a renderer maps cubie ids to its own
//! scene nodes.
//!
//! Coordinate conventions:
//! - Grid coordinates use integers x, y, z in 0..=2.
//! - Rendered cubies map x->X, y->Y, z->Z in world units.
//! - The grid is centered at the origin, cells `pitch` apart.

use nalgebra::{UnitQuaternion, Vector3};

use crate::cube::Cube;
use crate::geometry::{world_position, Axis};
use crate::grid::Layer;
use crate::pieces::CubieId;

/// Scene container a cubie can be parented to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    /// The resting container holding every cubie.
    Cubies,
    /// The temporary pivot group of a turning layer.
    Layer(Layer),
}

/// One presentation instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Move a cubie under another container.
    Reparent {
        cubie: CubieId,
        container: Container,
    },
    /// Show the pivot group of `layer` rotated by `angle` about `axis`.
    ///
    /// Continuous; carries no logical meaning.
    RotateLayer {
        layer: Layer,
        axis: Axis,
        angle: f64,
    },
    /// Place a cubie at its resting transform after a commit.
    PlaceCubie {
        cubie: CubieId,
        position: Vector3<f64>,
        orientation: UnitQuaternion<f64>,
    },
    /// Enable or disable camera orbiting.
    OrbitControls { enabled: bool },
}

/// Buffer of pending instructions, drained by the renderer each frame.
#[derive(Debug, Clone, Default)]
pub struct RenderQueue {
    commands: Vec<RenderCommand>,
}

impl RenderQueue {
    pub fn push(&mut self, command: RenderCommand) {
        self.commands.push(command);
    }

    /// Reparents every current member of `layer` to its pivot group.
    pub fn detach_layer(&mut self, cube: &Cube, layer: Layer) {
        for &cubie in cube.layer_members(layer) {
            self.push(RenderCommand::Reparent {
                cubie,
                container: Container::Layer(layer),
            });
        }
    }

    /// Returns the cubies of `members` to the resting container and emits
    /// their committed transforms.
    pub fn reattach(&mut self, cube: &Cube, members: &[CubieId]) {
        for &cubie in members {
            let Some((position, orientation)) = resting_transform(cube, cubie) else {
                continue;
            };
            self.push(RenderCommand::Reparent {
                cubie,
                container: Container::Cubies,
            });
            self.push(RenderCommand::PlaceCubie {
                cubie,
                position,
                orientation,
            });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Takes all pending instructions, oldest first.
    pub fn drain(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.commands)
    }
}

/// World position and orientation of a cubie at rest.
pub fn resting_transform(
    cube: &Cube,
    id: CubieId,
) -> Option<(Vector3<f64>, UnitQuaternion<f64>)> {
    let cubie = cube.cubie(id)?;
    let position = world_position(cubie.coord, cube.pitch());
    Some((position, cubie.orientation))
}

/// Commands placing every cubie, used to build the scene from scratch.
pub fn full_scene(cube: &Cube) -> Vec<RenderCommand> {
    let mut queue = RenderQueue::default();
    let ids: Vec<CubieId> = cube.cubies().iter().map(|cubie| cubie.id).collect();
    queue.reattach(cube, &ids);
    queue.drain()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_scene_places_every_cubie() {
        let cube = Cube::default();
        let commands = full_scene(&cube);
        let placed = commands
            .iter()
            .filter(|c| matches!(c, RenderCommand::PlaceCubie { .. }))
            .count();
        assert_eq!(placed, 26);
    }

    #[test]
    fn test_detach_layer_reparents_members() {
        let cube = Cube::default();
        let mut queue = RenderQueue::default();
        queue.detach_layer(&cube, Layer::Front);
        let commands = queue.drain();
        assert_eq!(commands.len(), 9);
        assert!(commands.iter().all(|command| matches!(
            command,
            RenderCommand::Reparent {
                container: Container::Layer(Layer::Front),
                ..
            }
        )));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_resting_transform_is_centered() {
        let cube = Cube::default();
        let corner = cube.cubie_at((0, 0, 0)).unwrap().id;
        let (position, _) = resting_transform(&cube, corner).unwrap();
        let pitch = cube.pitch();
        let corner_position = Vector3::new(-pitch, -pitch, -pitch);
        assert!((position - corner_position).norm() < 1e-12);
    }

    #[test]
    fn test_unknown_cubie_is_skipped() {
        let cube = Cube::default();
        assert_eq!(resting_transform(&cube, CubieId(200)), None);
        let mut queue = RenderQueue::default();
        queue.reattach(&cube, &[CubieId(200)]);
        assert!(queue.is_empty());
    }
}

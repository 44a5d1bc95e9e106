//! Converts pointer drags into layer turns.
//!
//! State machine: `Idle -> Dragging -> {Committing | Cancelling} -> Idle`.
//!
//! While dragging, the clicked face's layer follows the pointer continuously;
//! that rotation is presentation only. On release the accumulated angle either
//! snaps to the nearest quarter turn (and is committed once the snap animation
//! ends) or springs back to rest with no state change.
//!
//! Hit testing and camera math live outside the engine. The caller supplies the
//! clicked face on pointer-down and, on every move, the drag vector already
//! expressed in camera space together with the cumulative pointer travel in
//! pixels.

use std::f64::consts::FRAC_PI_2;
use std::time::Duration;

use log::{debug, trace};
use nalgebra::Vector3;

use crate::animation::{Animation, Easing, LayerTurn};
use crate::config::Config;
use crate::cube::Cube;
use crate::geometry::{Axis, Face};
use crate::grid::Layer;
use crate::render::{RenderCommand, RenderQueue};

/// Result of a pointer-down hit test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceHit {
    /// Outer face of the cube that was clicked.
    pub face: Face,
    /// World-space hit point; the drag plane passes through it.
    pub point: Vector3<f64>,
}

/// Layer and direction a drag currently points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub layer: Layer,
    pub axis: Axis,
    /// `1` or `-1`: sign applied to drag increments.
    pub direction: i32,
}

/// How a drag across `face` maps to a turn of that face's layer.
///
/// Returns `(primary, primary_sign, secondary, secondary_sign)`. The in-plane
/// axis with the larger drag component wins, and its sign times the listed
/// factor gives the turn direction. Ties go to the secondary axis.
const fn drag_rule(face: Face) -> (Axis, i32, Axis, i32) {
    match face {
        Face::Right => (Axis::Y, 1, Axis::Z, -1),
        Face::Left => (Axis::Y, -1, Axis::Z, 1),
        Face::Up => (Axis::X, 1, Axis::Z, -1),
        Face::Down => (Axis::X, -1, Axis::Z, 1),
        Face::Front => (Axis::X, 1, Axis::Y, 1),
        Face::Back => (Axis::X, -1, Axis::Y, -1),
    }
}

/// Picks the candidate turn for a drag across `face`.
pub fn candidate_for(face: Face, drag: &Vector3<f64>) -> Candidate {
    let (primary, primary_sign, secondary, secondary_sign) = drag_rule(face);

    let component = |axis: Axis| drag[axis.index()];
    let (value, sign) = if component(primary).abs() > component(secondary).abs() {
        (component(primary), primary_sign)
    } else {
        (component(secondary), secondary_sign)
    };
    let direction = if value > 0.0 { sign } else { -sign };

    let layer = Layer::of_face(face);
    Candidate {
        layer,
        axis: layer.axis(),
        direction,
    }
}

/// In-progress drag.
#[derive(Debug, Clone, PartialEq)]
pub struct Drag {
    pub hit: FaceHit,
    /// Set by the first move long enough to count.
    pub candidate: Option<Candidate>,
    /// Proportional rotation from cumulative pointer travel, before direction
    /// and gain.
    pub travel_rotation: f64,
    /// Angle currently presented for the candidate layer.
    pub accumulated: f64,
}

/// Gesture state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Dragging(Drag),
    /// Snapping to a nonzero multiple of a quarter turn.
    Committing(LayerTurn),
    /// Springing back to rest.
    Cancelling(LayerTurn),
}

/// What a finished settle animation asks the caller to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Settled {
    /// Commit `turn.quarter_turns` on `turn.layer`.
    Commit(LayerTurn),
    /// Nothing changes; reattach the members.
    Cancel(LayerTurn),
}

/// Drag-to-turn translator.
#[derive(Debug, Clone)]
pub struct GestureTranslator {
    state: GestureState,
    config: Config,
}

impl GestureTranslator {
    pub fn new(config: Config) -> Self {
        Self {
            state: GestureState::Idle,
            config,
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    /// Whether a settle animation is running.
    pub fn is_settling(&self) -> bool {
        matches!(
            self.state,
            GestureState::Committing(_) | GestureState::Cancelling(_)
        )
    }

    /// Starts a drag if the pointer hit the cube.
    ///
    /// Returns `false` and does nothing when `busy` (an animation or solve is
    /// running), when another gesture is active, or when nothing was hit.
    pub fn pointer_down(
        &mut self,
        hit: Option<FaceHit>,
        busy: bool,
        render: &mut RenderQueue,
    ) -> bool {
        let Some(hit) = hit else {
            return false;
        };
        if busy || !matches!(self.state, GestureState::Idle) {
            debug!("ignoring pointer-down while busy");
            return false;
        }

        render.push(RenderCommand::OrbitControls { enabled: false });
        self.state = GestureState::Dragging(Drag {
            hit,
            candidate: None,
            travel_rotation: 0.0,
            accumulated: 0.0,
        });
        true
    }

    /// Updates the in-progress drag.
    ///
    /// `drag_vector` is the camera-space offset from the hit point on the drag
    /// plane; `pixel_distance` is the pointer's distance from where the drag
    /// started, in pixels.
    pub fn pointer_move(
        &mut self,
        drag_vector: &Vector3<f64>,
        pixel_distance: f64,
        cube: &Cube,
        render: &mut RenderQueue,
    ) {
        let GestureState::Dragging(drag) = &mut self.state else {
            return;
        };
        if drag_vector.norm() < self.config.min_drag_length {
            return;
        }

        let candidate = candidate_for(drag.hit.face, drag_vector);
        if drag.candidate.is_none() {
            render.detach_layer(cube, candidate.layer);
        }
        drag.candidate = Some(candidate);

        let travel_rotation = pixel_distance * self.config.drag_sensitivity;
        let delta = travel_rotation - drag.travel_rotation;
        drag.travel_rotation = travel_rotation;
        drag.accumulated += delta * f64::from(candidate.direction) * self.config.drag_gain;

        trace!(
            "dragging {:?}: accumulated {:.3} rad",
            candidate.layer,
            drag.accumulated
        );
        render.push(RenderCommand::RotateLayer {
            layer: candidate.layer,
            axis: candidate.axis,
            angle: drag.accumulated,
        });
    }

    /// Ends the drag, choosing between snapping and cancelling.
    pub fn pointer_up(&mut self, cube: &Cube, render: &mut RenderQueue) {
        if !matches!(self.state, GestureState::Dragging(_)) {
            return;
        }
        let GestureState::Dragging(drag) = std::mem::take(&mut self.state) else {
            return;
        };
        render.push(RenderCommand::OrbitControls { enabled: true });

        let Some(candidate) = drag.candidate else {
            return;
        };
        let members = cube.layer_members(candidate.layer).to_vec();
        let accumulated = drag.accumulated;

        if accumulated.abs() >= self.config.snap_threshold {
            let quarter_turns = (accumulated / FRAC_PI_2).round() as i32;
            let target = f64::from(quarter_turns) * FRAC_PI_2;
            debug!(
                "snapping {:?} from {accumulated:.3} to {quarter_turns} quarter turns",
                candidate.layer
            );
            let animation = Animation::new(
                accumulated,
                target,
                self.config.settle_duration,
                Easing::EaseOutCubic,
            );
            self.state = GestureState::Committing(LayerTurn::new(
                candidate.layer,
                quarter_turns,
                animation,
                members,
            ));
        } else {
            debug!(
                "cancelling drag on {:?} at {accumulated:.3}",
                candidate.layer
            );
            let animation = Animation::new(
                accumulated,
                0.0,
                self.config.settle_duration,
                Easing::EaseOutCubic,
            );
            self.state =
                GestureState::Cancelling(LayerTurn::new(candidate.layer, 0, animation, members));
        }
    }

    /// Advances a settle animation. Returns the outcome once it ends.
    pub fn advance(&mut self, dt: Duration, render: &mut RenderQueue) -> Option<Settled> {
        let turn = match &mut self.state {
            GestureState::Committing(turn) | GestureState::Cancelling(turn) => turn,
            GestureState::Idle | GestureState::Dragging(_) => return None,
        };

        let angle = turn.advance(dt);
        render.push(RenderCommand::RotateLayer {
            layer: turn.layer,
            axis: turn.layer.axis(),
            angle,
        });
        if !turn.is_finished() {
            return None;
        }

        match std::mem::take(&mut self.state) {
            GestureState::Committing(turn) => Some(Settled::Commit(turn)),
            GestureState::Cancelling(turn) => Some(Settled::Cancel(turn)),
            GestureState::Idle | GestureState::Dragging(_) => None,
        }
    }
}

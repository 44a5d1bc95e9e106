//! Authoritative cube state.
//!
//! The store owns the 26 cubies and the layer membership table. The only
//! transition is a whole number of quarter turns of one layer; continuous
//! rotation is a presentation concern and never reaches this module.

use log::trace;
use nalgebra::UnitQuaternion;
use rustc_hash::FxHashSet;

use crate::config::Config;
use crate::error::CubeError;
use crate::geometry::{
    angle_to_quarter_turns, orientations_match, quarter_turn, snap_orientation, snap_to_grid,
    world_position, Face,
};
use crate::grid::{coord_to_idx, facelet_cell, Layer, LayerTable, GRID_SIZE, NUM_FACELETS};
use crate::notation::Move;
use crate::pieces::{solved_cubies, Color, Coord, Cubie, CubieId, CENTER, NUM_CUBIES};

/// A 3x3x3 cube.
#[derive(Debug, Clone, PartialEq)]
pub struct Cube {
    /// Indexed by [`CubieId`].
    cubies: Vec<Cubie>,
    layers: LayerTable,
    pitch: f64,
}

impl Default for Cube {
    fn default() -> Self {
        Self::new(Config::default().cubie_pitch)
    }
}

impl Cube {
    /// Creates a solved cube whose cubie centers are `pitch` apart.
    pub fn new(pitch: f64) -> Self {
        let cubies = solved_cubies();
        let layers = LayerTable::rebuild(&cubies);
        Self {
            cubies,
            layers,
            pitch,
        }
    }

    /// All cubies, indexed by id.
    pub fn cubies(&self) -> &[Cubie] {
        &self.cubies
    }

    /// Cubie with the given id, if it belongs to this cube.
    pub fn cubie(&self, id: CubieId) -> Option<&Cubie> {
        self.cubies.get(usize::from(id.0))
    }

    /// Distance between neighbouring cubie centers.
    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    /// Current layer membership table.
    pub fn layers(&self) -> &LayerTable {
        &self.layers
    }

    /// Cubies currently in `layer`.
    pub fn layer_members(&self, layer: Layer) -> &[CubieId] {
        self.layers.members(layer)
    }

    /// Cubie occupying `coord`, if any.
    pub fn cubie_at(&self, coord: Coord) -> Option<&Cubie> {
        self.cubies.iter().find(|cubie| cubie.coord == coord)
    }

    /// Rotates `layer` by `angle` radians about its positive axis.
    ///
    /// `angle` must be a multiple of a quarter turn.
    pub fn commit_rotation(&mut self, layer: Layer, angle: f64) -> Result<(), CubeError> {
        let quarter_turns = angle_to_quarter_turns(angle)
            .ok_or(CubeError::IllegalRotationAngle { angle })?;
        self.rotate(layer, quarter_turns);
        Ok(())
    }

    /// Rotates `layer` by `quarter_turns` × 90° about its positive axis.
    pub fn rotate(&mut self, layer: Layer, quarter_turns: i32) {
        if quarter_turns.rem_euclid(4) == 0 {
            return;
        }
        let rotation = quarter_turn(layer.axis(), quarter_turns);

        // snapshot before any cubie moves; membership is stale until rebuild
        let members = self.layers.members(layer).to_vec();
        for id in members {
            let cubie = &mut self.cubies[id.0 as usize];
            let position = rotation * world_position(cubie.coord, self.pitch);
            cubie.coord = snap_to_grid(&position, self.pitch);
            cubie.orientation = snap_orientation(&(rotation * cubie.orientation));
        }

        self.layers = LayerTable::rebuild(&self.cubies);
        debug_assert!(self.is_permutation(), "turn broke the cubie permutation");
        trace!("rotated {layer:?} by {quarter_turns} quarter turns");
    }

    /// Applies a move.
    pub fn apply(&mut self, m: Move) {
        self.rotate(m.layer, m.quarter_turns());
    }

    /// Applies moves in order.
    pub fn apply_all<'a>(&mut self, moves: impl IntoIterator<Item = &'a Move>) {
        for &m in moves {
            self.apply(m);
        }
    }

    /// Whether every cubie is at its home cell with its original orientation.
    pub fn is_solved(&self) -> bool {
        let identity = UnitQuaternion::identity();
        self.cubies.iter().all(|cubie| {
            cubie.coord == cubie.home && orientations_match(&cubie.orientation, &identity)
        })
    }

    /// Whether the cubie coordinates are exactly the 26 non-center cells.
    pub fn is_permutation(&self) -> bool {
        let cells: FxHashSet<Coord> = self.cubies.iter().map(|cubie| cubie.coord).collect();
        self.cubies.len() == NUM_CUBIES && cells.len() == NUM_CUBIES && !cells.contains(&CENTER)
    }

    /// Visible sticker colors, indexed as in [`facelet_cell`].
    pub fn facelet_colors(&self) -> [Color; NUM_FACELETS] {
        let mut occupancy: [Option<&Cubie>; GRID_SIZE] = [None; GRID_SIZE];
        for cubie in &self.cubies {
            occupancy[coord_to_idx(cubie.coord)] = Some(cubie);
        }

        std::array::from_fn(|index| {
            let (coord, face) = facelet_cell(index);
            occupancy[coord_to_idx(coord)].map_or(Color::Hidden, |cubie| {
                // which of the cubie's original faces now points this way
                let local = cubie.orientation.inverse() * face.normal();
                cubie.sticker(Face::from_normal(&local))
            })
        })
    }

    /// State as 54 face letters in `U R F D L B` order.
    ///
    /// Each sticker is written as the letter of the face it belongs to when
    /// solved.
    pub fn facelets(&self) -> String {
        self.facelet_colors()
            .iter()
            .map(|color| match color.home_face() {
                Some(face) => Layer::of_face(face).letter(),
                None => '?',
            })
            .collect()
    }
}

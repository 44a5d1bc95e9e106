//! Grid and layer indexing for the 3x3x3 cube.
//!
//! Cells are addressed either by [`Coord`] or by a flat x-major index. Layers
//! are the nine rotatable slabs: three per axis, numbered
//! `L M R D E U B S F` so that a cubie at `(x, y, z)` belongs to layers
//! `x`, `y + 3` and `z + 6`.

use crate::geometry::{Axis, Face};
use crate::pieces::{Color, Coord, Cubie, CubieId};

/// Grid dimension per axis.
pub const DIM: usize = 3;

/// Total number of cells, including the hidden center.
pub const GRID_SIZE: usize = DIM * DIM * DIM;

/// Number of layers.
pub const NUM_LAYERS: usize = 9;

/// Number of stickers on the cube surface.
pub const NUM_FACELETS: usize = 54;

/// Converts (x, y, z) coordinates to a linear cell index.
///
/// Index order is x-major: `idx = x * DIM * DIM + y * DIM + z`.
#[inline(always)]
pub const fn coord_to_idx((x, y, z): Coord) -> usize {
    (x as usize) * DIM * DIM + (y as usize) * DIM + (z as usize)
}

/// Converts a linear cell index to (x, y, z) coordinates.
#[inline(always)]
pub const fn idx_to_coord(cell_index: usize) -> Coord {
    (
        (cell_index / (DIM * DIM)) as i32,
        ((cell_index / DIM) % DIM) as i32,
        (cell_index % DIM) as i32,
    )
}

/// A rotatable slab of nine cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    /// x = 0
    Left,
    /// x = 1
    Middle,
    /// x = 2
    Right,
    /// y = 0
    Down,
    /// y = 1
    Equator,
    /// y = 2
    Up,
    /// z = 0
    Back,
    /// z = 1
    Standing,
    /// z = 2
    Front,
}

impl Layer {
    /// All layers in index order.
    pub const ALL: [Layer; NUM_LAYERS] = [
        Layer::Left,
        Layer::Middle,
        Layer::Right,
        Layer::Down,
        Layer::Equator,
        Layer::Up,
        Layer::Back,
        Layer::Standing,
        Layer::Front,
    ];

    /// The six outer layers, in the order scrambles draw from.
    pub const OUTER: [Layer; 6] = [
        Layer::Left,
        Layer::Right,
        Layer::Down,
        Layer::Up,
        Layer::Back,
        Layer::Front,
    ];

    /// Index in `0..9`.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Layer with the given index, if in range.
    pub const fn from_index(index: usize) -> Option<Layer> {
        if index < NUM_LAYERS {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Layer perpendicular to `axis` at grid value `slice`.
    pub const fn from_axis_slice(axis: Axis, slice: i32) -> Layer {
        Self::ALL[axis.index() * DIM + slice as usize]
    }

    /// Rotation axis of this layer.
    pub const fn axis(self) -> Axis {
        Axis::ALL[self.index() / DIM]
    }

    /// Grid value shared by every member along [`Self::axis`].
    pub const fn slice(self) -> i32 {
        (self.index() % DIM) as i32
    }

    /// Outer face this layer contains, or `None` for middle slices.
    pub const fn face(self) -> Option<Face> {
        match self {
            Layer::Left => Some(Face::Left),
            Layer::Right => Some(Face::Right),
            Layer::Down => Some(Face::Down),
            Layer::Up => Some(Face::Up),
            Layer::Back => Some(Face::Back),
            Layer::Front => Some(Face::Front),
            Layer::Middle | Layer::Equator | Layer::Standing => None,
        }
    }

    /// Outer layer containing `face`.
    pub const fn of_face(face: Face) -> Layer {
        let slice = if face.is_positive() { 2 } else { 0 };
        Layer::from_axis_slice(face.axis(), slice)
    }

    /// Whether the cell lies in this layer.
    pub const fn contains(self, coord: Coord) -> bool {
        self.axis().component(coord) == self.slice()
    }
}

/// Layers containing `coord`, one per axis.
pub const fn layers_for(coord: Coord) -> [Layer; 3] {
    [
        Layer::from_axis_slice(Axis::X, coord.0),
        Layer::from_axis_slice(Axis::Y, coord.1),
        Layer::from_axis_slice(Axis::Z, coord.2),
    ]
}

/// Current membership of every layer.
///
/// Always rebuilt from scratch: nothing ever patches a single entry, so the
/// table cannot drift from the cubies' coordinates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerTable {
    members: [Vec<CubieId>; NUM_LAYERS],
}

impl LayerTable {
    /// Recomputes membership of all nine layers from the cubies' coordinates.
    pub fn rebuild(cubies: &[Cubie]) -> Self {
        let mut table = Self::default();
        for cubie in cubies {
            for layer in layers_for(cubie.coord) {
                table.members[layer.index()].push(cubie.id);
            }
        }
        table
    }

    /// Cubies currently in `layer`.
    pub fn members(&self, layer: Layer) -> &[CubieId] {
        &self.members[layer.index()]
    }
}

/// Grid cell and outward face shown by facelet `index`.
///
/// Facelets are numbered face by face in `U R F D L B` order, nine per face,
/// row-major as seen when looking at that face with the usual net
/// orientation (U with B at the top, D with F at the top, side faces with U at
/// the top).
pub const fn facelet_cell(index: usize) -> (Coord, Face) {
    let face_slot = index / 9;
    let row = ((index % 9) / 3) as i32;
    let col = (index % 3) as i32;
    match face_slot {
        0 => ((col, 2, row), Face::Up),
        1 => ((2, 2 - row, 2 - col), Face::Right),
        2 => ((col, 2 - row, 2), Face::Front),
        3 => ((col, 0, 2 - row), Face::Down),
        4 => ((0, 2 - row, col), Face::Left),
        _ => ((2 - col, 2 - row, 0), Face::Back),
    }
}

/// Formats the visible stickers as an unfolded net.
///
/// `facelets` is indexed as in [`facelet_cell`]. U sits above F, D below it,
/// and the middle band reads L F R B.
pub fn format_net(facelets: &[Color; NUM_FACELETS]) -> String {
    const INDENT: &str = "    ";

    let row_of = |face_slot: usize, row: usize| -> String {
        (0..3)
            .map(|col| facelets[face_slot * 9 + row * 3 + col].symbol())
            .collect()
    };

    let mut output = String::new();
    for row in 0..3 {
        output.push_str(INDENT);
        output.push_str(&row_of(0, row));
        output.push('\n');
    }
    for row in 0..3 {
        // L F R B
        let band: Vec<String> = [4, 2, 1, 5].iter().map(|&slot| row_of(slot, row)).collect();
        output.push_str(&band.join(" "));
        output.push('\n');
    }
    for row in 0..3 {
        output.push_str(INDENT);
        output.push_str(&row_of(3, row));
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use rustc_hash::FxHashSet;

    use super::*;
    use crate::pieces::solved_cubies;

    #[test]
    fn test_coordinate_conversion_roundtrip() {
        for idx in 0..GRID_SIZE {
            let recovered = coord_to_idx(idx_to_coord(idx));
            assert_eq!(recovered, idx, "Roundtrip failed for index {idx}");
        }
    }

    #[test]
    fn test_layer_axis_and_slice() {
        assert_eq!(Layer::Right.axis(), Axis::X);
        assert_eq!(Layer::Right.slice(), 2);
        assert_eq!(Layer::Equator.axis(), Axis::Y);
        assert_eq!(Layer::Equator.slice(), 1);
        assert_eq!(Layer::Back.axis(), Axis::Z);
        assert_eq!(Layer::Back.slice(), 0);
        for layer in Layer::ALL {
            assert_eq!(Layer::from_axis_slice(layer.axis(), layer.slice()), layer);
            assert_eq!(Layer::from_index(layer.index()), Some(layer));
        }
        assert_eq!(Layer::from_index(9), None);
    }

    #[test]
    fn test_layers_for_matches_index_scheme() {
        assert_eq!(
            layers_for((2, 0, 1)),
            [Layer::Right, Layer::Down, Layer::Standing]
        );
        for idx in 0..GRID_SIZE {
            let coord = idx_to_coord(idx);
            let [x, y, z] = layers_for(coord);
            assert_eq!(x.index(), coord.0 as usize);
            assert_eq!(y.index(), coord.1 as usize + 3);
            assert_eq!(z.index(), coord.2 as usize + 6);
        }
    }

    #[test]
    fn test_outer_layers_match_faces() {
        for layer in Layer::OUTER {
            let face = layer.face().unwrap();
            assert_eq!(Layer::of_face(face), layer);
        }
    }

    #[test]
    fn test_rebuild_sizes() {
        let table = LayerTable::rebuild(&solved_cubies());
        for layer in Layer::ALL {
            let expected = if layer.slice() == 1 { 8 } else { 9 };
            assert_eq!(table.members(layer).len(), expected, "{layer:?}");
        }
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let cubies = solved_cubies();
        assert_eq!(LayerTable::rebuild(&cubies), LayerTable::rebuild(&cubies));
    }

    #[test]
    fn test_facelet_cells_are_distinct_surface_cells() {
        let mut seen = FxHashSet::default();
        for index in 0..NUM_FACELETS {
            let (coord, face) = facelet_cell(index);
            assert!(
                Layer::of_face(face).contains(coord),
                "facelet {index} at {coord:?} is not on {face:?}"
            );
            assert!(seen.insert((coord, face)), "facelet {index} repeated");
        }
    }

    #[test]
    fn test_facelet_centers() {
        assert_eq!(facelet_cell(4), ((1, 2, 1), Face::Up));
        assert_eq!(facelet_cell(13), ((2, 1, 1), Face::Right));
        assert_eq!(facelet_cell(22), ((1, 1, 2), Face::Front));
        assert_eq!(facelet_cell(31), ((1, 0, 1), Face::Down));
        assert_eq!(facelet_cell(40), ((0, 1, 1), Face::Left));
        assert_eq!(facelet_cell(49), ((1, 1, 0), Face::Back));
    }
}

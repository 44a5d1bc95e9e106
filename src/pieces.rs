//! Cubie definitions and coordinate types.
//!
//! Each cubie is identified by the grid cell it occupies in the solved cube.
//! Its sticker colors are bound at creation from that home cell and never
//! change; only its position and orientation move with turns.

use nalgebra::UnitQuaternion;

use crate::geometry::Face;

/// A grid cell in the 3x3x3 cube, each axis in `0..=2`.
pub type Coord = (i32, i32, i32);

/// The hidden center cell. Never occupied by a cubie.
pub const CENTER: Coord = (1, 1, 1);

/// Number of cubies in the puzzle (27 cells minus the hidden center).
pub const NUM_CUBIES: usize = 26;

/// Sticker color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Yellow,
    Red,
    Orange,
    Blue,
    Green,
    /// Interior face that is never visible on the solved cube.
    Hidden,
}

impl Color {
    /// Color of the stickers on `face` of the solved cube.
    pub const fn of_face(face: Face) -> Self {
        match face {
            Face::Right => Color::Red,
            Face::Left => Color::Orange,
            Face::Up => Color::White,
            Face::Down => Color::Yellow,
            Face::Front => Color::Blue,
            Face::Back => Color::Green,
        }
    }

    /// Face that shows this color on the solved cube.
    pub const fn home_face(self) -> Option<Face> {
        match self {
            Color::White => Some(Face::Up),
            Color::Yellow => Some(Face::Down),
            Color::Red => Some(Face::Right),
            Color::Orange => Some(Face::Left),
            Color::Blue => Some(Face::Front),
            Color::Green => Some(Face::Back),
            Color::Hidden => None,
        }
    }

    /// Single-character label used by text output.
    pub const fn symbol(self) -> char {
        match self {
            Color::White => 'W',
            Color::Yellow => 'Y',
            Color::Red => 'R',
            Color::Orange => 'O',
            Color::Blue => 'B',
            Color::Green => 'G',
            Color::Hidden => '.',
        }
    }
}

/// Stable identifier of a cubie, independent of any rendering object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CubieId(pub u8);

/// One physical piece of the cube.
#[derive(Debug, Clone, PartialEq)]
pub struct Cubie {
    /// Stable identifier.
    pub id: CubieId,
    /// Cell occupied in the solved cube.
    pub home: Coord,
    /// Cell currently occupied.
    pub coord: Coord,
    /// Accumulated rotation applied by committed turns.
    pub orientation: UnitQuaternion<f64>,
    /// Sticker colors by original face, in [`Face::ALL`] order.
    pub stickers: [Color; 6],
}

impl Cubie {
    /// Creates a cubie at its home cell with identity orientation.
    pub fn new(id: CubieId, home: Coord) -> Self {
        Self {
            id,
            home,
            coord: home,
            orientation: UnitQuaternion::identity(),
            stickers: Face::ALL.map(|face| sticker_for(home, face)),
        }
    }

    /// Color bound to the given original face.
    pub fn sticker(&self, face: Face) -> Color {
        self.stickers[face as usize]
    }
}

/// Color of `face` on the cubie whose home cell is `home`.
///
/// Only faces that lie on the exterior of the solved cube get a color.
fn sticker_for((x, y, z): Coord, face: Face) -> Color {
    let exterior = match face {
        Face::Right => x == 2,
        Face::Left => x == 0,
        Face::Up => y == 2,
        Face::Down => y == 0,
        Face::Front => z == 2,
        Face::Back => z == 0,
    };
    if exterior {
        Color::of_face(face)
    } else {
        Color::Hidden
    }
}

/// Home cells of all cubies, in x-major order, skipping the center.
pub fn home_cells() -> impl Iterator<Item = Coord> {
    (0..3)
        .flat_map(|x| (0..3).flat_map(move |y| (0..3).map(move |z| (x, y, z))))
        .filter(|&coord| coord != CENTER)
}

/// All 26 cubies of a solved cube.
pub fn solved_cubies() -> Vec<Cubie> {
    home_cells()
        .enumerate()
        .map(|(i, home)| Cubie::new(CubieId(i as u8), home))
        .collect()
}

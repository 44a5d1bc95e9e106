//! Move notation codec.
//!
//! A move token is one layer letter (`L M R D E U B S F`) optionally followed
//! by `'` (counter-clockwise) or `2` (half turn). Internally a move is a number
//! of quarter turns about the positive world axis of its layer; this module is
//! the single table translating between the two.
//!
//! Looking at a face from outside the cube, clockwise about the outward normal
//! is a negative rotation for `R U F` and a positive rotation for `L D B`. The
//! middle slices map a positive rotation straight to the bare letter.

use std::fmt;
use std::str::FromStr;

use crate::error::CubeError;
use crate::grid::Layer;

/// Turn magnitude and direction of a move token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Turn {
    /// No suffix.
    Clockwise,
    /// `'` suffix.
    CounterClockwise,
    /// `2` suffix.
    Half,
}

impl Turn {
    /// Opposite direction. Half turns are their own inverse.
    pub const fn inverse(self) -> Turn {
        match self {
            Turn::Clockwise => Turn::CounterClockwise,
            Turn::CounterClockwise => Turn::Clockwise,
            Turn::Half => Turn::Half,
        }
    }

    const fn suffix(self) -> &'static str {
        match self {
            Turn::Clockwise => "",
            Turn::CounterClockwise => "'",
            Turn::Half => "2",
        }
    }
}

impl Layer {
    /// Notation letter.
    pub const fn letter(self) -> char {
        match self {
            Layer::Left => 'L',
            Layer::Middle => 'M',
            Layer::Right => 'R',
            Layer::Down => 'D',
            Layer::Equator => 'E',
            Layer::Up => 'U',
            Layer::Back => 'B',
            Layer::Standing => 'S',
            Layer::Front => 'F',
        }
    }

    /// Layer for a notation letter.
    pub fn from_letter(letter: char) -> Option<Layer> {
        Layer::ALL
            .into_iter()
            .find(|layer| layer.letter() == letter)
    }

    /// Quarter turns about the positive axis that the bare letter stands for,
    /// normalized to `0..4`.
    pub const fn clockwise_quarter_turns(self) -> i32 {
        match self {
            Layer::Right | Layer::Up | Layer::Front => 3,
            _ => 1,
        }
    }
}

/// One committed rotation of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub layer: Layer,
    pub turn: Turn,
}

impl Move {
    pub const fn new(layer: Layer, turn: Turn) -> Self {
        Self { layer, turn }
    }

    /// Move rotating `layer` by `quarter_turns` × 90° about its positive axis.
    ///
    /// Returns `None` when the count is a multiple of four.
    pub fn from_quarter_turns(layer: Layer, quarter_turns: i32) -> Option<Move> {
        let turn = match quarter_turns.rem_euclid(4) {
            0 => return None,
            2 => Turn::Half,
            q if q == layer.clockwise_quarter_turns() => Turn::Clockwise,
            _ => Turn::CounterClockwise,
        };
        Some(Move::new(layer, turn))
    }

    /// Quarter turns about the layer's positive axis, in `1..4`.
    pub const fn quarter_turns(self) -> i32 {
        let clockwise = self.layer.clockwise_quarter_turns();
        match self.turn {
            Turn::Clockwise => clockwise,
            Turn::CounterClockwise => 4 - clockwise,
            Turn::Half => 2,
        }
    }

    /// Move that undoes this one.
    pub const fn inverse(self) -> Move {
        Move::new(self.layer, self.turn.inverse())
    }

    /// Splits a half turn into two clockwise quarter turns.
    ///
    /// Quarter turns are returned unchanged.
    pub fn quarter_steps(self) -> impl Iterator<Item = Move> {
        let (step, count) = match self.turn {
            Turn::Half => (Move::new(self.layer, Turn::Clockwise), 2),
            _ => (self, 1),
        };
        std::iter::repeat(step).take(count)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.layer.letter(), self.turn.suffix())
    }
}

impl FromStr for Move {
    type Err = CubeError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        decode(token)
    }
}

/// Encodes a rotation of `layer` by `quarter_turns` as a move token.
///
/// Multiples of four encode to the empty string.
pub fn encode(layer: Layer, quarter_turns: i32) -> String {
    Move::from_quarter_turns(layer, quarter_turns)
        .map(|m| m.to_string())
        .unwrap_or_default()
}

/// Decodes a single move token.
pub fn decode(token: &str) -> Result<Move, CubeError> {
    let invalid = || CubeError::InvalidNotation {
        token: token.to_owned(),
    };

    let mut chars = token.chars();
    let layer = chars
        .next()
        .and_then(Layer::from_letter)
        .ok_or_else(invalid)?;
    let turn = match chars.as_str() {
        "" => Turn::Clockwise,
        "'" => Turn::CounterClockwise,
        "2" => Turn::Half,
        _ => return Err(invalid()),
    };
    Ok(Move::new(layer, turn))
}

/// Parses a whitespace-separated token stream.
pub fn parse_sequence(text: &str) -> Result<Vec<Move>, CubeError> {
    text.split_whitespace().map(decode).collect()
}

/// Formats moves as a space-separated token stream.
pub fn format_sequence(moves: &[Move]) -> String {
    moves
        .iter()
        .map(Move::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_encode_outer_layers() {
        assert_eq!(encode(Layer::Right, 1), "R'");
        assert_eq!(encode(Layer::Right, 3), "R");
        assert_eq!(encode(Layer::Right, -1), "R");
        assert_eq!(encode(Layer::Left, 1), "L");
        assert_eq!(encode(Layer::Left, 3), "L'");
        assert_eq!(encode(Layer::Back, 1), "B");
        assert_eq!(encode(Layer::Down, -1), "D'");
        assert_eq!(encode(Layer::Up, 2), "U2");
        assert_eq!(encode(Layer::Front, -2), "F2");
        assert_eq!(encode(Layer::Front, 4), "");
        assert_eq!(encode(Layer::Front, 0), "");
    }

    #[test]
    fn test_encode_slices_without_flip() {
        assert_eq!(encode(Layer::Middle, 1), "M");
        assert_eq!(encode(Layer::Middle, 3), "M'");
        assert_eq!(encode(Layer::Equator, 1), "E");
        assert_eq!(encode(Layer::Standing, -1), "S'");
    }

    #[test]
    fn test_decode() {
        assert_eq!(
            decode("R").unwrap(),
            Move::new(Layer::Right, Turn::Clockwise)
        );
        assert_eq!(
            decode("U'").unwrap(),
            Move::new(Layer::Up, Turn::CounterClockwise)
        );
        assert_eq!(
            decode("S2").unwrap(),
            Move::new(Layer::Standing, Turn::Half)
        );
    }

    #[test]
    fn test_decode_rejects_unknown_letters() {
        assert_eq!(
            decode("X"),
            Err(CubeError::InvalidNotation {
                token: "X".to_owned()
            })
        );
        assert!(decode("").is_err());
        assert!(decode("r").is_err());
        assert!(decode("R3").is_err());
        assert!(decode("R''").is_err());
    }

    #[test]
    fn test_parse_and_format_sequence() {
        let moves = parse_sequence("  R U  R' U'\nF2 ").unwrap();
        assert_eq!(format_sequence(&moves), "R U R' U' F2");
        assert!(parse_sequence("R Q").is_err());
        assert!(parse_sequence("").unwrap().is_empty());
    }

    #[test]
    fn test_inverse() {
        for layer in Layer::ALL {
            for q in 1..4 {
                let m = Move::from_quarter_turns(layer, q).unwrap();
                assert_eq!(m.inverse().quarter_turns(), 4 - q);
            }
        }
    }

    #[test]
    fn test_quarter_steps_split_half_turns() {
        let steps: Vec<Move> = decode("F2").unwrap().quarter_steps().collect();
        assert_eq!(steps, vec![decode("F").unwrap(), decode("F").unwrap()]);
        let steps: Vec<Move> = decode("F'").unwrap().quarter_steps().collect();
        assert_eq!(steps, vec![decode("F'").unwrap()]);
    }

    proptest! {
        #[test]
        fn proptest_codec_roundtrip(layer_index in 0usize..9, quarter_turns in 1i32..4) {
            let layer = Layer::ALL[layer_index];
            let token = encode(layer, quarter_turns);
            let decoded = decode(&token).unwrap();
            prop_assert_eq!(decoded.layer, layer);
            prop_assert_eq!(decoded.quarter_turns(), quarter_turns.rem_euclid(4));
            prop_assert_eq!(decoded.to_string(), token);
        }
    }
}

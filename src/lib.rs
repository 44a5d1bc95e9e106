//! Rubik's Cube Engine
//!
//! Logical model of a 3x3x3 cube and the machinery around it: move notation,
//! layer membership, drag gestures that snap to quarter turns, move history
//! and an asynchronous adapter for an external solver.

pub mod animation;
pub mod config;
pub mod cube;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod grid;
pub mod history;
pub mod notation;
pub mod pieces;
pub mod render;
pub mod session;
pub mod solver;

pub use config::Config;
pub use cube::Cube;
pub use error::CubeError;
pub use history::MoveHistory;
pub use notation::{Move, Turn};
pub use session::{Session, SessionEvent};

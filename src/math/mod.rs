//! Transform algebra
//!
//! Fixed-size 4x4 matrix operations used by scene graph evaluation,
//! skinning, and camera construction.

pub mod matrix;

pub use matrix::Matrix4;

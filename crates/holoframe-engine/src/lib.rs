//! Holoframe engine crate.
//!
//! Owns the graphics device, immediate context and adapter for a holographic
//! renderer, and the protocol that recreates them after device loss.

pub mod camera;
pub mod device;
pub mod logging;
pub mod sim;

#[cfg(windows)]
pub mod d3d11;

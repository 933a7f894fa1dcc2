//! Paint model used when clearing or tinting the hosting surface.

pub mod color;

pub use color::Color;

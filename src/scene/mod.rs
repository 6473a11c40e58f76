//! Scene document model and its mutation operations.
//!
//! - Model types and validation: [`model`]
//! - Plane/lattice math: [`geometry`]
//! - Add/delete/connect/transform/clone, with index renumbering: [`ops`]
//! - Wall synthesis: [`walls`]

mod geometry;
mod model;
mod ops;
mod walls;

pub use geometry::*;
pub use model::*;
pub use ops::*;
pub use walls::*;

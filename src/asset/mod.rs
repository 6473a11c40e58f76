//! Session-owned registries: textures and animated planes.

mod animation;
mod texture;

pub use animation::*;
pub use texture::*;

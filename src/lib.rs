//! gridforge - the document core of a node-and-wall 3D scene editor.
//!
//! A scene is a set of modules; a module is nodes (positions plus
//! mirrored adjacency), walls (planar faces over node indices), and a
//! center. On top of that sit a bounded snapshot undo history,
//! coplanarity-based wall synthesis, texture and animated-plane
//! registries, and two companion on-disk formats: Wavefront-style
//! geometry and section-delimited project metadata.
//!
//! Rendering, input, and cameras live elsewhere; they drive everything
//! through [`EditorSession`] and read the scene back out.

pub mod asset;
pub mod history;
pub mod io;
pub mod scene;
pub mod session;

pub use asset::{AnimatedPlane, AssetId, TextureLibrary, TextureRef};
pub use history::History;
pub use scene::{Module, Node, Point, Scene, Wall};
pub use session::EditorSession;

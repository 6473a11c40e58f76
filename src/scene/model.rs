//! Document model: nodes, walls, modules, and the scene aggregate.
//!
//! Identity is positional: nodes are addressed by index into their
//! module's `nodes` vector, modules by index into `Scene::modules`.
//! Deleting an element renumbers everything above it; the mutation
//! operations in [`super::ops`] maintain that contract, and
//! [`Scene::validate`] checks the structural invariants after the fact.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::asset::TextureRef;

use super::geometry::{self, grid_lattice, Point};

/// A vertex in a module: a position plus its adjacency lists.
///
/// `connections` holds same-module neighbor indices; `cross_connections`
/// holds `(module index, node index)` links into other modules. Both
/// are mirrored: if A lists B, B lists A.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub position: Point,
    pub connections: Vec<usize>,
    pub cross_connections: Vec<(usize, usize)>,
}

impl Node {
    pub fn new(position: Point) -> Self {
        Node {
            position,
            connections: Vec::new(),
            cross_connections: Vec::new(),
        }
    }

    pub fn is_connected_to(&self, node_idx: usize) -> bool {
        self.connections.contains(&node_idx)
    }

    pub fn is_cross_connected_to(&self, module_idx: usize, node_idx: usize) -> bool {
        self.cross_connections.contains(&(module_idx, node_idx))
    }
}

/// A planar face spanning three or more nodes of one module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub node_indices: Vec<usize>,
    /// Registry key into the session's texture library; walls share
    /// textures by id, never by pixel data.
    pub texture: Option<TextureRef>,
}

impl Wall {
    pub fn new(node_indices: Vec<usize>) -> Self {
        Wall {
            node_indices,
            texture: None,
        }
    }

    /// Order-insensitive node-set comparison, for duplicate detection.
    pub fn has_same_nodes(&self, indices: &[usize]) -> bool {
        if self.node_indices.len() != indices.len() {
            return false;
        }
        let mut a = self.node_indices.clone();
        let mut b = indices.to_vec();
        a.sort_unstable();
        b.sort_unstable();
        a == b
    }
}

/// A group of nodes and walls with its own center of mass. Transforms
/// and auto wall detection operate per module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    /// Monotonically assigned by the scene, never reused. Stable across
    /// module deletions, unlike the module's vector index.
    pub id: u32,
    pub name: String,
    pub nodes: Vec<Node>,
    pub walls: Vec<Wall>,
    pub center: Point,
}

impl Module {
    pub fn new(id: u32) -> Self {
        Module {
            id,
            name: format!("Module {id}"),
            nodes: Vec::new(),
            walls: Vec::new(),
            center: Point::new(0.0, 0.0, 0.0),
        }
    }

    /// A cubic lattice module: `dimension` nodes per axis spanning
    /// `extent` world units around `center`, with mirrored axis-aligned
    /// neighbor connections.
    pub fn grid(id: u32, center: Point, extent: f32, dimension: usize) -> Self {
        let (points, edges) = grid_lattice(center, extent, dimension);
        let mut module = Module::new(id);
        module.nodes = points.into_iter().map(Node::new).collect();
        for (a, b) in edges {
            module.nodes[a].connections.push(b);
            module.nodes[b].connections.push(a);
        }
        module.center = center;
        module
    }

    pub fn node_positions(&self) -> Vec<Point> {
        self.nodes.iter().map(|n| n.position).collect()
    }

    /// Recomputes the center as the node centroid. Call after any
    /// structural change that isn't a rigid transform of every node.
    pub fn recenter(&mut self) {
        self.center = geometry::centroid(&self.node_positions());
    }
}

/// The whole document: every module plus the id counter. This is the
/// unit of undo snapshotting, so it stays plain data with a cheap
/// `Clone`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub modules: Vec<Module>,
    pub next_module_id: u32,
}

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("scene validation failed: {0}")]
    Validation(String),
}

impl Scene {
    /// A scene holding one module, with the id counter advanced past it.
    pub fn with_module(module: Module) -> Self {
        let next_module_id = module.id + 1;
        Scene {
            modules: vec![module],
            next_module_id,
        }
    }

    pub fn allocate_module_id(&mut self) -> u32 {
        let id = self.next_module_id;
        self.next_module_id += 1;
        id
    }

    pub fn node(&self, module_idx: usize, node_idx: usize) -> Option<&Node> {
        self.modules.get(module_idx)?.nodes.get(node_idx)
    }

    pub fn node_count(&self) -> usize {
        self.modules.iter().map(|m| m.nodes.len()).sum()
    }

    pub fn wall_count(&self) -> usize {
        self.modules.iter().map(|m| m.walls.len()).sum()
    }

    /// Checks the structural invariants: every stored index in range,
    /// no self-loops, every connection mirrored (same-module and
    /// cross-module), every wall with at least three in-range nodes.
    pub fn validate(&self) -> Result<(), SceneError> {
        let fail = |msg: String| Err(SceneError::Validation(msg));
        for (mi, module) in self.modules.iter().enumerate() {
            for (ni, node) in module.nodes.iter().enumerate() {
                for &conn in &node.connections {
                    if conn == ni {
                        return fail(format!("module {mi} node {ni}: self-loop"));
                    }
                    let Some(other) = module.nodes.get(conn) else {
                        return fail(format!(
                            "module {mi} node {ni}: connection {conn} out of range"
                        ));
                    };
                    if !other.is_connected_to(ni) {
                        return fail(format!(
                            "module {mi}: connection {ni} -> {conn} not mirrored"
                        ));
                    }
                }
                for &(tm, tn) in &node.cross_connections {
                    if tm == mi {
                        return fail(format!(
                            "module {mi} node {ni}: cross-connection to own module"
                        ));
                    }
                    let Some(target) = self.modules.get(tm).and_then(|m| m.nodes.get(tn))
                    else {
                        return fail(format!(
                            "module {mi} node {ni}: cross-connection ({tm}, {tn}) out of range"
                        ));
                    };
                    if !target.is_cross_connected_to(mi, ni) {
                        return fail(format!(
                            "cross-connection ({mi}, {ni}) <-> ({tm}, {tn}) not mirrored"
                        ));
                    }
                }
            }
            for (wi, wall) in module.walls.iter().enumerate() {
                if wall.node_indices.len() < 3 {
                    return fail(format!(
                        "module {mi} wall {wi}: fewer than 3 nodes"
                    ));
                }
                for &idx in &wall.node_indices {
                    if idx >= module.nodes.len() {
                        return fail(format!(
                            "module {mi} wall {wi}: node index {idx} out of range"
                        ));
                    }
                }
            }
            if module.id >= self.next_module_id {
                return fail(format!(
                    "module {mi}: id {} not below next_module_id {}",
                    module.id, self.next_module_id
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_module_validates() {
        let module = Module::grid(0, Point::new(0.0, 5.0, 0.0), 12.0, 3);
        let scene = Scene::with_module(module);
        scene.validate().unwrap();
        assert_eq!(scene.node_count(), 27);
    }

    #[test]
    fn grid_connections_are_mirrored() {
        let module = Module::grid(0, Point::new(0.0, 0.0, 0.0), 12.0, 3);
        for (ni, node) in module.nodes.iter().enumerate() {
            for &conn in &node.connections {
                assert!(module.nodes[conn].is_connected_to(ni));
            }
        }
        let undirected: usize = module.nodes.iter().map(|n| n.connections.len()).sum();
        assert_eq!(undirected, 108, "54 undirected edges, both directions stored");
    }

    #[test]
    fn validate_catches_unmirrored_connection() {
        let mut module = Module::new(0);
        module.nodes.push(Node::new(Point::new(0.0, 0.0, 0.0)));
        module.nodes.push(Node::new(Point::new(1.0, 0.0, 0.0)));
        module.nodes[0].connections.push(1);
        let scene = Scene::with_module(module);
        assert!(scene.validate().is_err());
    }

    #[test]
    fn validate_catches_dangling_wall_index() {
        let mut module = Module::new(0);
        for i in 0..3 {
            module.nodes.push(Node::new(Point::new(i as f32, 0.0, 0.0)));
        }
        module.walls.push(Wall::new(vec![0, 1, 7]));
        let scene = Scene::with_module(module);
        assert!(scene.validate().is_err());
    }

    #[test]
    fn wall_node_set_comparison_ignores_order() {
        let wall = Wall::new(vec![3, 1, 2]);
        assert!(wall.has_same_nodes(&[1, 2, 3]));
        assert!(!wall.has_same_nodes(&[1, 2, 4]));
        assert!(!wall.has_same_nodes(&[1, 2]));
    }
}

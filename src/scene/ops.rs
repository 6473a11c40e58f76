//! Scene mutations: add, connect, delete, transform, clone.
//!
//! Deletion is the delicate part. Indices are identity, so removing a
//! node (or module) renumbers everything above it, and every stored
//! reference has to follow: adjacency lists, cross-module links, and
//! wall index lists. All of that lives here so the cascade is in one
//! place. Entry points taking pick-layer indices no-op on out-of-range
//! input rather than panic, since picks can go stale between frames.

use cgmath::InnerSpace;

use super::geometry::Point;
use super::model::{Module, Node, Scene};

/// Rotation axis for per-tick module rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

fn rotate_about(axis: Axis, angle: f32, pivot: Point, p: Point) -> Point {
    let (sin, cos) = angle.sin_cos();
    let d = p - pivot;
    let rotated = match axis {
        Axis::X => Point::new(d.x, d.y * cos - d.z * sin, d.y * sin + d.z * cos),
        Axis::Y => Point::new(d.x * cos + d.z * sin, d.y, -d.x * sin + d.z * cos),
        Axis::Z => Point::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos, d.z),
    };
    pivot + rotated
}

impl Scene {
    /// Appends a free-standing node. No automatic connections: linking
    /// is always an explicit, separate action.
    pub fn add_node(&mut self, module_idx: usize, position: Point) -> Option<usize> {
        let module = self.modules.get_mut(module_idx)?;
        module.nodes.push(Node::new(position));
        module.recenter();
        Some(module.nodes.len() - 1)
    }

    /// Toggles the (mirrored) connection between two node references.
    /// Same-module pairs use the adjacency lists, cross-module pairs the
    /// cross lists. Self-pairs and stale indices change nothing.
    /// Returns whether the scene changed.
    pub fn toggle_connection(&mut self, a: (usize, usize), b: (usize, usize)) -> bool {
        if a == b {
            return false;
        }
        if self.node(a.0, a.1).is_none() || self.node(b.0, b.1).is_none() {
            return false;
        }
        if a.0 == b.0 {
            let module = &mut self.modules[a.0];
            if module.nodes[a.1].is_connected_to(b.1) {
                module.nodes[a.1].connections.retain(|&c| c != b.1);
                module.nodes[b.1].connections.retain(|&c| c != a.1);
            } else {
                module.nodes[a.1].connections.push(b.1);
                module.nodes[b.1].connections.push(a.1);
            }
        } else if self.modules[a.0].nodes[a.1].is_cross_connected_to(b.0, b.1) {
            self.modules[a.0].nodes[a.1]
                .cross_connections
                .retain(|&c| c != b);
            self.modules[b.0].nodes[b.1]
                .cross_connections
                .retain(|&c| c != a);
        } else {
            self.modules[a.0].nodes[a.1].cross_connections.push(b);
            self.modules[b.0].nodes[b.1].cross_connections.push(a);
        }
        true
    }

    /// Removes a node and renumbers every surviving reference to the
    /// module's index space. Walls containing the node are removed
    /// outright. Returns false (and changes nothing) on stale indices.
    pub fn delete_node(&mut self, module_idx: usize, node_idx: usize) -> bool {
        if self.node(module_idx, node_idx).is_none() {
            return false;
        }

        // Same-module adjacency: drop references, then shift the rest.
        let module = &mut self.modules[module_idx];
        for node in &mut module.nodes {
            node.connections.retain(|&c| c != node_idx);
            for conn in &mut node.connections {
                if *conn > node_idx {
                    *conn -= 1;
                }
            }
        }

        // Cross-module references from every other module.
        for (mi, module) in self.modules.iter_mut().enumerate() {
            if mi == module_idx {
                continue;
            }
            for node in &mut module.nodes {
                node.cross_connections
                    .retain(|&(tm, tn)| !(tm == module_idx && tn == node_idx));
                for cross in &mut node.cross_connections {
                    if cross.0 == module_idx && cross.1 > node_idx {
                        cross.1 -= 1;
                    }
                }
            }
        }

        // Walls: drop any wall using the node, shift the survivors.
        let module = &mut self.modules[module_idx];
        module.walls.retain(|w| !w.node_indices.contains(&node_idx));
        for wall in &mut module.walls {
            for idx in &mut wall.node_indices {
                if *idx > node_idx {
                    *idx -= 1;
                }
            }
        }

        module.nodes.remove(node_idx);
        module.recenter();
        true
    }

    pub fn delete_wall(&mut self, module_idx: usize, wall_idx: usize) -> bool {
        let Some(module) = self.modules.get_mut(module_idx) else {
            return false;
        };
        if wall_idx >= module.walls.len() {
            return false;
        }
        module.walls.remove(wall_idx);
        true
    }

    /// Removes a whole module and renumbers cross-module references in
    /// the survivors. The last module cannot be deleted; the editor
    /// always keeps at least one.
    pub fn delete_module(&mut self, module_idx: usize) -> bool {
        if module_idx >= self.modules.len() || self.modules.len() <= 1 {
            return false;
        }
        self.modules.remove(module_idx);
        for module in &mut self.modules {
            for node in &mut module.nodes {
                node.cross_connections.retain(|&(tm, _)| tm != module_idx);
                for cross in &mut node.cross_connections {
                    if cross.0 > module_idx {
                        cross.0 -= 1;
                    }
                }
            }
        }
        true
    }

    /// Rigid translation of every node and the stored center.
    pub fn translate_module(&mut self, module_idx: usize, delta: Point) -> bool {
        let Some(module) = self.modules.get_mut(module_idx) else {
            return false;
        };
        for node in &mut module.nodes {
            node.position += delta;
        }
        module.center += delta;
        true
    }

    /// Rotates every node about the module center, in the plane
    /// perpendicular to `axis`. The center itself is unchanged.
    pub fn rotate_module(&mut self, module_idx: usize, axis: Axis, angle: f32) -> bool {
        let Some(module) = self.modules.get_mut(module_idx) else {
            return false;
        };
        let pivot = module.center;
        for node in &mut module.nodes {
            node.position = rotate_about(axis, angle, pivot, node.position);
        }
        true
    }

    /// Uniform scale of every node about `pivot`. Non-positive or
    /// non-finite factors change nothing.
    pub fn scale_module(&mut self, module_idx: usize, pivot: Point, factor: f32) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            return false;
        }
        let Some(module) = self.modules.get_mut(module_idx) else {
            return false;
        };
        for node in &mut module.nodes {
            node.position = pivot + (node.position - pivot) * factor;
        }
        module.center = pivot + (module.center - pivot) * factor;
        true
    }

    /// Duplicates a module under a fresh id, offset in space. The copy
    /// keeps nodes, same-module connections, and walls (sharing texture
    /// ids); cross-module links are not copied, since their mirrors
    /// live in other modules and would dangle one-sided.
    pub fn clone_module(&mut self, module_idx: usize, offset: Point) -> Option<usize> {
        let source = self.modules.get(module_idx)?.clone();
        let id = self.allocate_module_id();
        let mut clone = source;
        clone.id = id;
        clone.name = format!("Module {id}");
        for node in &mut clone.nodes {
            node.position += offset;
            node.cross_connections.clear();
        }
        clone.center += offset;
        self.modules.push(clone);
        Some(self.modules.len() - 1)
    }

    /// Copies a set of node references into a brand-new module.
    /// Same-module connections between two selected nodes are remapped
    /// into the copy; connections leaving the subset, and cross-module
    /// links, are dropped. Returns the new module's index, or `None`
    /// when no valid node reference was given.
    pub fn clone_selection(&mut self, selection: &[(usize, usize)]) -> Option<usize> {
        let mut picked: Vec<(usize, usize)> = Vec::new();
        for &(m, n) in selection {
            if self.node(m, n).is_some() && !picked.contains(&(m, n)) {
                picked.push((m, n));
            }
        }
        if picked.is_empty() {
            return None;
        }

        let id = self.allocate_module_id();
        let mut module = Module::new(id);
        for &(m, n) in &picked {
            module.nodes.push(Node::new(self.modules[m].nodes[n].position));
        }
        let remap = |target: (usize, usize)| picked.iter().position(|&p| p == target);
        for (new_idx, &(m, n)) in picked.iter().enumerate() {
            for &conn in &self.modules[m].nodes[n].connections {
                if let Some(other) = remap((m, conn)) {
                    if !module.nodes[new_idx].is_connected_to(other) {
                        module.nodes[new_idx].connections.push(other);
                    }
                }
            }
        }
        module.recenter();
        self.modules.push(module);
        Some(self.modules.len() - 1)
    }

    /// Nearest node reference to `target`, with its distance. Used by
    /// the session to decide which module a placed node should join.
    pub fn nearest_node(&self, target: Point) -> Option<((usize, usize), f32)> {
        let mut best: Option<((usize, usize), f32)> = None;
        for (mi, module) in self.modules.iter().enumerate() {
            for (ni, node) in module.nodes.iter().enumerate() {
                let dist2 = (node.position - target).magnitude2();
                if best.map_or(true, |(_, b)| dist2 < b) {
                    best = Some(((mi, ni), dist2));
                }
            }
        }
        best.map(|(r, d2)| (r, d2.sqrt()))
    }
}

//! Wall synthesis: manual fill from a selection, and batch auto-detect
//! over a module's connection graph.
//!
//! Both paths share the coplanarity test in [`super::geometry`]. Auto
//! detection is cubic in component size (every 3-subset is a candidate
//! plane), so it only runs as an explicit batch action, never per edit.

use std::collections::VecDeque;

use thiserror::Error;

use super::geometry::{self, plane_normal, COPLANAR_TOLERANCE};
use super::model::{Node, Scene, Wall};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WallError {
    #[error("a wall needs at least 3 selected nodes")]
    TooFewNodes,
    #[error("the selected nodes are collinear")]
    Collinear,
    #[error("the selected nodes are not coplanar")]
    NotCoplanar,
    #[error("a wall over these nodes already exists")]
    Duplicate,
}

impl From<geometry::GeometryError> for WallError {
    fn from(err: geometry::GeometryError) -> Self {
        match err {
            geometry::GeometryError::TooFewPoints => WallError::TooFewNodes,
            geometry::GeometryError::Collinear => WallError::Collinear,
            geometry::GeometryError::NotCoplanar => WallError::NotCoplanar,
        }
    }
}

impl Scene {
    /// Builds one wall from a selection of node references.
    ///
    /// Stale references are dropped first (picks can outlive a delete);
    /// duplicates in the selection are ignored. The surviving set must
    /// be at least three coplanar, non-collinear nodes. The wall lands
    /// in the module of the first selected node; selected nodes from
    /// other modules are copied into it, with a mirrored cross-module
    /// connection recording where each copy came from.
    pub fn wall_from_selection(
        &mut self,
        selection: &[(usize, usize)],
    ) -> Result<(), WallError> {
        let mut picked: Vec<(usize, usize)> = Vec::new();
        for &(m, n) in selection {
            if self.node(m, n).is_some() && !picked.contains(&(m, n)) {
                picked.push((m, n));
            }
        }
        if picked.len() < 3 {
            return Err(WallError::TooFewNodes);
        }

        let points: Vec<_> = picked
            .iter()
            .map(|&(m, n)| self.modules[m].nodes[n].position)
            .collect();
        geometry::check_coplanar(&points)?;

        let target = picked[0].0;
        if picked.iter().all(|&(m, _)| m == target) {
            let indices: Vec<usize> = picked.iter().map(|&(_, n)| n).collect();
            let module = &mut self.modules[target];
            if module.walls.iter().any(|w| w.has_same_nodes(&indices)) {
                return Err(WallError::Duplicate);
            }
            module.walls.push(Wall::new(indices));
            return Ok(());
        }

        // Mixed selection: copy foreign nodes into the target module and
        // link each copy back to its original.
        let mut indices = Vec::with_capacity(picked.len());
        for &(m, n) in &picked {
            if m == target {
                indices.push(n);
                continue;
            }
            let position = self.modules[m].nodes[n].position;
            let copy_idx = self.modules[target].nodes.len();
            self.modules[target].nodes.push(Node::new(position));
            self.modules[target].nodes[copy_idx]
                .cross_connections
                .push((m, n));
            self.modules[m].nodes[n]
                .cross_connections
                .push((target, copy_idx));
            indices.push(copy_idx);
        }
        self.modules[target].walls.push(Wall::new(indices));
        self.modules[target].recenter();
        Ok(())
    }

    /// Rebuilds a module's walls from its connection graph. Existing
    /// walls are discarded first. Returns the number of walls created,
    /// or `None` for a stale module index.
    ///
    /// For each connected component of the same-module graph, every
    /// 3-subset of not-yet-claimed nodes proposes a plane; the largest
    /// coplanar subset of the component wins and becomes one wall, and
    /// its nodes are out of the running for further walls.
    pub fn detect_walls(&mut self, module_idx: usize) -> Option<usize> {
        let module = self.modules.get_mut(module_idx)?;
        module.walls.clear();

        let count = module.nodes.len();
        let mut claimed = vec![false; count];
        let mut exhausted = vec![false; count];
        let mut created = 0;

        for start in 0..count {
            if claimed[start] || exhausted[start] {
                continue;
            }
            // Connected component around `start`, skipping nodes that
            // already belong to a wall.
            let mut component = Vec::new();
            let mut seen = vec![false; count];
            let mut queue = VecDeque::new();
            seen[start] = true;
            queue.push_back(start);
            while let Some(current) = queue.pop_front() {
                if !claimed[current] {
                    component.push(current);
                }
                for &next in &module.nodes[current].connections {
                    if !seen[next] {
                        seen[next] = true;
                        queue.push_back(next);
                    }
                }
            }

            let best = largest_coplanar_subset(module, &component);
            match best {
                Some(subset) if subset.len() >= 3 => {
                    for &idx in &subset {
                        claimed[idx] = true;
                    }
                    module.walls.push(Wall::new(subset));
                    created += 1;
                }
                _ => {
                    // Nothing planar left in this component.
                    for &idx in &component {
                        exhausted[idx] = true;
                    }
                }
            }
        }
        Some(created)
    }
}

/// Largest subset of `candidates` lying within tolerance of a plane
/// proposed by one of its 3-subsets. Collinear triples propose nothing.
fn largest_coplanar_subset(
    module: &super::model::Module,
    candidates: &[usize],
) -> Option<Vec<usize>> {
    if candidates.len() < 3 {
        return None;
    }
    let pos = |idx: usize| module.nodes[idx].position;
    let mut best: Vec<usize> = Vec::new();
    for i in 0..candidates.len() {
        for j in (i + 1)..candidates.len() {
            for k in (j + 1)..candidates.len() {
                let (a, b, c) = (candidates[i], candidates[j], candidates[k]);
                let Some(normal) = plane_normal(pos(a), pos(b), pos(c)) else {
                    continue;
                };
                let origin = pos(a);
                let subset: Vec<usize> = candidates
                    .iter()
                    .copied()
                    .filter(|&idx| {
                        geometry::plane_distance(origin, normal, pos(idx)).abs()
                            <= COPLANAR_TOLERANCE
                    })
                    .collect();
                if subset.len() > best.len() {
                    best = subset;
                }
            }
        }
    }
    if best.is_empty() {
        None
    } else {
        Some(best)
    }
}

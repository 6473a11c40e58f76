//! The editing session: one scene, its history, and the registries the
//! scene refers into.
//!
//! This is the seam the interactive layers (renderer, pick layer, UI)
//! talk to. Every mutation goes through one entry point here, and every
//! entry point that changes the scene commits a history snapshot on
//! success, so undo granularity is exactly one user action. Selection
//! and the pending connect endpoint are transient session state, never
//! part of the document. Nothing in here is global; tools hold a
//! `&mut EditorSession`.

use std::path::{Path, PathBuf};

use log::warn;
use thiserror::Error;

use crate::asset::{AnimatedPlane, AssetId, TextureLibrary, TextureRef};
use crate::history::History;
use crate::io::{self, ObjError, ProjectMetadata};
use crate::scene::{Aabb, Axis, Module, Point, Scene, WallError};

/// Starter and spawned grid modules: nodes per axis.
pub const GRID_DIMENSION: usize = 3;
/// Starter and spawned grid modules: world-unit span per axis.
pub const GRID_EXTENT: f32 = 12.0;
/// A placed node joins the module of the nearest existing node within
/// this distance; beyond it, the node starts a module of its own.
pub const NODE_MODULE_RANGE: f32 = 15.0;
/// New grid modules spawn this far along +X from the last module.
pub const MODULE_SPAWN_STEP: f32 = 15.0;
/// Cloned modules land this far along +X from their source.
pub const CLONE_OFFSET: f32 = 10.0;
/// Angle of one rotation tick, 15 degrees.
pub const ROTATE_STEP: f32 = std::f32::consts::PI / 12.0;

fn initial_center() -> Point {
    Point::new(0.0, 5.0, 0.0)
}

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error(transparent)]
    Geometry(#[from] ObjError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct EditorSession {
    scene: Scene,
    history: History,
    pub textures: TextureLibrary,
    pub planes: Vec<AnimatedPlane>,
    selection: Vec<(usize, usize)>,
    active_module: usize,
    pending_connect: Option<(usize, usize)>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorSession {
    /// A fresh session: one grid module and the baseline snapshot.
    pub fn new() -> Self {
        let scene = Scene::with_module(Module::grid(
            0,
            initial_center(),
            GRID_EXTENT,
            GRID_DIMENSION,
        ));
        let mut history = History::new();
        history.save_state(&scene);
        EditorSession {
            scene,
            history,
            textures: TextureLibrary::new(),
            planes: Vec::new(),
            selection: Vec::new(),
            active_module: 0,
            pending_connect: None,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn selection(&self) -> &[(usize, usize)] {
        &self.selection
    }

    pub fn active_module(&self) -> usize {
        self.active_module
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    fn commit(&mut self) {
        self.history.save_state(&self.scene);
    }

    /// Indices shifted or died; drop everything that points at nodes.
    fn clear_transient(&mut self) {
        self.selection.clear();
        self.pending_connect = None;
        if self.active_module >= self.scene.modules.len() {
            self.active_module = self.scene.modules.len().saturating_sub(1);
        }
    }

    // ----- nodes and connections -----

    /// Places a node, joining the module of the nearest existing node
    /// when one is within [`NODE_MODULE_RANGE`], otherwise starting a
    /// new single-node module.
    pub fn place_node(&mut self, position: Point) -> (usize, usize) {
        let target = match self.scene.nearest_node(position) {
            Some(((module, _), dist)) if dist <= NODE_MODULE_RANGE => module,
            _ => {
                let id = self.scene.allocate_module_id();
                let mut module = Module::new(id);
                module.center = position;
                self.scene.modules.push(module);
                self.scene.modules.len() - 1
            }
        };
        // The module is guaranteed present, so add_node cannot fail.
        let node = self.scene.add_node(target, position).unwrap_or(0);
        self.active_module = target;
        self.commit();
        (target, node)
    }

    pub fn add_node_to(&mut self, module_idx: usize, position: Point) -> Option<usize> {
        let node = self.scene.add_node(module_idx, position)?;
        self.active_module = module_idx;
        self.commit();
        Some(node)
    }

    pub fn toggle_connection(&mut self, a: (usize, usize), b: (usize, usize)) {
        if self.scene.toggle_connection(a, b) {
            self.commit();
        }
    }

    /// Two-click connect flow: the first click arms an endpoint, the
    /// second toggles the connection (cross-module included) and
    /// disarms. Clicking the armed node again just disarms.
    pub fn click_connect(&mut self, module_idx: usize, node_idx: usize) {
        let clicked = (module_idx, node_idx);
        match self.pending_connect.take() {
            Some(armed) if armed != clicked => self.toggle_connection(armed, clicked),
            Some(_) => {}
            None => self.pending_connect = Some(clicked),
        }
    }

    pub fn pending_connect(&self) -> Option<(usize, usize)> {
        self.pending_connect
    }

    pub fn delete_node(&mut self, module_idx: usize, node_idx: usize) {
        if self.scene.delete_node(module_idx, node_idx) {
            self.clear_transient();
            self.commit();
        }
    }

    // ----- selection -----

    /// Toggles a node's membership in the selection.
    pub fn select_node(&mut self, module_idx: usize, node_idx: usize) {
        if self.scene.node(module_idx, node_idx).is_none() {
            return;
        }
        let entry = (module_idx, node_idx);
        if let Some(pos) = self.selection.iter().position(|&s| s == entry) {
            self.selection.remove(pos);
        } else {
            self.selection.push(entry);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // ----- walls -----

    /// Builds a wall from the current selection; the selection is
    /// consumed on success and kept for fixing up on failure.
    pub fn fill_wall(&mut self) -> Result<(), WallError> {
        let selection = self.selection.clone();
        self.scene.wall_from_selection(&selection)?;
        self.selection.clear();
        self.commit();
        Ok(())
    }

    /// Rebuilds a module's walls from its connection graph. Returns the
    /// number of walls created.
    pub fn detect_walls(&mut self, module_idx: usize) -> Option<usize> {
        let created = self.scene.detect_walls(module_idx)?;
        self.commit();
        Some(created)
    }

    pub fn delete_wall(&mut self, module_idx: usize, wall_idx: usize) {
        if self.scene.delete_wall(module_idx, wall_idx) {
            self.commit();
        }
    }

    /// Binds a library texture to a wall, replacing any existing
    /// binding. No-ops on stale indices or an unknown asset.
    pub fn assign_texture(&mut self, module_idx: usize, wall_idx: usize, id: AssetId) {
        let Some(texture) = self.textures.make_ref(id) else {
            return;
        };
        let Some(wall) = self
            .scene
            .modules
            .get_mut(module_idx)
            .and_then(|m| m.walls.get_mut(wall_idx))
        else {
            return;
        };
        wall.texture = Some(texture);
        self.commit();
    }

    pub fn clear_texture(&mut self, module_idx: usize, wall_idx: usize) {
        let Some(wall) = self
            .scene
            .modules
            .get_mut(module_idx)
            .and_then(|m| m.walls.get_mut(wall_idx))
        else {
            return;
        };
        if wall.texture.take().is_some() {
            self.commit();
        }
    }

    // ----- modules -----

    /// Adds a fresh grid module one spawn step along +X from the last
    /// module's center.
    pub fn spawn_grid_module(&mut self) -> usize {
        let center = self
            .scene
            .modules
            .last()
            .map(|m| m.center + Point::new(MODULE_SPAWN_STEP, 0.0, 0.0))
            .unwrap_or_else(initial_center);
        let id = self.scene.allocate_module_id();
        self.scene
            .modules
            .push(Module::grid(id, center, GRID_EXTENT, GRID_DIMENSION));
        self.active_module = self.scene.modules.len() - 1;
        self.commit();
        self.active_module
    }

    pub fn delete_module(&mut self, module_idx: usize) {
        if self.scene.delete_module(module_idx) {
            self.clear_transient();
            self.commit();
        }
    }

    pub fn translate_module(&mut self, module_idx: usize, delta: Point) {
        if self.scene.translate_module(module_idx, delta) {
            self.commit();
        }
    }

    pub fn rotate_module(&mut self, module_idx: usize, axis: Axis, angle: f32) {
        if self.scene.rotate_module(module_idx, axis, angle) {
            self.commit();
        }
    }

    /// Uniform scale about the centroid of the selected nodes in the
    /// module, falling back to the module center when nothing relevant
    /// is selected.
    pub fn scale_module(&mut self, module_idx: usize, factor: f32) {
        let pivot = self.scale_pivot(module_idx);
        if self.scene.scale_module(module_idx, pivot, factor) {
            self.commit();
        }
    }

    fn scale_pivot(&self, module_idx: usize) -> Point {
        let selected: Vec<Point> = self
            .selection
            .iter()
            .filter(|&&(m, _)| m == module_idx)
            .filter_map(|&(m, n)| self.scene.node(m, n).map(|node| node.position))
            .collect();
        if selected.is_empty() {
            self.scene
                .modules
                .get(module_idx)
                .map(|m| m.center)
                .unwrap_or_else(|| Point::new(0.0, 0.0, 0.0))
        } else {
            crate::scene::centroid(&selected)
        }
    }

    pub fn clone_module(&mut self, module_idx: usize) -> Option<usize> {
        let idx = self
            .scene
            .clone_module(module_idx, Point::new(CLONE_OFFSET, 0.0, 0.0))?;
        self.active_module = idx;
        self.commit();
        Some(idx)
    }

    /// Copies the selected nodes into a new module; the selection is
    /// consumed.
    pub fn clone_selection(&mut self) -> Option<usize> {
        let idx = self.scene.clone_selection(&self.selection)?;
        self.selection.clear();
        self.active_module = idx;
        self.commit();
        Some(idx)
    }

    // ----- history -----

    /// Steps the scene back one committed action. Returns false at the
    /// baseline.
    pub fn undo(&mut self) -> bool {
        let Some(restored) = self.history.restore() else {
            return false;
        };
        self.scene = restored;
        self.clear_transient();
        true
    }

    // ----- files -----

    pub fn export_geometry(&self, path: &Path) -> Result<(), ObjError> {
        io::export_obj(&self.scene, &self.textures, path)
    }

    /// Replaces the scene with the file's contents, flattened into one
    /// module, and empties the registries — texture bindings and planes
    /// belong to the metadata companion, so carrying the previous
    /// project's registries over would attach them to the wrong scene.
    /// The session stays untouched when parsing fails. Returns the
    /// imported bounding box for camera framing.
    pub fn import_geometry(&mut self, path: &Path) -> Result<Aabb, ObjError> {
        let imported = io::import_obj(path, 0)?;
        self.scene = Scene::with_module(imported.module);
        self.textures = TextureLibrary::new();
        self.planes.clear();
        self.history.clear();
        self.commit();
        self.clear_transient();
        self.active_module = 0;
        Ok(imported.bounds)
    }

    /// Rebuilds the registries and wall bindings from parsed metadata.
    /// Texture files that fail to load keep their registry slot, so the
    /// file's library indices stay meaningful; bindings to nonexistent
    /// walls or textures are dropped with a warning.
    pub fn apply_metadata(&mut self, meta: ProjectMetadata) {
        self.textures = TextureLibrary::new();
        for path in &meta.texture_paths {
            self.textures.register_and_try_load(path);
        }
        for binding in &meta.wall_bindings {
            let Some(asset) = self.textures.by_index(binding.texture).map(|e| e.id) else {
                warn!(
                    "wall ({}, {}) binds texture index {} beyond the library, skipping",
                    binding.module, binding.wall, binding.texture
                );
                continue;
            };
            let Some(wall) = self
                .scene
                .modules
                .get_mut(binding.module)
                .and_then(|m| m.walls.get_mut(binding.wall))
            else {
                warn!(
                    "texture binding for missing wall ({}, {}), skipping",
                    binding.module, binding.wall
                );
                continue;
            };
            wall.texture = Some(TextureRef {
                asset,
                name: binding.name.clone(),
            });
        }
        self.planes = meta.planes;
    }

    fn project_paths(base: &Path) -> (PathBuf, PathBuf) {
        (base.with_extension("obj"), base.with_extension("meta"))
    }

    /// Saves both companion files: `<base>.obj` and `<base>.meta`.
    pub fn save_project(&self, base: &Path) -> Result<(), ProjectError> {
        let (geometry, metadata) = Self::project_paths(base);
        self.export_geometry(&geometry)?;
        io::save_metadata(&self.scene, &self.textures, &self.planes, &metadata)?;
        Ok(())
    }

    /// Loads a project. Geometry is required: a failed geometry read
    /// leaves the session exactly as it was. The metadata companion is
    /// tolerant all the way down: missing or unreadable, the load
    /// degrades to geometry with empty registries, with a warning.
    pub fn load_project(&mut self, base: &Path) -> Result<Aabb, ProjectError> {
        let (geometry, metadata) = Self::project_paths(base);
        let bounds = self.import_geometry(&geometry)?;
        match io::load_metadata(&metadata) {
            Ok(meta) => self.apply_metadata(meta),
            Err(err) => warn!(
                "metadata companion {} not applied: {err}",
                metadata.display()
            ),
        }
        // Re-baseline so undo cannot step back past the load.
        self.history.clear();
        self.commit();
        Ok(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    #[test]
    fn new_session_has_one_grid_module_and_a_baseline() {
        let session = EditorSession::new();
        assert_eq!(session.scene().modules.len(), 1);
        assert_eq!(session.scene().node_count(), 27);
        assert_eq!(session.history_len(), 1);
        session.scene().validate().unwrap();
    }

    #[test]
    fn starter_grid_is_fully_connected() {
        let session = EditorSession::new();
        let module = &session.scene().modules[0];
        let mut seen = vec![false; module.nodes.len()];
        let mut queue = VecDeque::from([0usize]);
        seen[0] = true;
        let mut visited = 0;
        while let Some(current) = queue.pop_front() {
            visited += 1;
            for &next in &module.nodes[current].connections {
                if !seen[next] {
                    seen[next] = true;
                    queue.push_back(next);
                }
            }
        }
        assert_eq!(visited, 27);
    }

    #[test]
    fn place_node_joins_nearby_module() {
        let mut session = EditorSession::new();
        let (module, node) = session.place_node(Point::new(7.0, 5.0, 0.0));
        assert_eq!(module, 0);
        assert_eq!(node, 27);
        assert_eq!(session.scene().modules.len(), 1);
    }

    #[test]
    fn place_node_far_away_starts_a_module() {
        let mut session = EditorSession::new();
        let (module, node) = session.place_node(Point::new(100.0, 0.0, 0.0));
        assert_eq!(module, 1);
        assert_eq!(node, 0);
        assert_eq!(session.scene().modules[1].id, 1);
        assert_eq!(session.active_module(), 1);
    }

    #[test]
    fn undo_steps_back_one_action_per_call() {
        let mut session = EditorSession::new();
        let before = session.scene().clone();
        session.place_node(Point::new(0.0, 5.0, 20.0));
        session.toggle_connection((0, 0), (0, 26));
        assert_eq!(session.history_len(), 3);

        assert!(session.undo());
        assert!(!session.scene().modules[0].nodes[0].is_connected_to(26));
        assert!(session.undo());
        assert_eq!(*session.scene(), before);
        assert!(!session.undo(), "baseline is not undoable");
    }

    fn assert_undo_round_trip(
        session: &mut EditorSession,
        act: impl FnOnce(&mut EditorSession),
    ) {
        let before = session.scene().clone();
        act(session);
        assert_ne!(*session.scene(), before, "mutation must change the scene");
        assert!(session.undo());
        assert_eq!(*session.scene(), before, "undo must restore it exactly");
    }

    #[test]
    fn undo_round_trips_every_mutation_kind() {
        let mut session = EditorSession::new();
        assert_undo_round_trip(&mut session, |s| {
            s.place_node(Point::new(0.0, 5.0, 20.0));
        });
        assert_undo_round_trip(&mut session, |s| s.toggle_connection((0, 0), (0, 26)));
        assert_undo_round_trip(&mut session, |s| {
            s.translate_module(0, Point::new(1.0, 0.0, 0.0))
        });
        assert_undo_round_trip(&mut session, |s| s.rotate_module(0, Axis::Y, ROTATE_STEP));
        assert_undo_round_trip(&mut session, |s| s.scale_module(0, 1.5));
        assert_undo_round_trip(&mut session, |s| {
            s.clone_module(0);
        });
        assert_undo_round_trip(&mut session, |s| {
            s.spawn_grid_module();
        });
        session.spawn_grid_module();
        assert_undo_round_trip(&mut session, |s| s.delete_module(1));
        assert_undo_round_trip(&mut session, |s| s.delete_node(0, 13));
        assert_undo_round_trip(&mut session, |s| {
            s.select_node(0, 0);
            s.select_node(0, 2);
            s.select_node(0, 8);
            s.fill_wall().unwrap();
        });
        assert_undo_round_trip(&mut session, |s| {
            s.select_node(0, 0);
            s.select_node(0, 1);
            s.clone_selection();
        });
        assert_undo_round_trip(&mut session, |s| {
            s.detect_walls(0);
        });

        // Texture assignment and wall deletion need a wall in place.
        session.select_node(0, 0);
        session.select_node(0, 2);
        session.select_node(0, 8);
        session.fill_wall().unwrap();
        let id = session.textures.register(Path::new("img/brick.png"));
        assert_undo_round_trip(&mut session, |s| s.assign_texture(0, 0, id));
        assert_undo_round_trip(&mut session, |s| s.delete_wall(0, 0));
    }

    #[test]
    fn history_is_bounded_across_many_actions() {
        let mut session = EditorSession::new();
        for i in 0..60 {
            session.add_node_to(0, Point::new(i as f32, 30.0, 0.0));
        }
        assert_eq!(session.history_len(), crate::history::MAX_HISTORY);
    }

    #[test]
    fn click_connect_arms_then_toggles() {
        let mut session = EditorSession::new();
        session.click_connect(0, 0);
        assert_eq!(session.pending_connect(), Some((0, 0)));
        session.click_connect(0, 26);
        assert_eq!(session.pending_connect(), None);
        assert!(session.scene().modules[0].nodes[0].is_connected_to(26));
    }

    #[test]
    fn fill_wall_consumes_selection_and_commits() {
        let mut session = EditorSession::new();
        // Three corners of one grid face are coplanar.
        session.select_node(0, 0);
        session.select_node(0, 2);
        session.select_node(0, 8);
        let before = session.history_len();
        session.fill_wall().unwrap();
        assert!(session.selection().is_empty());
        assert_eq!(session.scene().wall_count(), 1);
        assert_eq!(session.history_len(), before + 1);
    }

    #[test]
    fn failed_fill_wall_keeps_selection_and_history() {
        let mut session = EditorSession::new();
        session.select_node(0, 0);
        session.select_node(0, 1);
        let before = session.history_len();
        assert_eq!(session.fill_wall(), Err(WallError::TooFewNodes));
        assert_eq!(session.selection().len(), 2);
        assert_eq!(session.history_len(), before);
    }

    #[test]
    fn deleting_the_last_module_is_refused() {
        let mut session = EditorSession::new();
        let before = session.history_len();
        session.delete_module(0);
        assert_eq!(session.scene().modules.len(), 1);
        assert_eq!(session.history_len(), before);
    }

    #[test]
    fn delete_clears_selection_and_fixes_active_module() {
        let mut session = EditorSession::new();
        session.spawn_grid_module();
        session.select_node(1, 0);
        assert_eq!(session.active_module(), 1);
        session.delete_module(1);
        assert!(session.selection().is_empty());
        assert_eq!(session.active_module(), 0);
    }

    #[test]
    fn spawn_grid_module_steps_along_x() {
        let mut session = EditorSession::new();
        let idx = session.spawn_grid_module();
        assert_eq!(idx, 1);
        assert_eq!(
            session.scene().modules[1].center,
            Point::new(15.0, 5.0, 0.0)
        );
        session.scene().validate().unwrap();
    }

    #[test]
    fn scale_pivots_on_selected_nodes() {
        let mut session = EditorSession::new();
        // Select one corner; scaling must keep that corner fixed.
        session.select_node(0, 0);
        let corner = session.scene().modules[0].nodes[0].position;
        session.scale_module(0, 2.0);
        assert_eq!(session.scene().modules[0].nodes[0].position, corner);
        let far = session.scene().modules[0].nodes[26].position;
        assert_eq!(far, corner + (Point::new(6.0, 11.0, 6.0) - corner) * 2.0);
    }

    #[test]
    fn assign_texture_replaces_binding_and_survives_undo() {
        let mut session = EditorSession::new();
        session.select_node(0, 0);
        session.select_node(0, 2);
        session.select_node(0, 8);
        session.fill_wall().unwrap();

        let brick = session.textures.register(Path::new("img/brick.png"));
        let moss = session.textures.register(Path::new("img/moss.png"));
        session.assign_texture(0, 0, brick);
        session.assign_texture(0, 0, moss);
        let bound = session.scene().modules[0].walls[0].texture.clone().unwrap();
        assert_eq!(bound.asset, moss);

        assert!(session.undo());
        let bound = session.scene().modules[0].walls[0].texture.clone().unwrap();
        assert_eq!(bound.asset, brick, "undo restores the previous binding");
    }

    #[test]
    fn project_round_trip_restores_bindings_and_planes() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("town");

        let mut session = EditorSession::new();
        session.select_node(0, 0);
        session.select_node(0, 2);
        session.select_node(0, 8);
        session.fill_wall().unwrap();
        let id = session.textures.register(Path::new("img/brick.png"));
        session.assign_texture(0, 0, id);
        let mut plane = AnimatedPlane::new(Point::new(1.0, 2.0, 3.0), 4.0, 4.0);
        plane.frames = vec![PathBuf::from("anim/f0.png")];
        session.planes.push(plane.clone());
        session.save_project(&base).unwrap();

        let mut loaded = EditorSession::new();
        let bounds = loaded.load_project(&base).unwrap();
        assert_eq!(loaded.scene().node_count(), 27);
        assert_eq!(loaded.scene().wall_count(), 1);
        let tex = loaded.scene().modules[0].walls[0].texture.clone().unwrap();
        assert_eq!(tex.name, "brick");
        assert_eq!(loaded.planes, vec![plane]);
        assert_eq!(loaded.textures.len(), 1);
        assert_eq!(bounds.min, Point::new(-6.0, -1.0, -6.0));
        assert_eq!(bounds.max, Point::new(6.0, 11.0, 6.0));
        assert!(!loaded.undo(), "load re-baselines the history");
        loaded.scene().validate().unwrap();
    }

    #[test]
    fn unreadable_metadata_degrades_to_geometry_only_load() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("town");

        let mut session = EditorSession::new();
        session.textures.register(Path::new("img/brick.png"));
        session
            .planes
            .push(AnimatedPlane::new(Point::new(0.0, 1.0, 0.0), 2.0, 2.0));
        session.save_project(&base).unwrap();
        // Make the companion present but unreadable as a file.
        std::fs::remove_file(base.with_extension("meta")).unwrap();
        std::fs::create_dir(base.with_extension("meta")).unwrap();

        let mut loaded = EditorSession::new();
        loaded.textures.register(Path::new("img/stale.png"));
        loaded
            .planes
            .push(AnimatedPlane::new(Point::new(9.0, 9.0, 9.0), 1.0, 1.0));
        let bounds = loaded.load_project(&base).unwrap();
        assert_eq!(loaded.scene().node_count(), 27);
        assert_eq!(bounds.max, Point::new(6.0, 11.0, 6.0));
        // No half-applied state: the previous session's registries are
        // gone rather than attached to the freshly loaded scene.
        assert!(loaded.textures.is_empty());
        assert!(loaded.planes.is_empty());
        assert!(!loaded.undo());
        loaded.scene().validate().unwrap();
    }

    #[test]
    fn import_geometry_drops_stale_registries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.obj");
        EditorSession::new().export_geometry(&path).unwrap();

        let mut session = EditorSession::new();
        session.textures.register(Path::new("img/brick.png"));
        session
            .planes
            .push(AnimatedPlane::new(Point::new(0.0, 0.0, 0.0), 1.0, 1.0));
        session.import_geometry(&path).unwrap();
        assert!(session.textures.is_empty());
        assert!(session.planes.is_empty());
    }

    #[test]
    fn import_failure_leaves_the_scene_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.obj");
        std::fs::write(&path, "v 1 2\n").unwrap();

        let mut session = EditorSession::new();
        session.textures.register(Path::new("img/brick.png"));
        let before = session.scene().clone();
        assert!(session.import_geometry(&path).is_err());
        assert_eq!(*session.scene(), before);
        assert_eq!(session.textures.len(), 1, "registries kept on failure");
        assert_eq!(session.history_len(), 1);
    }
}

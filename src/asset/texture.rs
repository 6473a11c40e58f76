//! Texture registry: stable ids mapping walls to image files.
//!
//! Walls never hold pixel data or raw handles; they hold a
//! [`TextureRef`] whose [`AssetId`] keys into the session-owned
//! [`TextureLibrary`]. Scene snapshots and clones copy the id only, so
//! undo and duplication cannot double-free or orphan image memory.

use std::path::{Path, PathBuf};

use image::RgbaImage;
use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable registry key. Ids are assigned monotonically per library and
/// never reused, so a stale ref resolves to `None` rather than to a
/// reassigned image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetId(pub u32);

/// A wall's texture binding: the registry key plus a display name for
/// UI listings and the metadata file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureRef {
    pub asset: AssetId,
    pub name: String,
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),
    #[error("no texture registered under id {0:?}")]
    Unknown(AssetId),
}

/// One registered image file. `pixels` is `None` until (or unless) the
/// file has been decoded; the registry entry itself exists either way,
/// so indices stay stable across missing files.
#[derive(Debug)]
pub struct TextureEntry {
    pub id: AssetId,
    pub path: PathBuf,
    pub name: String,
    pub pixels: Option<RgbaImage>,
}

#[derive(Debug, Default)]
pub struct TextureLibrary {
    entries: Vec<TextureEntry>,
    next_id: u32,
}

fn display_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

impl TextureLibrary {
    pub fn new() -> Self {
        TextureLibrary::default()
    }

    /// Registers a path without touching the filesystem. Re-registering
    /// the same path returns the existing id.
    pub fn register(&mut self, path: &Path) -> AssetId {
        if let Some(entry) = self.entries.iter().find(|e| e.path == path) {
            return entry.id;
        }
        let id = AssetId(self.next_id);
        self.next_id += 1;
        self.entries.push(TextureEntry {
            id,
            path: path.to_path_buf(),
            name: display_name(path),
            pixels: None,
        });
        id
    }

    /// Registers a path and decodes its pixels.
    pub fn load(&mut self, path: &Path) -> Result<AssetId, AssetError> {
        let id = self.register(path);
        self.load_pixels(id)?;
        Ok(id)
    }

    /// Decodes (or re-decodes) the entry's image file.
    pub fn load_pixels(&mut self, id: AssetId) -> Result<(), AssetError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(AssetError::Unknown(id))?;
        let image = image::open(&entry.path)?;
        entry.pixels = Some(image.to_rgba8());
        Ok(())
    }

    /// Registers a path and tries to decode it, keeping the entry (and
    /// its index) even when the file is missing or unreadable. Used by
    /// tolerant metadata import, where later records address textures
    /// by library index.
    pub fn register_and_try_load(&mut self, path: &Path) -> AssetId {
        let id = self.register(path);
        if let Err(err) = self.load_pixels(id) {
            warn!("texture {} not loaded: {err}", path.display());
        }
        id
    }

    pub fn get(&self, id: AssetId) -> Option<&TextureEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Library position of an id; this index is what the metadata
    /// format's `WALL_TEX` records store.
    pub fn index_of(&self, id: AssetId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    pub fn by_index(&self, index: usize) -> Option<&TextureEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TextureEntry> {
        self.entries.iter()
    }

    /// A fresh ref for assigning this texture to a wall.
    pub fn make_ref(&self, id: AssetId) -> Option<TextureRef> {
        self.get(id).map(|e| TextureRef {
            asset: id,
            name: e.name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_assigns_stable_ids_and_indices() {
        let mut lib = TextureLibrary::new();
        let a = lib.register(Path::new("textures/brick.png"));
        let b = lib.register(Path::new("textures/moss.png"));
        assert_ne!(a, b);
        assert_eq!(lib.register(Path::new("textures/brick.png")), a);
        assert_eq!(lib.len(), 2);
        assert_eq!(lib.index_of(a), Some(0));
        assert_eq!(lib.index_of(b), Some(1));
        assert_eq!(lib.by_index(1).map(|e| e.id), Some(b));
    }

    #[test]
    fn display_name_is_the_file_stem() {
        let mut lib = TextureLibrary::new();
        let id = lib.register(Path::new("assets/stone_floor.png"));
        assert_eq!(lib.get(id).map(|e| e.name.as_str()), Some("stone_floor"));
        let r = lib.make_ref(id).unwrap();
        assert_eq!(r.name, "stone_floor");
        assert_eq!(r.asset, id);
    }

    #[test]
    fn missing_file_keeps_the_entry() {
        let mut lib = TextureLibrary::new();
        let id = lib.register_and_try_load(Path::new("does/not/exist.png"));
        let entry = lib.get(id).unwrap();
        assert!(entry.pixels.is_none());
        assert_eq!(lib.index_of(id), Some(0));
    }

    #[test]
    fn load_pixels_unknown_id_errors() {
        let mut lib = TextureLibrary::new();
        assert!(matches!(
            lib.load_pixels(AssetId(9)),
            Err(AssetError::Unknown(AssetId(9)))
        ));
    }
}

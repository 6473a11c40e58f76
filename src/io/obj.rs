//! Wavefront-style geometry export and import.
//!
//! The on-disk layout is `v` records per module (with `# Module {id}`
//! comments), `l` records for connections, `f` records for walls, all
//! over a single running 1-based vertex numbering. Textured walls add
//! `vt`/`usemtl` records and a companion `.mtl` file. Import flattens
//! everything back into one module; module structure and texture
//! bindings live in the project metadata file, not here.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use log::{info, warn};
use thiserror::Error;

use crate::asset::{AssetId, TextureLibrary};
use crate::scene::{Aabb, Module, Node, Scene, Wall};

use super::write_atomic;

#[derive(Debug, Error)]
pub enum ObjError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(String),
}

/// Result of a geometry import: the flattened module plus its bounding
/// box, which the caller uses to frame the camera.
#[derive(Debug)]
pub struct GeometryImport {
    pub module: Module,
    pub bounds: Aabb,
}

fn sanitize_material_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

/// Dominant-plane UV projection: the wall's two widest axes become U
/// and V, normalized into [0, 1] by the wall's own bounding box.
fn wall_uvs(points: &[crate::scene::Point]) -> Vec<(f32, f32)> {
    let bounds = Aabb::from_points(points.iter());
    let ext = bounds.extents();
    let norm = |value: f32, min: f32, range: f32| {
        if range > 1e-6 {
            (value - min) / range
        } else {
            0.0
        }
    };
    points
        .iter()
        .map(|p| {
            if ext.x > ext.y && ext.x > ext.z {
                (norm(p.x, bounds.min.x, ext.x), norm(p.y, bounds.min.y, ext.y))
            } else if ext.y > ext.z {
                (norm(p.y, bounds.min.y, ext.y), norm(p.z, bounds.min.z, ext.z))
            } else {
                (norm(p.x, bounds.min.x, ext.x), norm(p.z, bounds.min.z, ext.z))
            }
        })
        .collect()
}

/// Exports the scene's geometry to `path`. When any wall carries a
/// texture known to `textures`, a companion `.mtl` file is written next
/// to it and referenced with `mtllib`.
pub fn export_obj(
    scene: &Scene,
    textures: &TextureLibrary,
    path: &Path,
) -> Result<(), ObjError> {
    // Running vertex offset per module; OBJ indices are 1-based and
    // global across the file.
    let mut offsets = Vec::with_capacity(scene.modules.len());
    let mut total = 0usize;
    for module in &scene.modules {
        offsets.push(total);
        total += module.nodes.len();
    }

    // Materials referenced by at least one wall, keyed by asset id.
    let mut materials: HashMap<AssetId, String> = HashMap::new();
    for module in &scene.modules {
        for wall in &module.walls {
            if let Some(tex) = &wall.texture {
                if let Some(entry) = textures.get(tex.asset) {
                    materials.entry(tex.asset).or_insert_with(|| {
                        format!("{}_{}", sanitize_material_name(&entry.name), tex.asset.0)
                    });
                }
            }
        }
    }

    let mut out = String::new();
    let _ = writeln!(out, "# Node scene geometry");
    let _ = writeln!(out, "# modules: {}", scene.modules.len());
    if !materials.is_empty() {
        if let Some(stem) = path.file_stem() {
            let _ = writeln!(out, "mtllib {}.mtl", stem.to_string_lossy());
        }
    }
    out.push('\n');

    for module in &scene.modules {
        let _ = writeln!(out, "# Module {}", module.id);
        for node in &module.nodes {
            let _ = writeln!(
                out,
                "v {:.6} {:.6} {:.6}",
                node.position.x, node.position.y, node.position.z
            );
        }
    }

    let _ = writeln!(out, "\n# Connections");
    for (mi, module) in scene.modules.iter().enumerate() {
        for (ni, node) in module.nodes.iter().enumerate() {
            // Each undirected edge once: low index first.
            for &conn in &node.connections {
                if ni < conn {
                    let _ =
                        writeln!(out, "l {} {}", offsets[mi] + ni + 1, offsets[mi] + conn + 1);
                }
            }
            for &(tm, tn) in &node.cross_connections {
                if mi < tm {
                    let _ =
                        writeln!(out, "l {} {}", offsets[mi] + ni + 1, offsets[tm] + tn + 1);
                }
            }
        }
    }

    let _ = writeln!(out, "\n# Walls");
    let mut vt_count = 0usize;
    for (mi, module) in scene.modules.iter().enumerate() {
        for wall in &module.walls {
            let material = wall
                .texture
                .as_ref()
                .and_then(|t| materials.get(&t.asset));
            if let Some(material) = material {
                let points: Vec<_> = wall
                    .node_indices
                    .iter()
                    .map(|&i| module.nodes[i].position)
                    .collect();
                for (u, v) in wall_uvs(&points) {
                    let _ = writeln!(out, "vt {u:.6} {v:.6}");
                }
                let _ = writeln!(out, "usemtl {material}");
                let mut line = String::from("f");
                for (k, &idx) in wall.node_indices.iter().enumerate() {
                    let _ = write!(line, " {}/{}", offsets[mi] + idx + 1, vt_count + k + 1);
                }
                vt_count += wall.node_indices.len();
                let _ = writeln!(out, "{line}");
            } else {
                let mut line = String::from("f");
                for &idx in &wall.node_indices {
                    let _ = write!(line, " {}", offsets[mi] + idx + 1);
                }
                let _ = writeln!(out, "{line}");
            }
        }
    }

    write_atomic(path, &out)?;

    if !materials.is_empty() {
        let mut mtl = String::new();
        let _ = writeln!(mtl, "# Node scene materials");
        let mut ordered: Vec<_> = materials.iter().collect();
        ordered.sort_by_key(|(id, _)| id.0);
        for (id, name) in ordered {
            if let Some(entry) = textures.get(*id) {
                let _ = writeln!(mtl, "newmtl {name}");
                let _ = writeln!(mtl, "map_Kd {}", entry.path.display());
            }
        }
        write_atomic(&path.with_extension("mtl"), &mtl)?;
    }

    info!(
        "exported {} nodes, {} walls to {}",
        total,
        scene.wall_count(),
        path.display()
    );
    Ok(())
}

fn parse_f32(token: &str, line_no: usize) -> Result<f32, ObjError> {
    token
        .parse::<f32>()
        .map_err(|_| ObjError::Parse(format!("line {line_no}: bad number '{token}'")))
}

/// 1-based OBJ vertex index, taking only the vertex part of `v/vt/vn`
/// forms. Returns `None` for anything non-positive or non-numeric.
fn parse_vertex_index(token: &str) -> Option<usize> {
    let vertex = token.split('/').next()?;
    match vertex.parse::<usize>() {
        Ok(n) if n > 0 => Some(n - 1),
        _ => None,
    }
}

/// Parses a geometry file into one flattened module.
///
/// `l` records become mirrored, deduplicated connections; `f` records
/// become walls. Records referencing out-of-range vertices are dropped
/// with a warning rather than failing the whole import. `vt`, `usemtl`,
/// `mtllib`, and unrecognized records are ignored; texture bindings are
/// reattached from the metadata file by the session.
pub fn import_obj(path: &Path, module_id: u32) -> Result<GeometryImport, ObjError> {
    let contents = fs::read_to_string(path)?;
    parse_obj(&contents, module_id)
}

fn parse_obj(contents: &str, module_id: u32) -> Result<GeometryImport, ObjError> {
    let mut positions = Vec::new();
    let mut edges: Vec<(usize, usize)> = Vec::new();
    let mut faces: Vec<Vec<usize>> = Vec::new();

    for (idx, raw) in contents.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => {
                let coords: Vec<&str> = tokens.collect();
                if coords.len() < 3 {
                    return Err(ObjError::Parse(format!(
                        "line {line_no}: vertex needs 3 coordinates"
                    )));
                }
                positions.push(crate::scene::Point::new(
                    parse_f32(coords[0], line_no)?,
                    parse_f32(coords[1], line_no)?,
                    parse_f32(coords[2], line_no)?,
                ));
            }
            Some("l") => {
                let indices: Option<Vec<usize>> =
                    tokens.map(parse_vertex_index).collect();
                match indices {
                    Some(indices) if indices.len() >= 2 => {
                        // OBJ allows polylines; take consecutive pairs.
                        for pair in indices.windows(2) {
                            edges.push((pair[0], pair[1]));
                        }
                    }
                    _ => warn!("line {line_no}: skipping malformed line record"),
                }
            }
            Some("f") => {
                let indices: Option<Vec<usize>> =
                    tokens.map(parse_vertex_index).collect();
                match indices {
                    Some(indices) if indices.len() >= 3 => faces.push(indices),
                    _ => warn!("line {line_no}: skipping malformed face record"),
                }
            }
            // Texture coordinates and material records are re-derived
            // at the next export; other record types are out of scope.
            _ => {}
        }
    }

    if positions.is_empty() {
        return Err(ObjError::Parse("no vertices found".into()));
    }

    let mut module = Module::new(module_id);
    module.nodes = positions.iter().copied().map(Node::new).collect();

    let count = module.nodes.len();
    for (a, b) in edges {
        if a == b || a >= count || b >= count {
            warn!("skipping connection with out-of-range vertex ({a}, {b})");
            continue;
        }
        if !module.nodes[a].is_connected_to(b) {
            module.nodes[a].connections.push(b);
            module.nodes[b].connections.push(a);
        }
    }

    for face in faces {
        if face.iter().any(|&i| i >= count) {
            warn!("skipping face with out-of-range vertex");
            continue;
        }
        module.walls.push(Wall::new(face));
    }

    module.recenter();
    let bounds = Aabb::from_points(positions.iter());
    info!(
        "imported {} nodes, {} connections, {} walls",
        module.nodes.len(),
        module.nodes.iter().map(|n| n.connections.len()).sum::<usize>() / 2,
        module.walls.len()
    );
    Ok(GeometryImport { module, bounds })
}

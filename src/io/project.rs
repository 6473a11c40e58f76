//! Project metadata: everything the geometry file cannot carry.
//!
//! A section-delimited text format with three blocks: the texture
//! library (ordered image paths), wall texture bindings (addressing
//! textures by library index), and animated plane definitions. The
//! parser is deliberately tolerant: a malformed line loses that record,
//! never the whole load.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use log::warn;

use crate::asset::{AnimatedPlane, TextureLibrary};
use crate::scene::{Point, Scene};

use super::write_atomic;

/// A `WALL_TEX` record: wall at (`module`, `wall`) uses the texture at
/// library position `texture`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WallTextureBinding {
    pub module: usize,
    pub wall: usize,
    pub texture: usize,
    pub name: String,
}

/// Parsed contents of a metadata file, before the session resolves
/// paths against the filesystem and bindings against the scene.
#[derive(Debug, Default)]
pub struct ProjectMetadata {
    pub texture_paths: Vec<PathBuf>,
    pub wall_bindings: Vec<WallTextureBinding>,
    pub planes: Vec<AnimatedPlane>,
}

/// Writes the metadata companion for a scene.
pub fn save_metadata(
    scene: &Scene,
    textures: &TextureLibrary,
    planes: &[AnimatedPlane],
    path: &Path,
) -> std::io::Result<()> {
    let mut out = String::new();

    let _ = writeln!(out, "TEXTURE_LIBRARY_START");
    let _ = writeln!(out, "{}", textures.len());
    for entry in textures.iter() {
        let _ = writeln!(out, "{}", entry.path.display());
    }
    let _ = writeln!(out, "TEXTURE_LIBRARY_END");
    out.push('\n');

    let _ = writeln!(out, "WALL_TEXTURES_START");
    for (mi, module) in scene.modules.iter().enumerate() {
        for (wi, wall) in module.walls.iter().enumerate() {
            let Some(tex) = &wall.texture else { continue };
            let Some(index) = textures.index_of(tex.asset) else {
                warn!("wall ({mi}, {wi}) references an unregistered texture, skipping");
                continue;
            };
            let _ = writeln!(out, "WALL_TEX {mi} {wi} {index} {}", tex.name);
        }
    }
    let _ = writeln!(out, "WALL_TEXTURES_END");
    out.push('\n');

    let _ = writeln!(out, "ANIMATED_PLANES_START");
    let _ = writeln!(out, "{}", planes.len());
    for (pi, plane) in planes.iter().enumerate() {
        let _ = writeln!(out, "PLANE {pi}");
        let _ = writeln!(
            out,
            "POSITION {:.6} {:.6} {:.6}",
            plane.position.x, plane.position.y, plane.position.z
        );
        let _ = writeln!(out, "SIZE {:.6} {:.6}", plane.width, plane.height);
        let _ = writeln!(out, "FRAMETIME {:.6}", plane.frame_time);
        let _ = writeln!(out, "PLAYING {}", plane.playing as u8);
        let _ = writeln!(out, "BILLBOARD {}", plane.billboard as u8);
        let _ = writeln!(out, "FRAMES {}", plane.frames.len());
        for frame in &plane.frames {
            let _ = writeln!(out, "{}", frame.display());
        }
    }
    let _ = writeln!(out, "ANIMATED_PLANES_END");

    write_atomic(path, &out)
}

pub fn load_metadata(path: &Path) -> std::io::Result<ProjectMetadata> {
    let contents = fs::read_to_string(path)?;
    Ok(parse_metadata(&contents))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Textures,
    WallTextures,
    Planes,
}

/// Tolerant line-by-line parse. Section markers drive a small state
/// machine; anything unrecognized inside a section is logged and
/// skipped. Counts in the file are advisory, the END markers are
/// authoritative.
pub fn parse_metadata(contents: &str) -> ProjectMetadata {
    let mut meta = ProjectMetadata::default();
    let mut section = Section::None;
    let mut texture_count_seen = false;
    let mut plane_count_seen = false;
    let mut current_plane: Option<AnimatedPlane> = None;
    let mut pending_frames = 0usize;

    for (idx, raw) in contents.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        match line {
            "TEXTURE_LIBRARY_START" => {
                section = Section::Textures;
                texture_count_seen = false;
                continue;
            }
            "TEXTURE_LIBRARY_END" | "WALL_TEXTURES_END" | "ANIMATED_PLANES_END" => {
                if let Some(plane) = current_plane.take() {
                    meta.planes.push(plane);
                }
                section = Section::None;
                continue;
            }
            "WALL_TEXTURES_START" => {
                section = Section::WallTextures;
                continue;
            }
            "ANIMATED_PLANES_START" => {
                section = Section::Planes;
                plane_count_seen = false;
                continue;
            }
            _ => {}
        }

        match section {
            Section::None => warn!("line {line_no}: text outside any section, skipping"),
            Section::Textures => {
                // The first line of the section is the advisory count.
                if !texture_count_seen && line.parse::<usize>().is_ok() {
                    texture_count_seen = true;
                } else {
                    meta.texture_paths.push(PathBuf::from(line));
                }
            }
            Section::WallTextures => {
                let mut tokens = line.split_whitespace();
                let record = tokens.next();
                if record != Some("WALL_TEX") {
                    warn!("line {line_no}: unrecognized wall-texture record, skipping");
                    continue;
                }
                let parsed = (|| {
                    let module = tokens.next()?.parse().ok()?;
                    let wall = tokens.next()?.parse().ok()?;
                    let texture = tokens.next()?.parse().ok()?;
                    // The display name is the remainder, spaces included.
                    let name = tokens.collect::<Vec<_>>().join(" ");
                    Some(WallTextureBinding {
                        module,
                        wall,
                        texture,
                        name,
                    })
                })();
                match parsed {
                    Some(binding) => meta.wall_bindings.push(binding),
                    None => warn!("line {line_no}: malformed WALL_TEX record, skipping"),
                }
            }
            Section::Planes => {
                if pending_frames > 0 {
                    if let Some(plane) = current_plane.as_mut() {
                        plane.frames.push(PathBuf::from(line));
                    }
                    pending_frames -= 1;
                    continue;
                }
                if !plane_count_seen && line.parse::<usize>().is_ok() {
                    plane_count_seen = true;
                    continue;
                }
                let mut tokens = line.split_whitespace();
                match tokens.next() {
                    Some("PLANE") => {
                        if let Some(plane) = current_plane.take() {
                            meta.planes.push(plane);
                        }
                        current_plane =
                            Some(AnimatedPlane::new(Point::new(0.0, 0.0, 0.0), 1.0, 1.0));
                    }
                    Some(key) => {
                        let Some(plane) = current_plane.as_mut() else {
                            warn!("line {line_no}: plane field before PLANE, skipping");
                            continue;
                        };
                        let rest: Vec<&str> = tokens.collect();
                        let floats: Vec<f32> =
                            rest.iter().filter_map(|t| t.parse().ok()).collect();
                        match key {
                            "POSITION" => match floats[..] {
                                [x, y, z] => plane.position = Point::new(x, y, z),
                                _ => warn!("line {line_no}: malformed POSITION, skipping"),
                            },
                            "SIZE" => match floats[..] {
                                [w, h] => {
                                    plane.width = w;
                                    plane.height = h;
                                }
                                _ => warn!("line {line_no}: malformed SIZE, skipping"),
                            },
                            "FRAMETIME" => match floats[..] {
                                [t] => plane.frame_time = t,
                                _ => warn!("line {line_no}: malformed FRAMETIME, skipping"),
                            },
                            "PLAYING" => match rest.first().copied() {
                                Some("1") => plane.playing = true,
                                Some("0") => plane.playing = false,
                                _ => warn!("line {line_no}: malformed PLAYING, skipping"),
                            },
                            "BILLBOARD" => match rest.first().copied() {
                                Some("1") => plane.billboard = true,
                                Some("0") => plane.billboard = false,
                                _ => warn!("line {line_no}: malformed BILLBOARD, skipping"),
                            },
                            "FRAMES" => match rest.first().and_then(|t| t.parse().ok()) {
                                Some(count) => pending_frames = count,
                                None => warn!("line {line_no}: malformed FRAMES, skipping"),
                            },
                            _ => warn!("line {line_no}: unknown plane field '{key}', skipping"),
                        }
                    }
                    None => {}
                }
            }
        }
    }
    if let Some(plane) = current_plane.take() {
        meta.planes.push(plane);
    }
    meta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Module, Node};

    fn sample_state() -> (Scene, TextureLibrary, Vec<AnimatedPlane>) {
        let mut module = Module::new(0);
        for i in 0..3 {
            module.nodes.push(Node::new(Point::new(i as f32, 0.0, 0.0)));
        }
        module
            .walls
            .push(crate::scene::Wall::new(vec![0, 1, 2]));
        let mut scene = Scene::with_module(module);

        let mut textures = TextureLibrary::new();
        let brick = textures.register(Path::new("img/brick.png"));
        textures.register(Path::new("img/moss stone.png"));
        scene.modules[0].walls[0].texture = textures.make_ref(brick);

        let mut plane = AnimatedPlane::new(Point::new(1.0, 2.0, 3.0), 4.0, 5.0);
        plane.frame_time = 0.25;
        plane.playing = false;
        plane.billboard = true;
        plane.frames = vec![PathBuf::from("anim/f0.png"), PathBuf::from("anim/f1.png")];
        (scene, textures, vec![plane])
    }

    #[test]
    fn metadata_round_trips() {
        let (scene, textures, planes) = sample_state();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.meta");
        save_metadata(&scene, &textures, &planes, &path).unwrap();

        let meta = load_metadata(&path).unwrap();
        assert_eq!(
            meta.texture_paths,
            vec![PathBuf::from("img/brick.png"), PathBuf::from("img/moss stone.png")]
        );
        assert_eq!(
            meta.wall_bindings,
            vec![WallTextureBinding {
                module: 0,
                wall: 0,
                texture: 0,
                name: "brick".into(),
            }]
        );
        assert_eq!(meta.planes, planes);
    }

    #[test]
    fn binding_names_keep_their_spaces() {
        let meta = parse_metadata(
            "WALL_TEXTURES_START\nWALL_TEX 0 1 2 mossy stone wall\nWALL_TEXTURES_END\n",
        );
        assert_eq!(meta.wall_bindings[0].name, "mossy stone wall");
        assert_eq!(meta.wall_bindings[0].texture, 2);
    }

    #[test]
    fn malformed_lines_are_skipped_not_fatal() {
        let _ = env_logger::builder().is_test(true).try_init();
        let text = "\
TEXTURE_LIBRARY_START
2
img/ok.png
TEXTURE_LIBRARY_END

WALL_TEXTURES_START
WALL_TEX 0 0 0 fine
WALL_TEX zero one two broken
GARBAGE RECORD
WALL_TEXTURES_END

ANIMATED_PLANES_START
1
PLANE 0
POSITION 1 2 3
SIZE not numbers
FRAMETIME 0.5
PLAYING maybe
FRAMES 1
anim/f0.png
ANIMATED_PLANES_END
";
        let meta = parse_metadata(text);
        assert_eq!(meta.texture_paths, vec![PathBuf::from("img/ok.png")]);
        assert_eq!(meta.wall_bindings.len(), 1);
        assert_eq!(meta.wall_bindings[0].name, "fine");

        assert_eq!(meta.planes.len(), 1);
        let plane = &meta.planes[0];
        assert_eq!(plane.position, Point::new(1.0, 2.0, 3.0));
        // Malformed SIZE and PLAYING keep their defaults.
        assert_eq!((plane.width, plane.height), (1.0, 1.0));
        assert!(plane.playing);
        assert_eq!(plane.frame_time, 0.5);
        assert_eq!(plane.frames, vec![PathBuf::from("anim/f0.png")]);
    }

    #[test]
    fn empty_input_parses_to_empty_metadata() {
        let meta = parse_metadata("");
        assert!(meta.texture_paths.is_empty());
        assert!(meta.wall_bindings.is_empty());
        assert!(meta.planes.is_empty());
    }
}

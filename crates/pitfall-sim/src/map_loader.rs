//! Map loading: named map resources to static collider placements.
//!
//! `MapSource` locates and parses a description; `generate_colliders` is the
//! pure tiling step. The walk is deterministic, so the same description always
//! yields the same placements in the same order.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use pitfall_core::error::MapLoadError;
use pitfall_core::map::{MapDescription, StaticColliderSpec};

/// Where map descriptions come from.
pub trait MapSource {
    /// Locate and parse the named description.
    fn description(&self, name: &str) -> Result<MapDescription, MapLoadError>;

    /// Load and tile the named map.
    fn load(&self, name: &str) -> Result<Vec<StaticColliderSpec>, MapLoadError> {
        let description = self.description(name)?;
        description.validate(name)?;
        Ok(generate_colliders(&description))
    }
}

/// Map descriptions stored as `<root>/<name>.json`.
#[derive(Debug, Clone)]
pub struct MapDirectory {
    root: PathBuf,
}

impl MapDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl MapSource for MapDirectory {
    fn description(&self, name: &str) -> Result<MapDescription, MapLoadError> {
        if !is_safe_map_name(name) {
            return Err(MapLoadError::InvalidName(name.to_string()));
        }

        let path = self.root.join(format!("{name}.json"));
        let content = fs::read_to_string(&path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                MapLoadError::NotFound(name.to_string())
            } else {
                MapLoadError::Io {
                    name: name.to_string(),
                    source,
                }
            }
        })?;

        serde_json::from_str(&content).map_err(|source| MapLoadError::Parse {
            name: name.to_string(),
            source,
        })
    }
}

/// Map descriptions held in memory, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMaps {
    maps: HashMap<String, MapDescription>,
}

impl InMemoryMaps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, description: MapDescription) -> Self {
        self.insert(name, description);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, description: MapDescription) {
        self.maps.insert(name.into(), description);
    }

    /// Parse and insert a JSON description.
    pub fn insert_json(&mut self, name: &str, json: &str) -> Result<(), MapLoadError> {
        let description = serde_json::from_str(json).map_err(|source| MapLoadError::Parse {
            name: name.to_string(),
            source,
        })?;
        self.maps.insert(name.to_string(), description);
        Ok(())
    }
}

impl MapSource for InMemoryMaps {
    fn description(&self, name: &str) -> Result<MapDescription, MapLoadError> {
        self.maps
            .get(name)
            .cloned()
            .ok_or_else(|| MapLoadError::NotFound(name.to_string()))
    }
}

/// Tile a map description into ground plates.
///
/// Cells cover `[-length/2, length/2) × [-width/2, width/2)`. A cell whose
/// center is exactly matched by any declared area gets no default plate.
/// Every non-hole area then contributes one plate of its own size.
///
/// A step that no longer advances a coordinate ends that row early, so an
/// unvalidated description still terminates.
pub fn generate_colliders(map: &MapDescription) -> Vec<StaticColliderSpec> {
    let size = map.default_size;
    let half = size / 2.0;
    let max_x = map.length / 2.0;
    let min_x = -max_x;
    let max_z = map.width / 2.0;
    let min_z = -max_z;

    let mut plates = Vec::new();

    let mut x = min_x;
    while x < max_x {
        let mut z = min_z;
        while z < max_z {
            let (cx, cz) = (x + half, z + half);
            if !map.areas.iter().any(|area| area.covers(cx, cz)) {
                plates.push(StaticColliderSpec::new(cx, cz, size));
            }
            let next = z + size;
            if next <= z {
                break;
            }
            z = next;
        }
        let next = x + size;
        if next <= x {
            break;
        }
        x = next;
    }

    plates.extend(
        map.areas
            .iter()
            .filter(|area| !area.is_hole())
            .map(|area| StaticColliderSpec::new(area.x, area.z, area.size)),
    );

    plates
}

/// Map names are plain file stems: no separators, no parent references.
fn is_safe_map_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains(['/', '\\'])
        && !name.contains("..")
        && name.chars().all(|c| !c.is_control())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitfall_core::map::MapArea;

    fn flat(length: f32, width: f32, default_size: f32) -> MapDescription {
        MapDescription {
            length,
            width,
            default_size,
            areas: vec![],
        }
    }

    fn area(x: f32, z: f32, size: f32, kind: &str) -> MapArea {
        MapArea {
            name: None,
            x,
            z,
            size,
            kind: kind.to_string(),
        }
    }

    fn sorted(mut plates: Vec<StaticColliderSpec>) -> Vec<(f32, f32, f32)> {
        plates.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.z.total_cmp(&b.z)));
        plates.into_iter().map(|p| (p.x, p.z, p.size)).collect()
    }

    #[test]
    fn test_open_map_four_plates() {
        let plates = generate_colliders(&flat(10.0, 10.0, 5.0));
        assert_eq!(
            sorted(plates),
            vec![
                (-2.5, -2.5, 5.0),
                (-2.5, 2.5, 5.0),
                (2.5, -2.5, 5.0),
                (2.5, 2.5, 5.0),
            ]
        );
    }

    #[test]
    fn test_hole_suppresses_cell() {
        let mut map = flat(15.0, 15.0, 5.0);
        map.areas.push(area(0.0, 0.0, 5.0, "hole"));

        let plates = generate_colliders(&map);
        assert_eq!(plates.len(), 8);
        assert!(!plates.iter().any(|p| p.x == 0.0 && p.z == 0.0));
    }

    #[test]
    fn test_hole_off_grid_changes_nothing() {
        let mut map = flat(10.0, 10.0, 5.0);
        // Cell corner, not a cell center.
        map.areas.push(area(0.0, 0.0, 5.0, "hole"));
        assert_eq!(generate_colliders(&map).len(), 4);
    }

    #[test]
    fn test_area_overrides_cell_with_own_size() {
        let mut map = flat(10.0, 10.0, 5.0);
        map.areas.push(area(2.5, 2.5, 3.0, "ice"));

        let plates = sorted(generate_colliders(&map));
        assert_eq!(plates.len(), 4);
        assert!(plates.contains(&(2.5, 2.5, 3.0)));
        assert!(!plates.contains(&(2.5, 2.5, 5.0)));
    }

    #[test]
    fn test_hole_and_platform_at_same_cell() {
        let mut map = flat(10.0, 10.0, 5.0);
        map.areas.push(area(-2.5, -2.5, 5.0, "hole"));
        map.areas.push(area(-2.5, -2.5, 2.0, "platform"));

        let plates = sorted(generate_colliders(&map));
        assert_eq!(plates.len(), 4);
        assert!(plates.contains(&(-2.5, -2.5, 2.0)));
    }

    #[test]
    fn test_overlapping_areas_both_emit() {
        let mut map = flat(10.0, 10.0, 5.0);
        map.areas.push(area(20.0, 20.0, 4.0, "platform"));
        map.areas.push(area(20.0, 20.0, 6.0, "platform"));
        assert_eq!(generate_colliders(&map).len(), 6);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let mut map = flat(40.0, 30.0, 5.0);
        map.areas.push(area(2.5, 2.5, 5.0, "hole"));
        map.areas.push(area(-7.5, 12.5, 8.0, "ramp"));

        let a = generate_colliders(&map);
        let b = generate_colliders(&map);
        assert_eq!(a, b);
        assert_eq!(a.len(), 8 * 6 - 2 + 1);
    }

    #[test]
    fn test_empty_map_has_no_plates() {
        assert!(generate_colliders(&flat(0.0, 0.0, 5.0)).is_empty());
    }

    #[test]
    fn test_in_memory_source() {
        let mut maps = InMemoryMaps::new();
        maps.insert_json(
            "lobby",
            r#"{ "length": 10, "width": 10, "default_size": 5, "areas": [] }"#,
        )
        .unwrap();

        assert_eq!(maps.load("lobby").unwrap().len(), 4);
        assert!(matches!(
            maps.load("missing"),
            Err(MapLoadError::NotFound(_))
        ));
        assert!(matches!(
            maps.insert_json("broken", "{ not json"),
            Err(MapLoadError::Parse { .. })
        ));
    }

    #[test]
    fn test_load_rejects_invalid_dimensions() {
        let maps = InMemoryMaps::new().with("bad", flat(10.0, 10.0, -1.0));
        assert!(matches!(
            maps.load("bad"),
            Err(MapLoadError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_load_rejects_map_wider_than_its_cells_can_step() {
        let wide = MapDescription {
            length: 1.0,
            width: 1.0e9,
            default_size: 1.0,
            areas: vec![area(0.0, -5.0e8, 1.0, "hole")],
        };
        let maps = InMemoryMaps::new().with("wide", wide.clone());
        assert!(matches!(
            maps.load("wide"),
            Err(MapLoadError::InvalidDimensions { .. })
        ));

        // Tiling the raw description still returns instead of spinning.
        assert!(generate_colliders(&wide).len() <= 1);
    }

    #[test]
    fn test_map_directory_reads_json_files() {
        let root = std::env::temp_dir().join(format!("pitfall-maps-{}", std::process::id()));
        fs::create_dir_all(&root).unwrap();
        fs::write(
            root.join("lobby.json"),
            r#"{ "length": 10, "width": 5, "default_size": 5, "areas": [] }"#,
        )
        .unwrap();
        fs::write(root.join("garbled.json"), "[1, 2").unwrap();

        let maps = MapDirectory::new(&root);
        assert_eq!(
            sorted(maps.load("lobby").unwrap()),
            vec![(-2.5, 0.0, 5.0), (2.5, 0.0, 5.0)]
        );
        assert!(matches!(maps.load("nowhere"), Err(MapLoadError::NotFound(_))));
        assert!(matches!(
            maps.load("garbled"),
            Err(MapLoadError::Parse { .. })
        ));
        assert!(matches!(
            maps.load("../lobby"),
            Err(MapLoadError::InvalidName(_))
        ));

        let _ = fs::remove_dir_all(&root);
    }
}

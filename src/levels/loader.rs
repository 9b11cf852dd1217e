// src/levels/loader.rs
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::LevelError;
use crate::game::tile;

// Tile-map document as exported by the level editor. Unknown keys
// (tilesets, tileheight, ...) are ignored.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct LevelData {
    pub width: usize,
    pub height: usize,
    pub tilewidth: u32,
    pub layers: Vec<LayerData>,
    #[serde(default)]
    pub enemies: Vec<EnemySpawn>,
    #[serde(default)]
    pub spawn: Option<(f32, f32)>,
}

// A layer is either a bare row-major id list or an editor layer object
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(untagged)]
pub enum LayerData {
    Plain(Vec<i64>),
    Named {
        #[serde(default)]
        name: Option<String>,
        data: Vec<i64>,
    },
}

impl LayerData {
    pub fn tiles(&self) -> &[i64] {
        match self {
            LayerData::Named { data, .. } => data,
            LayerData::Plain(data) => data,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    #[serde(alias = "Skull")]
    Skull,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct EnemySpawn {
    #[serde(rename = "type")]
    pub kind: EnemyKind,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub moving: bool,
}

impl LevelData {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    // Load a level from a compact character grid, one glyph per tile:
    //
    //   .  empty         #  floor          B  brick (solid)
    //   ^  spike         =  platform       |  chain (phase-through)
    //   o  coin          D  door           >  booster
    //   ?  pressure block
    //   S  spawn point   K  skull          M  moving skull
    pub fn from_ascii(data: &str, tile_size: u32) -> Result<Self, LevelError> {
        let lines: Vec<&str> = data.trim().lines().map(str::trim).collect();
        let height = lines.len();
        let width = lines.iter().map(|line| line.chars().count()).max().unwrap_or(0);
        if width == 0 || height == 0 {
            return Err(LevelError::EmptyMap);
        }

        let size = tile_size as f32;
        let mut tiles = vec![tile::EMPTY_ID; width * height];
        let mut enemies = Vec::new();
        let mut spawn = None;

        for (y, line) in lines.iter().enumerate() {
            for (x, c) in line.chars().enumerate() {
                let id = match c {
                    '.' => tile::EMPTY_ID,
                    '#' => tile::FLOOR as i64,
                    'B' => 100,
                    '^' => tile::SPIKE_1 as i64,
                    '=' => tile::PLATFORM_1 as i64,
                    '|' => tile::CHAIN_1 as i64,
                    'o' => tile::COIN_1 as i64,
                    'D' => tile::DOOR as i64,
                    '>' => tile::BOOSTER as i64,
                    '?' => tile::PRESSURE_BLOCK_1 as i64,
                    'S' => {
                        spawn = Some((x as f32 * size, y as f32 * size));
                        tile::EMPTY_ID
                    }
                    'K' | 'M' => {
                        enemies.push(EnemySpawn {
                            kind: EnemyKind::Skull,
                            x: x as f32 * size,
                            y: y as f32 * size,
                            moving: c == 'M',
                        });
                        tile::EMPTY_ID
                    }
                    glyph => {
                        return Err(LevelError::UnknownGlyph {
                            glyph,
                            col: x,
                            row: y,
                        });
                    }
                };
                tiles[y * width + x] = id;
            }
        }

        Ok(Self {
            width,
            height,
            tilewidth: tile_size,
            layers: vec![LayerData::Named {
                name: Some("foreground".to_string()),
                data: tiles,
            }],
            enemies,
            spawn,
        })
    }
}

pub fn level_path(dir: &Path, level_id: u32) -> PathBuf {
    dir.join(format!("level_{}.json", level_id))
}

pub fn load_level(path: &Path) -> Result<LevelData, LevelError> {
    let file = File::open(path).map_err(|source| LevelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| LevelError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

// Loads level_1.json, level_2.json, ... until the first gap
pub fn load_levels(dir: &Path) -> Result<BTreeMap<u32, LevelData>, LevelError> {
    let mut levels = BTreeMap::new();
    let mut level_id = 1;
    loop {
        let path = level_path(dir, level_id);
        if !path.is_file() {
            break;
        }
        levels.insert(level_id, load_level(&path)?);
        level_id += 1;
    }

    if levels.is_empty() {
        return Err(LevelError::UndefinedLevel(1));
    }
    info!(count = levels.len(), dir = %dir.display(), "loaded level definitions");
    Ok(levels)
}

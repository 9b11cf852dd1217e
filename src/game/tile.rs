// src/game/tile.rs
// Tile identifiers, their collision categories and per-category hitbox insets.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::hitbox::Hitbox;

// Collision behaviour of a tile, decided solely by its identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileCategory {
    Empty,
    Solid,
    Deadly,
    Platform,
    PhaseThrough,
    Coin,
    Door,
    Booster,
    PressureBlock,
}

impl TileCategory {
    // Stops movement on whichever side it is approached from.
    pub fn is_solid(self) -> bool {
        matches!(self, TileCategory::Solid | TileCategory::PressureBlock)
    }
}

// Grid cell coordinates. Serialized as `{x, y}` to match saved coin lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    #[serde(rename = "x")]
    pub col: i32,
    #[serde(rename = "y")]
    pub row: i32,
}

impl TileCoord {
    pub fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }
}

// Collision rectangle of a tile relative to its cell's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileInset {
    pub offset_x: f32,
    pub offset_y: f32,
    pub width: f32,
    pub height: f32,
}

impl TileInset {
    pub fn full(tile_size: f32) -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            width: tile_size,
            height: tile_size,
        }
    }

    // World-space hitbox for the cell at `coord`.
    pub fn at(&self, coord: TileCoord, tile_size: f32) -> Hitbox {
        Hitbox::new(
            coord.col as f32 * tile_size + self.offset_x,
            coord.row as f32 * tile_size + self.offset_y,
            self.width,
            self.height,
        )
    }
}

// Margins trimmed off each side of a cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsetRule {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl InsetRule {
    pub const FULL: InsetRule = InsetRule {
        left: 0.0,
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
    };

    pub fn apply(&self, tile_size: f32) -> TileInset {
        TileInset {
            offset_x: self.left,
            offset_y: self.top,
            width: (tile_size - self.left - self.right).max(1.0),
            height: (tile_size - self.top - self.bottom).max(1.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub id: u32,
    pub category: TileCategory,
    pub inset: TileInset,
}

// Well-known tileset identifiers
pub const SPIKE_1: u32 = 183;
pub const SPIKE_2: u32 = 37;
pub const SPIKE_3: u32 = 203;
pub const POST: u32 = 221;
pub const CHAIN_1: u32 = 4;
pub const CHAIN_2: u32 = 5;
pub const CHAIN_3: u32 = 24;
pub const CHAIN_4: u32 = 25;
pub const CHAIN_5: u32 = 26;
pub const PLATFORM_1: u32 = 44;
pub const PLATFORM_2: u32 = 45;
pub const PLATFORM_3: u32 = 46;
pub const PLATFORM_4: u32 = 201;
pub const FLOOR: u32 = 196;
pub const DOOR: u32 = 58;
pub const COIN_1: u32 = 151;
pub const COIN_2: u32 = 152;
pub const BOOSTER: u32 = 230;
pub const PRESSURE_BLOCK_1: u32 = 1;
pub const PRESSURE_BLOCK_2: u32 = 2;

// Marker used by level files for an empty cell.
pub const EMPTY_ID: i64 = -1;

// Fixed mapping from identifier to category. Any identifier inside the
// tileset that has no special meaning is solid; identifiers outside the
// tileset are rejected rather than guessed at.
#[derive(Debug, Clone)]
pub struct TileCatalog {
    tile_count: u32,
    special: HashMap<u32, TileCategory>,
    insets: HashMap<TileCategory, InsetRule>,
}

impl Default for TileCatalog {
    fn default() -> Self {
        let mut catalog = Self::new(400);
        for id in [SPIKE_1, SPIKE_2, SPIKE_3, POST] {
            catalog.assign(id, TileCategory::Deadly);
        }
        for id in [CHAIN_1, CHAIN_2, CHAIN_3, CHAIN_4, CHAIN_5] {
            catalog.assign(id, TileCategory::PhaseThrough);
        }
        for id in [PLATFORM_1, PLATFORM_2, PLATFORM_3, PLATFORM_4] {
            catalog.assign(id, TileCategory::Platform);
        }
        catalog.assign(FLOOR, TileCategory::Solid);
        catalog.assign(DOOR, TileCategory::Door);
        catalog.assign(COIN_1, TileCategory::Coin);
        catalog.assign(COIN_2, TileCategory::Coin);
        catalog.assign(BOOSTER, TileCategory::Booster);
        catalog.assign(PRESSURE_BLOCK_1, TileCategory::PressureBlock);
        catalog.assign(PRESSURE_BLOCK_2, TileCategory::PressureBlock);

        catalog.set_inset(
            TileCategory::Deadly,
            InsetRule {
                left: 2.0,
                top: 4.0,
                right: 2.0,
                bottom: 0.0,
            },
        );
        catalog.set_inset(
            TileCategory::Platform,
            InsetRule {
                left: 0.0,
                top: 0.0,
                right: 0.0,
                bottom: 8.0,
            },
        );
        catalog.set_inset(
            TileCategory::Coin,
            InsetRule {
                left: 4.0,
                top: 4.0,
                right: 4.0,
                bottom: 4.0,
            },
        );
        catalog
    }
}

impl TileCatalog {
    // Empty catalog: every id below `tile_count` is solid with a full-cell hitbox.
    pub fn new(tile_count: u32) -> Self {
        Self {
            tile_count,
            special: HashMap::new(),
            insets: HashMap::new(),
        }
    }

    pub fn assign(&mut self, id: u32, category: TileCategory) {
        self.special.insert(id, category);
    }

    pub fn set_inset(&mut self, category: TileCategory, rule: InsetRule) {
        self.insets.insert(category, rule);
    }

    pub fn tile_count(&self) -> u32 {
        self.tile_count
    }

    // `None` for identifiers the tileset doesn't contain.
    pub fn category(&self, id: u32) -> Option<TileCategory> {
        if id >= self.tile_count {
            return None;
        }
        Some(self.special.get(&id).copied().unwrap_or(TileCategory::Solid))
    }

    pub fn inset(&self, category: TileCategory, tile_size: f32) -> TileInset {
        self.insets
            .get(&category)
            .copied()
            .unwrap_or(InsetRule::FULL)
            .apply(tile_size)
    }

    // Builds the tile for a raw level identifier. `Ok(None)` is an empty cell,
    // `Err(id)` an identifier the catalog doesn't know.
    pub fn tile(&self, raw: i64, tile_size: f32) -> Result<Option<Tile>, i64> {
        if raw == EMPTY_ID {
            return Ok(None);
        }
        let id = u32::try_from(raw).map_err(|_| raw)?;
        let category = self.category(id).ok_or(raw)?;
        Ok(Some(Tile {
            id,
            category,
            inset: self.inset(category, tile_size),
        }))
    }
}

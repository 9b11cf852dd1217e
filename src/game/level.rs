// src/game/level.rs
use std::collections::HashSet;

use crate::error::LevelError;
use crate::levels::loader::LevelData;

use super::hitbox::Hitbox;
use super::tile::{Tile, TileCatalog, TileCategory, TileCoord};

// Index of the layer used for every collision query
pub const FOREGROUND_LAYER: usize = 0;

// One grid of tiles, row-major
#[derive(Debug, Clone)]
pub struct Layer {
    pub width: usize,
    pub height: usize,
    tiles: Vec<Option<Tile>>,
}

impl Layer {
    // Get a tile at a specific position; anything outside the grid is empty
    pub fn get_tile(&self, col: i32, row: i32) -> Option<&Tile> {
        let index = self.index(col, row)?;
        self.tiles[index].as_ref()
    }

    // Clear a tile at a specific position
    pub fn remove_tile(&mut self, col: i32, row: i32) -> Option<Tile> {
        let index = self.index(col, row)?;
        self.tiles[index].take()
    }

    pub fn tiles(&self) -> impl Iterator<Item = (TileCoord, &Tile)> + '_ {
        self.tiles.iter().enumerate().filter_map(move |(i, tile)| {
            let coord = TileCoord::new((i % self.width) as i32, (i / self.width) as i32);
            tile.as_ref().map(|tile| (coord, tile))
        })
    }

    fn index(&self, col: i32, row: i32) -> Option<usize> {
        let col = usize::try_from(col).ok()?;
        let row = usize::try_from(row).ok()?;
        if col < self.width && row < self.height {
            Some(row * self.width + col)
        } else {
            None
        }
    }
}

// The playable tile map: every layer of a level plus the per-session state
// (removed coins, struck pressure blocks) layered on top of it
#[derive(Debug, Clone)]
pub struct Map {
    pub width: usize,
    pub height: usize,
    pub tile_size: f32,
    layers: Vec<Layer>,
    total_coins: usize,
    struck_blocks: HashSet<TileCoord>,
}

impl Map {
    pub fn from_level(level: &LevelData, catalog: &TileCatalog) -> Result<Self, LevelError> {
        if level.tilewidth == 0 {
            return Err(LevelError::InvalidTileSize(level.tilewidth));
        }
        if level.width == 0 || level.height == 0 {
            return Err(LevelError::EmptyMap);
        }
        if level.layers.len() <= FOREGROUND_LAYER {
            return Err(LevelError::MissingForeground {
                index: FOREGROUND_LAYER,
            });
        }

        let tile_size = level.tilewidth as f32;
        let expected = level.width * level.height;
        let mut layers = Vec::with_capacity(level.layers.len());

        for (layer_index, layer) in level.layers.iter().enumerate() {
            let ids = layer.tiles();
            if ids.len() != expected {
                return Err(LevelError::LayerSize {
                    layer: layer_index,
                    actual: ids.len(),
                    width: level.width,
                    height: level.height,
                });
            }

            let tiles = ids
                .iter()
                .enumerate()
                .map(|(i, &raw)| {
                    catalog
                        .tile(raw, tile_size)
                        .map_err(|id| LevelError::UnknownTile {
                            id,
                            layer: layer_index,
                            col: i % level.width,
                            row: i / level.width,
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;

            layers.push(Layer {
                width: level.width,
                height: level.height,
                tiles,
            });
        }

        let total_coins = layers[FOREGROUND_LAYER]
            .tiles()
            .filter(|(_, tile)| tile.category == TileCategory::Coin)
            .count();

        Ok(Self {
            width: level.width,
            height: level.height,
            tile_size,
            layers,
            total_coins,
            struck_blocks: HashSet::new(),
        })
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn foreground(&self) -> &Layer {
        &self.layers[FOREGROUND_LAYER]
    }

    pub fn get_tile_at(&self, layer: usize, col: i32, row: i32) -> Option<&Tile> {
        self.layers.get(layer)?.get_tile(col, row)
    }

    // Foreground tile, the one collisions care about
    pub fn tile(&self, col: i32, row: i32) -> Option<&Tile> {
        self.foreground().get_tile(col, row)
    }

    pub fn category(&self, col: i32, row: i32) -> TileCategory {
        self.tile(col, row)
            .map_or(TileCategory::Empty, |tile| tile.category)
    }

    pub fn is_solid_at(&self, col: i32, row: i32) -> bool {
        self.category(col, row).is_solid()
    }

    pub fn is_category(&self, col: i32, row: i32, category: TileCategory) -> bool {
        self.category(col, row) == category
    }

    // Collision rectangle of a foreground tile in world pixels
    pub fn tile_hitbox(&self, col: i32, row: i32) -> Option<Hitbox> {
        self.tile(col, row)
            .map(|tile| tile.inset.at(TileCoord::new(col, row), self.tile_size))
    }

    // Removing is one-way for the rest of the session; a reload rebuilds the map
    pub fn remove_tile(&mut self, col: i32, row: i32) -> Option<Tile> {
        self.layers[FOREGROUND_LAYER].remove_tile(col, row)
    }

    // Marks a pressure block as struck. Only the first strike counts.
    pub fn strike_block(&mut self, coord: TileCoord) -> bool {
        self.is_category(coord.col, coord.row, TileCategory::PressureBlock)
            && self.struck_blocks.insert(coord)
    }

    pub fn is_struck(&self, coord: TileCoord) -> bool {
        self.struck_blocks.contains(&coord)
    }

    pub fn total_coins(&self) -> usize {
        self.total_coins
    }

    pub fn pixel_width(&self) -> f32 {
        self.width as f32 * self.tile_size
    }

    pub fn pixel_height(&self) -> f32 {
        self.height as f32 * self.tile_size
    }
}

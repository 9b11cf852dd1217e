// src/game/collision.rs
// Axis-separated entity vs. tile-grid collision.
//
// Callers move one axis at a time and resolve after each move: apply `dx`,
// call `CollisionResolver::resolve_horizontal`, apply `dy`, call
// `CollisionResolver::resolve_vertical`. Resolving both axes from a single
// combined displacement makes corners ambiguous.
//
// Only the foreground layer takes part. Cells outside the grid are empty.

use std::ops::RangeInclusive;

use tracing::{debug, info};

use crate::config::CollisionConfig;

use super::entity::Entity;
use super::hitbox::Hitbox;
use super::level::Map;
use super::tile::{TileCategory, TileCoord};

#[derive(Debug, Clone, Default)]
pub struct CollisionResolver {
    config: CollisionConfig,
}

// Grid index containing a pixel coordinate. Negative pixels land in negative
// cells, which the map treats as empty.
fn tile_index(pixel: f32, tile_size: f32) -> i32 {
    (pixel / tile_size).floor() as i32
}

fn span(start: f32, end: f32, tile_size: f32) -> RangeInclusive<i32> {
    tile_index(start, tile_size)..=tile_index(end, tile_size)
}

// Every cell touched by the hitbox's bounding box, right and bottom edges included
fn touched_cells(hitbox: &Hitbox, tile_size: f32) -> impl Iterator<Item = TileCoord> {
    let cols = span(hitbox.left(), hitbox.right(), tile_size);
    let rows = span(hitbox.top(), hitbox.bottom(), tile_size);
    rows.flat_map(move |row| cols.clone().map(move |col| TileCoord::new(col, row)))
}

impl CollisionResolver {
    pub fn new(config: CollisionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    // Stops the entity against solid tiles in the column its leading edge
    // entered. Expects `velocity.x * dt` to already be applied to the position.
    // Returns true when movement was blocked.
    pub fn resolve_horizontal(&self, map: &Map, entity: &mut Entity) -> bool {
        let tile_size = map.tile_size;
        let hitbox = entity.hitbox();

        let left = tile_index(hitbox.left(), tile_size);
        let right = tile_index(hitbox.right(), tile_size);
        // One pixel up from the bottom edge so the floor row doesn't count as a wall
        let rows = span(hitbox.top(), hitbox.bottom() - 1.0, tile_size);

        if entity.velocity.x > 0.0 {
            if rows.clone().any(|row| map.is_solid_at(right, row)) {
                entity.position.x =
                    right as f32 * tile_size - hitbox.dimensions.x - entity.hitbox_offset.x;
                entity.velocity.x = 0.0;
                return true;
            }
        } else if entity.velocity.x < 0.0 && rows.clone().any(|row| map.is_solid_at(left, row)) {
            entity.position.x = (left + 1) as f32 * tile_size - entity.hitbox_offset.x;
            entity.velocity.x = 0.0;
            return true;
        }
        false
    }

    // Lands the entity on solid ground or a platform, or stops it against a
    // ceiling. Grounding is recomputed from scratch on every call.
    //
    // Returns the pressure block struck from below this call, if any.
    pub fn resolve_vertical(&self, map: &mut Map, entity: &mut Entity) -> Option<TileCoord> {
        let tile_size = map.tile_size;
        let hitbox = entity.hitbox();

        let cols = span(hitbox.left(), hitbox.right() - 1.0, tile_size);
        let top = tile_index(hitbox.top(), tile_size);
        let bottom = tile_index(hitbox.bottom(), tile_size);

        entity.is_on_ground = false;

        if entity.velocity.y >= 0.0 {
            let surface = if cols.clone().any(|col| map.is_solid_at(col, bottom)) {
                Some(bottom as f32 * tile_size)
            } else {
                self.platform_surface(map, &hitbox, bottom, cols)
            };

            if let Some(surface) = surface {
                entity.position.y = surface - hitbox.dimensions.y - entity.hitbox_offset.y;
                entity.velocity.y = 0.0;
                entity.is_on_ground = true;
            }
            None
        } else {
            let struck = self.strike_from_below(map, &hitbox, top, cols.clone());
            if struck.is_some() || cols.clone().any(|col| map.is_solid_at(col, top)) {
                entity.position.y = (top + 1) as f32 * tile_size - entity.hitbox_offset.y;
                entity.velocity.y = 0.0;
            }
            struck
        }
    }

    // Top of the first platform in `row` whose surface the hitbox's feet are
    // within tolerance of, never past the platform's own bottom. Platforms
    // only catch from above.
    fn platform_surface(
        &self,
        map: &Map,
        hitbox: &Hitbox,
        row: i32,
        cols: RangeInclusive<i32>,
    ) -> Option<f32> {
        let feet = hitbox.bottom();
        cols.filter(|&col| map.is_category(col, row, TileCategory::Platform))
            .filter_map(|col| map.tile_hitbox(col, row))
            .find(|platform| {
                feet >= platform.top()
                    && feet
                        <= (platform.top() + self.config.platform_landing_tolerance)
                            .min(platform.bottom())
                    && hitbox.right() > platform.left()
                    && hitbox.left() < platform.right()
            })
            .map(|platform| platform.top())
    }

    fn strike_from_below(
        &self,
        map: &mut Map,
        hitbox: &Hitbox,
        row: i32,
        cols: RangeInclusive<i32>,
    ) -> Option<TileCoord> {
        let block_bottom = (row + 1) as f32 * map.tile_size;
        if (hitbox.top() - block_bottom).abs() >= self.config.pressure_block_tolerance {
            return None;
        }

        let coord = cols
            .map(|col| TileCoord::new(col, row))
            .find(|coord| {
                map.is_category(coord.col, coord.row, TileCategory::PressureBlock)
                    && !map.is_struck(*coord)
            })?;
        map.strike_block(coord);
        debug!(col = coord.col, row = coord.row, "pressure block struck");
        Some(coord)
    }

    // True when the hitbox touches a deadly tile's inset, or runs into the
    // side of a platform. The side check needs horizontal motion and real
    // vertical overlap, so feet resting on a platform top are safe.
    pub fn check_deadly(&self, map: &Map, entity: &Entity) -> bool {
        let hitbox = entity.hitbox();
        touched_cells(&hitbox, map.tile_size).any(|coord| {
            let Some(tile) = map.tile(coord.col, coord.row) else {
                return false;
            };
            let tile_box = tile.inset.at(coord, map.tile_size);
            match tile.category {
                TileCategory::Deadly => hitbox.touches(&tile_box),
                TileCategory::Platform => self.is_platform_side_hit(entity, &hitbox, &tile_box),
                _ => false,
            }
        })
    }

    fn is_platform_side_hit(&self, entity: &Entity, hitbox: &Hitbox, platform: &Hitbox) -> bool {
        let margin = self.config.platform_side_margin;
        entity.velocity.x != 0.0
            && hitbox.bottom() > platform.top() + margin
            && hitbox.top() < platform.bottom() - margin
    }

    pub fn check_door(&self, map: &Map, entity: &Entity) -> bool {
        self.touches_category(map, entity, TileCategory::Door)
    }

    // Whether the entity stands in a booster. What the boost does is up to the caller.
    pub fn check_booster(&self, map: &Map, entity: &Entity) -> bool {
        self.touches_category(map, entity, TileCategory::Booster)
    }

    // Removes every coin whose inset strictly overlaps the hitbox and returns
    // their cells. A removed coin is gone, so a second call can't report it again.
    pub fn check_coins(&self, map: &mut Map, entity: &Entity) -> Vec<TileCoord> {
        let hitbox = entity.hitbox();
        let collected: Vec<TileCoord> = touched_cells(&hitbox, map.tile_size)
            .filter(|coord| map.is_category(coord.col, coord.row, TileCategory::Coin))
            .filter(|coord| {
                map.tile_hitbox(coord.col, coord.row)
                    .is_some_and(|coin| hitbox.overlaps(&coin))
            })
            .collect();

        for coord in &collected {
            map.remove_tile(coord.col, coord.row);
            info!(col = coord.col, row = coord.row, "coin collected");
        }
        collected
    }

    // Keeps the entity's sprite inside `[0, map width]` and snaps it to whole pixels.
    pub fn clamp_to_world(&self, map: &Map, entity: &mut Entity) {
        let max_x = (map.pixel_width() - entity.dimensions.x).max(0.0);
        entity.position.x = entity.position.x.round().clamp(0.0, max_x);
        entity.position.y = entity.position.y.round();
    }

    fn touches_category(&self, map: &Map, entity: &Entity, category: TileCategory) -> bool {
        touched_cells(&entity.hitbox(), map.tile_size)
            .any(|coord| map.is_category(coord.col, coord.row, category))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::tile::{self, TileCatalog};
    use crate::levels::loader::{LayerData, LevelData};

    fn map(art: &str) -> Map {
        let level = LevelData::from_ascii(art, 16).unwrap();
        Map::from_level(&level, &TileCatalog::default()).unwrap()
    }

    fn body(x: f32, y: f32, vx: f32, vy: f32) -> Entity {
        let mut entity = Entity::new(x, y, 16.0, 16.0);
        entity.velocity.x = vx;
        entity.velocity.y = vy;
        entity
    }

    #[test]
    fn moving_right_stops_at_the_wall() {
        let map = map("....#");
        let mut entity = body(50.0, 0.0, 100.0, 0.0);

        assert!(CollisionResolver::default().resolve_horizontal(&map, &mut entity));
        assert_eq!(entity.hitbox().right(), 64.0);
        assert_eq!(entity.position.x, 48.0);
        assert_eq!(entity.velocity.x, 0.0);
    }

    #[test]
    fn flush_against_a_wall_stays_flush() {
        let map = map("....#");
        let mut entity = body(48.0, 0.0, 100.0, 0.0);

        CollisionResolver::default().resolve_horizontal(&map, &mut entity);
        assert_eq!(entity.position.x, 48.0);
        assert_eq!(entity.velocity.x, 0.0);
    }

    #[test]
    fn moving_left_stops_at_the_wall_with_hitbox_offset() {
        let map = map("#....");
        let mut entity = body(12.0, 0.0, -100.0, 0.0);
        entity.hitbox_offset.x = 3.0;
        entity.hitbox_dimensions.x = 10.0;

        CollisionResolver::default().resolve_horizontal(&map, &mut entity);
        assert_eq!(entity.hitbox().left(), 16.0);
        assert_eq!(entity.position.x, 13.0);
        assert_eq!(entity.velocity.x, 0.0);
    }

    #[test]
    fn floor_row_is_not_a_wall() {
        let map = map(
            "
            .....
            #####
            ",
        );
        let mut entity = body(20.0, 0.0, 100.0, 0.0);
        assert!(!CollisionResolver::default().resolve_horizontal(&map, &mut entity));
        assert_eq!(entity.position.x, 20.0);
        assert_eq!(entity.velocity.x, 100.0);
    }

    #[test]
    fn platforms_and_chains_never_block_sideways() {
        let resolver = CollisionResolver::default();
        for art in ["....=", "....|", "....^", "....o", "....D"] {
            let map = map(art);
            let mut entity = body(50.0, 0.0, 100.0, 0.0);
            assert!(!resolver.resolve_horizontal(&map, &mut entity), "{art}");
            assert_eq!(entity.position.x, 50.0);
        }
    }

    #[test]
    fn out_of_bounds_is_not_a_collision() {
        let map = map("....");
        let mut entity = body(-40.0, -40.0, -100.0, -100.0);
        let resolver = CollisionResolver::default();
        assert!(!resolver.resolve_horizontal(&map, &mut entity));
        assert_eq!(resolver.resolve_vertical(&mut map.clone(), &mut entity), None);
        assert_eq!(entity.position.x, -40.0);
        assert!(!resolver.check_deadly(&map, &entity));
    }

    #[test]
    fn falling_onto_a_solid_tile() {
        let mut ids = vec![tile::EMPTY_ID; 4 * 16];
        ids[15 * 4 + 2] = tile::FLOOR as i64;
        let level = LevelData {
            width: 4,
            height: 16,
            tilewidth: 16,
            layers: vec![LayerData::Plain(ids)],
            enemies: Vec::new(),
            spawn: None,
        };
        let mut map = Map::from_level(&level, &TileCatalog::default()).unwrap();
        let mut entity = body(32.0, 239.0, 0.0, 50.0);

        CollisionResolver::default().resolve_vertical(&mut map, &mut entity);
        assert_eq!(entity.position.y, 224.0);
        assert_eq!(entity.velocity.y, 0.0);
        assert!(entity.is_on_ground);
    }

    #[test]
    fn ground_flag_is_recomputed_every_call() {
        let mut map = map(
            "
            .....
            #####
            ",
        );
        let resolver = CollisionResolver::default();
        let mut entity = body(16.0, 0.0, 0.0, 0.0);

        resolver.resolve_vertical(&mut map, &mut entity);
        assert!(entity.is_on_ground);
        assert_eq!(entity.position.y, 0.0);

        entity.position.y = -10.0;
        resolver.resolve_vertical(&mut map, &mut entity);
        assert!(!entity.is_on_ground);
        assert_eq!(entity.position.y, -10.0);
    }

    #[test]
    fn landing_on_a_platform_from_above() {
        let mut map = map(
            "
            .....
            ..=..
            ",
        );
        let resolver = CollisionResolver::default();
        let mut entity = body(32.0, 2.0, 100.0, 120.0);

        resolver.resolve_vertical(&mut map, &mut entity);
        assert!(entity.is_on_ground);
        assert_eq!(entity.velocity.y, 0.0);
        assert_eq!(entity.position.y, 0.0);
        // standing on top while running is safe
        assert!(!resolver.check_deadly(&map, &entity));
    }

    #[test]
    fn platform_too_deep_is_not_landable_and_kills() {
        let mut map = map(
            "
            .....
            ..=..
            ",
        );
        let resolver = CollisionResolver::default();
        let mut entity = body(32.0, 12.0, 100.0, 120.0);

        resolver.resolve_vertical(&mut map, &mut entity);
        assert!(!entity.is_on_ground);
        assert_eq!(entity.position.y, 12.0);
        assert!(resolver.check_deadly(&map, &entity));
    }

    #[test]
    fn platform_landing_band_ends_at_the_platform_bottom() {
        let art = "
            .....
            ..=..
            ";
        let resolver = CollisionResolver::new(CollisionConfig {
            platform_landing_tolerance: 12.0,
            ..CollisionConfig::default()
        });

        // feet exactly on the platform's bottom edge still land
        let mut map = map(art);
        let mut entity = body(32.0, 8.0, 0.0, 100.0);
        resolver.resolve_vertical(&mut map, &mut entity);
        assert!(entity.is_on_ground);
        assert_eq!(entity.position.y, 0.0);

        // one pixel lower is already below the platform box
        let mut entity = body(32.0, 9.0, 0.0, 100.0);
        resolver.resolve_vertical(&mut map, &mut entity);
        assert!(!entity.is_on_ground);
        assert_eq!(entity.position.y, 9.0);
        assert_eq!(entity.velocity.y, 100.0);
    }

    #[test]
    fn platform_side_is_deadly_only_while_moving() {
        let map = map(
            "
            .....
            ..=..
            ",
        );
        let resolver = CollisionResolver::default();
        let running = body(20.0, 16.0, 100.0, 0.0);
        assert!(resolver.check_deadly(&map, &running));

        let still = body(20.0, 16.0, 0.0, 0.0);
        assert!(!resolver.check_deadly(&map, &still));
    }

    #[test]
    fn spikes_use_their_inset() {
        let map = map("..^..");
        let resolver = CollisionResolver::default();
        // bounding cell touched, inset (x 34..46) not reached
        assert!(!resolver.check_deadly(&map, &body(17.0, 0.0, 0.0, 0.0)));
        assert!(resolver.check_deadly(&map, &body(20.0, 0.0, 0.0, 0.0)));
    }

    #[test]
    fn coins_are_collected_once() {
        let mut map = map("..o..");
        let resolver = CollisionResolver::default();
        let entity = body(30.0, 0.0, 0.0, 0.0);

        assert_eq!(resolver.check_coins(&mut map, &entity), vec![TileCoord::new(2, 0)]);
        assert!(resolver.check_coins(&mut map, &entity).is_empty());
        assert!(map.tile(2, 0).is_none());
    }

    #[test]
    fn coins_need_a_strict_inset_overlap() {
        let mut map = map("..o..");
        let resolver = CollisionResolver::default();
        // right edge at 36 meets the coin inset's left edge exactly
        let entity = body(20.0, 0.0, 0.0, 0.0);
        assert!(resolver.check_coins(&mut map, &entity).is_empty());
        assert!(map.tile(2, 0).is_some());
    }

    #[test]
    fn door_and_booster_by_touched_cell() {
        let resolver = CollisionResolver::default();
        let door = map("..D");
        assert!(resolver.check_door(&door, &body(18.0, 0.0, 0.0, 0.0)));
        assert!(!resolver.check_door(&door, &body(0.0, 0.0, 0.0, 0.0)));

        let booster = map(".>.");
        assert!(resolver.check_booster(&booster, &body(4.0, 0.0, 0.0, 0.0)));
        assert!(!resolver.check_door(&booster, &body(4.0, 0.0, 0.0, 0.0)));
    }

    #[test]
    fn ceiling_stops_upward_motion() {
        let mut map = map(
            "
            ..#..
            .....
            ",
        );
        let mut entity = body(32.0, 10.0, 0.0, -200.0);
        assert_eq!(CollisionResolver::default().resolve_vertical(&mut map, &mut entity), None);
        assert_eq!(entity.position.y, 16.0);
        assert_eq!(entity.velocity.y, 0.0);
        assert!(!entity.is_on_ground);
    }

    #[test]
    fn pressure_block_triggers_once_and_keeps_blocking() {
        let mut map = map(
            "
            ..?..
            .....
            ",
        );
        let resolver = CollisionResolver::default();

        let mut entity = body(32.0, 13.0, 0.0, -200.0);
        assert_eq!(resolver.resolve_vertical(&mut map, &mut entity), Some(TileCoord::new(2, 0)));
        assert_eq!(entity.position.y, 16.0);
        assert_eq!(entity.velocity.y, 0.0);

        let mut again = body(32.0, 13.0, 0.0, -200.0);
        assert_eq!(resolver.resolve_vertical(&mut map, &mut again), None);
        assert_eq!(again.position.y, 16.0);
    }

    #[test]
    fn clamp_to_world_keeps_sprite_inside() {
        let map = map(".....");
        let resolver = CollisionResolver::default();

        let mut entity = body(-3.4, 7.6, -100.0, 0.0);
        resolver.clamp_to_world(&map, &mut entity);
        assert_eq!(entity.position.x, 0.0);
        assert_eq!(entity.position.y, 8.0);

        entity.position.x = 1000.0;
        resolver.clamp_to_world(&map, &mut entity);
        assert_eq!(entity.position.x, 64.0);
    }
}

// src/game/states/playing.rs
use tracing::{info, warn};
use winit::event::WindowEvent;

use crate::engine::input::{Action, Input};
use crate::engine::state::GameState;
use crate::error::GameResult;
use crate::game::entities::enemy::Enemy;
use crate::game::entities::player::{Player, PlayerOutcome};
use crate::game::level::Map;
use crate::game::session::Session;
use crate::game::tile::{TileCategory, TileCoord};
use crate::save::{GameProgress, ProgressStore};

// How a level ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    Victory { level: u32, coins: u32 },
    GameOver { level: u32 },
}

// One level being played: the map, the player and enemies on it, and the
// bookkeeping needed to save and restore it
pub struct PlayState {
    session: Session,
    store: Box<dyn ProgressStore>,
    input: Input,
    map: Map,
    player: Player,
    enemies: Vec<Enemy>,
    collected_coins: Vec<TileCoord>,
    autosave_timer: f32,
}

impl PlayState {
    pub fn new(session: Session, store: Box<dyn ProgressStore>) -> GameResult<Self> {
        let definition = session.level_definition(session.current_level)?;
        let map = Map::from_level(definition, session.catalog())?;
        let player = Player::new(session.config(), 0.0, 0.0);

        let mut state = Self {
            session,
            store,
            input: Input::new(),
            map,
            player,
            enemies: Vec::new(),
            collected_coins: Vec::new(),
            autosave_timer: 0.0,
        };
        state.enter()?;
        Ok(state)
    }

    // (Re)starts the current level from its definition, then picks up any
    // saved progress for it
    pub fn enter(&mut self) -> GameResult<()> {
        let level = self.session.current_level;
        let definition = self.session.level_definition(level)?;
        self.map = Map::from_level(definition, self.session.catalog())?;
        self.enemies = definition.enemies.iter().map(Enemy::from_spawn).collect();
        let (x, y) = definition.spawn.unwrap_or(self.session.config().spawn);

        self.player.reset(x, y);
        self.collected_coins.clear();
        self.autosave_timer = 0.0;
        self.input.clear();
        info!(
            level,
            coins = self.map.total_coins(),
            enemies = self.enemies.len(),
            "level started"
        );

        self.restore_progress(level);
        Ok(())
    }

    pub fn load_level(&mut self, level: u32) -> GameResult<()> {
        self.session.level_definition(level)?;
        self.session.current_level = level;
        self.enter()
    }

    fn restore_progress(&mut self, level: u32) {
        let progress = match self.store.load_progress() {
            Ok(Some(progress)) if progress.level == level => progress,
            Ok(_) => return,
            Err(err) => {
                warn!(%err, "could not read saved progress");
                return;
            }
        };

        // A bad save must not leave the player outside the map
        let dimensions = self.player.entity().dimensions;
        let max_x = (self.map.pixel_width() - dimensions.x).max(0.0);
        let max_y = (self.map.pixel_height() - dimensions.y).max(0.0);
        let spawn = self.player.position();
        let x = if progress.player_x.is_finite() {
            progress.player_x.clamp(0.0, max_x)
        } else {
            spawn.x
        };
        let y = if progress.player_y.is_finite() {
            progress.player_y.clamp(0.0, max_y)
        } else {
            spawn.y
        };
        if x != progress.player_x || y != progress.player_y {
            warn!(
                saved_x = progress.player_x,
                saved_y = progress.player_y,
                x,
                y,
                "saved position was outside the map"
            );
        }

        for coord in &progress.collected_coin_positions {
            if self.map.is_category(coord.col, coord.row, TileCategory::Coin) {
                self.map.remove_tile(coord.col, coord.row);
            }
        }
        self.player.restore(x, y, progress.coins_collected);
        info!(
            level,
            coins = progress.coins_collected,
            "restored saved progress"
        );
        self.collected_coins = progress.collected_coin_positions;
    }

    pub fn update(&mut self, dt: f32) -> Option<PlayOutcome> {
        let outcome = self.tick(dt);
        self.input.end_frame();
        outcome
    }

    fn tick(&mut self, dt: f32) -> Option<PlayOutcome> {
        self.autosave_timer += dt;
        if self.autosave_timer >= self.session.config().autosave_interval {
            self.autosave_timer = 0.0;
            if !self.player.is_finishing() {
                self.save_progress();
            }
        }

        let signal = self.player.update(&mut self.map, &self.input, dt);
        self.collected_coins
            .extend(self.player.take_collected_coins());

        for enemy in &mut self.enemies {
            enemy.update(dt);
        }
        if self.check_enemy_collisions() {
            self.player.die();
        }
        // Fell out of the bottom of the world
        if self.player.entity().hitbox().top() > self.map.pixel_height() {
            self.player.die();
        }

        signal.map(|signal| self.finish(signal))
    }

    // True while the player is alive and touching any enemy
    pub fn check_enemy_collisions(&self) -> bool {
        !self.player.is_finishing()
            && self
                .enemies
                .iter()
                .any(|enemy| enemy.entity.collides_with(self.player.entity()))
    }

    pub fn save_progress(&mut self) {
        let position = self.player.position();
        let progress = GameProgress::new(
            self.session.current_level,
            position.x,
            position.y,
            self.player.coins(),
            self.collected_coins.clone(),
        );
        if let Err(err) = self.store.save_progress(&progress) {
            warn!(%err, "autosave failed");
        }
    }

    fn clear_progress(&mut self) {
        if let Err(err) = self.store.clear_progress() {
            warn!(%err, "could not clear saved progress");
        }
    }

    fn finish(&mut self, signal: PlayerOutcome) -> PlayOutcome {
        let level = self.session.current_level;
        match signal {
            PlayerOutcome::Won => {
                let coins = self.player.coins();
                self.session.update_high_score(level, coins);
                if let Err(err) = self.store.save_high_scores(self.session.high_scores()) {
                    warn!(%err, "could not save high scores");
                }
                self.clear_progress();
                info!(level, coins, "level complete");
                PlayOutcome::Victory { level, coins }
            }
            PlayerOutcome::Died => {
                self.clear_progress();
                info!(level, "game over");
                PlayOutcome::GameOver { level }
            }
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn store(&self) -> &dyn ProgressStore {
        self.store.as_ref()
    }

    pub fn input_mut(&mut self) -> &mut Input {
        &mut self.input
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn collected_coins(&self) -> &[TileCoord] {
        &self.collected_coins
    }
}

impl GameState for PlayState {
    type Outcome = PlayOutcome;

    fn handle_event(&mut self, event: &WindowEvent) -> bool {
        self.input.handle_event(event);
        self.input.is_pressed(Action::Quit)
    }

    fn update(&mut self, dt: f32) -> Option<PlayOutcome> {
        PlayState::update(self, dt)
    }

    fn status(&self) -> String {
        let level = self.session.current_level;
        format!(
            "Yellow Lightning | Level {} | Coins {}/{} | Best {}",
            level,
            self.player.coins(),
            self.map.total_coins(),
            self.session.high_score(level)
        )
    }
}

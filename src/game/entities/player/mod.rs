// src/game/entities/player/mod.rs
mod machine;
mod states;

pub use machine::{PlayerFrame, PlayerState, PlayerStateMachine, PlayerStateName};

use tracing::info;

use crate::config::{GameConfig, PlayerConfig};
use crate::engine::animation::Animation;
use crate::engine::input::Input;
use crate::game::Vector2;
use crate::game::collision::CollisionResolver;
use crate::game::entity::Entity;
use crate::game::level::Map;
use crate::game::tile::TileCoord;

// Reported once when a terminal animation finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerOutcome {
    Died,
    Won,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAnimation {
    Idle,
    Run,
    Jump,
    Fall,
    Death,
    Victory,
}

// Frame indices into the player sprite sheet
#[derive(Debug, Clone)]
struct AnimationSet {
    idle: Animation,
    run: Animation,
    jump: Animation,
    fall: Animation,
    death: Animation,
    victory: Animation,
}

impl AnimationSet {
    fn new() -> Self {
        Self {
            idle: Animation::new(vec![0], 0.1),
            run: Animation::new((1..=6).collect(), 0.1),
            jump: Animation::new(vec![7], 0.1),
            fall: Animation::new(vec![8, 9], 0.1),
            death: Animation::once((10..=14).collect(), 0.3),
            victory: Animation::once((15..=17).collect(), 0.3),
        }
    }

    fn get(&self, which: PlayerAnimation) -> &Animation {
        match which {
            PlayerAnimation::Idle => &self.idle,
            PlayerAnimation::Run => &self.run,
            PlayerAnimation::Jump => &self.jump,
            PlayerAnimation::Fall => &self.fall,
            PlayerAnimation::Death => &self.death,
            PlayerAnimation::Victory => &self.victory,
        }
    }

    fn get_mut(&mut self, which: PlayerAnimation) -> &mut Animation {
        match which {
            PlayerAnimation::Idle => &mut self.idle,
            PlayerAnimation::Run => &mut self.run,
            PlayerAnimation::Jump => &mut self.jump,
            PlayerAnimation::Fall => &mut self.fall,
            PlayerAnimation::Death => &mut self.death,
            PlayerAnimation::Victory => &mut self.victory,
        }
    }
}

// The data player states act on
#[derive(Debug, Clone)]
pub struct PlayerBody {
    pub entity: Entity,
    pub facing_right: bool,
    pub has_died: bool,
    pub has_won: bool,
    pub coins: u32,
    // Coin cells picked up since the owner last drained them
    collected: Vec<TileCoord>,
    outcome: Option<PlayerOutcome>,
    animations: AnimationSet,
    current_animation: PlayerAnimation,
}

impl PlayerBody {
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            facing_right: true,
            has_died: false,
            has_won: false,
            coins: 0,
            collected: Vec::new(),
            outcome: None,
            animations: AnimationSet::new(),
            current_animation: PlayerAnimation::Idle,
        }
    }

    // Switch to an animation and rewind it
    pub fn play(&mut self, which: PlayerAnimation) {
        self.current_animation = which;
        self.animations.get_mut(which).refresh();
    }

    pub fn animate(&mut self, dt: f32) {
        self.animations.get_mut(self.current_animation).update(dt);
    }

    pub fn animation(&self) -> &Animation {
        self.animations.get(self.current_animation)
    }

    pub fn current_animation(&self) -> PlayerAnimation {
        self.current_animation
    }

    fn finish(&mut self, outcome: PlayerOutcome) {
        match outcome {
            PlayerOutcome::Died => self.has_died = true,
            PlayerOutcome::Won => self.has_won = true,
        }
        info!(?outcome, coins = self.coins, "player finished");
        self.outcome = Some(outcome);
    }
}

pub struct Player {
    pub body: PlayerBody,
    machine: PlayerStateMachine,
    config: PlayerConfig,
    resolver: CollisionResolver,
}

impl Player {
    pub fn new(config: &GameConfig, x: f32, y: f32) -> Self {
        let player = &config.player;
        let entity = Entity::new(x, y, player.width, player.height)
            .with_hitbox(player.hitbox_offset, player.hitbox_size);
        let mut body = PlayerBody::new(entity);
        let mut machine = PlayerStateMachine::new(PlayerStateName::Falling);
        machine.restart(PlayerStateName::Falling, &mut body, player);

        Self {
            body,
            machine,
            config: player.clone(),
            resolver: CollisionResolver::new(config.collision.clone()),
        }
    }

    // Back to a fresh, falling player at (x, y)
    pub fn reset(&mut self, x: f32, y: f32) {
        let body = &mut self.body;
        body.entity.set_position(x, y);
        body.entity.stop();
        body.entity.is_on_ground = false;
        body.facing_right = true;
        body.has_died = false;
        body.has_won = false;
        body.coins = 0;
        body.collected.clear();
        body.outcome = None;
        self.machine
            .restart(PlayerStateName::Falling, &mut self.body, &self.config);
    }

    // Puts a reset player back where a saved game left off
    pub fn restore(&mut self, x: f32, y: f32, coins: u32) {
        self.body.entity.set_position(x, y);
        self.body.coins = coins;
    }

    pub fn update(&mut self, map: &mut Map, input: &Input, dt: f32) -> Option<PlayerOutcome> {
        let mut cx = PlayerFrame {
            body: &mut self.body,
            map,
            input,
            resolver: &self.resolver,
            config: &self.config,
        };
        self.machine.update(&mut cx, dt);
        self.body.outcome.take()
    }

    // Starts dying unless the level is already over. Returns whether it did.
    pub fn die(&mut self) -> bool {
        if self.machine.current().is_terminal() {
            return false;
        }
        self.machine
            .change(PlayerStateName::Dying, &mut self.body, &self.config)
    }

    pub fn state(&self) -> PlayerStateName {
        self.machine.current()
    }

    pub fn is_finishing(&self) -> bool {
        self.state().is_terminal()
    }

    pub fn entity(&self) -> &Entity {
        &self.body.entity
    }

    pub fn position(&self) -> Vector2 {
        self.body.entity.position
    }

    pub fn coins(&self) -> u32 {
        self.body.coins
    }

    pub fn take_collected_coins(&mut self) -> Vec<TileCoord> {
        std::mem::take(&mut self.body.collected)
    }

    pub fn sprite_frame(&self) -> usize {
        self.body.animation().frame()
    }

    pub fn resolver(&self) -> &CollisionResolver {
        &self.resolver
    }
}

#[cfg(test)]
mod tests {
    use winit::event::{ElementState, VirtualKeyCode};

    use super::*;
    use crate::config::Locomotion;
    use crate::game::tile::TileCatalog;
    use crate::levels::loader::LevelData;

    const DT: f32 = 1.0 / 60.0;

    fn map(art: &str) -> Map {
        let level = LevelData::from_ascii(art, 16).unwrap();
        Map::from_level(&level, &TileCatalog::default()).unwrap()
    }

    fn manual_config() -> GameConfig {
        let mut config = GameConfig::default();
        config.player.locomotion = Locomotion::Manual;
        config
    }

    fn run(player: &mut Player, map: &mut Map, input: &mut Input, frames: usize) -> Vec<PlayerOutcome> {
        let mut outcomes = Vec::new();
        for _ in 0..frames {
            outcomes.extend(player.update(map, input, DT));
            input.end_frame();
        }
        outcomes
    }

    #[test]
    fn lands_and_auto_runs() {
        let mut map = map(
            "
            ......
            ......
            ######
            ",
        );
        let mut input = Input::new();
        let mut player = Player::new(&GameConfig::default(), 0.0, 0.0);
        assert_eq!(player.state(), PlayerStateName::Falling);

        run(&mut player, &mut map, &mut input, 30);
        assert_eq!(player.state(), PlayerStateName::Running);
        assert!(player.entity().is_on_ground);
        assert_eq!(player.position().y, 16.0);
        assert_eq!(player.entity().velocity.x, 100.0);
    }

    #[test]
    fn jump_rises_then_falls_then_lands() {
        let mut map = map(
            "
            ..........
            ..........
            ..........
            ..........
            ##########
            ",
        );
        let mut input = Input::new();
        let mut player = Player::new(&GameConfig::default(), 0.0, 48.0);
        run(&mut player, &mut map, &mut input, 2);
        assert_eq!(player.state(), PlayerStateName::Running);

        input.handle_key(VirtualKeyCode::Space, ElementState::Pressed);
        run(&mut player, &mut map, &mut input, 1);
        assert_eq!(player.state(), PlayerStateName::Jumping);
        assert_eq!(player.entity().velocity.y, -500.0);

        run(&mut player, &mut map, &mut input, 5);
        assert_eq!(player.state(), PlayerStateName::Jumping);
        assert!(player.entity().velocity.y < 0.0);

        run(&mut player, &mut map, &mut input, 40);
        assert_eq!(player.state(), PlayerStateName::Falling);

        run(&mut player, &mut map, &mut input, 60);
        assert_eq!(player.state(), PlayerStateName::Running);
        assert_eq!(player.position().y, 48.0);
    }

    #[test]
    fn releasing_jump_early_halves_upward_speed_once() {
        let mut map = map(
            "
            ..........
            ..........
            ..........
            ..........
            ##########
            ",
        );
        let mut input = Input::new();
        let mut player = Player::new(&GameConfig::default(), 0.0, 48.0);
        run(&mut player, &mut map, &mut input, 2);
        input.handle_key(VirtualKeyCode::Space, ElementState::Pressed);
        run(&mut player, &mut map, &mut input, 2);

        let before = player.entity().velocity.y;
        input.handle_key(VirtualKeyCode::Space, ElementState::Released);
        run(&mut player, &mut map, &mut input, 1);
        let gravity = 1000.0 * DT;
        let cut = player.entity().velocity.y;
        assert!((cut - (before * 0.5 + gravity)).abs() < 1e-3);

        run(&mut player, &mut map, &mut input, 1);
        assert!((player.entity().velocity.y - (cut + gravity)).abs() < 1e-3);
    }

    #[test]
    fn door_wins_once() {
        let mut map = map(
            "
            ....D
            #####
            ",
        );
        let mut input = Input::new();
        let mut player = Player::new(&GameConfig::default(), 0.0, 0.0);

        let outcomes = run(&mut player, &mut map, &mut input, 200);
        assert_eq!(outcomes, vec![PlayerOutcome::Won]);
        assert_eq!(player.state(), PlayerStateName::Victory);
        assert!(player.body.has_won);
        assert_eq!(player.entity().velocity, Vector2::zeros());
    }

    #[test]
    fn spike_kills_once() {
        let mut map = map(
            "
            ...^.
            #####
            ",
        );
        let mut input = Input::new();
        let mut player = Player::new(&GameConfig::default(), 0.0, 0.0);

        let outcomes = run(&mut player, &mut map, &mut input, 400);
        assert_eq!(outcomes, vec![PlayerOutcome::Died]);
        assert!(player.body.has_died);
        assert!(!player.body.has_won);
    }

    #[test]
    fn spike_beats_a_door_touched_in_the_same_step() {
        let mut map = map(
            "
            ..^D.
            #####
            ",
        );
        let mut input = Input::new();
        // hitbox spans the spike inset and the door cell from the first step
        let mut player = Player::new(&GameConfig::default(), 36.0, 0.0);

        player.update(&mut map, &input, DT);
        assert_eq!(player.state(), PlayerStateName::Dying);

        let outcomes = run(&mut player, &mut map, &mut input, 200);
        assert_eq!(outcomes, vec![PlayerOutcome::Died]);
        assert!(player.body.has_died);
        assert!(!player.body.has_won);
    }

    #[test]
    fn death_signal_fires_once_while_animation_stays_done() {
        let mut map = map("#####");
        let input = Input::new();
        let mut player = Player::new(&GameConfig::default(), 0.0, -16.0);

        assert!(player.die());
        assert_eq!(player.state(), PlayerStateName::Dying);
        assert!(!player.die());

        let mut signals = 0;
        // five frames to finish, then three more with the animation done
        for _ in 0..8 {
            if player.update(&mut map, &input, 0.31) == Some(PlayerOutcome::Died) {
                signals += 1;
            }
        }
        assert!(player.body.animation().is_done());
        assert_eq!(signals, 1);
    }

    #[test]
    fn collects_coins_and_reports_cells() {
        let mut map = map(
            "
            ..o.......
            ##########
            ",
        );
        let mut input = Input::new();
        let mut player = Player::new(&GameConfig::default(), 0.0, 0.0);

        run(&mut player, &mut map, &mut input, 30);
        assert_eq!(player.coins(), 1);
        assert_eq!(player.take_collected_coins(), vec![TileCoord::new(2, 0)]);
        assert!(player.take_collected_coins().is_empty());
    }

    #[test]
    fn booster_launches_upward() {
        let mut map = map(
            "
            ..........
            .>........
            ##########
            ",
        );
        let mut input = Input::new();
        let mut player = Player::new(&GameConfig::default(), 0.0, 16.0);

        let mut lowest = 0.0_f32;
        for _ in 0..20 {
            player.update(&mut map, &input, DT);
            input.end_frame();
            lowest = lowest.min(player.entity().velocity.y);
        }
        assert!(lowest < -600.0);
    }

    #[test]
    fn pressure_block_pays_one_coin() {
        let mut map = map(
            "
            .???????..
            ..........
            ..........
            ##########
            ",
        );
        let mut input = Input::new();
        let mut player = Player::new(&GameConfig::default(), 16.0, 32.0);
        run(&mut player, &mut map, &mut input, 1);
        assert_eq!(player.state(), PlayerStateName::Running);

        input.handle_key(VirtualKeyCode::Space, ElementState::Pressed);
        run(&mut player, &mut map, &mut input, 15);
        assert_eq!(player.coins(), 1);
        assert!(!player.is_finishing());
    }

    #[test]
    fn left_edge_clamps_to_zero() {
        let mut map = map(
            "
            .....
            #####
            ",
        );
        let mut input = Input::new();
        let mut player = Player::new(&manual_config(), 0.0, 0.0);
        input.handle_key(VirtualKeyCode::A, ElementState::Pressed);

        for _ in 0..20 {
            player.update(&mut map, &input, DT);
            input.end_frame();
            assert!(player.position().x >= 0.0);
        }
        assert_eq!(player.position().x, 0.0);

        player.body.entity.velocity.x = -100.0;
        player.update(&mut map, &input, DT);
        assert_eq!(player.position().x, 0.0);
    }

    #[test]
    fn manual_player_idles_without_input() {
        let mut map = map(
            "
            .....
            #####
            ",
        );
        let mut input = Input::new();
        let mut player = Player::new(&manual_config(), 16.0, 0.0);

        run(&mut player, &mut map, &mut input, 5);
        assert_eq!(player.state(), PlayerStateName::Idling);
        assert_eq!(player.entity().velocity.x, 0.0);

        input.handle_key(VirtualKeyCode::D, ElementState::Pressed);
        run(&mut player, &mut map, &mut input, 1);
        assert_eq!(player.state(), PlayerStateName::Running);
    }

    #[test]
    fn reversing_at_speed_skids_back_to_running() {
        let mut map = map(&format!("{}\n{}", ".".repeat(40), "#".repeat(40)));
        let mut input = Input::new();
        let mut player = Player::new(&manual_config(), 16.0, 0.0);

        input.handle_key(VirtualKeyCode::D, ElementState::Pressed);
        run(&mut player, &mut map, &mut input, 60);
        assert!(player.entity().velocity.x > 200.0);

        input.handle_key(VirtualKeyCode::D, ElementState::Released);
        input.handle_key(VirtualKeyCode::A, ElementState::Pressed);
        run(&mut player, &mut map, &mut input, 1);
        assert_eq!(player.state(), PlayerStateName::Skidding);
        assert!(!player.body.facing_right);

        run(&mut player, &mut map, &mut input, 20);
        assert_eq!(player.state(), PlayerStateName::Running);
        assert!(player.entity().velocity.x <= 100.0);
    }

    #[test]
    fn reset_clears_progress() {
        let mut map = map(
            "
            ..o.......
            ##########
            ",
        );
        let mut input = Input::new();
        let mut player = Player::new(&GameConfig::default(), 0.0, 0.0);
        run(&mut player, &mut map, &mut input, 30);
        player.die();

        player.reset(8.0, 0.0);
        assert_eq!(player.state(), PlayerStateName::Falling);
        assert_eq!(player.coins(), 0);
        assert_eq!(player.position(), Vector2::new(8.0, 0.0));
        assert!(player.take_collected_coins().is_empty());
        assert!(!player.body.has_died);
    }
}

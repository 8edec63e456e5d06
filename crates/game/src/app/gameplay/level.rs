use engine::{
    BodyDesc, EntityId, InputAction, InputSnapshot, RenderableDesc, Rgba, Scene, SceneCommand,
    SceneKey, SceneParams, SceneWorld, TextAnchor, Vec2,
};
use tracing::info;

use super::movement::{Actor, MovementProfile};
use super::worlds::{resolve_world, WorldDescriptor};
use super::{
    apply_motion, movement_input, spawn_player, TEXTURE_BOOK, TEXTURE_PLATFORM, TEXT_DIM,
    TEXT_WHITE,
};

const BACKGROUND: Rgba = [0x0d, 0x12, 0x20, 255];
const PLATFORM_SIZE: Vec2 = Vec2::new(64.0, 16.0);
const BOOK_SIZE: Vec2 = Vec2::new(16.0, 12.0);
const RETURN_HINT: &str = "Collect overdue books. Press Q to return to Hub.";

/// (x, offset above the bottom edge) for each platform.
const PLATFORMS: [(f32, f32); 4] = [
    (200.0, 80.0),
    (450.0, 150.0),
    (700.0, 230.0),
    (950.0, 300.0),
];
const BOOKS: [(f32, f32); 4] = [
    (220.0, 120.0),
    (460.0, 200.0),
    (720.0, 280.0),
    (980.0, 360.0),
];
const PLAYER_SPAWN: (f32, f32) = (100.0, 200.0);

#[derive(Debug)]
struct LevelState {
    world: &'static WorldDescriptor,
    player: EntityId,
    actor: Actor,
    books: Vec<EntityId>,
    score: u32,
    score_label: EntityId,
}

pub(crate) struct LevelScene {
    profile: MovementProfile,
    state: Option<LevelState>,
}

impl LevelScene {
    pub(crate) fn new(profile: MovementProfile) -> Self {
        Self {
            profile,
            state: None,
        }
    }
}

fn score_text(score: u32) -> String {
    format!("Books: {score}")
}

impl Scene for LevelScene {
    fn load(&mut self, params: &SceneParams, world: &mut SceneWorld) {
        let descriptor = resolve_world(params.world_id.as_deref());
        let h = world.viewport().height as f32;
        world.set_background(BACKGROUND);

        world.spawn(
            Vec2::new(16.0, 16.0),
            RenderableDesc::text(
                format!("World: {}", descriptor.id),
                2,
                TEXT_WHITE,
                TextAnchor::TopLeft,
            ),
        );
        world.spawn(
            Vec2::new(16.0, 40.0),
            RenderableDesc::text(RETURN_HINT, 2, TEXT_DIM, TextAnchor::TopLeft),
        );
        let score_label = world.spawn(
            Vec2::new(16.0, 64.0),
            RenderableDesc::text(score_text(0), 2, TEXT_WHITE, TextAnchor::TopLeft),
        );

        for (x, rise) in PLATFORMS {
            world.spawn_with_body(
                Vec2::new(x, h - rise),
                RenderableDesc::sprite(TEXTURE_PLATFORM),
                BodyDesc::solid(PLATFORM_SIZE),
            );
        }

        let books = BOOKS
            .iter()
            .map(|&(x, rise)| {
                world.spawn_with_body(
                    Vec2::new(x, h - rise),
                    RenderableDesc::sprite(TEXTURE_BOOK),
                    BodyDesc::sensor(BOOK_SIZE),
                )
            })
            .collect();

        let player = spawn_player(world, Vec2::new(PLAYER_SPAWN.0, h - PLAYER_SPAWN.1));
        self.state = Some(LevelState {
            world: descriptor,
            player,
            actor: Actor::default(),
            books,
            score: 0,
            score_label,
        });
    }

    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand {
        let Some(state) = self.state.as_mut() else {
            return SceneCommand::None;
        };

        if input.just_pressed(InputAction::ReturnToHub) {
            info!(
                world_id = state.world.id,
                score = state.score,
                "returned_to_hub"
            );
            return SceneCommand::Start(SceneKey::Hub, SceneParams::default());
        }

        let grounded = world.is_blocked_down(state.player);
        let command = state.actor.step(
            &self.profile,
            movement_input(input, grounded),
            fixed_dt_seconds,
        );
        apply_motion(world, state.player, command, state.actor.facing());

        let player = state.player;
        let (picked, remaining): (Vec<EntityId>, Vec<EntityId>) = state
            .books
            .iter()
            .copied()
            .partition(|&book| world.overlaps(player, book));
        for book in picked {
            world.despawn(book);
            state.score += 1;
            info!(
                world_id = state.world.id,
                score = state.score,
                "collectible_picked"
            );
        }
        if remaining.len() != state.books.len() {
            state.books = remaining;
            world.set_text(state.score_label, score_text(state.score));
        }

        SceneCommand::None
    }

    fn unload(&mut self, _world: &mut SceneWorld) {
        self.state = None;
    }

    fn debug_title(&self) -> Option<String> {
        self.state
            .as_ref()
            .map(|state| format!("Archivist - {}", state.world.name))
    }

    fn debug_lines(&self) -> Vec<String> {
        let Some(state) = self.state.as_ref() else {
            return Vec::new();
        };
        vec![
            format!("world: {}", state.world.id),
            format!("score: {}/{}", state.score, BOOKS.len()),
            format!("dash: {}", state.actor.dash_phase().label()),
            format!("double jump: {}", state.actor.double_jump_available()),
        ]
    }
}
